//! # Ports Layer
//!
//! - `inbound`: the SECOM operation contracts exposed to the transport layer
//! - `outbound`: the dataset catalogue the node reads from

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
