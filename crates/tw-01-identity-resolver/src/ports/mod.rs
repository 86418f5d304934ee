//! # Ports Layer
//!
//! - **Inbound** (`IdentityApi`): what other subsystems call
//! - **Outbound** (`NodeRepository`): what storage adapters provide

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
