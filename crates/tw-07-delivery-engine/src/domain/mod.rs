//! # Domain Layer
//!
//! Transaction record, acknowledgement state machine, publish inputs and
//! reports.

pub mod config;
pub mod entities;
pub mod errors;
pub mod report;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use report::*;
