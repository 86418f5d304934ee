//! # Domain Layer
//!
//! Node identity records and identity errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
