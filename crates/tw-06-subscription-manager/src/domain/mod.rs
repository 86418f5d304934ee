//! # Domain Layer
//!
//! Subscription entity, the incoming request, match criteria and errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
