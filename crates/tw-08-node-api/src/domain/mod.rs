//! # Domain Layer
//!
//! Catalogue entities, query filters, SECOM response shapes and errors.

pub mod capability;
pub mod entities;
pub mod errors;

pub use capability::*;
pub use entities::*;
pub use errors::*;
