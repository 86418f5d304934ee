//! # Domain Layer
//!
//! Algorithms, keys and certificates. No file or network access.

pub mod algorithm;
pub mod certificate;
pub mod errors;
pub mod keys;
pub mod pem;

pub use algorithm::*;
pub use certificate::*;
pub use errors::*;
pub use keys::*;
pub use pem::*;
