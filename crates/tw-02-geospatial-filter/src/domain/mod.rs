//! # Domain Layer
//!
//! Pure geometry logic, no I/O beyond loading the coded-location table.

pub mod coded_location;
pub mod errors;
pub mod shapes;

pub use coded_location::*;
pub use errors::*;
pub use shapes::*;
