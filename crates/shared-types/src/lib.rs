//! # Shared Types Crate
//!
//! Identities, product enumerations, SECOM wire objects and error kinds shared
//! by every Tidewire subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Opaque Identity**: An `Mrn` reaching the core is already authenticated
//!   by the transport layer; the core only normalises it.
//! - **Closed Product Set**: Product lookups go through the `ProductType`
//!   enum and the static `SUPPORTED_PRODUCTS` table, never through names.

pub mod entities;
pub mod errors;
pub mod secom;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use secom::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
