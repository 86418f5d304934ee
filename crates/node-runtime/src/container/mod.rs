//! # Subsystem Container
//!
//! Central container holding all subsystem instances with dependency
//! injection and the configuration they were built from.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig};
pub use subsystems::SubsystemContainer;
