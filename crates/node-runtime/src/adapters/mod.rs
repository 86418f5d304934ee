//! # Runtime Adapters
//!
//! Decorators the runtime places around subsystem ports.

pub mod metered_links;

pub use metered_links::MeteredLinkStore;
