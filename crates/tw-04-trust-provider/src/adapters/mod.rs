//! # Adapters Layer
//!
//! PEM file sources for key material and trust anchors, and the outbound
//! HTTPS client factory.

pub mod file_source;
pub mod http;

pub use file_source::*;
pub use http::*;
