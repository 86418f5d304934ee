//! # Adapters Layer

pub mod cache;
pub mod http;

pub use cache::*;
pub use http::*;
