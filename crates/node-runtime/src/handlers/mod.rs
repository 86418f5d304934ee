//! # Event Handlers
//!
//! Background consumers of the event bus.

pub mod ingest;

pub use ingest::IngestHandler;
