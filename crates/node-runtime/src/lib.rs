//! # Node Runtime Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and subsystem wiring
//! - `adapters/` - Decorators around subsystem ports
//! - `handlers/` - Event bus consumers
//! - `runtime` - Background task lifecycle
//!
//! ## Dataset Flow
//!
//! ```text
//! ingest (tw-08) ──DatasetIngested──→ Event Bus ──→ IngestHandler
//!                                                       │
//!                                                       ↓
//!                                  publish (tw-08) ──→ Delivery Engine (tw-07)
//!                                                       │
//!                              matching subscribers ←───┘ (tw-06, tw-05, tw-03, tw-04)
//! ```

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use container::{ConfigError, NodeConfig, SubsystemContainer};
pub use runtime::{metrics_snapshot, NodeRuntime};
