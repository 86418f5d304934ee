//! # Node API Subsystem (tw-08)
//!
//! The SECOM operation contracts of a Tidewire node and the local dataset
//! catalogue they serve from. The transport layer authenticates the caller
//! and hands over its MRN; everything after that lives here.
//!
//! ## Operations
//!
//! | Operation | Delegates to |
//! |-----------|--------------|
//! | `ping` | Identity Resolver |
//! | `capability` | static supported-product table |
//! | `subscribe` / `unsubscribe` | Subscription Manager |
//! | `acknowledge` | Delivery Engine |
//! | `get` / `getSummary` | catalogue, signed with the Trust Provider |
//! | `getByLink` | Link Store |
//! | `ingest` | catalogue, then `DatasetIngested` on the event bus |
//! | `publish` | Delivery Engine |
//!
//! Errors leave this crate as [`shared_types::SecomError`]; each failure is
//! counted in `tw_subsystem_errors_total` by kind.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{EventingNotifier, InMemoryDatasetCatalogue};
pub use domain::{
    capabilities, CapabilityDescriptor, CatalogueError, Dataset, DatasetEnvelope, DatasetFilter,
    DatasetQuery, DatasetSummary, ImplementedInterfaces, IngestRequest,
};
pub use ports::{DatasetCatalogue, PendingPublication, SecomApi};
pub use service::{NodeApiDependencies, SecomNode};
