//! # Transactional Delivery Engine Subsystem (tw-07)
//!
//! Pushes published datasets to matching subscribers as signed SECOM
//! envelopes and tracks each push as a transaction until the receiver
//! acknowledges it.
//!
//! ## Publish Flow
//!
//! ```text
//! publish(dataset)
//!   └─ SubscriberLookup::find_active_subscribers
//!        └─ per subscriber (bounded concurrency, per-send timeout)
//!             ├─ payload > inline limit ? LinkStore::store_link : inline
//!             ├─ TransactionRepository::insert (OPEN)
//!             ├─ sign_envelope
//!             ├─ EndpointResolver::resolve_mrn
//!             └─ upload / upload_link
//! ```
//!
//! A failing subscriber is logged and reported in the [`PublishReport`];
//! the others are still served.
//!
//! ## Acknowledgements
//!
//! `OPEN -> {ACKNOWLEDGED, OPENED, ERROR}`, all terminal. The first
//! acknowledgement wins, an identical repeat is accepted as a no-op and
//! anything else is rejected. Updates are compare-and-swap on the record's
//! revision.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryTransactionRepository;
pub use domain::{
    AckOutcome, Delivery, DeliveryConfig, DeliveryError, DeliveryFailure, Publication,
    PublishReport, Transaction, TransactionPayload, TransactionState, DEFAULT_INLINE_LIMIT,
};
pub use ports::{DeliveryApi, TransactionRepository};
pub use service::{DeliveryDependencies, DeliveryEngine};
