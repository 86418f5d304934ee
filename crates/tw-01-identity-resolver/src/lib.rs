//! # Identity Resolver Subsystem (tw-01)
//!
//! Maps a maritime resource name (MRN) to a stable node identity record and
//! creates the record on first contact.
//!
//! ## Responsibilities
//!
//! - `find_or_create`: idempotent per MRN, never fails except on storage error
//! - `record_interaction`: stamps ping and acknowledgement activity
//! - Node identifiers are UUIDv8 values derived from the lowercased MRN, so
//!   the same MRN yields the same identifier on every deployment
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): `Node` entity and errors
//! - **Ports Layer** (`ports/`): `IdentityApi` inbound, `NodeRepository` outbound
//! - **Adapters Layer** (`adapters/`): in-memory repository
//! - **Service** (`service.rs`): `IdentityResolverService`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryNodeRepository;
pub use domain::{IdentityError, Node};
pub use ports::{IdentityApi, NodeRepository};
pub use service::IdentityResolverService;
