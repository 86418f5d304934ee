//! # Link Store Subsystem (tw-03)
//!
//! Keeps large payloads behind the transaction identifier that produced them
//! so a receiver can fetch them with `getByLink` instead of receiving them
//! inline.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Only the owning node may read a link | `LinkStoreService::get_link` |
//! | A link is unreadable from its expiry instant onward | `Link::is_expired` |
//! | Missing, foreign and expired links look identical | `LinkError::NotFound` |
//! | Reads racing a purge never see partial bytes | immutable `Bytes` payloads |
//!
//! No access count or access log is kept.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod tasks;

pub use adapters::InMemoryLinkRepository;
pub use domain::{Link, LinkError};
pub use ports::{LinkRepository, LinkStoreApi};
pub use service::LinkStoreService;
pub use tasks::{spawn_cleanup_task, DEFAULT_CLEANUP_INTERVAL};
