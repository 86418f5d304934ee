//! # Inbound Ports (Driving Ports)

use crate::domain::{IdentityError, Node};
use async_trait::async_trait;
use shared_types::{Mrn, Timestamp};

/// Primary API of the identity resolver.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Return the node registered under `mrn`, creating it on first contact.
    ///
    /// Idempotent: repeated calls with the same MRN yield the same identity.
    async fn find_or_create(&self, mrn: &Mrn) -> Result<Node, IdentityError>;

    /// Look up a node without creating it.
    async fn find(&self, mrn: &Mrn) -> Result<Option<Node>, IdentityError>;

    /// Record an interaction with `mrn` now and return the previous one.
    async fn record_interaction(&self, mrn: &Mrn) -> Result<Option<Timestamp>, IdentityError>;
}
