//! # Outbound Ports (Driven Ports)
//!
//! SPIs required by the identity resolver.

use crate::domain::Node;
use async_trait::async_trait;
use shared_types::{Mrn, StoreError, Timestamp};

/// Storage for node identity records, keyed by MRN.
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Find a node by MRN.
    async fn find_by_mrn(&self, mrn: &Mrn) -> Result<Option<Node>, StoreError>;

    /// Insert `node` unless a node with the same MRN exists.
    ///
    /// Returns whichever record is stored afterwards, so concurrent first
    /// contacts converge on one identity.
    async fn insert_if_absent(&self, node: Node) -> Result<Node, StoreError>;

    /// Set the last interaction of an existing node, returning the previous
    /// value. `Ok(None)` from the outer option means the node is unknown.
    async fn touch(
        &self,
        mrn: &Mrn,
        at: Timestamp,
    ) -> Result<Option<Option<Timestamp>>, StoreError>;
}
