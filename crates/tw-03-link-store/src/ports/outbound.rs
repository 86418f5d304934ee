//! # Outbound Ports (Driven Ports)

use crate::domain::Link;
use async_trait::async_trait;
use shared_types::{StoreError, Timestamp, TransactionId};

/// Storage for links, keyed by transaction identifier.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Persist a new link.
    async fn insert(&self, link: Link) -> Result<(), StoreError>;

    /// Load a link by identifier.
    async fn get(&self, id: TransactionId) -> Result<Option<Link>, StoreError>;

    /// Remove a link. Returns whether it existed.
    async fn delete(&self, id: TransactionId) -> Result<bool, StoreError>;

    /// Remove every link whose expiry precedes `before`. Returns the count.
    async fn delete_expired(&self, before: Timestamp) -> Result<usize, StoreError>;
}
