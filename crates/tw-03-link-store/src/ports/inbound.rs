//! # Inbound Ports (Driving Ports)

use crate::domain::LinkError;
use async_trait::async_trait;
use bytes::Bytes;
use shared_types::{NodeId, Timestamp, TransactionId};

/// Primary API of the link store.
#[async_trait]
pub trait LinkStoreApi: Send + Sync {
    /// Store `data` for `owner` until `expires_at` and return the identifier
    /// it can be fetched with.
    async fn store_link(
        &self,
        owner: NodeId,
        expires_at: Timestamp,
        data: Bytes,
    ) -> Result<TransactionId, LinkError>;

    /// Fetch a link's payload.
    ///
    /// Fails with `NotFound` when the link does not exist, belongs to another
    /// node, or has expired.
    async fn get_link(&self, owner: NodeId, id: TransactionId) -> Result<Bytes, LinkError>;

    /// Delete every link that expired before `now`. Returns the count.
    async fn cleanup_expired(&self, now: Timestamp) -> Result<usize, LinkError>;
}
