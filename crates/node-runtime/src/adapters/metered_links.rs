//! # Metered Link Store
//!
//! Wraps the tw-03 link store so the background sweep reports how many links
//! it purged.

use async_trait::async_trait;
use bytes::Bytes;
use shared_types::{NodeId, Timestamp, TransactionId};
use std::sync::Arc;
use tw_03_link_store::{LinkError, LinkStoreApi};
use tw_telemetry::{log_event, LINKS_PURGED};

pub struct MeteredLinkStore {
    inner: Arc<dyn LinkStoreApi>,
}

impl MeteredLinkStore {
    pub fn new(inner: Arc<dyn LinkStoreApi>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LinkStoreApi for MeteredLinkStore {
    async fn store_link(
        &self,
        owner: NodeId,
        expires_at: Timestamp,
        data: Bytes,
    ) -> Result<TransactionId, LinkError> {
        self.inner.store_link(owner, expires_at, data).await
    }

    async fn get_link(&self, owner: NodeId, id: TransactionId) -> Result<Bytes, LinkError> {
        self.inner.get_link(owner, id).await
    }

    async fn cleanup_expired(&self, now: Timestamp) -> Result<usize, LinkError> {
        let purged = self.inner.cleanup_expired(now).await?;
        if purged > 0 {
            LINKS_PURGED.inc_by(purged as f64);
            log_event!(info, "tw-03", "Expired links purged", purged);
        }
        Ok(purged)
    }
}
