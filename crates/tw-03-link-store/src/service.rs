//! # Link Store Service

use crate::domain::{Link, LinkError};
use crate::ports::{LinkRepository, LinkStoreApi};
use async_trait::async_trait;
use bytes::Bytes;
use shared_types::{NodeId, TimeSource, Timestamp, TransactionId};
use std::sync::Arc;
use tracing::{debug, info};

pub struct LinkStoreService {
    repository: Arc<dyn LinkRepository>,
    time_source: Arc<dyn TimeSource>,
}

impl LinkStoreService {
    pub fn new(repository: Arc<dyn LinkRepository>, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            repository,
            time_source,
        }
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> Timestamp {
        self.time_source.now()
    }
}

#[async_trait]
impl LinkStoreApi for LinkStoreService {
    async fn store_link(
        &self,
        owner: NodeId,
        expires_at: Timestamp,
        data: Bytes,
    ) -> Result<TransactionId, LinkError> {
        let now = self.time_source.now();
        if expires_at <= now {
            return Err(LinkError::ExpiryInPast);
        }

        let link = Link::new(owner, data, now, expires_at);
        let id = link.id;
        let size = link.size;
        self.repository.insert(link).await?;
        debug!(link_id = %id, owner = %owner, size, %expires_at, "Stored link");
        Ok(id)
    }

    async fn get_link(&self, owner: NodeId, id: TransactionId) -> Result<Bytes, LinkError> {
        let link = self
            .repository
            .get(id)
            .await?
            .ok_or(LinkError::NotFound(id))?;

        if link.owner != owner {
            debug!(link_id = %id, requester = %owner, "Link requested by non-owner");
            return Err(LinkError::NotFound(id));
        }

        if link.is_expired(self.time_source.now()) {
            // Expired links are logically gone; drop them eagerly.
            self.repository.delete(id).await?;
            return Err(LinkError::NotFound(id));
        }

        Ok(link.data)
    }

    async fn cleanup_expired(&self, now: Timestamp) -> Result<usize, LinkError> {
        let removed = self.repository.delete_expired(now).await?;
        if removed > 0 {
            info!(removed, "Purged expired links");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryLinkRepository;
    use chrono::{Duration, TimeZone};
    use shared_types::ManualTimeSource;

    fn setup() -> (
        LinkStoreService,
        Arc<InMemoryLinkRepository>,
        Arc<ManualTimeSource>,
    ) {
        let repo = Arc::new(InMemoryLinkRepository::new());
        let clock = Arc::new(ManualTimeSource::new(
            chrono::Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap(),
        ));
        (
            LinkStoreService::new(repo.clone(), clock.clone()),
            repo,
            clock,
        )
    }

    #[tokio::test]
    async fn test_owner_reads_link_before_expiry() {
        let (store, _, clock) = setup();
        let owner = NodeId::new_random();
        let id = store
            .store_link(owner, clock.now() + Duration::hours(1), Bytes::from_static(b"payload"))
            .await
            .unwrap();
        assert_eq!(store.get_link(owner, id).await.unwrap(), Bytes::from_static(b"payload"));
    }

    /// The comparison must fail reads past expiry, not before it.
    #[tokio::test]
    async fn test_expired_link_is_not_found() {
        let (store, repo, clock) = setup();
        let owner = NodeId::new_random();
        let id = store
            .store_link(owner, clock.now() + Duration::hours(1), Bytes::from_static(b"x"))
            .await
            .unwrap();

        clock.advance(Duration::minutes(59));
        assert!(store.get_link(owner, id).await.is_ok());

        clock.advance(Duration::minutes(2));
        assert_eq!(store.get_link(owner, id).await, Err(LinkError::NotFound(id)));
        assert!(repo.is_empty(), "expired read should drop the link");
    }

    #[tokio::test]
    async fn test_other_node_gets_not_found() {
        let (store, _, clock) = setup();
        let owner = NodeId::new_random();
        let stranger = NodeId::new_random();
        let id = store
            .store_link(owner, clock.now() + Duration::hours(1), Bytes::from_static(b"x"))
            .await
            .unwrap();

        let err = store.get_link(stranger, id).await.unwrap_err();
        assert_eq!(err, LinkError::NotFound(id));
        assert_eq!(err.kind(), shared_types::ErrorKind::NotFound);
        assert!(store.get_link(owner, id).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_link_is_not_found() {
        let (store, _, _) = setup();
        let id = TransactionId::new_random();
        assert_eq!(
            store.get_link(NodeId::new_random(), id).await,
            Err(LinkError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn test_store_rejects_expiry_in_past() {
        let (store, _, clock) = setup();
        let result = store
            .store_link(NodeId::new_random(), clock.now(), Bytes::new())
            .await;
        assert_eq!(result, Err(LinkError::ExpiryInPast));
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_expired() {
        let (store, repo, clock) = setup();
        let owner = NodeId::new_random();
        let short = store
            .store_link(owner, clock.now() + Duration::minutes(10), Bytes::from_static(b"a"))
            .await
            .unwrap();
        let long = store
            .store_link(owner, clock.now() + Duration::days(1), Bytes::from_static(b"b"))
            .await
            .unwrap();

        clock.advance(Duration::hours(1));
        assert_eq!(store.cleanup_expired(clock.now()).await.unwrap(), 1);
        assert_eq!(repo.len(), 1);
        assert!(store.get_link(owner, long).await.is_ok());
        assert_eq!(store.get_link(owner, short).await, Err(LinkError::NotFound(short)));
    }

    #[tokio::test]
    async fn test_reads_racing_cleanup_see_whole_payload_or_not_found() {
        let (store, _, clock) = setup();
        let store = Arc::new(store);
        let owner = NodeId::new_random();
        let payload = Bytes::from(vec![7u8; 64 * 1024]);
        let id = store
            .store_link(owner, clock.now() + Duration::minutes(1), payload.clone())
            .await
            .unwrap();
        clock.advance(Duration::minutes(2));

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.get_link(owner, id).await })
            })
            .collect();
        let sweep = {
            let store = store.clone();
            let now = clock.now();
            tokio::spawn(async move { store.cleanup_expired(now).await })
        };

        for result in futures::future::join_all(readers).await {
            match result.unwrap() {
                Ok(bytes) => assert_eq!(bytes, payload),
                Err(e) => assert_eq!(e, LinkError::NotFound(id)),
            }
        }
        sweep.await.unwrap().unwrap();
    }
}
