//! # Identity Resolver Service

use crate::domain::{IdentityError, Node};
use crate::ports::{IdentityApi, NodeRepository};
use async_trait::async_trait;
use shared_types::{Mrn, StoreError, TimeSource, Timestamp};
use std::sync::Arc;
use tracing::debug;

/// Resolves MRNs to node identity records.
pub struct IdentityResolverService {
    repository: Arc<dyn NodeRepository>,
    time_source: Arc<dyn TimeSource>,
}

impl IdentityResolverService {
    pub fn new(repository: Arc<dyn NodeRepository>, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            repository,
            time_source,
        }
    }
}

#[async_trait]
impl IdentityApi for IdentityResolverService {
    async fn find_or_create(&self, mrn: &Mrn) -> Result<Node, IdentityError> {
        if let Some(node) = self.repository.find_by_mrn(mrn).await? {
            return Ok(node);
        }

        let node = Node::first_contact(mrn.clone(), self.time_source.now());
        let stored = self.repository.insert_if_absent(node).await?;
        debug!(mrn = %stored.mrn, node_id = %stored.id, "Registered node on first contact");
        Ok(stored)
    }

    async fn find(&self, mrn: &Mrn) -> Result<Option<Node>, IdentityError> {
        Ok(self.repository.find_by_mrn(mrn).await?)
    }

    async fn record_interaction(&self, mrn: &Mrn) -> Result<Option<Timestamp>, IdentityError> {
        let now = self.time_source.now();
        if let Some(previous) = self.repository.touch(mrn, now).await? {
            return Ok(previous);
        }

        self.find_or_create(mrn).await?;
        self.repository
            .touch(mrn, now)
            .await?
            .ok_or_else(|| {
                IdentityError::Storage(StoreError::Backend(format!(
                    "node {mrn} vanished after insert"
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryNodeRepository;
    use chrono::TimeZone;
    use shared_types::{ManualTimeSource, NodeId};

    fn setup() -> (
        IdentityResolverService,
        Arc<InMemoryNodeRepository>,
        Arc<ManualTimeSource>,
    ) {
        let repo = Arc::new(InMemoryNodeRepository::new());
        let clock = Arc::new(ManualTimeSource::new(
            chrono::Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
        ));
        let service = IdentityResolverService::new(repo.clone(), clock.clone());
        (service, repo, clock)
    }

    fn mrn(s: &str) -> Mrn {
        Mrn::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let (service, repo, _) = setup();
        let a = service.find_or_create(&mrn("urn:mrn:mcp:device:dk:a")).await.unwrap();
        let b = service.find_or_create(&mrn("urn:mrn:mcp:device:dk:a")).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_identity_is_stable_across_case() {
        let (service, _, _) = setup();
        let a = service.find_or_create(&mrn("urn:mrn:mcp:device:DK:A")).await.unwrap();
        assert_eq!(a.id, NodeId::for_mrn(&mrn("urn:mrn:mcp:device:dk:a")));
    }

    #[tokio::test]
    async fn test_concurrent_first_contact_converges() {
        let (service, repo, _) = setup();
        let service = Arc::new(service);
        let target = mrn("urn:mrn:mcp:device:dk:racer");
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                let target = target.clone();
                tokio::spawn(async move { service.find_or_create(&target).await.unwrap() })
            })
            .collect();
        let nodes: Vec<Node> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert!(nodes.windows(2).all(|w| w[0].id == w[1].id));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_record_interaction_returns_previous_time() {
        let (service, _, clock) = setup();
        let node = mrn("urn:mrn:mcp:device:dk:pinger");

        assert_eq!(service.record_interaction(&node).await.unwrap(), None);
        let first = clock.now();
        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(service.record_interaction(&node).await.unwrap(), Some(first));

        let stored = service.find(&node).await.unwrap().unwrap();
        assert_eq!(stored.last_interaction, Some(clock.now()));
    }

    #[tokio::test]
    async fn test_find_does_not_create() {
        let (service, repo, _) = setup();
        assert!(service
            .find(&mrn("urn:mrn:mcp:device:dk:ghost"))
            .await
            .unwrap()
            .is_none());
        assert!(repo.is_empty());
    }
}
