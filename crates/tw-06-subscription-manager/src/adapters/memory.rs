//! In-memory subscription repository.

use crate::domain::{PublishedDataset, Subscription};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{NodeId, StoreError, SubscriptionId, Timestamp};
use std::collections::HashMap;

/// Subscriptions keyed by id, with a per-node uniqueness index.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<SubscriptionId, Subscription>,
    by_node: HashMap<NodeId, SubscriptionId>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn insert_if_absent(
        &self,
        subscription: Subscription,
    ) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.by_node.get(&subscription.node) {
            return inner
                .by_id
                .get(existing)
                .cloned()
                .ok_or_else(|| StoreError::Backend("dangling node index".to_string()));
        }
        if inner.by_id.contains_key(&subscription.id) {
            return Err(StoreError::Duplicate(subscription.id.to_string()));
        }
        inner.by_node.insert(subscription.node, subscription.id);
        inner.by_id.insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, StoreError> {
        Ok(self.inner.read().by_id.get(&id).cloned())
    }

    async fn find_by_node(&self, node: NodeId) -> Result<Option<Subscription>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .by_node
            .get(&node)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn delete(&self, id: SubscriptionId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        match inner.by_id.remove(&id) {
            Some(removed) => {
                inner.by_node.remove(&removed.node);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_matching(
        &self,
        dataset: &PublishedDataset,
        now: Timestamp,
    ) -> Result<Vec<Subscription>, StoreError> {
        let inner = self.inner.read();
        let mut matches: Vec<Subscription> = inner
            .by_id
            .values()
            .filter(|sub| dataset.matches(sub, now))
            .cloned()
            .collect();
        matches.sort_by_key(|sub| sub.created_at);
        Ok(matches)
    }
}
