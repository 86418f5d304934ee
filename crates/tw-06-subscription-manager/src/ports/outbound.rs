//! # Outbound Ports (Driven Ports)

use crate::domain::{PublishedDataset, Subscription};
use async_trait::async_trait;
use shared_types::{NodeId, SecomError, StoreError, SubscriptionEvent, SubscriptionId, Timestamp};
use tw_01_identity_resolver::Node;

/// Subscription persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Store `subscription` unless its node already has one; returns whichever
    /// record is stored afterwards.
    async fn insert_if_absent(&self, subscription: Subscription)
        -> Result<Subscription, StoreError>;

    async fn get(&self, id: SubscriptionId) -> Result<Option<Subscription>, StoreError>;

    async fn find_by_node(&self, node: NodeId) -> Result<Option<Subscription>, StoreError>;

    async fn delete(&self, id: SubscriptionId) -> Result<bool, StoreError>;

    /// Subscriptions `dataset` should be delivered to at `now`.
    async fn find_matching(
        &self,
        dataset: &PublishedDataset,
        now: Timestamp,
    ) -> Result<Vec<Subscription>, StoreError>;
}

/// Sends subscription lifecycle notifications to the subscribing node.
#[async_trait]
pub trait SubscriptionNotifier: Send + Sync {
    async fn notify(
        &self,
        node: &Node,
        subscription: SubscriptionId,
        event: SubscriptionEvent,
    ) -> Result<(), SecomError>;
}
