//! # Inbound Ports (Driving Ports)

use crate::domain::{PublishedDataset, Subscription, SubscriptionError, SubscriptionRequest};
use async_trait::async_trait;
use shared_types::{SubscriptionId, Timestamp};
use tw_01_identity_resolver::Node;

/// Primary API of the subscription manager.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    /// Register `node`'s subscription.
    ///
    /// A node holds at most one subscription; a repeat call returns the
    /// existing identifier and creates nothing.
    async fn subscribe(
        &self,
        node: &Node,
        request: SubscriptionRequest,
    ) -> Result<SubscriptionId, SubscriptionError>;

    /// Remove a subscription owned by `node`. `NotFound` when missing or
    /// owned by another node.
    async fn unsubscribe(&self, node: &Node, id: SubscriptionId) -> Result<(), SubscriptionError>;
}

/// Read side used by the delivery engine to find recipients.
#[async_trait]
pub trait SubscriberLookup: Send + Sync {
    async fn find_active_subscribers(
        &self,
        dataset: &PublishedDataset,
        now: Timestamp,
    ) -> Result<Vec<Subscription>, SubscriptionError>;
}
