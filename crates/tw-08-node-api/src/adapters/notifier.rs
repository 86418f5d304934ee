//! # Eventing Notifier
//!
//! Wraps the notifier that tells the remote node about its subscription and
//! additionally announces the change on the event bus. The subscription
//! manager only notifies on real creations and removals, so idempotent
//! re-subscribes never reach this adapter.

use async_trait::async_trait;
use shared_bus::{EventPublisher, NodeEvent};
use shared_types::{SecomError, SubscriptionEvent, SubscriptionId};
use std::sync::Arc;
use tw_01_identity_resolver::Node;
use tw_06_subscription_manager::SubscriptionNotifier;
use tw_telemetry::{SUBSCRIPTIONS_CREATED, SUBSCRIPTIONS_REMOVED};

pub struct EventingNotifier {
    inner: Arc<dyn SubscriptionNotifier>,
    events: Arc<dyn EventPublisher>,
}

impl EventingNotifier {
    pub fn new(inner: Arc<dyn SubscriptionNotifier>, events: Arc<dyn EventPublisher>) -> Self {
        Self { inner, events }
    }
}

#[async_trait]
impl SubscriptionNotifier for EventingNotifier {
    async fn notify(
        &self,
        node: &Node,
        subscription: SubscriptionId,
        event: SubscriptionEvent,
    ) -> Result<(), SecomError> {
        let announcement = match event {
            SubscriptionEvent::SubscriptionCreated => {
                SUBSCRIPTIONS_CREATED.inc();
                NodeEvent::SubscriptionCreated {
                    subscription_id: subscription,
                    node: node.mrn.clone(),
                }
            }
            SubscriptionEvent::SubscriptionRemoved => {
                SUBSCRIPTIONS_REMOVED.inc();
                NodeEvent::SubscriptionRemoved {
                    subscription_id: subscription,
                    node: node.mrn.clone(),
                }
            }
        };
        self.events.publish(announcement).await;

        self.inner.notify(node, subscription, event).await
    }
}
