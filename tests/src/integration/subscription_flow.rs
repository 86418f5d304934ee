//! # Subscription Flow
//!
//! subscribe ──→ tw-06 stores ──→ EventingNotifier ──→ bus + tw-07 notification
//! unsubscribe follows the same path with `SubscriptionRemoved`.

use super::harness::{eventually, mrn, TestNode, SHIP_A, SHIP_B};
use shared_bus::{EventFilter, EventSubscriber, EventTopic, NodeEvent};
use shared_types::{ErrorKind, ProductType, SubscriptionEvent};
use tw_06_subscription_manager::SubscriptionRequest;
use tw_08_node_api::SecomApi;

#[tokio::test]
async fn test_subscribe_notifies_remote_and_bus_once() {
    let node = TestNode::new();
    let mut events = node
        .container
        .event_bus
        .subscribe(EventFilter::topics(vec![EventTopic::Subscriptions]));

    let request = SubscriptionRequest::for_product(ProductType::S124);
    let id = node.api().subscribe(&mrn(SHIP_A), request.clone()).await.unwrap();
    let again = node.api().subscribe(&mrn(SHIP_A), request).await.unwrap();
    assert_eq!(id, again);

    let notifications = node.remote(SHIP_A).notifications.lock().clone();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].envelope.subscription_identifier, id);
    assert_eq!(
        notifications[0].envelope.event_enum,
        SubscriptionEvent::SubscriptionCreated
    );
    assert!(!notifications[0].envelope_signature.is_empty());

    assert_eq!(
        events.recv().await,
        Some(NodeEvent::SubscriptionCreated {
            subscription_id: id,
            node: mrn(SHIP_A),
        })
    );
    assert!(events.try_recv().unwrap().is_none());
}

#[tokio::test]
async fn test_unsubscribe_is_owner_only() {
    let node = TestNode::new();
    let id = node
        .api()
        .subscribe(&mrn(SHIP_A), SubscriptionRequest::for_product(ProductType::S124))
        .await
        .unwrap();

    let err = node.api().unsubscribe(&mrn(SHIP_B), id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    node.api().unsubscribe(&mrn(SHIP_A), id).await.unwrap();
    eventually(|| node.remote(SHIP_A).notifications.lock().len() == 2).await;
    let last = node.remote(SHIP_A).notifications.lock()[1].clone();
    assert_eq!(last.envelope.event_enum, SubscriptionEvent::SubscriptionRemoved);

    let err = node.api().unsubscribe(&mrn(SHIP_A), id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unsupported_subscription_is_not_implemented() {
    let node = TestNode::new();
    let err = node
        .api()
        .subscribe(&mrn(SHIP_A), SubscriptionRequest::for_product(ProductType::S101))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
    assert!(node.remote(SHIP_A).notifications.lock().is_empty());
}
