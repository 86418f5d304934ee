//! # Acknowledgement Flow
//!
//! upload ──→ remote signs EnvelopeAckObject ──→ acknowledge_envelope
//!        ──→ tw-04 verifies ──→ tw-07 applies ──→ TransactionAcknowledged

use super::harness::{mrn, TestNode, SHIP_A, SHIP_B};
use bytes::Bytes;
use shared_bus::{EventFilter, EventSubscriber, EventTopic, NodeEvent};
use shared_types::{AckType, ErrorKind, NackType, ProductType, TransactionId};
use tw_06_subscription_manager::SubscriptionRequest;
use tw_08_node_api::{IngestRequest, SecomApi};

async fn delivered_transaction(node: &TestNode) -> TransactionId {
    node.api()
        .subscribe(&mrn(SHIP_A), SubscriptionRequest::for_product(ProductType::S124))
        .await
        .unwrap();
    let reference = node
        .api()
        .ingest(IngestRequest {
            mrn: "urn:mrn:nw:dk:dma:nw-7-24".into(),
            data_product_type: ProductType::S124,
            product_version: "2.0.0".into(),
            title: None,
            geometry: None,
            valid_from: None,
            valid_to: None,
            payload: Bytes::from_static(b"<S124/>"),
            references: Vec::new(),
        })
        .await
        .unwrap();
    let report = node.api().publish(reference).await.unwrap();
    report.delivered[0].transaction
}

#[tokio::test]
async fn test_signed_ack_is_applied_once_and_announced() {
    let node = TestNode::new();
    let id = delivered_transaction(&node).await;
    let mut events = node
        .container
        .event_bus
        .subscribe(EventFilter::topics(vec![EventTopic::Delivery]));

    let ack = node.signed_ack(SHIP_A, id, AckType::DeliveredAck);
    node.api().acknowledge_envelope(&mrn(SHIP_A), &ack).await.unwrap();
    // A retried callback is accepted without a second event.
    node.api().acknowledge_envelope(&mrn(SHIP_A), &ack).await.unwrap();

    assert_eq!(
        events.recv().await,
        Some(NodeEvent::TransactionAcknowledged {
            transaction_id: id,
            node: mrn(SHIP_A),
            ack_type: AckType::DeliveredAck,
        })
    );
    assert!(events.try_recv().unwrap().is_none());

    let opened = node.signed_ack(SHIP_A, id, AckType::OpenedAck);
    let err = node
        .api()
        .acknowledge_envelope(&mrn(SHIP_A), &opened)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_tampered_ack_is_rejected() {
    let node = TestNode::new();
    let id = delivered_transaction(&node).await;

    let mut ack = node.signed_ack(SHIP_A, id, AckType::DeliveredAck);
    ack.envelope.ack_type = AckType::OpenedAck;
    let err = node
        .api()
        .acknowledge_envelope(&mrn(SHIP_A), &ack)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCredential);
}

#[tokio::test]
async fn test_ack_from_other_node_is_not_found() {
    let node = TestNode::new();
    let id = delivered_transaction(&node).await;

    let err = node
        .api()
        .acknowledge(&mrn(SHIP_B), id, AckType::DeliveredAck, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_error_ack_requires_nack_type() {
    let node = TestNode::new();
    let id = delivered_transaction(&node).await;

    let err = node
        .api()
        .acknowledge(&mrn(SHIP_A), id, AckType::Error, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    node.api()
        .acknowledge(
            &mrn(SHIP_A),
            id,
            AckType::Error,
            Some(NackType::XmlSchemaValidationError),
        )
        .await
        .unwrap();
}
