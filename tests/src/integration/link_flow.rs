//! # Link Flow
//!
//! Payloads above the inline limit go to tw-03 and the subscriber receives a
//! link envelope; it then fetches the bytes with `getByLink` until expiry.

use super::harness::{mrn, TestNode, SHIP_A, SHIP_B};
use bytes::Bytes;
use shared_types::{ErrorKind, ProductType, TimeSource};
use tw_03_link_store::LinkStoreApi;
use tw_06_subscription_manager::SubscriptionRequest;
use tw_08_node_api::{IngestRequest, SecomApi};

const PAYLOAD: &[u8] = b"<S124>a dataset larger than the inline limit</S124>";

fn small_inline_limit() -> TestNode {
    TestNode::with_config(|config| {
        config.delivery.inline_limit = 16;
        config.delivery.link_ttl_secs = 60 * 60;
    })
}

async fn publish_large(node: &TestNode) -> shared_types::TransactionId {
    node.api()
        .subscribe(&mrn(SHIP_A), SubscriptionRequest::for_product(ProductType::S124))
        .await
        .unwrap();
    let reference = node
        .api()
        .ingest(IngestRequest {
            mrn: "urn:mrn:nw:dk:dma:nw-99-24".into(),
            data_product_type: ProductType::S124,
            product_version: "2.0.0".into(),
            title: None,
            geometry: None,
            valid_from: None,
            valid_to: None,
            payload: Bytes::from_static(PAYLOAD),
            references: Vec::new(),
        })
        .await
        .unwrap();
    let report = node.api().publish(reference).await.unwrap();
    assert!(report.delivered[0].as_link);
    report.delivered[0].transaction
}

#[tokio::test]
async fn test_large_payload_is_sent_as_link_and_fetched_by_owner() {
    let node = small_inline_limit();
    let id = publish_large(&node).await;

    assert!(node.remote(SHIP_A).uploads.lock().is_empty());
    let links = node.remote(SHIP_A).links.lock().clone();
    assert_eq!(links.len(), 1);
    let envelope = &links[0].envelope;
    assert_eq!(envelope.transaction_identifier, id);
    assert_eq!(envelope.size, PAYLOAD.len() as u64);
    assert_eq!(
        envelope.time_to_live,
        node.clock.now() + chrono::Duration::hours(1)
    );

    let fetched = node.api().get_by_link(&mrn(SHIP_A), id).await.unwrap();
    assert_eq!(fetched, Bytes::from_static(PAYLOAD));

    let err = node.api().get_by_link(&mrn(SHIP_B), id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_link_expires_and_is_purged() {
    let node = small_inline_limit();
    let id = publish_large(&node).await;

    node.clock.advance(chrono::Duration::hours(2));
    let err = node.api().get_by_link(&mrn(SHIP_A), id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Already removed by the expired read above.
    let purged = node
        .container
        .links
        .cleanup_expired(node.clock.now())
        .await
        .unwrap();
    assert_eq!(purged, 0);
}

#[tokio::test]
async fn test_cleanup_sweep_purges_unread_links() {
    let node = small_inline_limit();
    publish_large(&node).await;

    node.clock.advance(chrono::Duration::hours(2));
    let purged = node
        .container
        .links
        .cleanup_expired(node.clock.now())
        .await
        .unwrap();
    assert_eq!(purged, 1);
}
