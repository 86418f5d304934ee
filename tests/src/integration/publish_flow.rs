//! # Publish Flow
//!
//! ingest ──→ catalogue ──DatasetIngested──→ IngestHandler ──→ publish
//!        ──→ tw-06 geometry match ──→ tw-07 signed upload per subscriber

use super::harness::{eventually, mrn, TestNode, SHIP_A, SHIP_B};
use bytes::Bytes;
use shared_types::{ProductType, TimeSource};
use tw_02_geospatial_filter::{coverage_circle, to_wkt, Geometry};
use tw_06_subscription_manager::SubscriptionRequest;
use tw_08_node_api::{DatasetFilter, IngestRequest, SecomApi};

const WARNING_LAT: f64 = 54.6586333;
const WARNING_LON: f64 = 10.6362500;

fn circle(lat: f64, lon: f64, radius_m: f64) -> String {
    to_wkt(&Geometry::Polygon(coverage_circle(lat, lon, radius_m, 64)))
}

fn area_request(wkt: String) -> SubscriptionRequest {
    SubscriptionRequest {
        geometry: Some(wkt),
        ..SubscriptionRequest::for_product(ProductType::S124)
    }
}

fn navigational_warning(payload: &'static [u8]) -> IngestRequest {
    IngestRequest {
        mrn: "urn:mrn:nw:dk:dma:nw-42-24".into(),
        data_product_type: ProductType::S124,
        product_version: "2.0.0".into(),
        title: Some("Buoy adrift south of Langeland".into()),
        geometry: Some(format!("POINT({WARNING_LON} {WARNING_LAT})")),
        valid_from: None,
        valid_to: None,
        payload: Bytes::from_static(payload),
        references: Vec::new(),
    }
}

#[tokio::test]
async fn test_only_subscribers_covering_the_warning_receive_it() {
    let node = TestNode::new();

    // 80 m east of the warning at this latitude is about 0.00124 degrees.
    let east = WARNING_LON + 80.0 / (111_320.0 * WARNING_LAT.to_radians().cos());
    node.api()
        .subscribe(&mrn(SHIP_A), area_request(circle(WARNING_LAT, WARNING_LON, 50.0)))
        .await
        .unwrap();
    node.api()
        .subscribe(&mrn(SHIP_B), area_request(circle(WARNING_LAT, east, 30.0)))
        .await
        .unwrap();

    let reference = node
        .api()
        .ingest(navigational_warning(b"<S124>nw-42</S124>"))
        .await
        .unwrap();
    let report = node.api().publish(reference).await.unwrap();

    assert_eq!(report.matched, 1);
    assert!(report.is_complete());
    assert_eq!(report.delivered.len(), 1);
    assert_eq!(report.delivered[0].recipient, mrn(SHIP_A));
    assert!(!report.delivered[0].as_link);

    let uploads = node.remote(SHIP_A).uploads.lock().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].envelope.data, Bytes::from_static(b"<S124>nw-42</S124>"));
    assert!(uploads[0].envelope.from_subscription);
    assert_eq!(
        uploads[0].envelope.transaction_identifier,
        report.delivered[0].transaction
    );
    assert!(node.remote(SHIP_B).uploads.lock().is_empty());
}

#[tokio::test]
async fn test_running_node_publishes_ingested_dataset() {
    let mut node = TestNode::new();
    node.runtime.start();
    node.api()
        .subscribe(&mrn(SHIP_A), SubscriptionRequest::for_product(ProductType::S124))
        .await
        .unwrap();

    node.api()
        .ingest(navigational_warning(b"<S124/>"))
        .await
        .unwrap();

    eventually(|| node.remote(SHIP_A).uploads.lock().len() == 1).await;
    assert!(node.remote(SHIP_B).uploads.lock().is_empty());
}

#[tokio::test]
async fn test_ingested_dataset_is_queryable_by_area_and_window() {
    let node = TestNode::new();
    let now = node.clock.now();
    let mut request = navigational_warning(b"<S124/>");
    request.valid_from = Some(now);
    request.valid_to = Some(now + chrono::Duration::days(2));
    let reference = node.api().ingest(request).await.unwrap();

    let inside = DatasetFilter {
        geometry: Some(circle(WARNING_LAT, WARNING_LON, 500.0)),
        valid_from: Some(now + chrono::Duration::days(1)),
        ..Default::default()
    };
    let found = node.api().get(inside).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].data_reference, reference);

    let later = DatasetFilter {
        valid_from: Some(now + chrono::Duration::days(3)),
        ..Default::default()
    };
    assert!(node.api().get_summary(later).await.unwrap().is_empty());

    let elsewhere = DatasetFilter {
        unlocode: Some("DKCPH".into()),
        ..Default::default()
    };
    assert!(node.api().get_summary(elsewhere).await.unwrap().is_empty());
}
