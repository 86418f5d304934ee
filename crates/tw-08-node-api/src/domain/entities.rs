//! # Catalogue Entities

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use shared_types::{DataReference, ExchangeMetadata, Mrn, ProductType, Timestamp};
use tw_02_geospatial_filter::{intersects, to_wkt, Geometry};

// =============================================================================
// CLUSTER A: DATASETS
// =============================================================================

/// A dataset held in the local catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Derived from `mrn`, so re-ingesting a dataset replaces it.
    pub data_reference: DataReference,
    /// The dataset's own identifier (`infoIdentifier`).
    pub mrn: Mrn,
    pub product_type: ProductType,
    pub product_version: String,
    pub title: Option<String>,
    pub geometry: Option<Geometry<f64>>,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
    /// Encoded dataset bytes, opaque to the core.
    pub payload: Bytes,
    pub created_at: Timestamp,
}

impl Dataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            data_reference: self.data_reference,
            info_identifier: self.mrn.to_string(),
            data_product_type: self.product_type,
            product_version: self.product_version.clone(),
            title: self.title.clone(),
            geometry: self.geometry.as_ref().map(to_wkt),
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            size: self.payload.len() as u64,
            last_modified: self.created_at,
        }
    }
}

/// A dataset handed to the node by the local producer.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest {
    pub mrn: String,
    pub data_product_type: ProductType,
    pub product_version: String,
    #[serde(default)]
    pub title: Option<String>,
    /// WKT footprint of the dataset.
    #[serde(default)]
    pub geometry: Option<String>,
    #[serde(default)]
    pub valid_from: Option<Timestamp>,
    #[serde(default)]
    pub valid_to: Option<Timestamp>,
    #[serde_as(as = "Base64")]
    pub payload: Bytes,
    /// MRNs of datasets this one refers to, e.g. warnings it cancels.
    #[serde(default)]
    pub references: Vec<String>,
}

// =============================================================================
// CLUSTER B: QUERIES
// =============================================================================

/// Caller-supplied `get` / `getSummary` filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFilter {
    #[serde(default)]
    pub data_reference: Option<DataReference>,
    /// Every supported product when absent.
    #[serde(default)]
    pub data_product_type: Option<ProductType>,
    #[serde(default)]
    pub product_version: Option<String>,
    /// WKT area of interest.
    #[serde(default)]
    pub geometry: Option<String>,
    /// UN/LOCODE area of interest.
    #[serde(default)]
    pub unlocode: Option<String>,
    #[serde(default)]
    pub valid_from: Option<Timestamp>,
    #[serde(default)]
    pub valid_to: Option<Timestamp>,
}

/// A validated filter with its geometry resolved, as seen by the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetQuery {
    pub data_reference: Option<DataReference>,
    pub product_type: ProductType,
    pub product_version: Option<String>,
    pub geometry: Option<Geometry<f64>>,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
}

impl DatasetQuery {
    /// Everything of one product type.
    pub fn for_product(product_type: ProductType) -> Self {
        Self {
            data_reference: None,
            product_type,
            product_version: None,
            geometry: None,
            valid_from: None,
            valid_to: None,
        }
    }

    /// Whether `dataset` satisfies every criterion that is set.
    ///
    /// Validity windows match when they overlap; a missing bound on either
    /// side is open. Geometry is compared only when both sides have one.
    pub fn matches(&self, dataset: &Dataset) -> bool {
        if dataset.product_type != self.product_type {
            return false;
        }
        if let Some(reference) = self.data_reference {
            if dataset.data_reference != reference {
                return false;
            }
        }
        if let Some(version) = &self.product_version {
            if &dataset.product_version != version {
                return false;
            }
        }
        if let (Some(from), Some(until)) = (self.valid_from, dataset.valid_to) {
            if until < from {
                return false;
            }
        }
        if let (Some(to), Some(since)) = (self.valid_to, dataset.valid_from) {
            if since > to {
                return false;
            }
        }
        match (&self.geometry, &dataset.geometry) {
            (Some(area), Some(footprint)) => intersects(area, footprint),
            _ => true,
        }
    }
}

// =============================================================================
// CLUSTER C: RESPONSES
// =============================================================================

/// One dataset as returned by `get`, signed by this node.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetEnvelope {
    pub data_reference: DataReference,
    #[serde_as(as = "Base64")]
    pub data: Bytes,
    pub exchange_metadata: ExchangeMetadata,
}

/// Catalogue entry as returned by `getSummary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub data_reference: DataReference,
    pub info_identifier: String,
    pub data_product_type: ProductType,
    pub product_version: String,
    pub title: Option<String>,
    /// WKT footprint.
    pub geometry: Option<String>,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
    /// Payload size in bytes.
    pub size: u64,
    pub last_modified: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tw_02_geospatial_filter::{coverage_circle, parse_wkt};

    fn t(day: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
    }

    fn dataset() -> Dataset {
        let mrn = Mrn::parse("urn:mrn:nw:dk:dma:nw-117-24").unwrap();
        Dataset {
            data_reference: DataReference::for_name(mrn.as_str()),
            mrn,
            product_type: ProductType::S124,
            product_version: "2.0.0".into(),
            title: Some("Buoy adrift".into()),
            geometry: Some(Geometry::Polygon(coverage_circle(55.0, 10.0, 500.0, 32))),
            valid_from: Some(t(10)),
            valid_to: Some(t(20)),
            payload: Bytes::from_static(b"<S124/>"),
            created_at: t(10),
        }
    }

    #[test]
    fn test_product_type_must_match() {
        assert!(DatasetQuery::for_product(ProductType::S124).matches(&dataset()));
        assert!(!DatasetQuery::for_product(ProductType::S101).matches(&dataset()));
    }

    #[test]
    fn test_validity_windows_overlap() {
        let mut query = DatasetQuery::for_product(ProductType::S124);

        query.valid_from = Some(t(15));
        query.valid_to = Some(t(25));
        assert!(query.matches(&dataset()));

        query.valid_from = Some(t(21));
        query.valid_to = None;
        assert!(!query.matches(&dataset()));

        query.valid_from = None;
        query.valid_to = Some(t(9));
        assert!(!query.matches(&dataset()));

        // Touching bounds still overlap.
        query.valid_to = Some(t(10));
        assert!(query.matches(&dataset()));
    }

    #[test]
    fn test_open_ended_dataset_matches_late_window() {
        let mut open = dataset();
        open.valid_to = None;

        let mut query = DatasetQuery::for_product(ProductType::S124);
        query.valid_from = Some(t(28));
        assert!(query.matches(&open));
    }

    #[test]
    fn test_geometry_filter() {
        let mut query = DatasetQuery::for_product(ProductType::S124);
        query.geometry = Some(parse_wkt("POINT (10 55)").unwrap());
        assert!(query.matches(&dataset()));

        query.geometry = Some(parse_wkt("POINT (12 57)").unwrap());
        assert!(!query.matches(&dataset()));

        let mut without_footprint = dataset();
        without_footprint.geometry = None;
        assert!(query.matches(&without_footprint));
    }

    #[test]
    fn test_version_and_reference_filters() {
        let mut query = DatasetQuery::for_product(ProductType::S124);
        query.product_version = Some("1.0.0".into());
        assert!(!query.matches(&dataset()));

        query.product_version = Some("2.0.0".into());
        query.data_reference = Some(DataReference::for_name("urn:mrn:nw:dk:dma:other"));
        assert!(!query.matches(&dataset()));

        query.data_reference = Some(dataset().data_reference);
        assert!(query.matches(&dataset()));
    }

    #[test]
    fn test_summary_renders_wkt_and_size() {
        let summary = dataset().summary();
        assert_eq!(summary.info_identifier, "urn:mrn:nw:dk:dma:nw-117-24");
        assert_eq!(summary.size, 7);
        assert!(summary.geometry.unwrap().starts_with("POLYGON"));
    }

    #[test]
    fn test_ingest_request_payload_is_base64() {
        let json = serde_json::json!({
            "mrn": "urn:mrn:nw:dk:dma:nw-1-24",
            "dataProductType": "S124",
            "productVersion": "2.0.0",
            "payload": "PFMxMjQvPg=="
        });
        let request: IngestRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.payload, Bytes::from_static(b"<S124/>"));
        assert!(request.references.is_empty());
    }
}
