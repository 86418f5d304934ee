//! # Subscription Entities

use serde::{Deserialize, Serialize};
use shared_types::{
    ContainerType, DataReference, Mrn, NodeId, ProductType, SubscriptionId, Timestamp,
};
use tw_02_geospatial_filter::{intersects, Geometry};

/// What a node asks for when subscribing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub container_type: ContainerType,
    pub data_product_type: ProductType,
    #[serde(default)]
    pub product_version: Option<String>,
    #[serde(default)]
    pub data_reference: Option<DataReference>,
    /// WKT area of interest.
    #[serde(default)]
    pub geometry: Option<String>,
    /// UN/LOCODE area of interest.
    #[serde(default)]
    pub unlocode: Option<String>,
    #[serde(default)]
    pub subscription_period_start: Option<Timestamp>,
    #[serde(default)]
    pub subscription_period_end: Option<Timestamp>,
}

impl SubscriptionRequest {
    /// Request for every dataset of `product_type`.
    pub fn for_product(product_type: ProductType) -> Self {
        Self {
            container_type: ContainerType::DataSet,
            data_product_type: product_type,
            product_version: None,
            data_reference: None,
            geometry: None,
            unlocode: None,
            subscription_period_start: None,
            subscription_period_end: None,
        }
    }
}

/// A standing interest registered by a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub node: NodeId,
    /// Where notifications and uploads go.
    pub node_mrn: Mrn,
    pub container_type: ContainerType,
    pub product_type: ProductType,
    pub product_version: Option<String>,
    pub data_reference: Option<DataReference>,
    /// Union of the requested WKT and coded location, if any.
    pub geometry: Option<Geometry<f64>>,
    pub original_wkt: Option<String>,
    pub original_unlocode: Option<String>,
    /// Open-ended when `None`.
    pub period_start: Option<Timestamp>,
    /// Open-ended when `None`.
    pub period_end: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Subscription {
    /// Whether `now` lies inside `[period_start, period_end]`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.period_start.map_or(true, |start| start <= now)
            && self.period_end.map_or(true, |end| now <= end)
    }
}

/// Attributes of a published dataset that subscriptions are matched on.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedDataset {
    pub product_type: ProductType,
    pub product_version: String,
    pub data_reference: Option<DataReference>,
    pub geometry: Option<Geometry<f64>>,
}

impl PublishedDataset {
    /// Whether `subscription` should receive this dataset at `now`.
    ///
    /// The subscription must be active and on the same product type. Its
    /// version, data reference and geometry each restrict the match only
    /// when set; geometry is compared only when the dataset has one too.
    pub fn matches(&self, subscription: &Subscription, now: Timestamp) -> bool {
        if subscription.product_type != self.product_type || !subscription.is_active(now) {
            return false;
        }
        if let Some(version) = &subscription.product_version {
            if version != &self.product_version {
                return false;
            }
        }
        if let Some(reference) = subscription.data_reference {
            if self.data_reference != Some(reference) {
                return false;
            }
        }
        match (&subscription.geometry, &self.geometry) {
            (Some(area), Some(dataset)) => intersects(area, dataset),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tw_02_geospatial_filter::{coverage_circle, GeospatialFilter};

    fn t(hour: u32) -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn subscription() -> Subscription {
        let mrn = Mrn::parse("urn:mrn:mcp:device:ship").unwrap();
        Subscription {
            id: SubscriptionId::new_random(),
            node: NodeId::for_mrn(&mrn),
            node_mrn: mrn,
            container_type: ContainerType::DataSet,
            product_type: ProductType::S124,
            product_version: None,
            data_reference: None,
            geometry: None,
            original_wkt: None,
            original_unlocode: None,
            period_start: None,
            period_end: None,
            created_at: t(0),
        }
    }

    fn dataset() -> PublishedDataset {
        PublishedDataset {
            product_type: ProductType::S124,
            product_version: "2.0.0".into(),
            data_reference: None,
            geometry: None,
        }
    }

    #[test]
    fn test_unrestricted_subscription_matches_product() {
        assert!(dataset().matches(&subscription(), t(1)));
        let other = PublishedDataset {
            product_type: ProductType::S125,
            ..dataset()
        };
        assert!(!other.matches(&subscription(), t(1)));
    }

    #[test]
    fn test_period_bounds_are_inclusive() {
        let sub = Subscription {
            period_start: Some(t(2)),
            period_end: Some(t(4)),
            ..subscription()
        };
        assert!(!dataset().matches(&sub, t(1)));
        assert!(dataset().matches(&sub, t(2)));
        assert!(dataset().matches(&sub, t(4)));
        assert!(!dataset().matches(&sub, t(5)));
    }

    #[test]
    fn test_version_restricts_only_when_set() {
        let sub = Subscription {
            product_version: Some("1.0.0".into()),
            ..subscription()
        };
        assert!(!dataset().matches(&sub, t(1)));
    }

    #[test]
    fn test_data_reference_must_match_when_set() {
        let reference = DataReference::for_name("urn:mrn:nw:dk:2024:1");
        let sub = Subscription {
            data_reference: Some(reference),
            ..subscription()
        };
        assert!(!dataset().matches(&sub, t(1)));
        let ds = PublishedDataset {
            data_reference: Some(reference),
            ..dataset()
        };
        assert!(ds.matches(&sub, t(1)));
    }

    #[test]
    fn test_geometry_intersection() {
        let filter = GeospatialFilter::with_builtin_table().unwrap();
        let area = filter.parse_geometry(None, Some("DKAAR")).unwrap();
        let sub = Subscription {
            geometry: area,
            ..subscription()
        };
        let location = filter.locations().get("DKAAR").unwrap().clone();
        let near = PublishedDataset {
            geometry: Some(Geometry::Polygon(coverage_circle(
                location.latitude,
                location.longitude,
                100.0,
                16,
            ))),
            ..dataset()
        };
        let far = PublishedDataset {
            geometry: Some(Geometry::Polygon(coverage_circle(0.0, 0.0, 100.0, 16))),
            ..dataset()
        };
        assert!(near.matches(&sub, t(1)));
        assert!(!far.matches(&sub, t(1)));
        // A dataset without geometry matches an area subscription.
        assert!(dataset().matches(&sub, t(1)));
    }

    #[test]
    fn test_request_deserializes_from_camel_case() {
        let json = r#"{
            "containerType": "S100_DataSet",
            "dataProductType": "S124",
            "unlocode": "DKCPH",
            "subscriptionPeriodEnd": "2030-01-01T00:00:00Z"
        }"#;
        let request: SubscriptionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.data_product_type, ProductType::S124);
        assert_eq!(request.unlocode.as_deref(), Some("DKCPH"));
        assert!(request.subscription_period_end.is_some());
        assert!(request.geometry.is_none());
    }
}
