//! # Capability Descriptors
//!
//! What this node advertises through `capability`. Built from the static
//! supported-product table, one descriptor per product type and version.

use serde::{Deserialize, Serialize};
use shared_types::{ContainerType, ProductType, SUPPORTED_PRODUCTS};

/// SECOM interfaces a node may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementedInterfaces {
    pub upload: bool,
    pub upload_link: bool,
    pub get: bool,
    pub get_summary: bool,
    pub get_by_link: bool,
    pub subscription: bool,
    pub access: bool,
    pub encryption_key: bool,
    pub acknowledgement: bool,
    pub ping: bool,
    pub capability: bool,
}

impl ImplementedInterfaces {
    /// The interfaces a Tidewire node serves.
    pub fn served() -> Self {
        Self {
            get: true,
            get_summary: true,
            get_by_link: true,
            subscription: true,
            acknowledgement: true,
            ping: true,
            capability: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    pub container_type: ContainerType,
    pub data_product_type: ProductType,
    pub product_version: String,
    pub service_version: String,
    pub implemented_interfaces: ImplementedInterfaces,
}

/// One descriptor per entry of the supported-product table.
pub fn capabilities() -> Vec<CapabilityDescriptor> {
    SUPPORTED_PRODUCTS
        .iter()
        .map(|product| CapabilityDescriptor {
            container_type: ContainerType::DataSet,
            data_product_type: product.product_type,
            product_version: product.product_version.to_string(),
            service_version: product.service_version.to_string(),
            implemented_interfaces: ImplementedInterfaces::served(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s124_capability() {
        let all = capabilities();
        assert_eq!(all.len(), 1);

        let s124 = &all[0];
        assert_eq!(s124.data_product_type, ProductType::S124);
        assert_eq!(s124.product_version, "2.0.0");
        assert_eq!(s124.service_version, "0.0.1");
        assert_eq!(s124.container_type, ContainerType::DataSet);
        assert!(s124.implemented_interfaces.get_by_link);
        assert!(!s124.implemented_interfaces.upload);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(capabilities()).unwrap();
        assert_eq!(json[0]["implementedInterfaces"]["getSummary"], true);
        assert_eq!(json[0]["serviceVersion"], "0.0.1");
    }
}
