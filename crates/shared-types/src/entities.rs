//! # Core Domain Entities
//!
//! Identities and closed enumerations shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `Mrn`, `NodeId`, deterministic UUIDv8 derivation
//! - **Identifiers**: `TransactionId`, `SubscriptionId`, `DataReference`
//! - **Products**: `ProductType`, `ContainerType`, `SupportedProduct`
//! - **Acknowledgement**: `AckType`, `NackType`, `AckRequest`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::MrnError;

/// Wall-clock instant used throughout the core.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A maritime resource name, e.g. `urn:mrn:mcp:device:idp1:dk:node-7`.
///
/// Stored lowercase. The transport layer is responsible for authenticating the
/// caller; by the time an `Mrn` reaches the core it is an opaque key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mrn(String);

impl Mrn {
    /// Scheme prefix every MRN carries.
    pub const PREFIX: &'static str = "urn:mrn:";

    /// Parse and normalise an MRN.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MrnError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MrnError::Empty);
        }
        let normalised = trimmed.to_lowercase();
        if !normalised.starts_with(Self::PREFIX) || normalised.len() == Self::PREFIX.len() {
            return Err(MrnError::MissingPrefix(trimmed.to_string()));
        }
        Ok(Self(normalised))
    }

    /// The normalised MRN string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic UUIDv8 for this MRN.
    pub fn to_uuid(&self) -> Uuid {
        name_based_uuid(&self.0)
    }
}

impl fmt::Display for Mrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Mrn {
    type Err = MrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Mrn {
    type Error = MrnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Mrn> for String {
    fn from(value: Mrn) -> Self {
        value.0
    }
}

/// Derive a UUIDv8 (RFC 9562 section 5.8) from a name.
///
/// The name is lowercased and hashed with SHA-256. The first 48 hash bits
/// become `custom_a`, followed by the version nibble, then the next 76 hash
/// bits fill `custom_b` and `custom_c` with the variant written over the top
/// two bits of the low word. Identifiers minted this way are stable across
/// restarts and deployments.
pub fn name_based_uuid(name: &str) -> Uuid {
    let digest = Sha256::digest(name.to_lowercase().as_bytes());
    let mut head = [0u8; 16];
    head.copy_from_slice(&digest[..16]);
    let hash = u128::from_be_bytes(head);

    let custom_a = hash >> 80;
    let remainder = (hash & ((1u128 << 80) - 1)) >> 4;
    let mut value = (custom_a << 80) | (0x8u128 << 76) | remainder;
    value = (value & !(0b11u128 << 62)) | (0b10u128 << 62);
    Uuid::from_u128(value)
}

// =============================================================================
// CLUSTER B: IDENTIFIERS
// =============================================================================

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new_random() -> Self {
                Self(Uuid::new_v4())
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_identifier!(
    /// Opaque identifier of a remote node, derived from its MRN.
    NodeId
);

uuid_identifier!(
    /// Identifier of an outbound transaction (and of the link it may own).
    TransactionId
);

uuid_identifier!(
    /// Identifier of a stored subscription.
    SubscriptionId
);

uuid_identifier!(
    /// Identifier of a published dataset.
    DataReference
);

impl NodeId {
    /// The deterministic node identifier for `mrn`.
    pub fn for_mrn(mrn: &Mrn) -> Self {
        Self(mrn.to_uuid())
    }
}

impl DataReference {
    /// Deterministic data reference derived from a dataset name or MRN.
    pub fn for_name(name: &str) -> Self {
        Self(name_based_uuid(name))
    }
}

// =============================================================================
// CLUSTER C: PRODUCTS
// =============================================================================

/// SECOM data product types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "OTHER")]
    Other,
    S57,
    S101,
    S102,
    S104,
    S111,
    S122,
    S123,
    S124,
    S125,
    S126,
    S127,
    S128,
    S129,
    S131,
    S201,
    S210,
    S211,
    S212,
    S401,
    S402,
    S411,
    S412,
    S413,
    S414,
    S421,
}

impl ProductType {
    /// Every member of the closed set, in declaration order.
    pub const ALL: [ProductType; 26] = [
        Self::Other,
        Self::S57,
        Self::S101,
        Self::S102,
        Self::S104,
        Self::S111,
        Self::S122,
        Self::S123,
        Self::S124,
        Self::S125,
        Self::S126,
        Self::S127,
        Self::S128,
        Self::S129,
        Self::S131,
        Self::S201,
        Self::S210,
        Self::S211,
        Self::S212,
        Self::S401,
        Self::S402,
        Self::S411,
        Self::S412,
        Self::S413,
        Self::S414,
        Self::S421,
    ];

    /// Wire name of the product type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Other => "OTHER",
            Self::S57 => "S57",
            Self::S101 => "S101",
            Self::S102 => "S102",
            Self::S104 => "S104",
            Self::S111 => "S111",
            Self::S122 => "S122",
            Self::S123 => "S123",
            Self::S124 => "S124",
            Self::S125 => "S125",
            Self::S126 => "S126",
            Self::S127 => "S127",
            Self::S128 => "S128",
            Self::S129 => "S129",
            Self::S131 => "S131",
            Self::S201 => "S201",
            Self::S210 => "S210",
            Self::S211 => "S211",
            Self::S212 => "S212",
            Self::S401 => "S401",
            Self::S402 => "S402",
            Self::S411 => "S411",
            Self::S412 => "S412",
            Self::S413 => "S413",
            Self::S414 => "S414",
            Self::S421 => "S421",
        }
    }

    /// The products this node serves for the type, empty when unsupported.
    pub fn supported_products(&self) -> impl Iterator<Item = &'static SupportedProduct> + '_ {
        SUPPORTED_PRODUCTS
            .iter()
            .filter(move |p| p.product_type == *self)
    }

    /// Whether this node serves the product type at all.
    pub fn is_supported(&self) -> bool {
        self.supported_products().next().is_some()
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown data product type: {s}"))
    }
}

/// A product type/version pair served by this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedProduct {
    /// The product type.
    pub product_type: ProductType,
    /// Product specification version, e.g. `2.0.0`.
    pub product_version: &'static str,
    /// SECOM service version advertised for the product.
    pub service_version: &'static str,
}

/// Static table of products this node serves.
pub const SUPPORTED_PRODUCTS: &[SupportedProduct] = &[SupportedProduct {
    product_type: ProductType::S124,
    product_version: "2.0.0",
    service_version: "0.0.1",
}];

/// SECOM container types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContainerType {
    /// No container specified; treated as a single dataset.
    #[serde(rename = "NONE")]
    None,
    /// A single S-100 dataset.
    #[default]
    #[serde(rename = "S100_DataSet")]
    DataSet,
    /// An S-100 exchange set.
    #[serde(rename = "S100_ExchangeSet")]
    ExchangeSet,
}

impl ContainerType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::DataSet => "S100_DataSet",
            Self::ExchangeSet => "S100_ExchangeSet",
        }
    }

    /// Resolve `None` to the default container.
    pub fn effective(self) -> Self {
        match self {
            Self::None => Self::DataSet,
            other => other,
        }
    }

    /// Whether this node can produce the container kind.
    pub fn is_supported(self) -> bool {
        self.effective() == Self::DataSet
    }
}

// =============================================================================
// CLUSTER D: ACKNOWLEDGEMENT
// =============================================================================

/// Kind of acknowledgement a remote node reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AckType {
    /// The payload reached the remote node.
    DeliveredAck,
    /// The payload was opened by an end user.
    OpenedAck,
    /// The remote node rejected the payload.
    Error,
}

/// Reason a remote node rejected a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NackType {
    /// Payload failed schema validation.
    XmlSchemaValidationError,
    /// Product type or version is unknown to the receiver.
    UnknownDataTypeOrVersion,
    /// Payload content was invalid.
    InvalidData,
}

impl AckType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeliveredAck => "DELIVERED_ACK",
            Self::OpenedAck => "OPENED_ACK",
            Self::Error => "ERROR",
        }
    }
}

impl NackType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XmlSchemaValidationError => "XML_SCHEMA_VALIDATION_ERROR",
            Self::UnknownDataTypeOrVersion => "UNKNOWN_DATA_TYPE_OR_VERSION",
            Self::InvalidData => "INVALID_DATA",
        }
    }
}

/// Acknowledgements the sender asks the receiver for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AckRequest {
    #[default]
    NoAckRequested,
    DeliveredAckRequested,
    OpenedAckRequested,
    DeliveredAndOpenedAckRequested,
}

impl fmt::Display for AckRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoAckRequested => "NO_ACK_REQUESTED",
            Self::DeliveredAckRequested => "DELIVERED_ACK_REQUESTED",
            Self::OpenedAckRequested => "OPENED_ACK_REQUESTED",
            Self::DeliveredAndOpenedAckRequested => "DELIVERED_AND_OPENED_ACK_REQUESTED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mrn_is_normalised_to_lowercase() {
        let mrn = Mrn::parse("  URN:MRN:mcp:device:DK:node-1 ").unwrap();
        assert_eq!(mrn.as_str(), "urn:mrn:mcp:device:dk:node-1");
    }

    #[test]
    fn test_mrn_rejects_empty_and_foreign_schemes() {
        assert!(matches!(Mrn::parse("   "), Err(MrnError::Empty)));
        assert!(matches!(
            Mrn::parse("urn:isbn:0451450523"),
            Err(MrnError::MissingPrefix(_))
        ));
        assert!(Mrn::parse("urn:mrn:").is_err());
    }

    #[test]
    fn test_name_based_uuid_is_version_8_and_rfc_variant() {
        let uuid = name_based_uuid("urn:mrn:dk:atons:some-dataset");
        assert_eq!(uuid.get_version_num(), 8);
        assert_eq!(uuid.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn test_name_based_uuid_known_answer() {
        assert_eq!(
            name_based_uuid("urn:mrn:dk:atons:some-dataset").to_string(),
            "a0034309-c652-87b4-a9d1-efef8748739c"
        );
        assert_eq!(
            DataReference::for_name("urn:mrn:dk:atons:some-dataset").to_string(),
            "a0034309-c652-87b4-a9d1-efef8748739c"
        );
    }

    #[test]
    fn test_name_based_uuid_ignores_case() {
        assert_eq!(
            name_based_uuid("urn:mrn:DK:Node"),
            name_based_uuid("urn:mrn:dk:node")
        );
        assert_ne!(
            name_based_uuid("urn:mrn:dk:node-a"),
            name_based_uuid("urn:mrn:dk:node-b")
        );
    }

    #[test]
    fn test_name_based_uuid_keeps_leading_hash_bytes() {
        let name = "urn:mrn:dk:node";
        let digest = Sha256::digest(name.as_bytes());
        let bytes = name_based_uuid(name).into_bytes();
        assert_eq!(&bytes[..6], &digest[..6]);
        assert_eq!(bytes[6] >> 4, 0x8);
        assert_eq!(bytes[6] & 0x0F, digest[6] >> 4);
    }

    #[test]
    fn test_product_type_parse_is_case_insensitive() {
        assert_eq!("s124".parse::<ProductType>().unwrap(), ProductType::S124);
        assert_eq!("OTHER".parse::<ProductType>().unwrap(), ProductType::Other);
        assert!("S999".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_only_s124_is_supported() {
        assert!(ProductType::S124.is_supported());
        assert!(!ProductType::S125.is_supported());
        let versions: Vec<_> = ProductType::S124
            .supported_products()
            .map(|p| p.product_version)
            .collect();
        assert_eq!(versions, vec!["2.0.0"]);
    }

    #[test]
    fn test_container_none_falls_back_to_dataset() {
        assert_eq!(ContainerType::None.effective(), ContainerType::DataSet);
        assert!(ContainerType::None.is_supported());
        assert!(!ContainerType::ExchangeSet.is_supported());
    }

    #[test]
    fn test_ack_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&AckType::DeliveredAck).unwrap(),
            "\"DELIVERED_ACK\""
        );
        assert_eq!(
            serde_json::from_str::<NackType>("\"UNKNOWN_DATA_TYPE_OR_VERSION\"").unwrap(),
            NackType::UnknownDataTypeOrVersion
        );
    }
}
