//! # Subscription Errors

use shared_types::{ErrorKind, SecomError, StoreError, SubscriptionId};
use thiserror::Error;
use tw_02_geospatial_filter::GeoError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Missing or owned by another node.
    #[error("Unknown subscription with UUID {0}")]
    NotFound(SubscriptionId),

    #[error("Unsupported data product: {0}")]
    UnsupportedProduct(String),

    #[error("Unsupported container type: {0}")]
    UnsupportedContainer(String),

    /// Subscription period ends before it starts.
    #[error("Subscription period end is before its start")]
    InvalidPeriod,

    #[error(transparent)]
    Geometry(#[from] GeoError),

    #[error("Subscription repository failure: {0}")]
    Storage(#[from] StoreError),
}

impl SubscriptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedProduct(_) | Self::UnsupportedContainer(_) => {
                ErrorKind::NotImplemented
            }
            Self::InvalidPeriod => ErrorKind::Validation,
            Self::Geometry(e) => e.kind(),
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<SubscriptionError> for SecomError {
    fn from(err: SubscriptionError) -> Self {
        SecomError::new(err.kind(), err.to_string())
    }
}
