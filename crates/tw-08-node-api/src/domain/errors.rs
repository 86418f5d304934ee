//! # Catalogue Errors

use shared_types::{DataReference, ErrorKind, MrnError, SecomError, StoreError};
use thiserror::Error;
use tw_02_geospatial_filter::GeoError;
use tw_04_trust_provider::TrustError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("Unsupported data product: {0}")]
    UnsupportedProduct(String),

    #[error("Invalid dataset MRN: {0}")]
    InvalidMrn(#[from] MrnError),

    /// Validity window ends before it starts.
    #[error("Dataset validity ends before it starts")]
    InvalidValidity,

    #[error("Dataset {0} cannot reference itself")]
    SelfReference(DataReference),

    #[error("Unknown dataset with UUID {0}")]
    DatasetNotFound(DataReference),

    #[error(transparent)]
    Geometry(#[from] GeoError),

    #[error("Failed to sign dataset: {0}")]
    Signing(#[from] TrustError),

    #[error("Catalogue failure: {0}")]
    Storage(#[from] StoreError),
}

impl CatalogueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedProduct(_) => ErrorKind::NotImplemented,
            Self::InvalidMrn(_) | Self::InvalidValidity | Self::SelfReference(_) => {
                ErrorKind::Validation
            }
            Self::DatasetNotFound(_) => ErrorKind::NotFound,
            Self::Geometry(e) => e.kind(),
            Self::Signing(e) => e.kind(),
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<CatalogueError> for SecomError {
    fn from(err: CatalogueError) -> Self {
        SecomError::new(err.kind(), err.to_string())
    }
}
