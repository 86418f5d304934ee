//! # Geospatial Errors

use shared_types::{ErrorKind, SecomError};
use thiserror::Error;

/// Errors raised while building or combining geometries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeoError {
    /// The WKT string could not be parsed.
    #[error("Malformed WKT geometry: {0}")]
    MalformedWkt(String),

    /// The coded location is not in the table.
    #[error("Unknown UN/LOCODE: {0}")]
    UnknownLocation(String),

    /// A coded-location coordinate did not follow the `DDDMM[NSEW]` layout.
    #[error("Malformed coordinate '{0}'")]
    MalformedCoordinate(String),

    /// The coded-location table could not be read.
    #[error("Failed to load coded-location table: {0}")]
    TableLoad(String),
}

impl GeoError {
    /// Stable classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedWkt(_) | Self::UnknownLocation(_) | Self::MalformedCoordinate(_) => {
                ErrorKind::Validation
            }
            Self::TableLoad(_) => ErrorKind::Storage,
        }
    }
}

impl From<GeoError> for SecomError {
    fn from(err: GeoError) -> Self {
        SecomError::new(err.kind(), err.to_string())
    }
}
