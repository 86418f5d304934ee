//! # Service Locator Errors

use shared_types::{ErrorKind, SecomError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocatorError {
    /// The directory knows no endpoint for the MRN.
    #[error("The MRN {0} was not registered as a service")]
    NotRegistered(String),

    /// The directory URL is missing or malformed.
    #[error("Invalid service directory URL: {0}")]
    InvalidDirectory(String),

    /// The directory could not be reached or answered badly.
    #[error("Service directory error: {0}")]
    Directory(String),

    /// A client for the resolved endpoint could not be built.
    #[error("Failed to create client for {endpoint}: {reason}")]
    ClientConstruction { endpoint: String, reason: String },

    /// A call to a remote node failed.
    #[error("Remote node {endpoint} call failed: {reason}")]
    Remote { endpoint: String, reason: String },
}

impl LocatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotRegistered(_) => ErrorKind::NotFound,
            Self::InvalidDirectory(_) => ErrorKind::Validation,
            Self::Directory(_) | Self::ClientConstruction { .. } | Self::Remote { .. } => {
                ErrorKind::Dispatch
            }
        }
    }
}

impl From<LocatorError> for SecomError {
    fn from(err: LocatorError) -> Self {
        SecomError::new(err.kind(), err.to_string())
    }
}
