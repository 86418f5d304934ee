//! # Identity Errors

use shared_types::{ErrorKind, SecomError, StoreError};
use thiserror::Error;

/// Errors raised by the identity resolver.
///
/// Resolution itself cannot fail; only the storage adapter can.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The node repository failed.
    #[error("Node repository failure: {0}")]
    Storage(#[from] StoreError),
}

impl IdentityError {
    /// Stable classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<IdentityError> for SecomError {
    fn from(err: IdentityError) -> Self {
        SecomError::new(err.kind(), err.to_string())
    }
}
