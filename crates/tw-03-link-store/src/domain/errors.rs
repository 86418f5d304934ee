//! # Link Store Errors

use shared_types::{ErrorKind, SecomError, StoreError, TransactionId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    /// Missing, owned by another node, or expired. Reported identically so
    /// non-owners cannot learn whether it exists.
    #[error("Link not found: {0}")]
    NotFound(TransactionId),

    /// The requested expiry is not in the future.
    #[error("Link expiry must be in the future")]
    ExpiryInPast,

    #[error("Link repository failure: {0}")]
    Storage(#[from] StoreError),
}

impl LinkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ExpiryInPast => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<LinkError> for SecomError {
    fn from(err: LinkError) -> Self {
        SecomError::new(err.kind(), err.to_string())
    }
}
