//! # Error Types
//!
//! Error kinds shared across subsystems.
//!
//! Every subsystem keeps its own `thiserror` enum and maps it onto
//! [`ErrorKind`] so the surrounding transport can translate failures into
//! stable protocol responses without knowing crate internals.

use thiserror::Error;

/// Stable classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown entity, or an entity owned by another node.
    NotFound,
    /// Malformed input.
    Validation,
    /// Missing or unverifiable envelope authentication.
    InvalidCredential,
    /// Unsupported product type or container kind.
    NotImplemented,
    /// Directory or remote node communication failure.
    Dispatch,
    /// Storage adapter failure.
    Storage,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::InvalidCredential => "invalid_credential",
            Self::NotImplemented => "not_implemented",
            Self::Dispatch => "dispatch",
            Self::Storage => "storage",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by the node's operation contracts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecomError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SecomError {
    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::InvalidCredential => Self::InvalidCredential(message),
            ErrorKind::NotImplemented => Self::NotImplemented(message),
            ErrorKind::Dispatch => Self::Dispatch(message),
            ErrorKind::Storage => Self::Storage(message),
        }
    }

    /// The stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidCredential(_) => ErrorKind::InvalidCredential,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::Dispatch(_) => ErrorKind::Dispatch,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Errors raised when parsing an MRN.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MrnError {
    #[error("MRN is empty")]
    Empty,

    #[error("Not an MRN (expected 'urn:mrn:' prefix): {0}")]
    MissingPrefix(String),
}

impl From<MrnError> for SecomError {
    fn from(err: MrnError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Failure reported by a storage adapter.
///
/// Repository ports across subsystems share this type so adapters can be
/// written once per backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Optimistic concurrency check failed.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// The backend failed.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for SecomError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
