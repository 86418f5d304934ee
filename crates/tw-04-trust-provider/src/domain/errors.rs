//! # Trust Errors

use shared_types::{ErrorKind, SecomError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrustError {
    /// The key store could not be read, decrypted or parsed.
    #[error("Key store error: {0}")]
    KeyStore(String),

    /// The trust store could not be read or parsed.
    #[error("Trust store error: {0}")]
    TrustStore(String),

    /// The trust store has no certificate under the configured alias.
    #[error("Trust anchor '{0}' not found in trust store")]
    MissingTrustAnchor(String),

    /// Signature algorithm name not recognised.
    #[error("Unknown signature algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A certificate handed in for verification could not be used.
    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl TrustError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyStore(_)
            | Self::TrustStore(_)
            | Self::MissingTrustAnchor(_)
            | Self::MalformedCertificate(_) => ErrorKind::InvalidCredential,
            Self::UnknownAlgorithm(_) => ErrorKind::Validation,
            Self::Signing(_) | Self::HttpClient(_) => ErrorKind::Dispatch,
        }
    }
}

impl From<TrustError> for SecomError {
    fn from(err: TrustError) -> Self {
        SecomError::new(err.kind(), err.to_string())
    }
}
