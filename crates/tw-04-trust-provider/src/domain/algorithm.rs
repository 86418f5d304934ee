//! # Signature Algorithms
//!
//! ECDSA over P-256 or P-384, combined with a SHA-2 or SHA-3 digest. The
//! curve comes from the key; the algorithm only picks the digest.

use crate::domain::errors::TrustError;
use sha2::{Sha256, Sha384};
use sha3::{Digest, Sha3_256, Sha3_384};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignatureAlgorithm {
    Sha256WithEcdsa,
    Sha384WithEcdsa,
    Sha3_256WithEcdsa,
    #[default]
    Sha3_384WithEcdsa,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 4] = [
        Self::Sha256WithEcdsa,
        Self::Sha384WithEcdsa,
        Self::Sha3_256WithEcdsa,
        Self::Sha3_384WithEcdsa,
    ];

    /// Name used on the wire and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256WithEcdsa => "SHA256withECDSA",
            Self::Sha384WithEcdsa => "SHA384withECDSA",
            Self::Sha3_256WithEcdsa => "SHA3-256withECDSA",
            Self::Sha3_384WithEcdsa => "SHA3-384withECDSA",
        }
    }

    /// Hash `payload` with this algorithm's digest.
    pub fn digest(&self, payload: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256WithEcdsa => Sha256::digest(payload).to_vec(),
            Self::Sha384WithEcdsa => Sha384::digest(payload).to_vec(),
            Self::Sha3_256WithEcdsa => Sha3_256::digest(payload).to_vec(),
            Self::Sha3_384WithEcdsa => Sha3_384::digest(payload).to_vec(),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TrustError::UnknownAlgorithm(s.to_string()))
    }
}
