//! # EC Keys
//!
//! Signing and verifying keys for the two supported curves. Signatures are
//! computed over a prehash chosen by [`SignatureAlgorithm`] and encoded as
//! DER.

use crate::domain::algorithm::SignatureAlgorithm;
use crate::domain::errors::TrustError;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};

/// Private signing key loaded from the key store.
pub enum SigningKeyPair {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SigningKeyPair")
            .field(&self.curve_name())
            .finish()
    }
}

impl SigningKeyPair {
    /// Decode an unencrypted PKCS#8 document, trying P-384 then P-256.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, TrustError> {
        if let Ok(key) = p384::ecdsa::SigningKey::from_pkcs8_der(der) {
            return Ok(Self::P384(key));
        }
        p256::ecdsa::SigningKey::from_pkcs8_der(der)
            .map(Self::P256)
            .map_err(|_| {
                TrustError::KeyStore("private key is not a P-256 or P-384 EC key".to_string())
            })
    }

    pub fn curve_name(&self) -> &'static str {
        match self {
            Self::P256(_) => "P-256",
            Self::P384(_) => "P-384",
        }
    }

    /// The matching public key.
    pub fn public_key(&self) -> EcPublicKey {
        match self {
            Self::P256(key) => EcPublicKey::P256(*key.verifying_key()),
            Self::P384(key) => EcPublicKey::P384(*key.verifying_key()),
        }
    }

    /// Sign `payload`, returning a DER-encoded signature.
    pub fn sign(&self, algorithm: SignatureAlgorithm, payload: &[u8]) -> Result<Vec<u8>, TrustError> {
        let prehash = algorithm.digest(payload);
        match self {
            Self::P256(key) => {
                let signature: p256::ecdsa::Signature = key
                    .sign_prehash(&prehash)
                    .map_err(|e| TrustError::Signing(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            Self::P384(key) => {
                let signature: p384::ecdsa::Signature = key
                    .sign_prehash(&prehash)
                    .map_err(|e| TrustError::Signing(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
        }
    }
}

/// Public key taken from a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcPublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

impl EcPublicKey {
    /// Decode a DER `SubjectPublicKeyInfo`.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, TrustError> {
        if let Ok(key) = p384::ecdsa::VerifyingKey::from_public_key_der(der) {
            return Ok(Self::P384(key));
        }
        p256::ecdsa::VerifyingKey::from_public_key_der(der)
            .map(Self::P256)
            .map_err(|_| {
                TrustError::MalformedCertificate(
                    "public key is not a P-256 or P-384 EC key".to_string(),
                )
            })
    }

    /// DER `SubjectPublicKeyInfo` encoding.
    pub fn to_spki_der(&self) -> Result<Vec<u8>, TrustError> {
        let document = match self {
            Self::P256(key) => key.to_public_key_der(),
            Self::P384(key) => key.to_public_key_der(),
        }
        .map_err(|e| TrustError::MalformedCertificate(e.to_string()))?;
        Ok(document.as_bytes().to_vec())
    }

    /// Check a DER signature. Malformed signatures verify as `false`.
    pub fn verify(&self, algorithm: SignatureAlgorithm, signature: &[u8], payload: &[u8]) -> bool {
        let prehash = algorithm.digest(payload);
        match self {
            Self::P256(key) => p256::ecdsa::Signature::from_der(signature)
                .map(|sig| key.verify_prehash(&prehash, &sig).is_ok())
                .unwrap_or(false),
            Self::P384(key) => p384::ecdsa::Signature::from_der(signature)
                .map(|sig| key.verify_prehash(&prehash, &sig).is_ok())
                .unwrap_or(false),
        }
    }
}
