//! # Certificates

use crate::domain::errors::TrustError;
use crate::domain::keys::EcPublicKey;
use sha2::{Digest, Sha256};
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

/// A parsed X.509 certificate.
#[derive(Debug, Clone)]
pub struct TrustedCertificate {
    /// Alias from the trust store, if any.
    pub alias: Option<String>,
    /// PEM text as loaded.
    pub pem: String,
    /// DER encoding.
    pub der: Vec<u8>,
    /// Subject distinguished name.
    pub subject: String,
    public_key: EcPublicKey,
}

impl TrustedCertificate {
    /// Parse a single PEM certificate.
    pub fn from_pem(alias: Option<String>, pem: &str) -> Result<Self, TrustError> {
        let cert = Certificate::from_pem(pem.trim().as_bytes())
            .map_err(|e| TrustError::MalformedCertificate(e.to_string()))?;
        let der = cert
            .to_der()
            .map_err(|e| TrustError::MalformedCertificate(e.to_string()))?;
        let spki = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| TrustError::MalformedCertificate(e.to_string()))?;
        let public_key = EcPublicKey::from_spki_der(&spki)?;

        Ok(Self {
            alias,
            pem: pem.trim().to_string(),
            der,
            subject: cert.tbs_certificate.subject.to_string(),
            public_key,
        })
    }

    /// The certificate's public key.
    pub fn public_key(&self) -> &EcPublicKey {
        &self.public_key
    }

    /// Lowercase hex SHA-256 of the DER encoding.
    pub fn thumbprint(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }
}
