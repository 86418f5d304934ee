//! # Inbound Ports (Driving Ports)

use crate::domain::{SignatureAlgorithm, TrustError};

/// Signing facade used by the delivery engine.
///
/// Implementations hold the node's own key material; callers never see the
/// private key.
pub trait EnvelopeSigner: Send + Sync {
    /// Algorithm used by [`EnvelopeSigner::sign`].
    fn algorithm(&self) -> SignatureAlgorithm;

    /// PEM of the certificate matching the signing key.
    fn signing_certificate_pem(&self) -> String;

    /// Lowercase hex SHA-256 of the trust anchor certificate.
    fn trust_anchor_thumbprint(&self) -> String;

    /// Sign `payload`, returning a DER-encoded ECDSA signature.
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, TrustError>;

    /// Verify `signature` over `payload` with the key in `certificate_pem`.
    ///
    /// Returns `Ok(false)` for a well-formed certificate whose key does not
    /// verify the signature, and an error when the certificate is unusable.
    fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        certificate_pem: &str,
        signature: &[u8],
        payload: &[u8],
    ) -> Result<bool, TrustError>;
}
