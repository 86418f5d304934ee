//! # Trust Provider Service

use crate::adapters::{
    build_http_client, ClientSettings, KeyMaterial, KeyStoreSource, TrustStoreSource,
};
use crate::domain::{EcPublicKey, SignatureAlgorithm, TrustError, TrustedCertificate};
use crate::ports::EnvelopeSigner;
use tracing::info;

/// Key material, trust anchor and signing operations for this node.
///
/// Loaded once at startup. Every load failure is returned so the runtime can
/// refuse to start.
pub struct TrustProvider {
    key_material: KeyMaterial,
    trusted: Vec<TrustedCertificate>,
    trust_anchor: TrustedCertificate,
    algorithm: SignatureAlgorithm,
}

impl TrustProvider {
    /// Load key and trust stores and check that they belong together.
    pub fn load(
        key_store: &KeyStoreSource,
        trust_store: &TrustStoreSource,
        algorithm: SignatureAlgorithm,
    ) -> Result<Self, TrustError> {
        let key_material = key_store.load()?;
        let trusted = trust_store.load()?;
        let trust_anchor = trust_store.select_anchor(&trusted)?;

        let signing_cert = &key_material.certificates[0];
        if *signing_cert.public_key() != key_material.signing_key.public_key() {
            return Err(TrustError::KeyStore(
                "private key does not match the signing certificate".to_string(),
            ));
        }

        info!(
            subject = %signing_cert.subject,
            curve = key_material.signing_key.curve_name(),
            anchor = %trust_anchor.subject,
            trusted = trusted.len(),
            algorithm = %algorithm,
            "Trust material loaded"
        );

        Ok(Self {
            key_material,
            trusted,
            trust_anchor,
            algorithm,
        })
    }

    pub fn signing_certificate(&self) -> &TrustedCertificate {
        &self.key_material.certificates[0]
    }

    pub fn public_key(&self) -> EcPublicKey {
        self.key_material.signing_key.public_key()
    }

    pub fn trust_anchor(&self) -> &TrustedCertificate {
        &self.trust_anchor
    }

    /// Sign with an explicit algorithm.
    pub fn sign_with(
        &self,
        algorithm: SignatureAlgorithm,
        payload: &[u8],
    ) -> Result<Vec<u8>, TrustError> {
        self.key_material.signing_key.sign(algorithm, payload)
    }

    /// HTTPS client presenting our certificate and trusting the trust store.
    pub fn http_client(&self, settings: &ClientSettings) -> Result<reqwest::Client, TrustError> {
        build_http_client(&self.key_material, &self.trusted, settings)
    }
}

impl EnvelopeSigner for TrustProvider {
    fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    fn signing_certificate_pem(&self) -> String {
        self.signing_certificate().pem.clone()
    }

    fn trust_anchor_thumbprint(&self) -> String {
        self.trust_anchor.thumbprint()
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, TrustError> {
        self.sign_with(self.algorithm, payload)
    }

    fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        certificate_pem: &str,
        signature: &[u8],
        payload: &[u8],
    ) -> Result<bool, TrustError> {
        let certificate = TrustedCertificate::from_pem(None, certificate_pem)?;
        Ok(certificate.public_key().verify(algorithm, signature, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TrustFixture, FIXTURE_PASSWORD};

    #[test]
    fn test_sign_verify_round_trip() {
        let fixture = TrustFixture::generate();
        let provider = fixture.provider();
        let payload = b"S124.0.0.1.payload";

        for algorithm in SignatureAlgorithm::ALL {
            let signature = provider.sign_with(algorithm, payload).unwrap();
            let ok = provider
                .verify(algorithm, &provider.signing_certificate_pem(), &signature, payload)
                .unwrap();
            assert!(ok, "{algorithm} round trip");
        }
    }

    #[test]
    fn test_tampered_payload_does_not_verify() {
        let fixture = TrustFixture::generate();
        let provider = fixture.provider();
        let signature = provider.sign(b"original").unwrap();
        let ok = provider
            .verify(
                provider.algorithm(),
                &provider.signing_certificate_pem(),
                &signature,
                b"tampered",
            )
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_wrong_algorithm_does_not_verify() {
        let fixture = TrustFixture::generate();
        let provider = fixture.provider();
        let signature = provider
            .sign_with(SignatureAlgorithm::Sha256WithEcdsa, b"payload")
            .unwrap();
        let ok = provider
            .verify(
                SignatureAlgorithm::Sha3_384WithEcdsa,
                &provider.signing_certificate_pem(),
                &signature,
                b"payload",
            )
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_garbage_signature_is_false_not_error() {
        let fixture = TrustFixture::generate();
        let provider = fixture.provider();
        let ok = provider
            .verify(
                provider.algorithm(),
                &provider.signing_certificate_pem(),
                b"not der",
                b"payload",
            )
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn test_peer_signature_verifies_with_peer_certificate() {
        let fixture = TrustFixture::generate();
        let provider = fixture.provider();
        let peer = fixture.issue_peer("urn:mrn:mcp:device:peer");
        let signature = peer.sign(SignatureAlgorithm::default(), b"ack").unwrap();

        assert!(provider
            .verify(SignatureAlgorithm::default(), &peer.certificate_pem, &signature, b"ack")
            .unwrap());
        assert!(!provider
            .verify(
                SignatureAlgorithm::default(),
                &provider.signing_certificate_pem(),
                &signature,
                b"ack"
            )
            .unwrap());
    }

    #[test]
    fn test_malformed_certificate_is_error() {
        let fixture = TrustFixture::generate();
        let provider = fixture.provider();
        let err = provider
            .verify(SignatureAlgorithm::default(), "not a pem", b"sig", b"payload")
            .unwrap_err();
        assert!(matches!(err, TrustError::MalformedCertificate(_)));
    }

    #[test]
    fn test_wrong_password_fails_load() {
        let fixture = TrustFixture::generate();
        let key_store = KeyStoreSource::new(fixture.key_store_path(), "wrong");
        let err = TrustProvider::load(
            &key_store,
            &fixture.trust_store_source(),
            SignatureAlgorithm::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, TrustError::KeyStore(_)));
    }

    #[test]
    fn test_wrong_trust_store_password_fails_load() {
        let fixture = TrustFixture::generate();
        let trust_store = TrustStoreSource::new(fixture.trust_store_path(), "wrong");
        let err = TrustProvider::load(
            &fixture.key_store_source(),
            &trust_store,
            SignatureAlgorithm::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, TrustError::TrustStore(_)));
        assert_eq!(err.kind(), shared_types::ErrorKind::InvalidCredential);
    }

    #[test]
    fn test_unsealed_or_tampered_trust_store_fails_load() {
        let fixture = TrustFixture::generate();
        let sealed = std::fs::read_to_string(fixture.trust_store_path()).unwrap();

        let unsealed_path = fixture.trust_store_path().with_file_name("unsealed.pem");
        let cut = sealed.find("-----BEGIN TRUST STORE MAC-----").unwrap();
        std::fs::write(&unsealed_path, &sealed[..cut]).unwrap();
        let err = TrustStoreSource::new(&unsealed_path, FIXTURE_PASSWORD)
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("not sealed"));

        // Renaming the anchor breaks the seal.
        let renamed_path = fixture.trust_store_path().with_file_name("renamed.pem");
        std::fs::write(&renamed_path, sealed.replace("mcp root certificate", "rogue root")).unwrap();
        let err = TrustStoreSource::new(&renamed_path, FIXTURE_PASSWORD)
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("wrong trust store password"));
    }

    #[test]
    fn test_resealing_with_new_password() {
        let fixture = TrustFixture::generate();
        let sealed = std::fs::read_to_string(fixture.trust_store_path()).unwrap();
        let resealed = crate::adapters::seal_trust_store(&sealed, "rotated").unwrap();
        assert_eq!(resealed.matches("BEGIN TRUST STORE MAC").count(), 1);

        let path = fixture.trust_store_path().with_file_name("rotated.pem");
        std::fs::write(&path, resealed).unwrap();
        assert_eq!(TrustStoreSource::new(&path, "rotated").load().unwrap().len(), 1);
        assert!(TrustStoreSource::new(&path, FIXTURE_PASSWORD).load().is_err());
    }

    #[test]
    fn test_missing_anchor_alias_fails_load() {
        let fixture = TrustFixture::generate();
        let trust_store = fixture.trust_store_source().with_anchor_alias("someone else");
        let err = TrustProvider::load(
            &fixture.key_store_source(),
            &trust_store,
            SignatureAlgorithm::default(),
        )
        .err()
        .unwrap();
        assert_eq!(err, TrustError::MissingTrustAnchor("someone else".into()));
    }

    #[test]
    fn test_missing_files_fail_load() {
        let fixture = TrustFixture::generate();
        let missing = KeyStoreSource::new("/nonexistent/keystore.pem", "pw");
        assert!(TrustProvider::load(
            &missing,
            &fixture.trust_store_source(),
            SignatureAlgorithm::default()
        )
        .is_err());
    }

    #[test]
    fn test_unencrypted_key_is_rejected() {
        let fixture = TrustFixture::generate();
        let path = fixture.write_unencrypted_key_store();
        let err = KeyStoreSource::new(path, "").load().err().unwrap();
        assert!(err.to_string().contains("password protected"));
    }

    #[test]
    fn test_anchor_thumbprint_is_sha256_hex() {
        let fixture = TrustFixture::generate();
        let provider = fixture.provider();
        let thumbprint = provider.trust_anchor_thumbprint();
        assert_eq!(thumbprint.len(), 64);
        assert!(thumbprint.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(thumbprint, fixture.root_thumbprint());
    }

    #[test]
    fn test_http_client_builds_with_and_without_insecure_flag() {
        let fixture = TrustFixture::generate();
        let provider = fixture.provider();
        assert!(provider.http_client(&ClientSettings::default()).is_ok());
        let insecure = ClientSettings {
            insecure_accept_all: true,
            ..ClientSettings::default()
        };
        assert!(provider.http_client(&insecure).is_ok());
    }
}
