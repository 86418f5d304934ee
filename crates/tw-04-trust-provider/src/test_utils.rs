//! # Test Certificate Material
//!
//! Generates a root CA and a node certificate with rcgen and writes them as
//! a key store and a trust store into a temporary directory.

use crate::adapters::{
    seal_trust_store, KeyStoreSource, TrustStoreSource, DEFAULT_TRUST_ANCHOR_ALIAS,
};
use crate::domain::{SignatureAlgorithm, SigningKeyPair, TrustError};
use crate::service::TrustProvider;
use pkcs8::der::pem::LineEnding;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair,
    PKCS_ECDSA_P384_SHA384,
};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tempfile::TempDir;

pub const FIXTURE_PASSWORD: &str = "changeit";
pub const FIXTURE_NODE_MRN: &str = "urn:mrn:mcp:service:tidewire:test-node";

/// A certificate and key issued by the fixture root.
pub struct PeerIdentity {
    pub mrn: String,
    pub certificate_pem: String,
    pub signing_key: SigningKeyPair,
}

impl PeerIdentity {
    pub fn sign(&self, algorithm: SignatureAlgorithm, payload: &[u8]) -> Result<Vec<u8>, TrustError> {
        self.signing_key.sign(algorithm, payload)
    }
}

/// Root CA plus node identity on disk.
pub struct TrustFixture {
    dir: TempDir,
    root_cert: Certificate,
    root_key: KeyPair,
    node_cert_pem: String,
    node_key_der: Vec<u8>,
}

impl TrustFixture {
    /// Generate fresh material and write `keystore.pem` and `truststore.pem`.
    pub fn generate() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");

        let root_key = KeyPair::generate_for(&PKCS_ECDSA_P384_SHA384).expect("root key");
        let mut root_params = CertificateParams::new(Vec::<String>::new()).expect("root params");
        root_params
            .distinguished_name
            .push(DnType::CommonName, "MCP Test Root");
        root_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let root_cert = root_params.self_signed(&root_key).expect("root cert");

        let (node_cert_pem, node_key_der) = issue(&root_cert, &root_key, FIXTURE_NODE_MRN);

        let fixture = Self {
            dir,
            root_cert,
            root_key,
            node_cert_pem,
            node_key_der,
        };

        let key_store = format!(
            "{}\n{}\n{}",
            fixture.node_cert_pem.trim(),
            fixture.root_cert.pem().trim(),
            encrypt_key(&fixture.node_key_der, FIXTURE_PASSWORD).trim()
        );
        std::fs::write(fixture.key_store_path(), key_store).expect("write key store");

        let trust_store = format!(
            "Bag Attributes\n    friendlyName: {DEFAULT_TRUST_ANCHOR_ALIAS}\n{}\n",
            fixture.root_cert.pem().trim()
        );
        let sealed = seal_trust_store(&trust_store, FIXTURE_PASSWORD).expect("seal trust store");
        std::fs::write(fixture.trust_store_path(), sealed).expect("write trust store");

        fixture
    }

    pub fn key_store_path(&self) -> PathBuf {
        self.dir.path().join("keystore.pem")
    }

    pub fn trust_store_path(&self) -> PathBuf {
        self.dir.path().join("truststore.pem")
    }

    pub fn key_store_source(&self) -> KeyStoreSource {
        KeyStoreSource::new(self.key_store_path(), FIXTURE_PASSWORD)
    }

    pub fn trust_store_source(&self) -> TrustStoreSource {
        TrustStoreSource::new(self.trust_store_path(), FIXTURE_PASSWORD)
    }

    /// Load a provider from the generated stores.
    pub fn provider(&self) -> TrustProvider {
        TrustProvider::load(
            &self.key_store_source(),
            &self.trust_store_source(),
            SignatureAlgorithm::default(),
        )
        .expect("fixture trust material loads")
    }

    /// Lowercase hex SHA-256 of the root certificate.
    pub fn root_thumbprint(&self) -> String {
        hex::encode(Sha256::digest(self.root_cert.der().as_ref()))
    }

    /// Issue another certificate under the same root, e.g. for a remote node.
    pub fn issue_peer(&self, mrn: &str) -> PeerIdentity {
        let (certificate_pem, key_der) = issue(&self.root_cert, &self.root_key, mrn);
        PeerIdentity {
            mrn: mrn.to_string(),
            certificate_pem,
            signing_key: SigningKeyPair::from_pkcs8_der(&key_der).expect("peer key"),
        }
    }

    /// Write a key store whose private key is not encrypted.
    pub fn write_unencrypted_key_store(&self) -> PathBuf {
        let path = self.dir.path().join("plain-keystore.pem");
        let key_pem = pkcs8::der::pem::encode_string("PRIVATE KEY", LineEnding::LF, &self.node_key_der)
            .expect("encode key");
        std::fs::write(&path, format!("{}\n{}", self.node_cert_pem.trim(), key_pem))
            .expect("write key store");
        path
    }
}

fn issue(root_cert: &Certificate, root_key: &KeyPair, common_name: &str) -> (String, Vec<u8>) {
    let key = KeyPair::generate_for(&PKCS_ECDSA_P384_SHA384).expect("leaf key");
    let mut params = CertificateParams::new(vec!["localhost".to_string()]).expect("leaf params");
    params.distinguished_name.push(DnType::CommonName, common_name);
    let cert = params
        .signed_by(&key, root_cert, root_key)
        .expect("leaf cert");
    (cert.pem(), key.serialize_der())
}

fn encrypt_key(der: &[u8], password: &str) -> String {
    let info = pkcs8::PrivateKeyInfo::try_from(der).expect("pkcs8 key");
    let salt = [7u8; 16];
    let iv = [9u8; 16];
    let params = pkcs8::pkcs5::pbes2::Parameters::pbkdf2_sha256_aes256cbc(2048, &salt, &iv)
        .expect("pbes2 params");
    let encrypted = info
        .encrypt_with_params(params, password)
        .expect("encrypt key");
    encrypted
        .to_pem("ENCRYPTED PRIVATE KEY", LineEnding::LF)
        .expect("encode encrypted key")
        .to_string()
}
