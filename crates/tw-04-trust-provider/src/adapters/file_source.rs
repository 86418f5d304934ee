//! # PEM File Sources

use crate::domain::{parse_pem_bundle, PemBlock, SigningKeyPair, TrustError, TrustedCertificate};
use hmac::{Hmac, Mac};
use pkcs8::der::pem::LineEnding;
use pkcs8::EncryptedPrivateKeyInfo;
use sha2::Sha256;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

/// Alias the trust anchor is registered under in an MCP trust store.
pub const DEFAULT_TRUST_ANCHOR_ALIAS: &str = "mcp identity registry (mcp root certificate)";

/// PEM label of the integrity block closing a sealed trust store.
pub const TRUST_STORE_MAC_LABEL: &str = "TRUST STORE MAC";

type HmacSha256 = Hmac<Sha256>;

/// Decoded contents of the key store.
pub struct KeyMaterial {
    pub signing_key: SigningKeyPair,
    /// Signing certificate first, then any chain certificates.
    pub certificates: Vec<TrustedCertificate>,
    /// Unencrypted PKCS#8 DER of the signing key, kept for the TLS identity.
    pub private_key_der: Zeroizing<Vec<u8>>,
}

impl KeyMaterial {
    /// Unencrypted PKCS#8 key as PEM.
    pub fn private_key_pem(&self) -> Result<Zeroizing<String>, TrustError> {
        pkcs8::der::pem::encode_string("PRIVATE KEY", LineEnding::LF, &self.private_key_der)
            .map(Zeroizing::new)
            .map_err(|e| TrustError::KeyStore(e.to_string()))
    }
}

/// PEM key store holding the signing certificate and an encrypted key.
#[derive(Clone)]
pub struct KeyStoreSource {
    pub path: PathBuf,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for KeyStoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStoreSource")
            .field("path", &self.path)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl KeyStoreSource {
    pub fn new(path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Read and decrypt the key store.
    pub fn load(&self) -> Result<KeyMaterial, TrustError> {
        let text = read_file(&self.path).map_err(TrustError::KeyStore)?;
        self.parse(&text)
    }

    fn parse(&self, text: &str) -> Result<KeyMaterial, TrustError> {
        let mut certificates = Vec::new();
        let mut key: Option<(SigningKeyPair, Zeroizing<Vec<u8>>)> = None;

        for block in parse_pem_bundle(text) {
            match block.label.as_str() {
                "CERTIFICATE" => {
                    certificates.push(
                        TrustedCertificate::from_pem(block.alias, &block.text)
                            .map_err(|e| TrustError::KeyStore(e.to_string()))?,
                    );
                }
                "ENCRYPTED PRIVATE KEY" => {
                    let (_, der) = pkcs8::der::pem::decode_vec(block.text.as_bytes())
                        .map_err(|e| TrustError::KeyStore(e.to_string()))?;
                    let encrypted = EncryptedPrivateKeyInfo::try_from(der.as_slice())
                        .map_err(|e| TrustError::KeyStore(e.to_string()))?;
                    let decrypted = encrypted
                        .decrypt(self.password.as_bytes())
                        .map_err(|_| {
                            TrustError::KeyStore("wrong key store password".to_string())
                        })?;
                    let plain = Zeroizing::new(decrypted.as_bytes().to_vec());
                    key = Some((SigningKeyPair::from_pkcs8_der(&plain)?, plain));
                }
                "PRIVATE KEY" | "EC PRIVATE KEY" => {
                    return Err(TrustError::KeyStore(
                        "private key must be password protected".to_string(),
                    ));
                }
                other => debug!(label = other, "Ignoring PEM block in key store"),
            }
        }

        let (signing_key, private_key_der) = key
            .ok_or_else(|| TrustError::KeyStore("no private key in key store".to_string()))?;
        if certificates.is_empty() {
            return Err(TrustError::KeyStore(
                "no certificate in key store".to_string(),
            ));
        }

        Ok(KeyMaterial {
            signing_key,
            certificates,
            private_key_der,
        })
    }
}

/// PEM trust store with aliased certificates, sealed with a password.
///
/// The last block is a `TRUST STORE MAC` holding the hex HMAC-SHA256, keyed
/// by the password, over every certificate block and its alias. See
/// [`seal_trust_store`].
#[derive(Clone)]
pub struct TrustStoreSource {
    pub path: PathBuf,
    pub password: Zeroizing<String>,
    pub anchor_alias: String,
}

impl std::fmt::Debug for TrustStoreSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustStoreSource")
            .field("path", &self.path)
            .field("password", &"<redacted>")
            .field("anchor_alias", &self.anchor_alias)
            .finish()
    }
}

impl TrustStoreSource {
    pub fn new(path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            password: Zeroizing::new(password.into()),
            anchor_alias: DEFAULT_TRUST_ANCHOR_ALIAS.to_string(),
        }
    }

    pub fn with_anchor_alias(mut self, alias: impl Into<String>) -> Self {
        self.anchor_alias = alias.into();
        self
    }

    /// Read the store, check its seal and return every certificate.
    pub fn load(&self) -> Result<Vec<TrustedCertificate>, TrustError> {
        let text = read_file(&self.path).map_err(TrustError::TrustStore)?;
        self.parse(&text)
    }

    fn parse(&self, text: &str) -> Result<Vec<TrustedCertificate>, TrustError> {
        let blocks = parse_pem_bundle(text);
        let certificate_blocks: Vec<&PemBlock> = blocks
            .iter()
            .filter(|block| block.label == "CERTIFICATE")
            .collect();

        let seal = blocks
            .iter()
            .find(|block| block.label == TRUST_STORE_MAC_LABEL)
            .ok_or_else(|| {
                TrustError::TrustStore("trust store is not sealed with a password".to_string())
            })?;
        let expected = hex::decode(armoured_body(&seal.text))
            .map_err(|_| TrustError::TrustStore("malformed trust store seal".to_string()))?;
        store_mac(&self.password, &certificate_blocks)?
            .verify_slice(&expected)
            .map_err(|_| {
                TrustError::TrustStore(
                    "integrity check failed, wrong trust store password".to_string(),
                )
            })?;

        let certificates = certificate_blocks
            .into_iter()
            .map(|block| {
                TrustedCertificate::from_pem(block.alias.clone(), &block.text)
                    .map_err(|e| TrustError::TrustStore(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if certificates.is_empty() {
            return Err(TrustError::TrustStore(
                "no certificates in trust store".to_string(),
            ));
        }
        Ok(certificates)
    }

    /// Pick the anchor out of `certificates` by alias (case-insensitive).
    pub fn select_anchor(
        &self,
        certificates: &[TrustedCertificate],
    ) -> Result<TrustedCertificate, TrustError> {
        certificates
            .iter()
            .find(|cert| {
                cert.alias
                    .as_deref()
                    .is_some_and(|alias| alias.eq_ignore_ascii_case(&self.anchor_alias))
            })
            .cloned()
            .ok_or_else(|| TrustError::MissingTrustAnchor(self.anchor_alias.clone()))
    }
}

/// Append the password seal to a PEM bundle of aliased certificates.
///
/// Any previous seal is dropped, so re-sealing with a new password works.
pub fn seal_trust_store(bundle: &str, password: &str) -> Result<String, TrustError> {
    let blocks = parse_pem_bundle(bundle);
    let certificate_blocks: Vec<&PemBlock> = blocks
        .iter()
        .filter(|block| block.label == "CERTIFICATE")
        .collect();
    let mac = hex::encode(store_mac(password, &certificate_blocks)?.finalize().into_bytes());

    let unsealed = match bundle.find(&format!("-----BEGIN {TRUST_STORE_MAC_LABEL}-----")) {
        Some(at) => &bundle[..at],
        None => bundle,
    };
    Ok(format!(
        "{}\n-----BEGIN {TRUST_STORE_MAC_LABEL}-----\n{mac}\n-----END {TRUST_STORE_MAC_LABEL}-----\n",
        unsealed.trim_end()
    ))
}

fn store_mac(password: &str, certificates: &[&PemBlock]) -> Result<HmacSha256, TrustError> {
    let mut mac = HmacSha256::new_from_slice(password.as_bytes())
        .map_err(|e| TrustError::TrustStore(e.to_string()))?;
    for block in certificates {
        mac.update(block.alias.as_deref().unwrap_or_default().as_bytes());
        mac.update(b"\n");
        mac.update(block.text.as_bytes());
    }
    Ok(mac)
}

/// Lines between the armour of a PEM block.
fn armoured_body(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with("-----"))
        .collect::<String>()
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))
}
