//! # Outbound HTTPS Client

use crate::adapters::file_source::KeyMaterial;
use crate::domain::{TrustError, TrustedCertificate};
use std::time::Duration;
use tracing::warn;

/// Settings for clients built by [`build_http_client`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Accept any server certificate. Off unless explicitly configured.
    pub insecure_accept_all: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            insecure_accept_all: false,
        }
    }
}

/// Build a client presenting our key material as the TLS identity and
/// trusting only the given certificates.
pub fn build_http_client(
    key_material: &KeyMaterial,
    trusted: &[TrustedCertificate],
    settings: &ClientSettings,
) -> Result<reqwest::Client, TrustError> {
    let mut identity_pem = key_material.private_key_pem()?.as_bytes().to_vec();
    for cert in &key_material.certificates {
        identity_pem.push(b'\n');
        identity_pem.extend_from_slice(cert.pem.as_bytes());
    }
    let identity = reqwest::Identity::from_pem(&identity_pem)
        .map_err(|e| TrustError::HttpClient(e.to_string()))?;

    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .identity(identity)
        .timeout(settings.timeout)
        .connect_timeout(settings.connect_timeout)
        .tls_built_in_root_certs(false);

    for cert in trusted {
        let root = reqwest::Certificate::from_der(&cert.der)
            .map_err(|e| TrustError::HttpClient(e.to_string()))?;
        builder = builder.add_root_certificate(root);
    }

    if settings.insecure_accept_all {
        warn!("TLS certificate verification disabled for outbound client");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| TrustError::HttpClient(e.to_string()))
}
