//! # Trust Provider Subsystem (tw-04)
//!
//! Holds this node's signing key and certificate, the trust anchor it
//! chains to, and builds the mutually authenticated HTTPS clients used for
//! outbound calls.
//!
//! ## Loading
//!
//! | Source | Format | Protection |
//! |--------|--------|------------|
//! | Key store | PEM: `CERTIFICATE` + `ENCRYPTED PRIVATE KEY` (PKCS#8) | password |
//! | Trust store | PEM bundle, `friendlyName:` alias per certificate, closing `TRUST STORE MAC` | password (HMAC-SHA256 seal) |
//!
//! Both are loaded once by [`TrustProvider::load`]; any failure is fatal for
//! the node.
//!
//! ## Signatures
//!
//! ECDSA over P-256 or P-384, prehashed with the configured
//! [`SignatureAlgorithm`] and DER encoded. Envelopes are signed with
//! [`sign_envelope`] and checked with [`verify_envelope`].
//!
//! ## Security
//!
//! Outbound clients trust only the trust store. Accept-all verification is
//! available behind [`ClientSettings::insecure_accept_all`] and is never the
//! default.

pub mod adapters;
pub mod domain;
pub mod envelope;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{
    seal_trust_store, ClientSettings, KeyMaterial, KeyStoreSource, TrustStoreSource,
    DEFAULT_TRUST_ANCHOR_ALIAS,
};
pub use domain::{EcPublicKey, SignatureAlgorithm, SigningKeyPair, TrustError, TrustedCertificate};
pub use envelope::{sign_envelope, verify_envelope};
pub use ports::EnvelopeSigner;
pub use service::TrustProvider;
