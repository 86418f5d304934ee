//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Values come from an optional TOML file, then `TW_*` environment variables
//! override individual keys. `validate()` runs last so a bad override fails
//! startup as early as a bad file does.
//!
//! ## Environment Overrides
//!
//! | Variable | Key |
//! |----------|-----|
//! | `TW_NODE_MRN` | `node.mrn` |
//! | `TW_KEYSTORE_PATH` / `TW_KEYSTORE_PASSWORD` | `trust.key_store_path` / `trust.key_store_password` |
//! | `TW_TRUSTSTORE_PATH` / `TW_TRUSTSTORE_PASSWORD` | `trust.trust_store_path` / `trust.trust_store_password` |
//! | `TW_TRUST_ANCHOR_ALIAS` | `trust.anchor_alias` |
//! | `TW_SIGNATURE_ALGORITHM` | `trust.signature_algorithm` |
//! | `TW_INSECURE_TLS` | `trust.insecure_accept_all` |
//! | `TW_DIRECTORY_URL` | `directory.url` |
//! | `TW_DIRECTORY_TIMEOUT_SECS` | `directory.timeout_secs` |
//! | `TW_RESOLUTION_CACHE_TTL_SECS` | `directory.cache_ttl_secs` |
//! | `TW_SEND_TIMEOUT_SECS` | `delivery.send_timeout_secs` |
//! | `TW_MAX_CONCURRENT_SENDS` | `delivery.max_concurrent_sends` |
//! | `TW_INLINE_LIMIT` | `delivery.inline_limit` |
//! | `TW_LINK_TTL_SECS` | `delivery.link_ttl_secs` |
//! | `TW_LINK_CLEANUP_INTERVAL_SECS` | `links.cleanup_interval_secs` |
//! | `TW_UNLOCODE_TABLE` | `geo.unlocode_table` |

use serde::{Deserialize, Serialize};
use shared_types::Mrn;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tw_03_link_store::DEFAULT_CLEANUP_INTERVAL;
use tw_04_trust_provider::{ClientSettings, SignatureAlgorithm, DEFAULT_TRUST_ANCHOR_ALIAS};
use tw_07_delivery_engine::{DeliveryConfig, DEFAULT_INLINE_LIMIT};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Missing required setting {0}")]
    Missing(&'static str),
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub node: NodeSection,
    pub trust: TrustConfig,
    pub directory: DirectoryConfig,
    pub delivery: DeliverySettings,
    pub links: LinkSettings,
    pub geo: GeoConfig,
}

/// Identity of this node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// MRN the node signs and registers as.
    pub mrn: String,
}

/// Key store, trust store and outbound TLS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// PEM file with the signing certificate chain and encrypted private key.
    pub key_store_path: PathBuf,
    pub key_store_password: String,
    /// Sealed PEM bundle of trusted certificates.
    pub trust_store_path: PathBuf,
    pub trust_store_password: String,
    /// Friendly name of the trust anchor inside the trust store.
    pub anchor_alias: String,
    pub signature_algorithm: String,
    /// Accept any server certificate on outbound calls.
    pub insecure_accept_all: bool,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            key_store_path: PathBuf::from("./keystore.pem"),
            key_store_password: String::new(),
            trust_store_path: PathBuf::from("./truststore.pem"),
            trust_store_password: String::new(),
            anchor_alias: DEFAULT_TRUST_ANCHOR_ALIAS.to_string(),
            signature_algorithm: SignatureAlgorithm::default().as_str().to_string(),
            insecure_accept_all: false,
        }
    }
}

impl TrustConfig {
    pub fn algorithm(&self) -> Result<SignatureAlgorithm, ConfigError> {
        SignatureAlgorithm::from_str(&self.signature_algorithm).map_err(|e| {
            ConfigError::InvalidValue {
                key: "trust.signature_algorithm",
                reason: e.to_string(),
            }
        })
    }
}

/// Service directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Resolution cache lifetime. Zero disables the cache.
    pub cache_ttl_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 30,
            cache_ttl_secs: 0,
        }
    }
}

impl DirectoryConfig {
    pub fn client_settings(&self, insecure_accept_all: bool) -> ClientSettings {
        ClientSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            insecure_accept_all,
            ..ClientSettings::default()
        }
    }
}

/// Outbound delivery tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySettings {
    pub send_timeout_secs: u64,
    pub max_concurrent_sends: usize,
    /// Payloads above this many bytes are sent as links.
    pub inline_limit: usize,
    pub link_ttl_secs: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        let engine = DeliveryConfig::default();
        Self {
            send_timeout_secs: engine.send_timeout.as_secs(),
            max_concurrent_sends: engine.max_concurrent_sends,
            inline_limit: DEFAULT_INLINE_LIMIT,
            link_ttl_secs: engine.link_ttl.num_seconds().unsigned_abs(),
        }
    }
}

impl DeliverySettings {
    pub fn engine_config(&self) -> DeliveryConfig {
        DeliveryConfig {
            send_timeout: Duration::from_secs(self.send_timeout_secs),
            max_concurrent_sends: self.max_concurrent_sends,
            inline_limit: self.inline_limit,
            link_ttl: chrono::Duration::seconds(self.link_ttl_secs as i64),
            ..DeliveryConfig::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    pub cleanup_interval_secs: u64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL.as_secs(),
        }
    }
}

impl LinkSettings {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// UN/LOCODE JSON table. The built-in table is used when unset.
    pub unlocode_table: Option<PathBuf>,
}

impl NodeConfig {
    /// Load from `path` (if any), apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `TW_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TW_NODE_MRN") {
            self.node.mrn = v;
        }
        if let Some(v) = lookup("TW_KEYSTORE_PATH") {
            self.trust.key_store_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("TW_KEYSTORE_PASSWORD") {
            self.trust.key_store_password = v;
        }
        if let Some(v) = lookup("TW_TRUSTSTORE_PATH") {
            self.trust.trust_store_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("TW_TRUSTSTORE_PASSWORD") {
            self.trust.trust_store_password = v;
        }
        if let Some(v) = lookup("TW_TRUST_ANCHOR_ALIAS") {
            self.trust.anchor_alias = v;
        }
        if let Some(v) = lookup("TW_SIGNATURE_ALGORITHM") {
            self.trust.signature_algorithm = v;
        }
        if let Some(v) = lookup("TW_INSECURE_TLS") {
            self.trust.insecure_accept_all = parse_flag("TW_INSECURE_TLS", &v)?;
        }
        if let Some(v) = lookup("TW_DIRECTORY_URL") {
            self.directory.url = v;
        }
        if let Some(v) = lookup("TW_DIRECTORY_TIMEOUT_SECS") {
            self.directory.timeout_secs = parse_number("TW_DIRECTORY_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("TW_RESOLUTION_CACHE_TTL_SECS") {
            self.directory.cache_ttl_secs = parse_number("TW_RESOLUTION_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("TW_SEND_TIMEOUT_SECS") {
            self.delivery.send_timeout_secs = parse_number("TW_SEND_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("TW_MAX_CONCURRENT_SENDS") {
            self.delivery.max_concurrent_sends = parse_number("TW_MAX_CONCURRENT_SENDS", &v)?;
        }
        if let Some(v) = lookup("TW_INLINE_LIMIT") {
            self.delivery.inline_limit = parse_number("TW_INLINE_LIMIT", &v)?;
        }
        if let Some(v) = lookup("TW_LINK_TTL_SECS") {
            self.delivery.link_ttl_secs = parse_number("TW_LINK_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("TW_LINK_CLEANUP_INTERVAL_SECS") {
            self.links.cleanup_interval_secs = parse_number("TW_LINK_CLEANUP_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("TW_UNLOCODE_TABLE") {
            self.geo.unlocode_table = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Reject settings the node cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.mrn.trim().is_empty() {
            return Err(ConfigError::Missing("node.mrn"));
        }
        Mrn::parse(&self.node.mrn).map_err(|e| ConfigError::InvalidValue {
            key: "node.mrn",
            reason: e.to_string(),
        })?;
        if self.directory.url.trim().is_empty() {
            return Err(ConfigError::Missing("directory.url"));
        }
        self.trust.algorithm()?;

        let positive = [
            ("directory.timeout_secs", self.directory.timeout_secs),
            ("delivery.send_timeout_secs", self.delivery.send_timeout_secs),
            ("delivery.max_concurrent_sends", self.delivery.max_concurrent_sends as u64),
            ("delivery.inline_limit", self.delivery.inline_limit as u64),
            ("delivery.link_ttl_secs", self.delivery.link_ttl_secs),
            ("links.cleanup_interval_secs", self.links.cleanup_interval_secs),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
        })
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}
