//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to log output
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "tidewire".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// - `TW_SERVICE_NAME`: Service name (default: tidewire)
    /// - `TW_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `TW_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `TW_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self::from_lookup(|key| env::var(key).ok(), is_container)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, is_container: bool) -> Self {
        Self {
            service_name: lookup("TW_SERVICE_NAME").unwrap_or_else(|| "tidewire".to_string()),

            log_level: lookup("TW_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("TW_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("TW_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "tidewire");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_log_level_prefers_tw_variable() {
        let config = TelemetryConfig::from_lookup(
            lookup(&[("TW_LOG_LEVEL", "debug"), ("RUST_LOG", "warn")]),
            false,
        );
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup(&[("RUST_LOG", "warn")]), false);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_json_logs_default_follows_container() {
        assert!(TelemetryConfig::from_lookup(lookup(&[]), true).json_logs);
        assert!(!TelemetryConfig::from_lookup(lookup(&[("TW_JSON_LOGS", "0")]), true).json_logs);
        assert!(TelemetryConfig::from_lookup(lookup(&[("TW_JSON_LOGS", "TRUE")]), false).json_logs);
    }
}
