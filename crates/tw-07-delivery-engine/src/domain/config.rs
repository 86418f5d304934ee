//! # Delivery Configuration

use std::time::Duration;

/// Payloads up to this many bytes are sent inline.
pub const DEFAULT_INLINE_LIMIT: usize = 1024 * 1024;

/// Tuning for outbound deliveries.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Upper bound on a single send, including endpoint resolution.
    pub send_timeout: Duration,
    /// Sends in flight at once during a publish.
    pub max_concurrent_sends: usize,
    /// Larger payloads go through the link store.
    pub inline_limit: usize,
    /// How long an upload-as-link payload stays retrievable.
    pub link_ttl: chrono::Duration,
    /// Attempts at a compare-and-swap acknowledgement before giving up.
    pub ack_retries: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(30),
            max_concurrent_sends: 16,
            inline_limit: DEFAULT_INLINE_LIMIT,
            link_ttl: chrono::Duration::hours(24),
            ack_retries: 5,
        }
    }
}
