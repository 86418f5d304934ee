//! Prometheus metrics for Tidewire subsystems.
//!
//! All metrics follow the naming convention: `tw_<subsystem>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CATALOGUE METRICS (tw-08)
    // =========================================================================

    /// Datasets accepted by `ingest`
    pub static ref DATASETS_INGESTED: Counter = Counter::new(
        "tw_catalogue_datasets_ingested_total",
        "Total number of datasets ingested into the catalogue"
    ).expect("metric creation failed");

    // =========================================================================
    // SUBSCRIPTION METRICS (tw-06)
    // =========================================================================

    pub static ref SUBSCRIPTIONS_CREATED: Counter = Counter::new(
        "tw_subscription_created_total",
        "Total number of subscriptions created"
    ).expect("metric creation failed");

    pub static ref SUBSCRIPTIONS_REMOVED: Counter = Counter::new(
        "tw_subscription_removed_total",
        "Total number of subscriptions removed"
    ).expect("metric creation failed");

    // =========================================================================
    // DELIVERY METRICS (tw-07)
    // =========================================================================

    /// Uploads accepted by the receiving node
    pub static ref UPLOADS_SENT: Counter = Counter::new(
        "tw_delivery_uploads_sent_total",
        "Total number of dataset uploads delivered to subscribers"
    ).expect("metric creation failed");

    pub static ref UPLOADS_FAILED: Counter = Counter::new(
        "tw_delivery_uploads_failed_total",
        "Total number of dataset uploads that failed"
    ).expect("metric creation failed");

    /// Acknowledgements applied, by ack type
    pub static ref ACKNOWLEDGEMENTS: CounterVec = CounterVec::new(
        Opts::new("tw_delivery_acknowledgements_total", "Acknowledgements applied to transactions"),
        &["ack_type"]
    ).expect("metric creation failed");

    /// Wall time of one publish across all subscribers
    pub static ref PUBLISH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "tw_delivery_publish_duration_seconds",
            "Time spent pushing one dataset to all matching subscribers"
        ).buckets(exponential_buckets(0.005, 2.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // LINK STORE METRICS (tw-03)
    // =========================================================================

    pub static ref LINKS_STORED: Counter = Counter::new(
        "tw_links_stored_total",
        "Total number of payloads stored behind a link"
    ).expect("metric creation failed");

    pub static ref LINKS_PURGED: Counter = Counter::new(
        "tw_links_purged_total",
        "Total number of expired links removed by the cleanup sweep"
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT BUS METRICS
    // =========================================================================

    /// Events a bus reader missed because it fell behind
    pub static ref BUS_EVENTS_LAGGED: Counter = Counter::new(
        "tw_bus_events_lagged_total",
        "Total number of events overwritten before a bus subscriber read them"
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Failed operations by subsystem and error kind
    pub static ref SUBSYSTEM_ERRORS: CounterVec = CounterVec::new(
        Opts::new("tw_subsystem_errors_total", "Errors by subsystem and kind"),
        &["subsystem", "error_kind"]
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Catalogue
        Box::new(DATASETS_INGESTED.clone()),
        // Subscriptions
        Box::new(SUBSCRIPTIONS_CREATED.clone()),
        Box::new(SUBSCRIPTIONS_REMOVED.clone()),
        // Delivery
        Box::new(UPLOADS_SENT.clone()),
        Box::new(UPLOADS_FAILED.clone()),
        Box::new(ACKNOWLEDGEMENTS.clone()),
        Box::new(PUBLISH_DURATION.clone()),
        // Links
        Box::new(LINKS_STORED.clone()),
        Box::new(LINKS_PURGED.clone()),
        // Event bus
        Box::new(BUS_EVENTS_LAGGED.clone()),
        // Errors
        Box::new(SUBSYSTEM_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_encode() {
        // A second registration in the same process fails with AlreadyReg.
        let _ = register_metrics();
        LINKS_STORED.inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("tw_links_stored_total"));
    }

    #[test]
    fn test_counter_vec_labels() {
        ACKNOWLEDGEMENTS.with_label_values(&["DELIVERED_ACK"]).inc();
        assert!(ACKNOWLEDGEMENTS.with_label_values(&["DELIVERED_ACK"]).get() >= 1.0);
    }

    #[test]
    fn test_histogram_timer() {
        let before = PUBLISH_DURATION.get_sample_count();
        {
            let _timer = crate::time_histogram!(PUBLISH_DURATION);
        }
        assert!(PUBLISH_DURATION.get_sample_count() > before);
    }
}
