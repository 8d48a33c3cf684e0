//! Prometheus metrics for EventHook components.
//!
//! All metrics follow the naming convention: `eh_<component>_<metric>_<unit>`
//!
//! Counters are process-wide; they are recorded whether or not
//! `register_metrics` has been called, and exported only once it has.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PUBLISHER METRICS
    // =========================================================================

    /// Hooks fired, by attestation policy
    pub static ref HOOKS_FIRED: CounterVec = CounterVec::new(
        Opts::new("eh_publisher_hooks_fired_total", "Total hooks fired by publishers"),
        &["policy"]  // emit_only / retain
    ).expect("metric creation failed");

    /// Rejected fire attempts, by error category
    pub static ref HOOK_FIRE_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("eh_publisher_fire_rejections_total", "Total rejected fireHook calls"),
        &["category"]
    ).expect("metric creation failed");

    // =========================================================================
    // REGISTRY METRICS
    // =========================================================================

    /// Registry operations, by operation and outcome
    pub static ref REGISTRY_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("eh_registry_operations_total", "Total registry operations"),
        &["operation", "outcome"]  // outcome: ok or an error category
    ).expect("metric creation failed");

    // =========================================================================
    // SUBSCRIBER METRICS
    // =========================================================================

    /// Hook deliveries, by authentication strategy and outcome
    pub static ref HOOK_DELIVERIES: CounterVec = CounterVec::new(
        Opts::new("eh_subscriber_deliveries_total", "Total hook deliveries verified"),
        &["strategy", "outcome"]  // outcome: accepted or an error category
    ).expect("metric creation failed");

    /// Relayer fee payments made
    pub static ref RELAYER_PAYMENTS: CounterVec = CounterVec::new(
        Opts::new("eh_subscriber_relayer_payments_total", "Total relayer fees paid"),
        &["strategy"]
    ).expect("metric creation failed");

    /// Delivery verification duration
    pub static ref DELIVERY_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "eh_subscriber_delivery_duration_seconds",
            "Time spent verifying a hook delivery"
        ).buckets(exponential_buckets(0.00001, 2.0, 16).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // SIGNATURE METRICS
    // =========================================================================

    /// Signer recoveries, by result
    pub static ref SIGNATURE_RECOVERIES: CounterVec = CounterVec::new(
        Opts::new("eh_signature_recoveries_total", "Total signer recoveries"),
        &["result"]  // match / mismatch / malformed
    ).expect("metric creation failed");
}

/// Handle proving metrics were registered.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    /// The registry metrics were registered with.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register every metric with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Publisher
        Box::new(HOOKS_FIRED.clone()),
        Box::new(HOOK_FIRE_REJECTIONS.clone()),
        // Registry
        Box::new(REGISTRY_OPERATIONS.clone()),
        // Subscriber
        Box::new(HOOK_DELIVERIES.clone()),
        Box::new(RELAYER_PAYMENTS.clone()),
        Box::new(DELIVERY_DURATION.clone()),
        // Signatures
        Box::new(SIGNATURE_RECOVERIES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
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
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
