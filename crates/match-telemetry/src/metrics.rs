//! Prometheus metrics for the match consensus engine.
//!
//! All metrics follow the naming convention: `mc_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // NEGOTIATION
    // =========================================================================

    /// Challenges issued
    pub static ref MATCHES_PROPOSED: Counter = Counter::new(
        "mc_matches_proposed_total",
        "Total number of match requests proposed"
    ).expect("metric creation failed");

    /// Challenges answered
    pub static ref MATCHES_RESPONDED: CounterVec = CounterVec::new(
        Opts::new("mc_matches_responded_total", "Match requests answered by the opponent"),
        &["decision"]  // decision: accept/decline
    ).expect("metric creation failed");

    /// Matches marked as played
    pub static ref MATCHES_COMPLETED: Counter = Counter::new(
        "mc_matches_completed_total",
        "Total number of match requests marked completed"
    ).expect("metric creation failed");

    // =========================================================================
    // OUTCOMES
    // =========================================================================

    /// Outcomes reported
    pub static ref OUTCOMES_REPORTED: Counter = Counter::new(
        "mc_outcomes_reported_total",
        "Total number of match outcomes reported"
    ).expect("metric creation failed");

    /// Outcomes ruled on by the counter-party
    pub static ref OUTCOMES_VERIFIED: CounterVec = CounterVec::new(
        Opts::new("mc_outcomes_verified_total", "Outcomes confirmed or disputed"),
        &["decision"]  // decision: confirm/dispute
    ).expect("metric creation failed");

    // =========================================================================
    // ERRORS & LATENCY
    // =========================================================================

    /// Rejected operations by error code
    pub static ref OPERATION_ERRORS: CounterVec = CounterVec::new(
        Opts::new("mc_operation_errors_total", "Rejected operations by error code"),
        &["code"]
    ).expect("metric creation failed");

    /// Operation latency
    pub static ref OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "mc_operation_duration_seconds",
            "Time spent serving an operation"
        ).buckets(exponential_buckets(0.0001, 2.0, 14).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");
}

/// Handle to the registry the metrics were registered in.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Registering twice is harmless; already-registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MATCHES_PROPOSED.clone()),
        Box::new(MATCHES_RESPONDED.clone()),
        Box::new(MATCHES_COMPLETED.clone()),
        Box::new(OUTCOMES_REPORTED.clone()),
        Box::new(OUTCOMES_VERIFIED.clone()),
        Box::new(OPERATION_ERRORS.clone()),
        Box::new(OPERATION_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
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
    histogram: prometheus::Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for one labelled series of `OPERATION_DURATION`.
    pub fn for_operation(operation: &str) -> Self {
        Self {
            histogram: OPERATION_DURATION.with_label_values(&[operation]),
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

/// Start timing an operation. Observation happens on drop.
#[macro_export]
macro_rules! time_operation {
    ($operation:expr) => {
        $crate::metrics::HistogramTimer::for_operation($operation)
    };
}
