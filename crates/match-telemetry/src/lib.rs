//! # Match Telemetry
//!
//! Logging and metrics bootstrap for the match consensus engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use match_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MC_SERVICE_NAME` | `match-consensus` | Service name in logs |
//! | `MC_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `MC_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `MC_CONSOLE_OUTPUT` | `true` | Emit logs at all |
//! | `MC_ENVIRONMENT` | `dev` | Deployment environment |

#![warn(missing_docs)]

mod config;
#[macro_use]
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, MATCHES_COMPLETED, MATCHES_PROPOSED,
    MATCHES_RESPONDED, OPERATION_DURATION, OPERATION_ERRORS, OUTCOMES_REPORTED,
    OUTCOMES_VERIFIED,
};
pub use tracing_setup::{build_env_filter, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first, they do not depend on the subscriber
    let metrics_handle = register_metrics()?;

    let tracing_guard = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
