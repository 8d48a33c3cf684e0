//! # Hook Telemetry
//!
//! Logging and metrics for EventHook components.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by a `tracing-subscriber` fmt layer
//!   (pretty for development, JSON for log shippers)
//! - **Metrics**: Prometheus counters and histograms in a global registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hook_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! let text = hook_telemetry::encode_metrics()?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EH_SERVICE_NAME` | `eventhook` | Service name in logs |
//! | `EH_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `EH_JSON_LOGS` | `false` | JSON log lines |
//! | `EH_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `EH_NETWORK` | `devnet` | Network name |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, DELIVERY_DURATION, HOOKS_FIRED,
    HOOK_DELIVERIES, HOOK_FIRE_REJECTIONS, REGISTRY_OPERATIONS, RELAYER_PAYMENTS,
    SIGNATURE_RECOVERIES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global log subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Registers metrics and installs the global log subscriber.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(&config)?;
    Ok(TelemetryGuard {
        service: config.full_service_name(),
        metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service: String,
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    /// Metrics registry handle.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service, "shutting down telemetry");
    }
}
