//! # Hashgraph Telemetry
//!
//! Logging and metrics bootstrap for processes embedding the consensus
//! engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hg_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> Result<(), hg_telemetry::TelemetryError> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // serve hg_telemetry::encode_metrics() on /metrics
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HG_SERVICE_NAME` | `hashgraph-node` | Service name in logs and metrics |
//! | `HG_LOG_LEVEL` | `info` | Log filter, falls back to `RUST_LOG` |
//! | `HG_JSON_LOGS` | `false` | JSON log lines (default true in containers) |
//! | `HG_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `HG_METRICS_PORT` | `9100` | Port for the metrics endpoint |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};
pub use metrics::{encode_metrics, register_metrics, REGISTRY, SERVICE_INFO};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Invalid log filter '{directives}': {reason}")]
    InvalidFilter { directives: String, reason: String },

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Install logging and register host metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics(&config.service_name)?;
    init_logging(config)
}
