//! Subscriber setup for structured logs.
//!
//! JSON lines carry `timestamp`, `level`, `target` and every structured field
//! of the event, ready for a log shipper. The pretty format is meant for
//! development consoles.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// # Errors
/// - `InvalidFilter`: `log_level` is not a valid filter directive
/// - `LoggingInit`: a global subscriber is already installed
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(&config.log_level)?;

    let result = if !config.console_output {
        tracing_subscriber::registry().with(env_filter).try_init()
    } else if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
    };
    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        level = %config.log_level,
        "Logging initialized"
    );
    Ok(())
}

/// Parse a level or directive list into a filter.
pub fn build_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|e| TelemetryError::InvalidFilter {
        directives: directives.to_string(),
        reason: e.to_string(),
    })
}
