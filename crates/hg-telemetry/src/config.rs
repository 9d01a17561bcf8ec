//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics exposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line and metric
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to format logs as JSON
    pub json_logs: bool,

    /// Port the host serves `/metrics` on
    pub metrics_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "hashgraph-node".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_port: 9100,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HG_SERVICE_NAME`: Service name (default: hashgraph-node)
    /// - `HG_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `HG_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `HG_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `HG_METRICS_PORT`: Prometheus metrics port (default: 9100)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("HG_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("HG_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("HG_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("HG_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            metrics_port: lookup("HG_METRICS_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.metrics_port),
        }
    }
}
