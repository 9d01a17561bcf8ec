//! Prometheus registry and text exposition.
//!
//! Metrics registered by the consensus engine live in the default prometheus
//! registry; host-level metrics live in [`REGISTRY`]. [`encode_metrics`]
//! exposes both.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Host metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Always 1, labelled with the service name
    pub static ref SERVICE_INFO: IntGaugeVec = IntGaugeVec::new(
        Opts::new("hg_service_info", "Service running the consensus engine"),
        &["service"]
    ).expect("metric creation failed");
}

/// Register host metrics and mark `service_name` as running.
///
/// # Errors
/// - `MetricsInit`: already registered
pub fn register_metrics(service_name: &str) -> Result<(), TelemetryError> {
    REGISTRY
        .register(Box::new(SERVICE_INFO.clone()))
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    SERVICE_INFO.with_label_values(&[service_name]).set(1);
    Ok(())
}

/// Encode host and engine metrics in Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut metric_families = REGISTRY.gather();
    metric_families.extend(prometheus::gather());

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
