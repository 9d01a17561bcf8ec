//! # Consensus Metrics
//!
//! Prometheus metrics for monitoring the hashgraph pipeline.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! hg-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `hg_consensus_events_added_total` - Events accepted by the engine
//! - `hg_consensus_rounds_decided_total` - Rounds whose fame was decided
//! - `hg_consensus_events_total` - Events that reached consensus
//! - `hg_consensus_pre_consensus_events_total` - Events emitted as pre-consensus
//! - `hg_consensus_stale_events_total` - Events that became ancient without consensus
//! - `hg_consensus_linker_anomalies_total` - Unlinked parents, by reason
//! - `hg_consensus_future_events_buffered` - Events waiting in the future buffer
//! - `hg_consensus_frozen` - 1 once the freeze round was reached
//! - `hg_consensus_latency_seconds` - Creation to consensus time of each event

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Events accepted by the engine (not frozen, not ancient)
    pub static ref EVENTS_ADDED: IntCounter = register_int_counter!(
        "hg_consensus_events_added_total",
        "Total number of events accepted by the consensus engine"
    )
    .expect("Failed to create EVENTS_ADDED metric");

    pub static ref ROUNDS_DECIDED: IntCounter = register_int_counter!(
        "hg_consensus_rounds_decided_total",
        "Total number of rounds decided"
    )
    .expect("Failed to create ROUNDS_DECIDED metric");

    pub static ref CONSENSUS_EVENTS: IntCounter = register_int_counter!(
        "hg_consensus_events_total",
        "Total number of events that reached consensus"
    )
    .expect("Failed to create CONSENSUS_EVENTS metric");

    pub static ref PRE_CONSENSUS_EVENTS: IntCounter = register_int_counter!(
        "hg_consensus_pre_consensus_events_total",
        "Total number of events emitted as pre-consensus"
    )
    .expect("Failed to create PRE_CONSENSUS_EVENTS metric");

    pub static ref STALE_EVENTS: IntCounter = register_int_counter!(
        "hg_consensus_stale_events_total",
        "Total number of events that became ancient without reaching consensus"
    )
    .expect("Failed to create STALE_EVENTS metric");

    /// Parents left unlinked, labeled by reason
    pub static ref LINKER_ANOMALIES: IntCounterVec = register_int_counter_vec!(
        "hg_consensus_linker_anomalies_total",
        "Total number of parents the linker refused to link",
        &["reason"]
    )
    .expect("Failed to create LINKER_ANOMALIES metric");

    pub static ref FUTURE_EVENTS_BUFFERED: IntGauge = register_int_gauge!(
        "hg_consensus_future_events_buffered",
        "Number of events buffered until their birth round is reached"
    )
    .expect("Failed to create FUTURE_EVENTS_BUFFERED metric");

    pub static ref FROZEN: IntGauge = register_int_gauge!(
        "hg_consensus_frozen",
        "1 once consensus stopped at the freeze round"
    )
    .expect("Failed to create FROZEN metric");

    /// Creation to consensus latency, not recorded while replaying
    pub static ref CONSENSUS_LATENCY: Histogram = register_histogram!(
        "hg_consensus_latency_seconds",
        "Time between event creation and consensus in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("Failed to create CONSENSUS_LATENCY metric");
}

#[cfg(feature = "metrics")]
pub fn record_event_added() {
    EVENTS_ADDED.inc();
}

/// Record a decided round and the number of events it ordered
#[cfg(feature = "metrics")]
pub fn record_round_decided(event_count: usize) {
    ROUNDS_DECIDED.inc();
    CONSENSUS_EVENTS.inc_by(event_count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_pre_consensus_events(count: usize) {
    PRE_CONSENSUS_EVENTS.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_stale_events(count: usize) {
    STALE_EVENTS.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_linker_anomaly(reason: &str) {
    LINKER_ANOMALIES.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn set_future_events_buffered(count: usize) {
    FUTURE_EVENTS_BUFFERED.set(count as i64);
}

#[cfg(feature = "metrics")]
pub fn set_frozen(frozen: bool) {
    FROZEN.set(i64::from(frozen));
}

#[cfg(feature = "metrics")]
pub fn observe_consensus_latency(seconds: f64) {
    CONSENSUS_LATENCY.observe(seconds);
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_event_added() {}

#[cfg(not(feature = "metrics"))]
pub fn record_round_decided(_event_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_pre_consensus_events(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_stale_events(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_linker_anomaly(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_future_events_buffered(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_frozen(_frozen: bool) {}

#[cfg(not(feature = "metrics"))]
pub fn observe_consensus_latency(_seconds: f64) {}
