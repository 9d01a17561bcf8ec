//! # Integration Tests
//!
//! Scenarios run whole simulated networks through [`hg_consensus::ConsensusEngine`]
//! and check the output guarantees from `hg_consensus::domain::invariants`.

pub mod fixtures;

mod anomalies;
mod determinism;
mod freeze;
mod pipeline;
mod properties;
mod telemetry;
