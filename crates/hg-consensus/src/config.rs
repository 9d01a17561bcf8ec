//! Consensus configuration

use crate::error::{ConsensusError, ConsensusResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables of the consensus engine.
///
/// Every node of a network must run with identical values for the voting
/// and ordering fields, otherwise their consensus output diverges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Number of decided rounds whose events are not ancient
    pub rounds_non_ancient: u64,
    /// Number of decided rounds kept in the minimum judge store
    pub rounds_expired: u64,
    /// Every `coin_freq`-th voting round is a coin round
    pub coin_freq: u64,
    /// Gap reserved per transaction between consecutive consensus timestamps
    pub min_trans_timestamp_incr_nanos: u64,
    /// Minimum period between two log lines of the same linker anomaly
    pub linker_log_period_secs: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            rounds_non_ancient: 26,
            rounds_expired: 500,
            coin_freq: 12,
            min_trans_timestamp_incr_nanos: 1_000,
            linker_log_period_secs: 60,
        }
    }
}

impl ConsensusConfig {
    /// Reject values the voting algorithm cannot work with.
    pub fn validate(&self) -> ConsensusResult<()> {
        if self.rounds_non_ancient == 0 {
            return Err(ConsensusError::InvalidConfig {
                reason: "rounds_non_ancient must be at least 1".to_string(),
            });
        }
        if self.rounds_expired < self.rounds_non_ancient {
            return Err(ConsensusError::InvalidConfig {
                reason: format!(
                    "rounds_expired ({}) must not be below rounds_non_ancient ({})",
                    self.rounds_expired, self.rounds_non_ancient
                ),
            });
        }
        if self.coin_freq < 2 {
            return Err(ConsensusError::InvalidConfig {
                reason: "coin_freq must be at least 2".to_string(),
            });
        }
        if self.min_trans_timestamp_incr_nanos == 0 {
            return Err(ConsensusError::InvalidConfig {
                reason: "min_trans_timestamp_incr_nanos must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn linker_log_period(&self) -> Duration {
        Duration::from_secs(self.linker_log_period_secs)
    }

    /// Config with a short ancient window, convenient for simulations.
    pub fn for_testing() -> Self {
        Self {
            rounds_non_ancient: 5,
            rounds_expired: 10,
            coin_freq: 12,
            min_trans_timestamp_incr_nanos: 1_000,
            linker_log_period_secs: 0,
        }
    }
}
