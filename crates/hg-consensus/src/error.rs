//! Error types for the consensus subsystem
//!
//! Only operator errors surface here. Anomalous gossip input (missing or
//! mismatched parents, ancient events) is logged and counted instead.

use thiserror::Error;

/// Consensus subsystem errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// A snapshot older than the current consensus state was offered
    #[error("Snapshot regression: current round {current_round}, snapshot round {snapshot_round}")]
    SnapshotRegression {
        current_round: u64,
        snapshot_round: u64,
    },

    /// Snapshot content is inconsistent
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// Snapshot bytes could not be encoded or decoded
    #[error("Snapshot codec failure: {reason}")]
    SnapshotCodec { reason: String },

    /// Ancient threshold moved backwards outside of a restart
    #[error("Event window regression: ancient threshold {current} -> {proposed}")]
    EventWindowRegression { current: u64, proposed: u64 },

    /// Roster has no voting weight or repeats a node
    #[error("Invalid roster: {reason}")]
    InvalidRoster { reason: String },

    /// Roster history entries must start at increasing rounds
    #[error("Roster history out of order: latest starting round {latest}, proposed {proposed}")]
    RosterHistoryOutOfOrder { latest: u64, proposed: u64 },

    /// Configuration value out of range
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
