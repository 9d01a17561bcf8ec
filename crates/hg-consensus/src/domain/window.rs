//! Event window: the ancient boundary shared by buffer, linker and core

use crate::domain::event::BirthRound;
use crate::domain::round::ConsensusSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First round of a hashgraph.
pub const ROUND_FIRST: u64 = 1;

/// Round number before any round is decided.
pub const ROUND_GENESIS: u64 = 0;

/// Immutable description of which birth rounds are still live.
///
/// Values never decrease over the life of an engine except through an
/// explicit snapshot load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventWindow {
    latest_consensus_round: u64,
    ancient_threshold: u64,
    expired_threshold: u64,
}

impl EventWindow {
    /// The expired threshold is clamped to the ancient threshold.
    pub fn new(latest_consensus_round: u64, ancient_threshold: u64, expired_threshold: u64) -> Self {
        Self {
            latest_consensus_round,
            ancient_threshold,
            expired_threshold: expired_threshold.min(ancient_threshold),
        }
    }

    /// Window of a network that has not decided any round.
    pub fn genesis() -> Self {
        Self::new(ROUND_GENESIS, ROUND_FIRST, ROUND_FIRST)
    }

    /// Window in force right after the snapshot's round was decided.
    pub fn from_snapshot(snapshot: &ConsensusSnapshot, rounds_non_ancient: u64) -> Self {
        Self::new(
            snapshot.round,
            snapshot.ancient_threshold(rounds_non_ancient),
            snapshot.expired_threshold(),
        )
    }

    pub fn latest_consensus_round(&self) -> u64 {
        self.latest_consensus_round
    }

    /// Round that will be decided next.
    pub fn pending_consensus_round(&self) -> u64 {
        self.latest_consensus_round + 1
    }

    pub fn ancient_threshold(&self) -> u64 {
        self.ancient_threshold
    }

    pub fn expired_threshold(&self) -> u64 {
        self.expired_threshold
    }

    pub fn is_genesis(&self) -> bool {
        self.latest_consensus_round == ROUND_GENESIS
    }

    /// True iff the item's birth round is strictly below the ancient threshold.
    pub fn is_ancient<T: BirthRound + ?Sized>(&self, item: &T) -> bool {
        self.is_ancient_round(item.birth_round())
    }

    pub fn is_ancient_round(&self, birth_round: u64) -> bool {
        birth_round < self.ancient_threshold
    }
}

impl Default for EventWindow {
    fn default() -> Self {
        Self::genesis()
    }
}

impl fmt::Display for EventWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "latest={} ancient={} expired={}",
            self.latest_consensus_round, self.ancient_threshold, self.expired_threshold
        )
    }
}
