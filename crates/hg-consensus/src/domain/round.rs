//! Consensus output: finalized rounds and restart snapshots

use crate::domain::event::{EventDescriptor, PlatformEvent};
use crate::domain::window::{EventWindow, ROUND_FIRST};
use crate::error::{ConsensusError, ConsensusResult};
use serde::{Deserialize, Serialize};
use shared_types::{Hash, NodeId, Timestamp};
use std::collections::HashSet;
use std::sync::Arc;

/// Identity of a judge (or other decided witness) of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JudgeId {
    pub creator: NodeId,
    pub hash: Hash,
}

impl JudgeId {
    pub fn new(creator: NodeId, hash: Hash) -> Self {
        Self { creator, hash }
    }
}

/// Lowest birth round among the judges of a decided round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumJudgeInfo {
    pub round: u64,
    pub minimum_judge_birth_round: u64,
}

impl MinimumJudgeInfo {
    pub fn new(round: u64, minimum_judge_birth_round: u64) -> Self {
        Self {
            round,
            minimum_judge_birth_round,
        }
    }
}

/// Ancient threshold after `latest_round` was decided: the minimum judge
/// birth round of the oldest non-ancient round.
pub(crate) fn ancient_threshold_of(
    list: &[MinimumJudgeInfo],
    latest_round: u64,
    rounds_non_ancient: u64,
) -> u64 {
    let oldest_non_ancient = (latest_round + 1).saturating_sub(rounds_non_ancient).max(ROUND_FIRST);
    list.iter()
        .find(|info| info.round >= oldest_non_ancient)
        .or_else(|| list.last())
        .map(|info| info.minimum_judge_birth_round)
        .unwrap_or(ROUND_FIRST)
}

/// Expired threshold: the minimum judge birth round of the oldest stored round.
pub(crate) fn expired_threshold_of(list: &[MinimumJudgeInfo]) -> u64 {
    list.first()
        .map(|info| info.minimum_judge_birth_round)
        .unwrap_or(ROUND_FIRST)
}

/// Serializable checkpoint of the voting state after a decided round.
///
/// `judges` and `other_witnesses` together are every witness of `round`
/// whose fame was decided. `consensus_tips` are the maximal events that had
/// reached consensus; their ancestors are the consensus events a restarted
/// engine must not emit again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusSnapshot {
    pub round: u64,
    pub judges: Vec<JudgeId>,
    pub other_witnesses: Vec<JudgeId>,
    pub minimum_judge_info_list: Vec<MinimumJudgeInfo>,
    pub next_consensus_number: u64,
    pub consensus_timestamp: Timestamp,
    pub consensus_tips: Vec<EventDescriptor>,
}

impl ConsensusSnapshot {
    pub fn ancient_threshold(&self, rounds_non_ancient: u64) -> u64 {
        ancient_threshold_of(&self.minimum_judge_info_list, self.round, rounds_non_ancient)
    }

    pub fn expired_threshold(&self) -> u64 {
        expired_threshold_of(&self.minimum_judge_info_list)
    }

    /// Structural checks performed before a snapshot is loaded.
    pub fn validate(&self) -> ConsensusResult<()> {
        let invalid = |reason: &str| ConsensusError::InvalidSnapshot {
            reason: reason.to_string(),
        };

        if self.round < ROUND_FIRST {
            return Err(invalid("round must be at least 1"));
        }
        if self.judges.is_empty() {
            return Err(invalid("no judges"));
        }

        let mut seen = HashSet::new();
        if !self
            .judges
            .iter()
            .chain(&self.other_witnesses)
            .all(|id| seen.insert(id.hash))
        {
            return Err(invalid("duplicate witness"));
        }

        if !self
            .minimum_judge_info_list
            .windows(2)
            .all(|w| w[0].round < w[1].round)
        {
            return Err(invalid("minimum judge rounds not increasing"));
        }
        match self.minimum_judge_info_list.last() {
            Some(last) if last.round == self.round => Ok(()),
            Some(_) => Err(invalid("minimum judge list does not end at snapshot round")),
            None => Err(invalid("empty minimum judge list")),
        }
    }

    pub fn to_bytes(&self) -> ConsensusResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ConsensusError::SnapshotCodec {
            reason: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> ConsensusResult<Self> {
        bincode::deserialize(bytes).map_err(|e| ConsensusError::SnapshotCodec {
            reason: e.to_string(),
        })
    }
}

/// An event with its consensus position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusEvent {
    pub event: Arc<PlatformEvent>,
    pub consensus_order: u64,
    pub consensus_timestamp: Timestamp,
    pub round_received: u64,
}

impl ConsensusEvent {
    pub fn hash(&self) -> &Hash {
        self.event.hash()
    }
}

/// Events that reached consensus together, with the state needed downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusRound {
    pub round_num: u64,
    /// Consensus order
    pub events: Vec<ConsensusEvent>,
    pub judges: Vec<JudgeId>,
    /// Window in force once this round is decided
    pub event_window: EventWindow,
    pub snapshot: ConsensusSnapshot,
    pub consensus_timestamp: Timestamp,
    /// Set on the round that crossed the freeze boundary
    pub freeze_round: bool,
}

impl ConsensusRound {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn hashes(&self) -> impl Iterator<Item = &Hash> {
        self.events.iter().map(ConsensusEvent::hash)
    }
}
