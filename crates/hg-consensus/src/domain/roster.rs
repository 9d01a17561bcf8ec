//! Voting weights and their history across roster changes

use crate::error::{ConsensusError, ConsensusResult};
use serde::{Deserialize, Serialize};
use shared_types::NodeId;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One voting participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub node_id: NodeId,
    pub weight: u64,
}

impl RosterEntry {
    pub fn new(node_id: NodeId, weight: u64) -> Self {
        Self { node_id, weight }
    }
}

/// Ordered set of participants and their weights.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// Sorted by node id
    entries: Vec<RosterEntry>,
    total_weight: u64,
}

impl Roster {
    /// Build a roster. Entries are sorted by node id.
    pub fn new(mut entries: Vec<RosterEntry>) -> ConsensusResult<Self> {
        entries.sort_by_key(|e| e.node_id);
        if entries.windows(2).any(|w| w[0].node_id == w[1].node_id) {
            return Err(ConsensusError::InvalidRoster {
                reason: "duplicate node id".to_string(),
            });
        }

        let total_weight = entries
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.weight))
            .ok_or_else(|| ConsensusError::InvalidRoster {
                reason: "total weight overflows".to_string(),
            })?;
        if total_weight == 0 {
            return Err(ConsensusError::InvalidRoster {
                reason: "total weight is zero".to_string(),
            });
        }

        Ok(Self {
            entries,
            total_weight,
        })
    }

    /// Every node gets the same weight.
    pub fn uniform(nodes: impl IntoIterator<Item = NodeId>, weight: u64) -> ConsensusResult<Self> {
        Self::new(
            nodes
                .into_iter()
                .map(|node_id| RosterEntry::new(node_id, weight))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|e| e.node_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Weight of a node, zero when it is not a member.
    pub fn weight(&self, node_id: NodeId) -> u64 {
        self.entries
            .binary_search_by_key(&node_id, |e| e.node_id)
            .map(|pos| self.entries[pos].weight)
            .unwrap_or(0)
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.weight(node_id) > 0
    }

    /// More than two thirds of the total weight.
    pub fn is_supermajority(&self, part: u64) -> bool {
        3 * part as u128 > 2 * self.total_weight as u128
    }
}

/// Versioned lookup table: starting round -> roster.
///
/// The roster for a round is the one with the greatest starting round not
/// above it. Rounds before the first entry use the first roster.
#[derive(Clone, Debug)]
pub struct RosterHistory {
    rosters: BTreeMap<u64, Arc<Roster>>,
    /// Roster of the earliest entry
    first: Arc<Roster>,
}

impl RosterHistory {
    pub fn new(starting_round: u64, roster: Roster) -> Self {
        let first = Arc::new(roster);
        let mut rosters = BTreeMap::new();
        rosters.insert(starting_round, Arc::clone(&first));
        Self { rosters, first }
    }

    /// Append a roster that takes effect at `starting_round`.
    pub fn add(&mut self, starting_round: u64, roster: Roster) -> ConsensusResult<()> {
        let latest = self.latest_starting_round();
        if starting_round <= latest {
            return Err(ConsensusError::RosterHistoryOutOfOrder {
                latest,
                proposed: starting_round,
            });
        }
        self.rosters.insert(starting_round, Arc::new(roster));
        Ok(())
    }

    /// Builder form of [`RosterHistory::add`].
    pub fn with(mut self, starting_round: u64, roster: Roster) -> ConsensusResult<Self> {
        self.add(starting_round, roster)?;
        Ok(self)
    }

    pub fn latest_starting_round(&self) -> u64 {
        self.rosters.keys().next_back().copied().unwrap_or(0)
    }

    pub fn lookup(&self, round: u64) -> &Arc<Roster> {
        self.rosters
            .range(..=round)
            .next_back()
            .map(|(_, roster)| roster)
            .unwrap_or(&self.first)
    }

    pub fn roster_count(&self) -> usize {
        self.rosters.len()
    }
}
