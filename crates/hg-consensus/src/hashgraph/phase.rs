//! Lifecycle of the voting state

use crate::graph::arena::EventIndex;
use shared_types::Hash;
use std::collections::HashSet;

/// Where the core stands with respect to its judge history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsensusPhase {
    /// Loaded from a snapshot: events are stored but not voted on until
    /// every judge of `judge_round` has been received.
    Bootstrapping {
        judge_round: u64,
        missing: HashSet<Hash>,
        found: Vec<EventIndex>,
    },
    /// Judges known, each event extends the voting incrementally.
    SteadyState,
}

impl ConsensusPhase {
    pub fn bootstrapping<'a>(judge_round: u64, judges: impl IntoIterator<Item = &'a Hash>) -> Self {
        Self::Bootstrapping {
            judge_round,
            missing: judges.into_iter().copied().collect(),
            found: Vec::new(),
        }
    }

    pub fn is_bootstrapping(&self) -> bool {
        matches!(self, Self::Bootstrapping { .. })
    }

    /// Record an arriving event. Returns true when it was the last missing
    /// judge.
    pub(crate) fn judge_arrived(&mut self, hash: &Hash, index: EventIndex) -> bool {
        match self {
            Self::Bootstrapping { missing, found, .. } => {
                if missing.remove(hash) {
                    found.push(index);
                }
                missing.is_empty()
            }
            Self::SteadyState => false,
        }
    }

    pub fn missing_judges(&self) -> usize {
        match self {
            Self::Bootstrapping { missing, .. } => missing.len(),
            Self::SteadyState => 0,
        }
    }
}
