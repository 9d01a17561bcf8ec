//! Engine output batches and an accumulator over many of them

use crate::domain::event::PlatformEvent;
use crate::domain::round::{ConsensusEvent, ConsensusRound};
use shared_types::Hash;
use std::sync::Arc;

/// Everything one `add_event` call produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsensusEngineOutput {
    /// Newly decided rounds, in round order
    pub consensus_rounds: Vec<ConsensusRound>,
    /// Events surfaced for the first time, in topological order
    pub pre_consensus_events: Vec<Arc<PlatformEvent>>,
    /// Events that became ancient without reaching consensus
    pub stale_events: Vec<Arc<PlatformEvent>>,
}

impl ConsensusEngineOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.consensus_rounds.is_empty()
            && self.pre_consensus_events.is_empty()
            && self.stale_events.is_empty()
    }
}

/// Keeps every output batch of an engine, in call order.
#[derive(Clone, Debug, Default)]
pub struct OutputCollector {
    batches: Vec<ConsensusEngineOutput>,
}

impl OutputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, output: ConsensusEngineOutput) {
        self.batches.push(output);
    }

    pub fn batches(&self) -> &[ConsensusEngineOutput] {
        &self.batches
    }

    pub fn consensus_rounds(&self) -> impl Iterator<Item = &ConsensusRound> {
        self.batches.iter().flat_map(|b| b.consensus_rounds.iter())
    }

    pub fn consensus_events(&self) -> impl Iterator<Item = &ConsensusEvent> {
        self.consensus_rounds().flat_map(|r| r.events.iter())
    }

    pub fn pre_consensus_events(&self) -> impl Iterator<Item = &Arc<PlatformEvent>> {
        self.batches.iter().flat_map(|b| b.pre_consensus_events.iter())
    }

    pub fn stale_events(&self) -> impl Iterator<Item = &Arc<PlatformEvent>> {
        self.batches.iter().flat_map(|b| b.stale_events.iter())
    }

    pub fn last_round(&self) -> Option<&ConsensusRound> {
        self.consensus_rounds().last()
    }

    pub fn round_count(&self) -> usize {
        self.consensus_rounds().count()
    }

    /// Hashes of the consensus events in consensus order.
    pub fn consensus_hashes(&self) -> Vec<Hash> {
        self.consensus_events().map(|e| *e.hash()).collect()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}
