//! Node of the local causal graph

use crate::domain::event::{BirthRound, EventDescriptor, PlatformEvent};
use crate::graph::arena::EventIndex;
use shared_types::{Hash, NodeId, Timestamp};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Latest event by one creator among an event's ancestors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SeenEvent {
    pub(crate) time_created: Timestamp,
    pub(crate) hash: Hash,
    pub(crate) index: EventIndex,
}

impl SeenEvent {
    /// Later creation time wins, hash breaks ties between forks.
    pub(crate) fn supersedes(&self, other: &SeenEvent) -> bool {
        (self.time_created, self.hash) > (other.time_created, other.hash)
    }
}

/// Round and fame annotations, recomputed whenever a round is decided.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct VotingMetadata {
    /// `None` stands for negative infinity
    pub(crate) round: Option<u64>,
    pub(crate) witness: bool,
    pub(crate) famous: Option<bool>,
    pub(crate) judge: bool,
}

/// Annotations attached once the event reaches consensus.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ConsensusData {
    pub(crate) reached: bool,
    pub(crate) round_received: Option<u64>,
    pub(crate) order: Option<u64>,
    pub(crate) timestamp: Option<Timestamp>,
}

/// A gossiped event with resolved parent links.
///
/// Parents are non-owning [`EventIndex`] handles into the arena. A parent that
/// was never linked, or that has since been freed, resolves to nothing.
#[derive(Clone, Debug)]
pub struct LinkedEvent {
    event: Arc<PlatformEvent>,
    self_parent: Option<EventIndex>,
    other_parent: Option<EventIndex>,
    generation: u64,
    pub(crate) last_see: BTreeMap<NodeId, SeenEvent>,
    pub(crate) voting: VotingMetadata,
    pub(crate) consensus: ConsensusData,
}

impl LinkedEvent {
    pub fn new(
        event: Arc<PlatformEvent>,
        self_parent: Option<EventIndex>,
        other_parent: Option<EventIndex>,
        generation: u64,
    ) -> Self {
        Self {
            event,
            self_parent,
            other_parent,
            generation,
            last_see: BTreeMap::new(),
            voting: VotingMetadata::default(),
            consensus: ConsensusData::default(),
        }
    }

    pub fn event(&self) -> &Arc<PlatformEvent> {
        &self.event
    }

    pub fn hash(&self) -> &Hash {
        self.event.hash()
    }

    pub fn creator(&self) -> NodeId {
        self.event.creator()
    }

    pub fn time_created(&self) -> Timestamp {
        self.event.time_created()
    }

    pub fn descriptor(&self) -> EventDescriptor {
        self.event.descriptor()
    }

    pub fn self_parent(&self) -> Option<EventIndex> {
        self.self_parent
    }

    pub fn other_parent(&self) -> Option<EventIndex> {
        self.other_parent
    }

    /// Linked parents, self parent first.
    pub fn parents(&self) -> impl Iterator<Item = EventIndex> {
        self.self_parent.into_iter().chain(self.other_parent)
    }

    /// `1 + max(parent generations)`, or 1 without linked parents.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn round_created(&self) -> Option<u64> {
        self.voting.round
    }

    pub fn is_witness(&self) -> bool {
        self.voting.witness
    }

    pub fn is_famous(&self) -> Option<bool> {
        self.voting.famous
    }

    pub fn is_judge(&self) -> bool {
        self.voting.judge
    }

    pub fn reached_consensus(&self) -> bool {
        self.consensus.reached
    }

    pub fn round_received(&self) -> Option<u64> {
        self.consensus.round_received
    }

    pub fn consensus_order(&self) -> Option<u64> {
        self.consensus.order
    }

    pub fn consensus_timestamp(&self) -> Option<Timestamp> {
        self.consensus.timestamp
    }

    pub(crate) fn seen_self(&self, index: EventIndex) -> SeenEvent {
        SeenEvent {
            time_created: self.time_created(),
            hash: *self.hash(),
            index,
        }
    }
}

impl BirthRound for LinkedEvent {
    fn birth_round(&self) -> u64 {
        self.event.birth_round()
    }
}
