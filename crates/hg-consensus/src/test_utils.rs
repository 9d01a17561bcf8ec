//! Deterministic gossip simulation for tests and benchmarks
//!
//! [`EventEmitter`] plays N honest nodes. Every event gets the round the
//! emitting network is waiting for as birth round; feed engine output back
//! through [`EventEmitter::observe`] to keep it current.

use crate::domain::event::{EventDescriptor, PlatformEvent};
use crate::domain::output::ConsensusEngineOutput;
use crate::domain::roster::{Roster, RosterHistory};
use crate::domain::window::ROUND_FIRST;
use crate::error::ConsensusResult;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared_types::{NodeId, Timestamp};
use std::collections::HashMap;
use std::sync::Arc;

pub use crate::domain::output::OutputCollector;

/// Start of simulated time.
pub const SIMULATION_START: Timestamp = Timestamp::from_secs(1_700_000_000);

/// How an emitted event picks its other parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtherParentSelection {
    /// Latest event of a uniformly chosen other node
    Random,
    /// Latest event of the next node by id
    NextNode,
    /// No other parent at all
    None,
}

pub struct EventEmitter {
    rng: StdRng,
    nodes: Vec<NodeId>,
    latest: HashMap<NodeId, Arc<PlatformEvent>>,
    emitted: Vec<Arc<PlatformEvent>>,
    clock: Timestamp,
    birth_round: u64,
    selection: OtherParentSelection,
    max_transactions: usize,
}

impl EventEmitter {
    pub fn new(node_count: u64, seed: u64) -> Self {
        Self::with_nodes((1..=node_count).map(NodeId).collect(), seed)
    }

    pub fn with_nodes(nodes: Vec<NodeId>, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            nodes,
            latest: HashMap::new(),
            emitted: Vec::new(),
            clock: SIMULATION_START,
            birth_round: ROUND_FIRST,
            selection: OtherParentSelection::Random,
            max_transactions: 2,
        }
    }

    pub fn with_other_parent(mut self, selection: OtherParentSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Move the simulated clock to `start` before the first event.
    pub fn starting_at(mut self, start: Timestamp) -> Self {
        self.clock = start;
        self
    }

    pub fn with_max_transactions(mut self, max_transactions: usize) -> Self {
        self.max_transactions = max_transactions;
        self
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Every node with weight 10.
    pub fn roster_history(&self) -> ConsensusResult<RosterHistory> {
        Ok(RosterHistory::new(
            ROUND_FIRST,
            Roster::uniform(self.nodes.iter().copied(), 10)?,
        ))
    }

    /// Let later events carry the birth round the engine is waiting for.
    pub fn observe(&mut self, output: &ConsensusEngineOutput) {
        if let Some(round) = output.consensus_rounds.last() {
            self.birth_round = self.birth_round.max(round.round_num + 1);
        }
    }

    pub fn birth_round(&self) -> u64 {
        self.birth_round
    }

    /// One event by a random node.
    pub fn next_event(&mut self) -> Arc<PlatformEvent> {
        let position = self.rng.gen_range(0..self.nodes.len());
        let creator = self.nodes[position];
        let other = self.pick_other_parent(position);
        self.create(creator, other)
    }

    /// One event per node, in random node order. Other parents are taken
    /// from before the layer, so any order of a layer is topological.
    pub fn next_layer(&mut self) -> Vec<Arc<PlatformEvent>> {
        let snapshot = self.latest.clone();
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.shuffle(&mut self.rng);

        let mut layer = Vec::with_capacity(order.len());
        for position in order {
            let creator = self.nodes[position];
            let other = self
                .other_node(position)
                .and_then(|node| snapshot.get(&node).cloned());
            layer.push(self.create(creator, other));
        }
        layer
    }

    /// Event by `creator` on top of the latest event of `other`.
    pub fn event_from(&mut self, creator: NodeId, other: Option<NodeId>) -> Arc<PlatformEvent> {
        let other = other.and_then(|node| self.latest.get(&node).cloned());
        self.create(creator, other)
    }

    pub fn emitted(&self) -> &[Arc<PlatformEvent>] {
        &self.emitted
    }

    fn pick_other_parent(&mut self, position: usize) -> Option<Arc<PlatformEvent>> {
        let node = self.other_node(position)?;
        self.latest.get(&node).cloned()
    }

    fn other_node(&mut self, position: usize) -> Option<NodeId> {
        if self.nodes.len() < 2 {
            return None;
        }
        match self.selection {
            OtherParentSelection::Random => {
                let offset = self.rng.gen_range(1..self.nodes.len());
                Some(self.nodes[(position + offset) % self.nodes.len()])
            }
            OtherParentSelection::NextNode => Some(self.nodes[(position + 1) % self.nodes.len()]),
            OtherParentSelection::None => None,
        }
    }

    fn create(&mut self, creator: NodeId, other: Option<Arc<PlatformEvent>>) -> Arc<PlatformEvent> {
        self.clock = self
            .clock
            .plus_nanos(self.rng.gen_range(1_000_000..10_000_000));

        let self_parent = self.latest.get(&creator);
        let birth_round = self.birth_round;
        let parents: Vec<EventDescriptor> = self_parent
            .map(|p| p.descriptor())
            .into_iter()
            .chain(other.as_ref().map(|p| p.descriptor()))
            .collect();
        let transactions: Vec<Vec<u8>> = (0..self.rng.gen_range(0..=self.max_transactions))
            .map(|_| {
                let mut tx = vec![0u8; 8];
                self.rng.fill(&mut tx[..]);
                tx
            })
            .collect();

        let event = Arc::new(PlatformEvent::new(
            creator,
            self.clock,
            birth_round,
            parents,
            transactions,
            Vec::new(),
        ));
        self.latest.insert(creator, Arc::clone(&event));
        self.emitted.push(Arc::clone(&event));
        event
    }
}
