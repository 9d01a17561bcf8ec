//! Simulation helpers shared by the integration tests and benchmarks.

use hg_consensus::domain::invariants::{
    validate_consensus_timestamps, validate_no_lost_events, validate_pre_consensus_completeness,
    validate_round_sequence, InvariantViolation,
};
use hg_consensus::test_utils::{EventEmitter, OutputCollector};
use hg_consensus::{
    ConsensusConfig, ConsensusEngine, ConsensusEngineApi, ConsensusResult, ConsensusRound,
    FreezeCheck, NoFreeze, PlatformEvent, RosterHistory,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;

pub type TestEngine<F = NoFreeze> = ConsensusEngine<RosterHistory, F>;

/// Engine over the emitter's roster with test tunables.
pub fn engine_for(emitter: &EventEmitter) -> ConsensusResult<TestEngine> {
    engine_with(emitter.roster_history()?, Arc::new(NoFreeze))
}

pub fn engine_with<F: FreezeCheck>(
    rosters: RosterHistory,
    freeze_check: Arc<F>,
) -> ConsensusResult<TestEngine<F>> {
    ConsensusEngine::new(
        ConsensusConfig::for_testing(),
        Arc::new(rosters),
        freeze_check,
    )
}

/// Feed events in the given order and keep every output batch.
pub fn feed<F: FreezeCheck>(
    engine: &mut TestEngine<F>,
    events: impl IntoIterator<Item = Arc<PlatformEvent>>,
) -> ConsensusResult<OutputCollector> {
    let mut collector = OutputCollector::new();
    for event in events {
        collector.add(engine.add_event(event)?);
    }
    Ok(collector)
}

pub fn rounds(collector: &OutputCollector) -> Vec<ConsensusRound> {
    collector.consensus_rounds().cloned().collect()
}

/// One engine fed by an emitter that tracks the engine's progress.
pub struct Simulation<F: FreezeCheck = NoFreeze> {
    pub emitter: EventEmitter,
    pub engine: TestEngine<F>,
    pub output: OutputCollector,
}

impl Simulation<NoFreeze> {
    pub fn new(node_count: u64, seed: u64) -> ConsensusResult<Self> {
        let emitter = EventEmitter::new(node_count, seed);
        let engine = engine_for(&emitter)?;
        Ok(Self::with_engine(emitter, engine))
    }
}

impl<F: FreezeCheck> Simulation<F> {
    pub fn with_engine(emitter: EventEmitter, engine: TestEngine<F>) -> Self {
        Self {
            emitter,
            engine,
            output: OutputCollector::new(),
        }
    }

    pub fn step(&mut self) -> ConsensusResult<()> {
        let event = self.emitter.next_event();
        self.add(event)
    }

    pub fn run(&mut self, events: usize) -> ConsensusResult<()> {
        for _ in 0..events {
            self.step()?;
        }
        Ok(())
    }

    /// Run until `round` is decided. Returns false when `max_events` ran out.
    pub fn run_until_round(&mut self, round: u64, max_events: usize) -> ConsensusResult<bool> {
        for _ in 0..max_events {
            if self.engine.last_decided_round() >= round {
                return Ok(true);
            }
            self.step()?;
        }
        Ok(self.engine.last_decided_round() >= round)
    }

    /// Emit and add whole layers, returning them in emission order.
    pub fn run_layers(&mut self, layers: usize) -> ConsensusResult<Vec<Vec<Arc<PlatformEvent>>>> {
        let mut emitted = Vec::with_capacity(layers);
        for _ in 0..layers {
            let layer = self.emitter.next_layer();
            for event in &layer {
                self.add(Arc::clone(event))?;
            }
            emitted.push(layer);
        }
        Ok(emitted)
    }

    pub fn rounds(&self) -> Vec<ConsensusRound> {
        rounds(&self.output)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        check_invariants(&self.output, &self.engine)
    }

    fn add(&mut self, event: Arc<PlatformEvent>) -> ConsensusResult<()> {
        let output = self.engine.add_event(event)?;
        self.emitter.observe(&output);
        self.output.add(output);
        Ok(())
    }
}

pub fn check_invariants<F: FreezeCheck>(
    output: &OutputCollector,
    engine: &TestEngine<F>,
) -> Result<(), InvariantViolation> {
    validate_pre_consensus_completeness(output)?;
    validate_consensus_timestamps(output)?;
    validate_round_sequence(output)?;
    validate_no_lost_events(output, &engine.event_window())
}

/// Every layer permuted; any order of a layer is still topological.
pub fn shuffle_layers(layers: &[Vec<Arc<PlatformEvent>>], seed: u64) -> Vec<Arc<PlatformEvent>> {
    let mut rng = StdRng::seed_from_u64(seed);
    layers
        .iter()
        .flat_map(|layer| {
            let mut layer = layer.clone();
            layer.shuffle(&mut rng);
            layer
        })
        .collect()
}
