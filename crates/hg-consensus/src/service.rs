//! Consensus Engine - pipeline orchestration
//!
//! # Pipeline
//!
//! ```text
//! event ─→ FutureEventBuffer ─→ ConsensusLinker ─→ ConsensusCore ─→ FreezeRoundController
//!               ↑                                        │
//!               └──────── released on window advance ────┘
//! ```
//!
//! Every decided round moves the event window: the linker frees ancient
//! events (stale ones are reported), and the buffer releases events that
//! are no longer from the future. Released events go through the same
//! pipeline within the same call.

use crate::config::ConsensusConfig;
use crate::domain::event::{BirthRound, PlatformEvent};
use crate::domain::output::ConsensusEngineOutput;
use crate::domain::round::{ConsensusRound, ConsensusSnapshot};
use crate::domain::status::PlatformStatus;
use crate::domain::window::EventWindow;
use crate::error::{ConsensusError, ConsensusResult};
use crate::freeze::FreezeRoundController;
use crate::future_buffer::FutureEventBuffer;
use crate::graph::arena::{EventArena, EventIndex};
use crate::hashgraph::ConsensusCore;
use crate::linking::{ConsensusLinker, LinkerAnomalyCounts};
use crate::metrics;
use crate::ports::inbound::ConsensusEngineApi;
use crate::ports::outbound::{FreezeCheck, RosterLookup};
use parking_lot::Mutex;
use shared_types::{HashDisplay, Timestamp};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Single-threaded consensus engine.
pub struct ConsensusEngine<R: RosterLookup, F: FreezeCheck> {
    config: ConsensusConfig,
    arena: EventArena,
    future_buffer: FutureEventBuffer,
    linker: ConsensusLinker,
    core: ConsensusCore<R>,
    freeze: FreezeRoundController<F>,
    status: PlatformStatus,
}

impl<R: RosterLookup, F: FreezeCheck> ConsensusEngine<R, F> {
    /// Create an engine at genesis.
    ///
    /// # Errors
    /// - `InvalidConfig`: a tunable is out of range
    pub fn new(config: ConsensusConfig, rosters: Arc<R>, freeze_check: Arc<F>) -> ConsensusResult<Self> {
        config.validate()?;
        info!(
            rounds_non_ancient = config.rounds_non_ancient,
            rounds_expired = config.rounds_expired,
            coin_freq = config.coin_freq,
            "[hg-consensus] Consensus engine created"
        );
        Ok(Self {
            arena: EventArena::new(),
            future_buffer: FutureEventBuffer::new(),
            linker: ConsensusLinker::new(config.linker_log_period()),
            core: ConsensusCore::new(config.clone(), rosters),
            freeze: FreezeRoundController::new(freeze_check),
            status: PlatformStatus::default(),
            config,
        })
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn platform_status(&self) -> PlatformStatus {
        self.status
    }

    /// Window the linker and buffer currently apply.
    pub fn event_window(&self) -> EventWindow {
        self.linker.event_window()
    }

    /// Snapshot of the last decided round, `None` before the first one.
    pub fn snapshot(&self) -> Option<ConsensusSnapshot> {
        self.core.snapshot()
    }

    pub fn last_decided_round(&self) -> u64 {
        self.core.last_decided_round()
    }

    /// Events linked since construction, including those freed since.
    pub fn linked_event_count(&self) -> u64 {
        self.linker.linked_event_count()
    }

    /// Events linked and still held in memory.
    pub fn live_event_count(&self) -> usize {
        self.linker.len()
    }

    pub fn future_event_count(&self) -> usize {
        self.future_buffer.len()
    }

    pub fn anomaly_counts(&self) -> LinkerAnomalyCounts {
        self.linker.anomaly_counts()
    }

    fn process(&mut self, event: Arc<PlatformEvent>) -> ConsensusResult<ConsensusEngineOutput> {
        let mut output = ConsensusEngineOutput::default();
        let mut rounds: Vec<ConsensusRound> = Vec::new();
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let Some(index) = self.linker.link_event(&mut self.arena, event) else {
                continue;
            };

            let was_waiting = self.core.waiting_for_init_judges();
            let decided = self.core.add_event(&mut self.arena, index);
            let still_waiting = self.core.waiting_for_init_judges();

            if was_waiting && !still_waiting {
                // everything held while bootstrapping surfaces now, exactly once
                output.pre_consensus_events.extend(
                    decided
                        .iter()
                        .flat_map(|round| round.events.iter())
                        .map(|event| Arc::clone(&event.event)),
                );
                output
                    .pre_consensus_events
                    .extend(self.core.pre_consensus_events(&self.arena));
            } else if !still_waiting {
                self.surface(index, &mut output);
            }

            if let Some(last) = decided.last() {
                let window = last.event_window;
                self.advance_window(window, &mut output)?;
                queue.extend(self.future_buffer.update_event_window(window));
            }
            rounds.extend(decided);
        }

        output.consensus_rounds = self.freeze.filter_and_modify(rounds);
        Ok(output)
    }

    /// Emit a freshly added event as pre-consensus unless it reached
    /// consensus before the loaded snapshot.
    fn surface(&self, index: EventIndex, output: &mut ConsensusEngineOutput) {
        let Some(linked) = self.arena.get(index) else {
            return;
        };
        if !linked.reached_consensus() || linked.consensus_order().is_some() {
            output.pre_consensus_events.push(Arc::clone(linked.event()));
        }
    }

    fn advance_window(
        &mut self,
        window: EventWindow,
        output: &mut ConsensusEngineOutput,
    ) -> ConsensusResult<()> {
        let evicted = self.linker.set_event_window(&mut self.arena, window)?;
        self.core.prune_dead(&self.arena);

        let stale: Vec<Arc<PlatformEvent>> = evicted
            .into_iter()
            .filter(|event| !event.reached_consensus())
            .map(|event| Arc::clone(event.event()))
            .collect();
        for event in &stale {
            warn!(
                hash = %HashDisplay(event.hash()),
                creator = %event.creator(),
                birth_round = event.birth_round(),
                window = %window,
                "[hg-consensus] Event became stale"
            );
        }
        output.stale_events.extend(stale);
        Ok(())
    }

    fn record_metrics(&self, output: &ConsensusEngineOutput) {
        metrics::record_pre_consensus_events(output.pre_consensus_events.len());
        metrics::record_stale_events(output.stale_events.len());
        for round in &output.consensus_rounds {
            metrics::record_round_decided(round.events.len());
        }
        if self.status.is_replaying() {
            return;
        }
        let now = Timestamp::now();
        for event in output.consensus_rounds.iter().flat_map(|r| r.events.iter()) {
            let latency = now.nanos_since(event.event.time_created());
            metrics::observe_consensus_latency(latency as f64 / 1_000_000_000.0);
        }
    }
}

impl<R: RosterLookup, F: FreezeCheck> ConsensusEngineApi for ConsensusEngine<R, F> {
    fn update_platform_status(&mut self, status: PlatformStatus) {
        if self.status != status {
            debug!(from = %self.status, to = %status, "[hg-consensus] Platform status changed");
        }
        self.status = status;
    }

    fn add_event(&mut self, event: Arc<PlatformEvent>) -> ConsensusResult<ConsensusEngineOutput> {
        if self.freeze.is_frozen() {
            return Ok(ConsensusEngineOutput::empty());
        }
        metrics::record_event_added();

        let Some(ready) = self.future_buffer.add_event(event) else {
            return Ok(ConsensusEngineOutput::empty());
        };
        let output = self.process(ready)?;
        self.record_metrics(&output);
        Ok(output)
    }

    fn out_of_band_snapshot_update(&mut self, snapshot: &ConsensusSnapshot) -> ConsensusResult<()> {
        snapshot.validate()?;
        let current_round = self.core.last_decided_round();
        if snapshot.round < current_round {
            return Err(ConsensusError::SnapshotRegression {
                current_round,
                snapshot_round: snapshot.round,
            });
        }

        self.core.load_snapshot(snapshot)?;
        let window = EventWindow::from_snapshot(snapshot, self.config.rounds_non_ancient);
        self.linker.clear(&mut self.arena);
        self.linker.set_event_window(&mut self.arena, window)?;
        self.future_buffer.clear();
        self.future_buffer.update_event_window(window);

        info!(
            round = snapshot.round,
            window = %window,
            "[hg-consensus] Out of band snapshot applied"
        );
        Ok(())
    }

    fn is_frozen(&self) -> bool {
        self.freeze.is_frozen()
    }

    fn waiting_for_init_judges(&self) -> bool {
        self.core.waiting_for_init_judges()
    }
}

/// Engine behind a lock, for hosts that feed events from several threads.
///
/// The frozen and waiting flags are mirrored into atomics after every call
/// so they can be polled without taking the lock.
pub struct SharedConsensusEngine<R: RosterLookup, F: FreezeCheck> {
    engine: Mutex<ConsensusEngine<R, F>>,
    frozen: AtomicBool,
    waiting_for_init_judges: AtomicBool,
}

impl<R: RosterLookup, F: FreezeCheck> SharedConsensusEngine<R, F> {
    pub fn new(engine: ConsensusEngine<R, F>) -> Self {
        let frozen = AtomicBool::new(engine.is_frozen());
        let waiting = AtomicBool::new(engine.waiting_for_init_judges());
        Self {
            engine: Mutex::new(engine),
            frozen,
            waiting_for_init_judges: waiting,
        }
    }

    pub fn add_event(&self, event: Arc<PlatformEvent>) -> ConsensusResult<ConsensusEngineOutput> {
        let mut engine = self.engine.lock();
        let result = engine.add_event(event);
        self.mirror(&engine);
        result
    }

    pub fn out_of_band_snapshot_update(&self, snapshot: &ConsensusSnapshot) -> ConsensusResult<()> {
        let mut engine = self.engine.lock();
        let result = engine.out_of_band_snapshot_update(snapshot);
        self.mirror(&engine);
        result
    }

    pub fn update_platform_status(&self, status: PlatformStatus) {
        self.engine.lock().update_platform_status(status);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn waiting_for_init_judges(&self) -> bool {
        self.waiting_for_init_judges.load(Ordering::Acquire)
    }

    /// Run `f` with the engine locked.
    pub fn with_engine<T>(&self, f: impl FnOnce(&ConsensusEngine<R, F>) -> T) -> T {
        f(&self.engine.lock())
    }

    fn mirror(&self, engine: &ConsensusEngine<R, F>) {
        self.frozen.store(engine.is_frozen(), Ordering::Release);
        self.waiting_for_init_judges
            .store(engine.waiting_for_init_judges(), Ordering::Release);
    }
}
