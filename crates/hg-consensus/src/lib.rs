//! # Hashgraph Consensus Subsystem
//!
//! Byzantine fault tolerant ordering of gossiped events through virtual
//! voting. Nodes never exchange votes: every node computes the votes it
//! would have received from the shared event graph alone, so every honest
//! node derives the same rounds, judges and total order.
//!
//! ## Pipeline
//!
//! | Stage | Type | Role |
//! |-------|------|------|
//! | Future buffer | `FutureEventBuffer` | Holds events whose birth round is ahead of consensus |
//! | Linker | `ConsensusLinker` | Resolves parents, drops ancient events, frees expired ones |
//! | Core | `ConsensusCore` | Rounds, witnesses, fame, order and consensus timestamps |
//! | Freeze | `FreezeRoundController` | Halts at the first round reaching the freeze time |
//! | Engine | `ConsensusEngine` | Drives the stages and aggregates their output |
//!
//! ## Output Guarantees
//!
//! | Guarantee | Enforcement Location |
//! |-----------|---------------------|
//! | Pre-consensus before consensus | `service.rs` - `surface()` and bootstrap transition |
//! | No lost events | `service.rs` - `advance_window()` reports stale events |
//! | Strictly increasing timestamps | `hashgraph/mod.rs` - `decide_round()` |
//! | Single-round freeze | `freeze.rs` - `filter_and_modify()` |
//!
//! Checks over recorded output live in [`domain::invariants`].
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use hg_consensus::{ConsensusConfig, ConsensusEngine, NoFreeze, RosterHistory};
//! use hg_consensus::ports::ConsensusEngineApi;
//!
//! let mut engine = ConsensusEngine::new(
//!     ConsensusConfig::default(),
//!     Arc::new(RosterHistory::new(1, roster)),
//!     Arc::new(NoFreeze),
//! )?;
//!
//! let output = engine.add_event(event)?;
//! for round in output.consensus_rounds {
//!     apply(round.events);
//! }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod freeze;
pub mod future_buffer;
pub mod graph;
pub mod hashgraph;
pub mod linking;
pub mod metrics;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main types
pub use config::ConsensusConfig;
pub use domain::{
    BirthRound, ConsensusEngineOutput, ConsensusEvent, ConsensusRound, ConsensusSnapshot,
    EventDescriptor, EventWindow, JudgeId, MinimumJudgeInfo, PlatformEvent, PlatformStatus,
    Roster, RosterEntry, RosterHistory,
};
pub use error::{ConsensusError, ConsensusResult};
pub use freeze::{FreezeCheckHolder, FreezeRoundController};
pub use future_buffer::FutureEventBuffer;
pub use hashgraph::{ConsensusCore, ConsensusPhase, MAX_CONSENSUS_TIME};
pub use linking::{ConsensusLinker, LinkerAnomalyCounts};
pub use ports::{ConsensusEngineApi, FreezeCheck, NoFreeze, RosterLookup};
pub use service::{ConsensusEngine, SharedConsensusEngine};
