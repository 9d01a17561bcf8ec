//! Domain layer for the consensus engine.
//!
//! Pure value types shared by every stage of the pipeline. Nothing here
//! holds graph state.

pub mod event;
pub mod invariants;
pub mod output;
pub mod roster;
pub mod round;
pub mod status;
pub mod window;

pub use event::{BirthRound, EventDescriptor, PlatformEvent};
pub use invariants::InvariantViolation;
pub use output::{ConsensusEngineOutput, OutputCollector};
pub use roster::{Roster, RosterEntry, RosterHistory};
pub use round::{ConsensusEvent, ConsensusRound, ConsensusSnapshot, JudgeId, MinimumJudgeInfo};
pub use status::PlatformStatus;
pub use window::{EventWindow, ROUND_FIRST, ROUND_GENESIS};
