//! Freeze round controller
//!
//! Stops consensus at a single round boundary: the first decided round whose
//! consensus timestamp reaches the freeze time is kept and flagged, every
//! round decided after it in the same batch is dropped, and the controller
//! latches frozen.

use crate::domain::round::ConsensusRound;
use crate::metrics;
use crate::ports::outbound::FreezeCheck;
use parking_lot::RwLock;
use shared_types::Timestamp;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

pub struct FreezeRoundController<F: FreezeCheck> {
    freeze_check: Arc<F>,
    frozen: AtomicBool,
}

impl<F: FreezeCheck> FreezeRoundController<F> {
    pub fn new(freeze_check: Arc<F>) -> Self {
        Self {
            freeze_check,
            frozen: AtomicBool::new(false),
        }
    }

    /// Truncate a batch of freshly decided rounds at the freeze round.
    ///
    /// Rounds cut off here are never delivered again.
    pub fn filter_and_modify(&self, mut rounds: Vec<ConsensusRound>) -> Vec<ConsensusRound> {
        if self.is_frozen() {
            return Vec::new();
        }
        let Some(freeze_time) = self.freeze_check.freeze_time() else {
            return rounds;
        };
        let Some(position) = rounds
            .iter()
            .position(|round| round.consensus_timestamp >= freeze_time)
        else {
            return rounds;
        };

        let dropped = rounds.len() - position - 1;
        rounds.truncate(position + 1);
        let freeze_round = &mut rounds[position];
        freeze_round.freeze_round = true;

        self.frozen.store(true, Ordering::Release);
        metrics::set_frozen(true);
        warn!(
            round = freeze_round.round_num,
            consensus_timestamp = %freeze_round.consensus_timestamp,
            freeze_time = %freeze_time,
            dropped_rounds = dropped,
            "[hg-consensus] Freeze round reached, consensus halted"
        );
        rounds
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }
}

/// Settable freeze time shared between the platform and the engine.
#[derive(Debug, Default)]
pub struct FreezeCheckHolder {
    freeze_time: RwLock<Option<Timestamp>>,
}

impl FreezeCheckHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_freeze_time(&self, freeze_time: Option<Timestamp>) {
        *self.freeze_time.write() = freeze_time;
    }
}

impl FreezeCheck for FreezeCheckHolder {
    fn freeze_time(&self) -> Option<Timestamp> {
        *self.freeze_time.read()
    }
}
