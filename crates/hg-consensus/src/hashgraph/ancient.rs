//! Minimum judge birth rounds of the most recent decided rounds
//!
//! The stored list drives both thresholds of the event window.

use crate::domain::round::{ancient_threshold_of, expired_threshold_of, MinimumJudgeInfo};
use crate::domain::window::EventWindow;

#[derive(Clone, Debug)]
pub(crate) struct AncientCalculator {
    rounds_non_ancient: u64,
    rounds_expired: u64,
    /// Ascending by round
    minimum_judge_info: Vec<MinimumJudgeInfo>,
}

impl AncientCalculator {
    pub(crate) fn new(rounds_non_ancient: u64, rounds_expired: u64) -> Self {
        Self {
            rounds_non_ancient,
            rounds_expired,
            minimum_judge_info: Vec::new(),
        }
    }

    /// Record the judges' minimum birth round for a freshly decided round and
    /// drop entries that fell out of the expired range.
    pub(crate) fn round_decided(&mut self, round: u64, minimum_judge_birth_round: u64) {
        self.minimum_judge_info
            .push(MinimumJudgeInfo::new(round, minimum_judge_birth_round));
        let oldest_kept = (round + 1).saturating_sub(self.rounds_expired);
        self.minimum_judge_info.retain(|info| info.round >= oldest_kept);
    }

    pub(crate) fn restore(&mut self, list: &[MinimumJudgeInfo]) {
        self.minimum_judge_info = list.to_vec();
    }

    pub(crate) fn clear(&mut self) {
        self.minimum_judge_info.clear();
    }

    pub(crate) fn list(&self) -> &[MinimumJudgeInfo] {
        &self.minimum_judge_info
    }

    /// Window in force once `latest_round` is decided.
    pub(crate) fn event_window(&self, latest_round: u64) -> EventWindow {
        EventWindow::new(
            latest_round,
            ancient_threshold_of(&self.minimum_judge_info, latest_round, self.rounds_non_ancient),
            expired_threshold_of(&self.minimum_judge_info),
        )
    }
}
