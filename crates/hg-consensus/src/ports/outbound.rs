//! Outbound (Driven) ports for the consensus engine.
//!
//! These traits define what the engine needs from the platform around it:
//! the roster in force for a round, and the freeze boundary.

use crate::domain::roster::{Roster, RosterHistory};
use shared_types::Timestamp;
use std::sync::Arc;

/// Roster history lookup.
///
/// Voting on a witness must use the roster active at the witness' round,
/// never a later one.
pub trait RosterLookup: Send + Sync {
    /// Roster in force for `round`.
    fn roster_for_round(&self, round: u64) -> Arc<Roster>;
}

impl RosterLookup for RosterHistory {
    fn roster_for_round(&self, round: u64) -> Arc<Roster> {
        Arc::clone(self.lookup(round))
    }
}

impl<T: RosterLookup + ?Sized> RosterLookup for Arc<T> {
    fn roster_for_round(&self, round: u64) -> Arc<Roster> {
        (**self).roster_for_round(round)
    }
}

/// Source of the freeze boundary.
pub trait FreezeCheck: Send + Sync {
    /// Consensus time at which the network freezes, if one is scheduled.
    fn freeze_time(&self) -> Option<Timestamp>;
}

/// Freeze check for networks that never freeze.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFreeze;

impl FreezeCheck for NoFreeze {
    fn freeze_time(&self) -> Option<Timestamp> {
        None
    }
}

/// Mock freeze check with a fixed boundary.
#[cfg(test)]
pub struct MockFreezeCheck {
    freeze_time: Option<Timestamp>,
}

#[cfg(test)]
impl MockFreezeCheck {
    pub fn at(freeze_time: Timestamp) -> Self {
        Self {
            freeze_time: Some(freeze_time),
        }
    }
}

#[cfg(test)]
impl FreezeCheck for MockFreezeCheck {
    fn freeze_time(&self) -> Option<Timestamp> {
        self.freeze_time
    }
}
