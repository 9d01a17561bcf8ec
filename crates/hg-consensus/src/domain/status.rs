//! Platform status as reported by the surrounding node

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of the node hosting the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformStatus {
    #[default]
    StartingUp,
    /// Events are read back from the local event stream
    ReplayingEvents,
    Observing,
    Checking,
    Active,
    Behind,
    Freezing,
    FreezeComplete,
    ReconnectComplete,
    CatastrophicFailure,
}

impl PlatformStatus {
    /// Events are historical, wall-clock derived metrics are meaningless.
    pub fn is_replaying(&self) -> bool {
        matches!(self, PlatformStatus::ReplayingEvents)
    }
}

impl fmt::Display for PlatformStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformStatus::StartingUp => "STARTING_UP",
            PlatformStatus::ReplayingEvents => "REPLAYING_EVENTS",
            PlatformStatus::Observing => "OBSERVING",
            PlatformStatus::Checking => "CHECKING",
            PlatformStatus::Active => "ACTIVE",
            PlatformStatus::Behind => "BEHIND",
            PlatformStatus::Freezing => "FREEZING",
            PlatformStatus::FreezeComplete => "FREEZE_COMPLETE",
            PlatformStatus::ReconnectComplete => "RECONNECT_COMPLETE",
            PlatformStatus::CatastrophicFailure => "CATASTROPHIC_FAILURE",
        };
        f.write_str(name)
    }
}
