//! # Inbound Port - ConsensusEngineApi
//!
//! Primary driving port of the consensus engine. Gossip, event-stream replay
//! and reconnect all feed events through it.
//!
//! ## Call pattern
//!
//! | Method | Caller |
//! |--------|--------|
//! | `add_event` | Event intake after validation and deduplication |
//! | `out_of_band_snapshot_update` | Reconnect, restart from saved state |
//! | `update_platform_status` | Platform status manager |

use crate::domain::output::ConsensusEngineOutput;
use crate::domain::round::ConsensusSnapshot;
use crate::domain::status::PlatformStatus;
use crate::domain::event::PlatformEvent;
use crate::error::ConsensusResult;
use std::sync::Arc;

/// Primary API of the consensus engine.
///
/// # Example
///
/// ```rust,ignore
/// use hg_consensus::ports::ConsensusEngineApi;
///
/// fn intake(engine: &mut impl ConsensusEngineApi, event: Arc<PlatformEvent>) {
///     let output = engine.add_event(event)?;
///     for round in output.consensus_rounds {
///         handle(round);
///     }
/// }
/// ```
pub trait ConsensusEngineApi: Send {
    /// Record the status of the hosting platform. Only replay changes
    /// engine behaviour: latency metrics are skipped while replaying.
    fn update_platform_status(&mut self, status: PlatformStatus);

    /// Add a validated, deduplicated event.
    ///
    /// Events older than the event window are dropped, events from the
    /// future are buffered. Returns everything the event made observable.
    /// Once frozen, always returns an empty output.
    fn add_event(&mut self, event: Arc<PlatformEvent>) -> ConsensusResult<ConsensusEngineOutput>;

    /// Replace all state with the given snapshot.
    ///
    /// # Errors
    /// - `InvalidSnapshot`: snapshot content is inconsistent
    /// - `SnapshotRegression`: snapshot is older than the current state
    fn out_of_band_snapshot_update(&mut self, snapshot: &ConsensusSnapshot) -> ConsensusResult<()>;

    /// A round at or after the freeze time has been decided.
    fn is_frozen(&self) -> bool;

    /// A snapshot was loaded and the judges of its round have not all
    /// arrived yet.
    fn waiting_for_init_judges(&self) -> bool;
}
