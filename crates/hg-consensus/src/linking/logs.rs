//! Rate-limited diagnostics for parent resolution failures

use crate::domain::event::{EventDescriptor, PlatformEvent};
use crate::metrics;
use shared_types::{RateLimiter, Timestamp};
use std::time::Duration;
use tracing::{error, warn};

/// Number of anomalies seen per failure mode since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkerAnomalyCounts {
    pub missing_parents: u64,
    pub birth_round_mismatches: u64,
    pub time_created_mismatches: u64,
}

impl LinkerAnomalyCounts {
    pub fn total(&self) -> u64 {
        self.missing_parents + self.birth_round_mismatches + self.time_created_mismatches
    }
}

/// Logs and counts linker anomalies, one log line per period per failure mode.
pub struct LinkerLogsAndMetrics {
    missing_parent_logger: RateLimiter,
    birth_round_mismatch_logger: RateLimiter,
    time_created_mismatch_logger: RateLimiter,
    counts: LinkerAnomalyCounts,
}

impl LinkerLogsAndMetrics {
    pub fn new(log_period: Duration) -> Self {
        Self {
            missing_parent_logger: RateLimiter::new(log_period),
            birth_round_mismatch_logger: RateLimiter::new(log_period),
            time_created_mismatch_logger: RateLimiter::new(log_period),
            counts: LinkerAnomalyCounts::default(),
        }
    }

    /// A non-ancient parent is unknown. Gossip delivers parents first, so
    /// this points at a bug or a malicious peer.
    pub fn missing_parent(&mut self, child: &PlatformEvent, parent: &EventDescriptor) {
        self.counts.missing_parents += 1;
        metrics::record_linker_anomaly("missing_parent");
        if let Some(suppressed) = self.missing_parent_logger.try_acquire() {
            error!(
                child = %child,
                parent = %parent,
                suppressed,
                "[hg-consensus] Child has a missing non-ancient parent"
            );
        }
    }

    /// The parent exists but the child claims a different birth round for it.
    pub fn parent_birth_round_mismatch(
        &mut self,
        child: &PlatformEvent,
        claimed: &EventDescriptor,
        actual_birth_round: u64,
    ) {
        self.counts.birth_round_mismatches += 1;
        metrics::record_linker_anomaly("parent_birth_round_mismatch");
        if let Some(suppressed) = self.birth_round_mismatch_logger.try_acquire() {
            warn!(
                child = %child,
                parent = %claimed,
                claimed_birth_round = claimed.birth_round,
                actual_birth_round,
                suppressed,
                "[hg-consensus] Parent birth round mismatch, parent not linked"
            );
        }
    }

    /// The self parent was not created strictly before the child.
    pub fn self_parent_time_mismatch(
        &mut self,
        child: &PlatformEvent,
        parent: &EventDescriptor,
        parent_time: Timestamp,
    ) {
        self.counts.time_created_mismatches += 1;
        metrics::record_linker_anomaly("time_created_mismatch");
        if let Some(suppressed) = self.time_created_mismatch_logger.try_acquire() {
            error!(
                child = %child,
                child_time = %child.time_created(),
                parent = %parent,
                parent_time = %parent_time,
                suppressed,
                "[hg-consensus] Self parent not created before child, parent not linked"
            );
        }
    }

    pub fn counts(&self) -> LinkerAnomalyCounts {
        self.counts
    }
}
