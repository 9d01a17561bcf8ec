//! # Core Domain Entities
//!
//! Identifiers shared by every participant of the gossip network.
//!
//! ## Clusters
//!
//! - **Content addressing**: `Hash`, `HashDisplay`
//! - **Membership**: `NodeId`
//! - **Time**: `Timestamp`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// CLUSTER A: CONTENT ADDRESSING
// =============================================================================

/// A 32-byte content hash (SHA-256).
pub type Hash = [u8; 32];

/// Short hexadecimal rendering of a hash for log fields.
///
/// Prints the first six bytes, enough to tell events apart in a log stream.
#[derive(Clone, Copy)]
pub struct HashDisplay<'a>(pub &'a Hash);

impl fmt::Display for HashDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..6] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HashDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// =============================================================================
// CLUSTER B: MEMBERSHIP
// =============================================================================

/// Stable numeric identifier of a network participant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Raw numeric id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// =============================================================================
// CLUSTER C: TIME
// =============================================================================

/// Wall-clock instant in nanoseconds since the Unix epoch.
///
/// Creation times are claimed by event creators and consensus timestamps are
/// derived from them, so arithmetic saturates instead of wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Timestamp = Timestamp(0);

    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Current wall-clock time. Falls back to the epoch on a clock set before 1970.
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| Self(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)))
            .unwrap_or(Self::EPOCH)
    }

    #[must_use]
    pub const fn plus_nanos(&self, nanos: u64) -> Self {
        Self(self.0.saturating_add(nanos))
    }

    #[must_use]
    pub const fn minus_nanos(&self, nanos: u64) -> Self {
        Self(self.0.saturating_sub(nanos))
    }

    /// Nanoseconds from `earlier` to `self`, zero if `earlier` is later.
    pub const fn nanos_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:09}",
            self.0 / 1_000_000_000,
            self.0 % 1_000_000_000
        )
    }
}
