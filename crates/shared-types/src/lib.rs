//! # Shared Types Crate
//!
//! Primitive types used across the hashgraph workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers and timestamps shared by the
//!   consensus engine, its collaborators and the test suite live here.
//! - **Plain values**: every type is `Copy` where possible and serializable
//!   with serde so snapshots can embed them directly.

pub mod entities;
pub mod rate_limiter;

pub use entities::*;
pub use rate_limiter::RateLimiter;
