//! # Hashgraph Consensus Test Suite
//!
//! Multi-node simulations driving the consensus engine end to end.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/
//! │   ├── fixtures.rs       # Engine and simulation helpers
//! │   ├── pipeline.rs       # Full pipeline scenarios
//! │   ├── anomalies.rs      # Malformed and out of window events
//! │   ├── determinism.rs    # Arrival order and restart determinism
//! │   ├── freeze.rs         # Freeze round handling
//! │   ├── properties.rs     # Randomised output guarantees
//! │   └── telemetry.rs      # Metrics exposition
//! benches/
//! └── consensus_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p hg-tests
//!
//! # By category
//! cargo test -p hg-tests integration::determinism::
//!
//! # Benchmarks
//! cargo bench -p hg-tests
//! ```

pub mod integration;
