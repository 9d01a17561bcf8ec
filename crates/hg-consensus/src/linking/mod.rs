//! Parent resolution for incoming events

pub mod linker;
pub mod logs;

pub use linker::ConsensusLinker;
pub use logs::{LinkerAnomalyCounts, LinkerLogsAndMetrics};
