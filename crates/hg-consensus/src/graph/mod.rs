//! In-memory causal graph: slot arena, linked nodes and windowed maps

pub mod arena;
pub mod linked_event;
pub mod sequence_map;

pub use arena::{EventArena, EventIndex};
pub use linked_event::LinkedEvent;
pub use sequence_map::SequenceMap;
