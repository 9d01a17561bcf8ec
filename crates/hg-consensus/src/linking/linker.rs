//! Consensus linker
//!
//! Resolves the parents of topologically ordered events against the live
//! (non-ancient) part of the graph. A parent that cannot be resolved safely
//! is left unlinked and the child is still linked.

use crate::domain::event::{BirthRound, EventDescriptor, PlatformEvent};
use crate::domain::window::EventWindow;
use crate::error::{ConsensusError, ConsensusResult};
use crate::graph::arena::{EventArena, EventIndex};
use crate::graph::linked_event::LinkedEvent;
use crate::graph::sequence_map::SequenceMap;
use crate::linking::logs::{LinkerAnomalyCounts, LinkerLogsAndMetrics};
use shared_types::Hash;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Links events to their parents.
///
/// A parent is not linked when it is ancient, unknown, has a birth round
/// different from the one the child claims, or (self parent only) was not
/// created strictly before the child. Only the first other parent is linked.
pub struct ConsensusLinker {
    window: EventWindow,
    /// Windowed by birth round; owns the eviction order
    parent_descriptor_map: SequenceMap<EventDescriptor, EventIndex>,
    /// Exact lookup by hash, kept in step with the sequence map
    parent_hash_map: HashMap<Hash, EventIndex>,
    logs: LinkerLogsAndMetrics,
    linked_event_count: u64,
}

impl ConsensusLinker {
    pub fn new(log_period: Duration) -> Self {
        let window = EventWindow::genesis();
        Self {
            window,
            parent_descriptor_map: SequenceMap::new(window.ancient_threshold(), |d| d.birth_round),
            parent_hash_map: HashMap::new(),
            logs: LinkerLogsAndMetrics::new(log_period),
            linked_event_count: 0,
        }
    }

    /// Link an event and store it in the arena.
    ///
    /// Returns `None` when the event is ancient or already linked.
    pub fn link_event(
        &mut self,
        arena: &mut EventArena,
        event: Arc<PlatformEvent>,
    ) -> Option<EventIndex> {
        if self.window.is_ancient(&*event) {
            trace!(event = %event, "[hg-consensus] Not linking ancient event");
            return None;
        }
        if self.parent_hash_map.contains_key(event.hash()) {
            debug!(event = %event, "[hg-consensus] Ignoring duplicate event");
            return None;
        }

        let self_parent = event
            .self_parent()
            .and_then(|parent| self.parent_to_link(arena, &event, parent));
        let other_parent = event
            .other_parents()
            .first()
            .and_then(|parent| self.parent_to_link(arena, &event, parent));

        let generation = 1 + [self_parent, other_parent]
            .into_iter()
            .flatten()
            .filter_map(|index| arena.get(index))
            .map(LinkedEvent::generation)
            .max()
            .unwrap_or(0);

        let descriptor = event.descriptor();
        let index = arena.insert(LinkedEvent::new(event, self_parent, other_parent, generation));
        self.parent_descriptor_map.put(descriptor, index);
        self.parent_hash_map.insert(descriptor.hash, index);
        self.linked_event_count += 1;

        Some(index)
    }

    /// Resolve one claimed parent, or decide it must not be linked.
    fn parent_to_link(
        &mut self,
        arena: &EventArena,
        child: &PlatformEvent,
        parent: &EventDescriptor,
    ) -> Option<EventIndex> {
        if self.window.is_ancient(parent) {
            return None;
        }

        let Some(candidate) = self
            .parent_hash_map
            .get(&parent.hash)
            .and_then(|index| arena.get(*index).map(|event| (*index, event)))
        else {
            self.logs.missing_parent(child, parent);
            return None;
        };
        let (index, candidate) = candidate;

        if candidate.birth_round() != parent.birth_round {
            self.logs
                .parent_birth_round_mismatch(child, parent, candidate.birth_round());
            return None;
        }

        // the creator does not consider other parents when choosing a creation time
        if parent.creator == child.creator() && candidate.time_created() >= child.time_created() {
            self.logs
                .self_parent_time_mismatch(child, parent, candidate.time_created());
            return None;
        }

        Some(index)
    }

    /// Move the window forward, freeing every event that became ancient.
    ///
    /// The released events are returned in birth round order for
    /// downstream accounting.
    pub fn set_event_window(
        &mut self,
        arena: &mut EventArena,
        window: EventWindow,
    ) -> ConsensusResult<Vec<LinkedEvent>> {
        if window.ancient_threshold() < self.window.ancient_threshold() {
            return Err(ConsensusError::EventWindowRegression {
                current: self.window.ancient_threshold(),
                proposed: window.ancient_threshold(),
            });
        }
        self.window = window;

        let mut evicted = Vec::new();
        let hash_map = &mut self.parent_hash_map;
        self.parent_descriptor_map
            .shift_window(window.ancient_threshold(), |descriptor, index| {
                hash_map.remove(&descriptor.hash);
                evicted.push(index);
            });

        if !evicted.is_empty() {
            trace!(
                evicted = evicted.len(),
                window = %window,
                "[hg-consensus] Released ancient events"
            );
        }
        Ok(arena.remove_all(evicted))
    }

    /// Forget every linked event and return to the genesis window.
    pub fn clear(&mut self, arena: &mut EventArena) {
        arena.clear();
        self.window = EventWindow::genesis();
        self.parent_descriptor_map
            .clear(self.window.ancient_threshold());
        self.parent_hash_map.clear();
    }

    pub fn event_window(&self) -> EventWindow {
        self.window
    }

    /// Number of currently linked events.
    pub fn len(&self) -> usize {
        self.parent_hash_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent_hash_map.is_empty()
    }

    /// Total events linked since construction.
    pub fn linked_event_count(&self) -> u64 {
        self.linked_event_count
    }

    pub fn anomaly_counts(&self) -> LinkerAnomalyCounts {
        self.logs.counts()
    }
}
