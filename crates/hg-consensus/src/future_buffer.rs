//! Future event buffer
//!
//! Holds events whose birth round is beyond the round currently pending
//! consensus and releases them once the window catches up.

use crate::domain::event::{BirthRound, EventDescriptor, PlatformEvent};
use crate::domain::window::EventWindow;
use crate::graph::sequence_map::SequenceMap;
use crate::metrics;
use std::sync::Arc;
use tracing::trace;

/// Buffer for events from the future.
pub struct FutureEventBuffer {
    window: EventWindow,
    /// Lower bound is always `pending_consensus_round + 1`
    future_events: SequenceMap<EventDescriptor, Arc<PlatformEvent>>,
}

impl Default for FutureEventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FutureEventBuffer {
    pub fn new() -> Self {
        let window = EventWindow::genesis();
        Self {
            window,
            future_events: SequenceMap::new(window.pending_consensus_round() + 1, |d| {
                d.birth_round
            }),
        }
    }

    /// Pass the event through if it can be processed now, buffer it if its
    /// birth round is in the future, drop it if it is ancient.
    pub fn add_event(&mut self, event: Arc<PlatformEvent>) -> Option<Arc<PlatformEvent>> {
        if self.window.is_ancient(&*event) {
            return None;
        }
        if event.birth_round() <= self.window.pending_consensus_round() {
            return Some(event);
        }

        trace!(
            event = %event,
            pending_round = self.window.pending_consensus_round(),
            "[hg-consensus] Buffering future event"
        );
        self.future_events.put(event.descriptor(), event);
        metrics::set_future_events_buffered(self.future_events.len());
        None
    }

    /// Adopt a new window and release every buffered event that is no longer
    /// in the future, ascending birth round then arrival order.
    pub fn update_event_window(&mut self, window: EventWindow) -> Vec<Arc<PlatformEvent>> {
        self.window = window;

        let mut released = Vec::new();
        self.future_events
            .shift_window(window.pending_consensus_round() + 1, |_, event| {
                if !window.is_ancient(&*event) {
                    released.push(event);
                }
            });
        metrics::set_future_events_buffered(self.future_events.len());
        released
    }

    /// Drop all buffered events and return to the genesis window.
    pub fn clear(&mut self) {
        self.window = EventWindow::genesis();
        self.future_events
            .clear(self.window.pending_consensus_round() + 1);
        metrics::set_future_events_buffered(0);
    }

    pub fn event_window(&self) -> EventWindow {
        self.window
    }

    pub fn len(&self) -> usize {
        self.future_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.future_events.is_empty()
    }
}
