//! Slot arena owning every linked event
//!
//! Parent links are [`EventIndex`] values instead of references. A slot is
//! reused after its event is freed; the slot generation makes stale indices
//! resolve to `None` rather than to the new occupant.

use crate::graph::linked_event::LinkedEvent;
use std::fmt;

/// Handle to an event stored in an [`EventArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventIndex {
    slot: u32,
    generation: u32,
}

impl fmt::Display for EventIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.slot, self.generation)
    }
}

struct Slot {
    generation: u32,
    event: Option<LinkedEvent>,
}

/// Growable arena with a free list and bulk release.
#[derive(Default)]
pub struct EventArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EventArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: LinkedEvent) -> EventIndex {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.event = Some(event);
            return EventIndex {
                slot,
                generation: entry.generation,
            };
        }

        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            event: Some(event),
        });
        EventIndex {
            slot,
            generation: 0,
        }
    }

    pub fn get(&self, index: EventIndex) -> Option<&LinkedEvent> {
        self.slots
            .get(index.slot as usize)
            .filter(|s| s.generation == index.generation)
            .and_then(|s| s.event.as_ref())
    }

    pub fn get_mut(&mut self, index: EventIndex) -> Option<&mut LinkedEvent> {
        self.slots
            .get_mut(index.slot as usize)
            .filter(|s| s.generation == index.generation)
            .and_then(|s| s.event.as_mut())
    }

    pub fn contains(&self, index: EventIndex) -> bool {
        self.get(index).is_some()
    }

    /// Free a slot. Indices to it stop resolving.
    pub fn remove(&mut self, index: EventIndex) -> Option<LinkedEvent> {
        let entry = self.slots.get_mut(index.slot as usize)?;
        if entry.generation != index.generation {
            return None;
        }
        let event = entry.event.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(index.slot);
        self.live -= 1;
        Some(event)
    }

    /// Free many slots at once, returning the released events in input order.
    pub fn remove_all(&mut self, indices: impl IntoIterator<Item = EventIndex>) -> Vec<LinkedEvent> {
        let indices = indices.into_iter();
        let mut released = Vec::with_capacity(indices.size_hint().0);
        for index in indices {
            if let Some(event) = self.remove(index) {
                released.push(event);
            }
        }
        released
    }

    /// Drop every event. All outstanding indices stop resolving.
    pub fn clear(&mut self) {
        self.free.clear();
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if entry.event.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
            }
            self.free.push(slot as u32);
        }
        // reuse low slots first
        self.free.reverse();
        self.live = 0;
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
