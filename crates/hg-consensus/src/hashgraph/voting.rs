//! Seeing and strongly seeing
//!
//! Both relations are answered from the per-creator `last_see` table each
//! event carries, so no query walks the whole ancestry.

use crate::domain::roster::Roster;
use crate::graph::arena::{EventArena, EventIndex};
use crate::graph::linked_event::{LinkedEvent, SeenEvent};
use shared_types::NodeId;
use std::collections::BTreeMap;

/// Latest event per creator among the ancestors of a new event, itself
/// included.
pub(crate) fn compute_last_see(
    arena: &EventArena,
    event: &LinkedEvent,
    index: EventIndex,
) -> BTreeMap<NodeId, SeenEvent> {
    let mut last_see: BTreeMap<NodeId, SeenEvent> = BTreeMap::new();
    for parent in event.parents().filter_map(|p| arena.get(p)) {
        for (creator, seen) in &parent.last_see {
            match last_see.get(creator) {
                Some(current) if !seen.supersedes(current) => {}
                _ => {
                    last_see.insert(*creator, *seen);
                }
            }
        }
    }
    last_see.insert(event.creator(), event.seen_self(index));
    last_see
}

/// `y` sees `w`: the latest event by `w`'s creator known to `y` descends
/// from `w` through self parents.
pub(crate) fn sees(
    arena: &EventArena,
    y: &LinkedEvent,
    w_index: EventIndex,
    w: &LinkedEvent,
) -> bool {
    let Some(seen) = y.last_see.get(&w.creator()) else {
        return false;
    };
    let mut cursor = seen.index;
    loop {
        if cursor == w_index {
            return true;
        }
        let Some(current) = arena.get(cursor) else {
            return false;
        };
        if current.time_created() <= w.time_created() {
            return false;
        }
        match current.self_parent() {
            Some(parent) => cursor = parent,
            None => return false,
        }
    }
}

/// `x` strongly sees `w`: creators holding a supermajority of `roster` each
/// have an event that `x` sees and that sees `w`.
pub(crate) fn strongly_sees(
    arena: &EventArena,
    x: &LinkedEvent,
    w_index: EventIndex,
    w: &LinkedEvent,
    roster: &Roster,
) -> bool {
    let mut weight: u64 = 0;
    for (creator, seen) in &x.last_see {
        let creator_weight = roster.weight(*creator);
        if creator_weight == 0 {
            continue;
        }
        let Some(intermediate) = arena.get(seen.index) else {
            continue;
        };
        if sees(arena, intermediate, w_index, w) {
            weight = weight.saturating_add(creator_weight);
            if roster.is_supermajority(weight) {
                return true;
            }
        }
    }
    false
}

/// Witnesses from `candidates` strongly seen by `x`, first event per creator
/// in candidate order.
pub(crate) fn strongly_seen_by(
    arena: &EventArena,
    x: &LinkedEvent,
    candidates: &[EventIndex],
    roster: &Roster,
) -> Vec<EventIndex> {
    let mut creators = Vec::new();
    let mut seen = Vec::new();
    for index in candidates {
        let Some(w) = arena.get(*index) else {
            continue;
        };
        if creators.contains(&w.creator()) {
            continue;
        }
        if strongly_sees(arena, x, *index, w, roster) {
            creators.push(w.creator());
            seen.push(*index);
        }
    }
    seen
}

/// Summed roster weight of the creators of `events`.
pub(crate) fn creator_weight(arena: &EventArena, events: &[EventIndex], roster: &Roster) -> u64 {
    events
        .iter()
        .filter_map(|index| arena.get(*index))
        .map(|event| roster.weight(event.creator()))
        .fold(0u64, u64::saturating_add)
}
