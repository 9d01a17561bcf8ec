//! Consensus ordering of the events received in one round
//!
//! Events are sorted by median received time. Events sharing a median time
//! are ordered with Kahn's topological sort, the ready set being drained in
//! whitened hash order so every node picks the same total order.

use crate::graph::arena::{EventArena, EventIndex};
use crate::graph::linked_event::LinkedEvent;
use crate::hashgraph::voting::sees;
use shared_types::{Hash, Timestamp};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One event awaiting its consensus position.
#[derive(Clone, Debug)]
pub(crate) struct OrderingNode {
    pub(crate) index: EventIndex,
    pub(crate) median_time: Timestamp,
    pub(crate) whitened: Hash,
    pub(crate) parents: Vec<EventIndex>,
}

/// XOR of every judge hash, mixed into each event hash before tie-breaking.
pub(crate) fn judge_whitener<'a>(judge_hashes: impl IntoIterator<Item = &'a Hash>) -> Hash {
    let mut whitener = [0u8; 32];
    for hash in judge_hashes {
        for (w, h) in whitener.iter_mut().zip(hash) {
            *w ^= h;
        }
    }
    whitener
}

pub(crate) fn whiten(hash: &Hash, whitener: &Hash) -> Hash {
    let mut out = *hash;
    for (o, w) in out.iter_mut().zip(whitener) {
        *o ^= w;
    }
    out
}

/// Upper median over the judges of the time each judge's creator first
/// learned about `event`.
///
/// For a judge, that is the creation time of its earliest self ancestor
/// that still sees the event. A judge that cannot see the event through its
/// own last-seen chain contributes its own creation time.
pub(crate) fn median_received_time(
    arena: &EventArena,
    event: &LinkedEvent,
    event_index: EventIndex,
    judges: &[EventIndex],
) -> Option<Timestamp> {
    let mut times: Vec<Timestamp> = judges
        .iter()
        .filter_map(|judge| arena.get(*judge))
        .map(|judge| {
            let mut earliest = judge.time_created();
            let mut cursor = Some(judge);
            while let Some(current) = cursor {
                if !sees(arena, current, event_index, event) {
                    break;
                }
                earliest = current.time_created();
                cursor = current.self_parent().and_then(|p| arena.get(p));
            }
            earliest
        })
        .collect();

    if times.is_empty() {
        return None;
    }
    times.sort();
    Some(times[times.len() / 2])
}

/// Total order of one round's received events.
pub(crate) fn consensus_sort(mut nodes: Vec<OrderingNode>) -> Vec<EventIndex> {
    nodes.sort_by(|a, b| {
        a.median_time
            .cmp(&b.median_time)
            .then_with(|| a.whitened.cmp(&b.whitened))
    });

    let mut ordered = Vec::with_capacity(nodes.len());
    let mut start = 0;
    while start < nodes.len() {
        let median = nodes[start].median_time;
        let end = nodes[start..]
            .iter()
            .position(|n| n.median_time != median)
            .map_or(nodes.len(), |offset| start + offset);
        ordered.extend(kahns_by_whitened_hash(&nodes[start..end]));
        start = end;
    }
    ordered
}

/// Kahn's sort restricted to parent edges inside `group`.
fn kahns_by_whitened_hash(group: &[OrderingNode]) -> Vec<EventIndex> {
    let members: HashSet<EventIndex> = group.iter().map(|n| n.index).collect();
    let mut in_degree: HashMap<EventIndex, usize> = HashMap::with_capacity(group.len());
    let mut children: HashMap<EventIndex, Vec<EventIndex>> = HashMap::new();
    let mut priority: HashMap<EventIndex, Hash> = HashMap::with_capacity(group.len());

    for node in group {
        priority.insert(node.index, node.whitened);
        let mut degree = 0;
        for parent in node.parents.iter().filter(|p| members.contains(p)) {
            children.entry(*parent).or_default().push(node.index);
            degree += 1;
        }
        in_degree.insert(node.index, degree);
    }

    // ordered by (whitened hash, index) for determinism
    let mut ready: BTreeSet<(Hash, EventIndex)> = group
        .iter()
        .filter(|n| in_degree.get(&n.index) == Some(&0))
        .map(|n| (n.whitened, n.index))
        .collect();

    let mut ordered = Vec::with_capacity(group.len());
    while let Some(next) = ready.pop_first() {
        let (_, index) = next;
        ordered.push(index);

        let Some(kids) = children.get(&index) else {
            continue;
        };
        for child in kids {
            let Some(degree) = in_degree.get_mut(child) else {
                continue;
            };
            *degree = degree.saturating_sub(1);
            if *degree == 0 {
                if let Some(whitened) = priority.get(child) {
                    ready.insert((*whitened, *child));
                }
            }
        }
    }

    // parent links cannot form a cycle; keep the output total regardless
    if ordered.len() < group.len() {
        let placed: HashSet<EventIndex> = ordered.iter().copied().collect();
        ordered.extend(group.iter().map(|n| n.index).filter(|i| !placed.contains(i)));
    }
    ordered
}
