//! Map whose keys carry a sequence number, with a sliding lower bound
//!
//! Entries below the lowest allowed sequence number are rejected on insert
//! and released in bulk when the window shifts.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Bounded-window map keyed by `K`, windowed by `sequence(K)`.
pub struct SequenceMap<K, V> {
    entries: HashMap<K, V>,
    by_sequence: BTreeMap<u64, Vec<K>>,
    lowest_allowed: u64,
    sequence: fn(&K) -> u64,
}

impl<K, V> SequenceMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(lowest_allowed: u64, sequence: fn(&K) -> u64) -> Self {
        Self {
            entries: HashMap::new(),
            by_sequence: BTreeMap::new(),
            lowest_allowed,
            sequence,
        }
    }

    pub fn lowest_allowed(&self) -> u64 {
        self.lowest_allowed
    }

    /// Insert an entry. Returns `false` and drops the value when the key is
    /// below the window.
    pub fn put(&mut self, key: K, value: V) -> bool {
        let seq = (self.sequence)(&key);
        if seq < self.lowest_allowed {
            return false;
        }
        if self.entries.insert(key.clone(), value).is_none() {
            self.by_sequence.entry(seq).or_default().push(key);
        }
        true
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        let seq = (self.sequence)(key);
        if let Some(keys) = self.by_sequence.get_mut(&seq) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                self.by_sequence.remove(&seq);
            }
        }
        Some(value)
    }

    /// Raise the lower bound and hand every entry that fell below it to
    /// `on_removed`, lowest sequence first, insertion order within one
    /// sequence number. A lower bound below the current one is ignored.
    pub fn shift_window(&mut self, lowest_allowed: u64, mut on_removed: impl FnMut(K, V)) {
        if lowest_allowed <= self.lowest_allowed {
            return;
        }
        self.lowest_allowed = lowest_allowed;

        let retained = self.by_sequence.split_off(&lowest_allowed);
        let expired = std::mem::replace(&mut self.by_sequence, retained);
        for key in expired.into_values().flatten() {
            if let Some(value) = self.entries.remove(&key) {
                on_removed(key, value);
            }
        }
    }

    /// Drop every entry and reset the lower bound.
    pub fn clear(&mut self, lowest_allowed: u64) {
        self.entries.clear();
        self.by_sequence.clear();
        self.lowest_allowed = lowest_allowed;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
