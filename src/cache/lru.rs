//! LRU Recency Index
//!
//! Orders keys by last access so the store can reclaim the least recently
//! used entry once it reaches capacity.

use std::collections::{BTreeMap, HashMap};

// == Recency Index ==
/// Access-ordered key index.
///
/// Every touch stamps the key with a fresh tick. `by_tick` is ordered
/// oldest first, so eviction pops its first element.
#[derive(Debug, Default)]
pub struct RecencyIndex {
    ticks: HashMap<String, u64>,
    by_tick: BTreeMap<u64, String>,
    next_tick: u64,
}

impl RecencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if new.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(old) => {
                self.by_tick.remove(&*old);
                *old = tick;
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
            }
        }
        self.by_tick.insert(tick, key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
