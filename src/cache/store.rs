//! Cache Store Module
//!
//! Keyed payload storage with TTL expiry and LRU-bounded capacity.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, RecencyIndex};

// == Cache Store ==
/// In-process payload cache.
///
/// Expiry is checked on every read, so an entry past its deadline is never
/// returned even if the background sweep has not reached it yet.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    recency: RecencyIndex,
    stats: CacheStats,
    /// Maximum number of entries before LRU eviction kicks in
    max_entries: usize,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries (at least one).
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyIndex::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and its TTL.
    ///
    /// A new key arriving at capacity evicts the least recently used entry.
    /// Returns the evicted key, if any.
    pub fn set(&mut self, key: &str, value: Value, ttl: Option<Duration>) -> Option<String> {
        let mut evicted = None;

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.recency.evict_oldest() {
                self.entries.remove(&oldest);
                self.stats.record_eviction();
                evicted = Some(oldest);
            }
        }

        let entry = CacheEntry::new(value, Some(ttl.unwrap_or(self.default_ttl)));
        self.entries.insert(key.to_string(), entry);
        self.recency.touch(key);

        evicted
    }

    // == Get ==
    /// Returns the live payload for `key`.
    ///
    /// Counts a hit or a miss. An expired entry is dropped and counts as a
    /// miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(),
        };

        if expired {
            self.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.recency.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Recheck ==
    /// Second look at a key whose `get` just missed.
    ///
    /// If another task filled the entry meanwhile, the earlier miss is
    /// reclassified as a hit and recency is refreshed. Absence is not
    /// counted again.
    pub fn recheck(&mut self, key: &str) -> Option<Value> {
        let value = self.peek(key)?;
        self.stats.convert_miss_to_hit();
        self.recency.touch(key);
        Some(value)
    }

    // == Peek ==
    /// Reads a live payload without touching statistics or recency.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    // == Stats ==
    /// Snapshot of the counters with the current live entry count.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.entries = self.live_len();
        stats
    }

    // == Cleanup Expired ==
    /// Physically removes every expired entry, returning how many went.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live_len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.recency.remove(key);
    }
}
