//! Cache Statistics Module
//!
//! Hit, miss, eviction and expiration counters for the cache store.

use serde::ser::{Serialize, SerializeStruct, Serializer};

// == Cache Stats ==
/// Counter snapshot. Serializes with a derived `hitRate` field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Reads answered from a live entry
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries reclaimed to stay within capacity
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Live (unexpired) entries at snapshot time
    pub entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Reclassifies an already counted miss as a hit.
    pub fn convert_miss_to_hit(&mut self) {
        self.misses = self.misses.saturating_sub(1);
        self.hits += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

impl Serialize for CacheStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CacheStats", 6)?;
        state.serialize_field("hits", &self.hits)?;
        state.serialize_field("misses", &self.misses)?;
        state.serialize_field("evictions", &self.evictions)?;
        state.serialize_field("expirations", &self.expirations)?;
        state.serialize_field("entries", &self.entries)?;
        state.serialize_field("hitRate", &self.hit_rate())?;
        state.end()
    }
}
