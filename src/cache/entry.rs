//! Cache Entry Module
//!
//! A stored payload together with its expiry deadline.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

// == Cache Entry ==
/// A single cached payload.
///
/// Deadlines use the tokio clock so that expiry follows a paused test clock.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Expiry deadline, None = never expires
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    ///
    /// A TTL too large to represent as a deadline never expires.
    pub fn new(value: Value, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = CacheEntry::new(json!({"id": 1}), None);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_with_ttl() {
        let entry = CacheEntry::new(json!("v"), Some(Duration::from_secs(60)));

        assert!(!entry.is_expired());
        assert!(entry.expires_at.is_some());
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let entry = CacheEntry::new(json!("v"), Some(Duration::from_secs(u64::MAX)));

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let entry = CacheEntry::new(json!("v"), Some(Duration::from_millis(500)));

        tokio::time::advance(Duration::from_millis(499)).await;
        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry {
            value: json!(null),
            expires_at: Some(now),
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at its deadline");
    }
}
