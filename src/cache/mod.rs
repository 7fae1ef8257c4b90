//! Cache Module
//!
//! In-memory payload cache with TTL expiration and LRU-bounded capacity.

mod entry;
mod lru;
mod stats;
mod store;


pub use entry::CacheEntry;
pub use lru::RecencyIndex;
pub use stats::CacheStats;
pub use store::CacheStore;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Cache handle shared between the fetcher, the sweeper and the handlers.
pub type SharedCache = Arc<RwLock<CacheStore>>;
