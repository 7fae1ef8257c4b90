//! Fetch Module
//!
//! Cache-aside resource reads and the concurrent batch aggregator.

mod batch;
mod fetcher;

pub use batch::{fetch_all, BatchResult, OrderedPayloads};
pub use fetcher::{call_upstream, FetchResult, FetchSource, ResourceFetcher};
