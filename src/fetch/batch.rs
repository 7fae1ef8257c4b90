//! Batch Aggregator
//!
//! Fans out one fetch per resource, joins on all of them and assembles the
//! payloads in request order.

use std::time::Duration;

use futures::future::try_join_all;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{FetchResult, ResourceFetcher};
use crate::error::{Result, ServiceError};
use crate::upstream::Resource;

// == Batch Result ==
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// One result per requested resource, in request order
    pub results: Vec<FetchResult>,
    /// Wall-clock time for the whole fan-out
    pub duration: Duration,
}

impl BatchResult {
    pub fn total_requests(&self) -> usize {
        self.results.len()
    }

    pub fn cache_hits(&self) -> usize {
        self.results.iter().filter(|r| r.cache_hit()).count()
    }

    /// Payloads keyed by resource name, serialized in request order.
    pub fn payloads(&self) -> OrderedPayloads<'_> {
        OrderedPayloads(&self.results)
    }
}

/// Serializes as a JSON object whose keys keep request order.
#[derive(Debug)]
pub struct OrderedPayloads<'a>(&'a [FetchResult]);

impl Serialize for OrderedPayloads<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for result in self.0 {
            map.serialize_entry(result.resource.as_str(), &result.payload)?;
        }
        map.end()
    }
}

// == Fetch All ==
/// Fetches every resource concurrently.
///
/// Total time tracks the slowest member, not the sum. The first member
/// failure fails the whole batch and no partial result is returned.
pub async fn fetch_all(fetcher: &ResourceFetcher, resources: &[Resource]) -> Result<BatchResult> {
    let started = Instant::now();

    let results = try_join_all(resources.iter().map(|&resource| fetcher.fetch(resource)))
        .await
        .map_err(|err| {
            warn!(error = %err, "batch member failed, discarding batch");
            ServiceError::Aggregate(Box::new(err))
        })?;

    let batch = BatchResult {
        results,
        duration: started.elapsed(),
    };
    debug!(
        requests = batch.total_requests(),
        cache_hits = batch.cache_hits(),
        elapsed = ?batch.duration,
        "batch complete"
    );

    Ok(batch)
}
