//! Resource Fetcher
//!
//! Cache-aside reads with single-flight upstream loads.
//!
//! A miss either starts the upstream call for its resource or joins the one
//! already running. The running call writes the cache before it retires its
//! in-flight marker, and a miss re-checks the cache while holding the
//! in-flight lock, so a resource never has two upstream calls in flight.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::SharedCache;
use crate::error::{Result, ServiceError};
use crate::upstream::{Resource, Upstream};

type InFlightLoad = Shared<BoxFuture<'static, Result<Value>>>;
type InFlightMap = Arc<Mutex<HashMap<Resource, InFlightLoad>>>;

// == Fetch Source ==
/// Where a fetched payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Cache,
    Origin,
}

// == Fetch Result ==
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub resource: Resource,
    pub payload: Value,
    pub source: FetchSource,
    /// Time spent inside `fetch`; for cache hits, only the lookup
    pub duration: Duration,
}

impl FetchResult {
    pub fn cache_hit(&self) -> bool {
        self.source == FetchSource::Cache
    }
}

enum Lookup {
    Cached(Value),
    Pending(InFlightLoad),
}

// == Resource Fetcher ==
pub struct ResourceFetcher {
    cache: SharedCache,
    upstream: Arc<dyn Upstream>,
    in_flight: InFlightMap,
    /// Overrides the store's default TTL when set
    entry_ttl: Option<Duration>,
    timeout: Duration,
}

impl fmt::Debug for ResourceFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceFetcher")
            .field("entry_ttl", &self.entry_ttl)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ResourceFetcher {
    /// Creates a fetcher whose upstream calls are bounded by `timeout`.
    pub fn new(cache: SharedCache, upstream: Arc<dyn Upstream>, timeout: Duration) -> Self {
        Self {
            cache,
            upstream,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            entry_ttl: None,
            timeout,
        }
    }

    pub fn with_entry_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = Some(ttl);
        self
    }

    // == Fetch ==
    /// Returns the payload for `resource`, loading it on a cache miss.
    ///
    /// Upstream failures and timeouts are returned as-is; nothing is
    /// cached for them and the next call retries.
    pub async fn fetch(&self, resource: Resource) -> Result<FetchResult> {
        let started = Instant::now();

        let cached = self.cache.write().await.get(resource.as_str());
        if let Some(payload) = cached {
            debug!(%resource, "cache hit");
            return Ok(FetchResult {
                resource,
                payload,
                source: FetchSource::Cache,
                duration: started.elapsed(),
            });
        }

        let (source, payload) = match self.join_or_start(resource).await {
            Lookup::Cached(payload) => (FetchSource::Cache, payload),
            Lookup::Pending(load) => (FetchSource::Origin, load.await?),
        };

        Ok(FetchResult {
            resource,
            payload,
            source,
            duration: started.elapsed(),
        })
    }

    async fn join_or_start(&self, resource: Resource) -> Lookup {
        let mut in_flight = self.in_flight.lock().await;

        if let Some(load) = in_flight.get(&resource) {
            debug!(%resource, "joining in-flight upstream call");
            return Lookup::Pending(load.clone());
        }

        // A load may have finished between our miss and taking the lock.
        if let Some(payload) = self.cache.write().await.recheck(resource.as_str()) {
            return Lookup::Cached(payload);
        }

        let load = self.start_load(resource);
        in_flight.insert(resource, load.clone());
        Lookup::Pending(load)
    }

    fn start_load(&self, resource: Resource) -> InFlightLoad {
        let cache = Arc::clone(&self.cache);
        let upstream = Arc::clone(&self.upstream);
        let in_flight = Arc::clone(&self.in_flight);
        let ttl = self.entry_ttl;
        let timeout = self.timeout;

        // Spawned so the load finishes and retires its marker even if every
        // waiter goes away.
        let task = tokio::spawn(async move {
            let started = Instant::now();
            let load = async {
                let payload = call_upstream(upstream.as_ref(), resource, timeout).await?;
                let evicted = cache
                    .write()
                    .await
                    .set(resource.as_str(), payload.clone(), ttl);
                if let Some(key) = evicted {
                    debug!(%resource, evicted = %key, "cache at capacity, evicted LRU entry");
                }
                info!(%resource, elapsed = ?started.elapsed(), "loaded from upstream");
                Ok::<_, ServiceError>(payload)
            };

            // A panicking upstream must still retire the marker, or every
            // later miss would join the dead load.
            let result = AssertUnwindSafe(load)
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    let reason = panic_message(panic.as_ref());
                    warn!(%resource, %reason, "upstream call panicked");
                    Err(ServiceError::upstream(
                        resource.as_str(),
                        format!("load panicked: {reason}"),
                    ))
                });

            in_flight.lock().await.remove(&resource);
            result
        });

        async move {
            task.await.unwrap_or_else(|err| {
                Err(ServiceError::upstream(
                    resource.as_str(),
                    format!("load task failed: {err}"),
                ))
            })
        }
        .boxed()
        .shared()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

// == Upstream Deadline ==
/// Calls `upstream` for `resource`, turning a missed deadline into an
/// upstream failure.
pub async fn call_upstream(
    upstream: &dyn Upstream,
    resource: Resource,
    timeout: Duration,
) -> Result<Value> {
    match tokio::time::timeout(timeout, upstream.fetch(resource)).await {
        Ok(Ok(payload)) => Ok(payload),
        Ok(Err(err)) => {
            warn!(%resource, error = %err, "upstream call failed");
            Err(err)
        }
        Err(_) => {
            warn!(%resource, ?timeout, "upstream call timed out");
            Err(ServiceError::upstream(
                resource.as_str(),
                format!("timed out after {}ms", timeout.as_millis()),
            ))
        }
    }
}
