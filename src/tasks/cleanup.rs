//! TTL Cleanup Task
//!
//! Periodically sweeps expired entries so memory is reclaimed even for
//! resources nobody reads again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns the sweeper. Abort the returned handle on shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(state.cache.clone(), Duration::from_secs(1));
/// // during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?interval, "starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!(removed, "TTL cleanup removed expired entries");
            } else {
                debug!("TTL cleanup: nothing expired");
            }
        }
    })
}
