//! Simulated Upstream
//!
//! Stand-in for a slow database or third-party API. Output is deterministic
//! apart from timing: ids come from a per-simulator sequence.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{BackingKind, Resource, Upstream};
use crate::error::{Result, ServiceError};

// == Latency Profile ==
/// Per-resource latency of the simulated source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyProfile {
    /// Tuned backend sitting behind the cache
    Fast,
    /// Unoptimized baseline
    Slow,
}

impl LatencyProfile {
    pub fn delay(&self, resource: Resource) -> Duration {
        let ms = match (self, resource) {
            (LatencyProfile::Fast, Resource::Users) => 50,
            (LatencyProfile::Fast, Resource::Posts) => 30,
            (LatencyProfile::Fast, Resource::Comments) => 40,
            (LatencyProfile::Fast, Resource::ExternalData) => 100,
            (LatencyProfile::Fast, Resource::Analytics) => 60,
            (LatencyProfile::Fast, Resource::Notifications) => 35,
            (LatencyProfile::Slow, Resource::Users) => 1500,
            (LatencyProfile::Slow, Resource::Posts) => 1200,
            (LatencyProfile::Slow, Resource::Comments) => 1800,
            (LatencyProfile::Slow, Resource::ExternalData) => 2000,
            (LatencyProfile::Slow, Resource::Analytics) => 1600,
            (LatencyProfile::Slow, Resource::Notifications) => 1400,
        };
        Duration::from_millis(ms)
    }

    fn result_label(&self, kind: BackingKind) -> &'static str {
        match (self, kind) {
            (LatencyProfile::Fast, BackingKind::Database) => "Fast database result",
            (LatencyProfile::Fast, BackingKind::ExternalApi) => "Fast external API result",
            (LatencyProfile::Slow, BackingKind::Database) => "Database result",
            (LatencyProfile::Slow, BackingKind::ExternalApi) => "External API result",
        }
    }
}

// == Simulated Upstream ==
#[derive(Debug)]
pub struct SimulatedUpstream {
    profile: LatencyProfile,
    failing: HashSet<Resource>,
    sequence: AtomicU64,
}

impl SimulatedUpstream {
    pub fn new(profile: LatencyProfile) -> Self {
        Self {
            profile,
            failing: HashSet::new(),
            sequence: AtomicU64::new(1),
        }
    }

    /// Makes every call for the given resources reject after the usual delay.
    pub fn with_failures(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.failing.extend(resources);
        self
    }

    fn payload(&self, resource: Resource) -> Value {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let now = chrono::Utc::now();
        let label = format!(
            "{} {}",
            self.profile.result_label(resource.kind()),
            now.timestamp_millis()
        );

        match resource.kind() {
            BackingKind::Database => json!({
                "resource": resource.as_str(),
                "id": id,
                "data": label,
                "timestamp": now.to_rfc3339(),
            }),
            BackingKind::ExternalApi => json!({
                "resource": resource.as_str(),
                "id": id,
                "externalData": label,
                "timestamp": now.to_rfc3339(),
            }),
        }
    }
}

#[async_trait]
impl Upstream for SimulatedUpstream {
    async fn fetch(&self, resource: Resource) -> Result<Value> {
        let delay = self.profile.delay(resource);
        debug!(%resource, ?delay, "simulated upstream call");
        tokio::time::sleep(delay).await;

        if self.failing.contains(&resource) {
            return Err(ServiceError::upstream(
                resource.as_str(),
                "simulated upstream rejection",
            ));
        }

        Ok(self.payload(resource))
    }
}
