//! Upstream Module
//!
//! The catalogue of cacheable resources and the trait for the slow,
//! authoritative source behind them.

mod simulator;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, ServiceError};

pub use simulator::{LatencyProfile, SimulatedUpstream};

// == Resource ==
/// A logical resource served through the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Users,
    Posts,
    Comments,
    ExternalData,
    Analytics,
    Notifications,
}

/// What kind of system backs a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackingKind {
    Database,
    ExternalApi,
}

impl Resource {
    /// All resources, in batch order.
    pub const ALL: [Resource; 6] = [
        Resource::Users,
        Resource::Posts,
        Resource::Comments,
        Resource::ExternalData,
        Resource::Analytics,
        Resource::Notifications,
    ];

    /// Wire name, also used as the cache key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Posts => "posts",
            Resource::Comments => "comments",
            Resource::ExternalData => "external-data",
            Resource::Analytics => "analytics",
            Resource::Notifications => "notifications",
        }
    }

    pub fn kind(&self) -> BackingKind {
        match self {
            Resource::ExternalData => BackingKind::ExternalApi,
            _ => BackingKind::Database,
        }
    }

    /// Label reported for responses served through the cache.
    pub fn optimization(&self) -> &'static str {
        match self.kind() {
            BackingKind::Database => "CACHING + FAST_DB",
            BackingKind::ExternalApi => "CACHING + FAST_API",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ServiceError::InvalidResource(s.to_string()))
    }
}

// == Upstream Trait ==
/// Authoritative source for resource payloads.
///
/// Implementations may take arbitrary wall-clock time; callers bound them
/// with a deadline.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch(&self, resource: Resource) -> Result<Value>;
}
