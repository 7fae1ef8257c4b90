//! Configuration Module
//!
//! Loads service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::upstream::Resource;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds for cached payloads
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Deadline for a single upstream call, in milliseconds
    pub upstream_timeout_ms: u64,
    /// Resources whose simulated upstream always fails
    pub failing_resources: Vec<Resource>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Cache TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3008)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream deadline (default: 5000)
    /// - `FAIL_RESOURCES` - Comma-separated resource names to fail (default: none)
    ///
    /// Unparseable values fall back to the default; unknown resource names
    /// are skipped.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            upstream_timeout_ms: env_or("UPSTREAM_TIMEOUT_MS", defaults.upstream_timeout_ms),
            failing_resources: env::var("FAIL_RESOURCES")
                .map(|v| parse_resource_list(&v))
                .unwrap_or_default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 300,
            server_port: 3008,
            cleanup_interval: 1,
            upstream_timeout_ms: 5000,
            failing_resources: Vec::new(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses `"users, posts"` into resources, keeping order and dropping
/// blanks, duplicates and unknown names.
fn parse_resource_list(raw: &str) -> Vec<Resource> {
    let mut resources = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Ok(resource) = name.parse::<Resource>() {
            if !resources.contains(&resource) {
                resources.push(resource);
            }
        }
    }
    resources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.server_port, 3008);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(5));
        assert!(config.failing_resources.is_empty());
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment to avoid races between tests
        for name in [
            "MAX_ENTRIES",
            "DEFAULT_TTL",
            "SERVER_PORT",
            "CLEANUP_INTERVAL",
            "UPSTREAM_TIMEOUT_MS",
            "FAIL_RESOURCES",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.server_port, 3008);

        env::set_var("DEFAULT_TTL", "60");
        env::set_var("SERVER_PORT", "not-a-port");
        env::set_var("FAIL_RESOURCES", "posts,bogus, users");

        let config = Config::from_env();
        assert_eq!(config.ttl(), Duration::from_secs(60));
        assert_eq!(config.server_port, 3008);
        assert_eq!(
            config.failing_resources,
            vec![Resource::Posts, Resource::Users]
        );

        env::remove_var("DEFAULT_TTL");
        env::remove_var("SERVER_PORT");
        env::remove_var("FAIL_RESOURCES");
    }

    #[test]
    fn test_parse_resource_list() {
        assert_eq!(
            parse_resource_list(" external-data ,users,,external-data"),
            vec![Resource::ExternalData, Resource::Users]
        );
        assert!(parse_resource_list("").is_empty());
    }
}
