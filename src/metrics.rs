//! Metrics Reporter
//!
//! Cache statistics plus process uptime, memory and CPU for the `/metrics`
//! endpoint.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::time::Instant;

use crate::cache::CacheStats;

// == Metrics Report ==
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub cache_entry_count: usize,
    pub process_uptime_seconds: f64,
    /// Resident set size, 0 if the platform does not report it
    pub memory_usage_bytes: u64,
    pub virtual_memory_bytes: u64,
    /// Process CPU usage since the previous report, in percent of one core
    pub cpu_usage_percent: f32,
    pub cache: CacheStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ProcessSample {
    resident: u64,
    virtual_size: u64,
    cpu_percent: f32,
}

// == Metrics Reporter ==
/// Owns the uptime clock and a `System` handle kept between reports, since
/// sysinfo measures CPU usage as the delta between two refreshes.
#[derive(Debug, Clone)]
pub struct MetricsReporter {
    started_at: Instant,
    system: Arc<Mutex<System>>,
}

impl MetricsReporter {
    /// Starts the uptime clock and takes the first CPU sample.
    pub fn new() -> Self {
        let reporter = Self {
            started_at: Instant::now(),
            system: Arc::new(Mutex::new(System::new())),
        };
        reporter.sample_process();
        reporter
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Builds a report from a cache statistics snapshot.
    pub fn report(&self, cache: CacheStats) -> MetricsReport {
        let sample = self.sample_process();
        MetricsReport {
            cache_entry_count: cache.entries,
            process_uptime_seconds: self.uptime_seconds(),
            memory_usage_bytes: sample.resident,
            virtual_memory_bytes: sample.virtual_size,
            cpu_usage_percent: sample.cpu_percent,
            cache,
        }
    }

    /// Refreshes memory and CPU for the current process only.
    fn sample_process(&self) -> ProcessSample {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return ProcessSample::default();
        };

        let mut system = self.lock_system();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        read_sample(&system, pid)
    }

    fn lock_system(&self) -> MutexGuard<'_, System> {
        // The guarded System holds no invariant a panic could break
        self.system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MetricsReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn read_sample(system: &System, pid: Pid) -> ProcessSample {
    system
        .process(pid)
        .map(|process| ProcessSample {
            resident: process.memory(),
            virtual_size: process.virtual_memory(),
            cpu_percent: process.cpu_usage(),
        })
        .unwrap_or_default()
}
