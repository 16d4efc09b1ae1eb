use std::sync::Mutex;

use chrono::Utc;
use sysinfo::System;

use crate::domain::entities::snapshot::{HostSnapshot, MemoryUsage};
use crate::infrastructure::probes::ProbeError;

/// Returns `(numerator / denominator) * 100.0`, or `0.0` when `denominator`
/// is zero.
#[allow(clippy::cast_precision_loss)]
fn safe_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        (numerator as f64 / denominator as f64) * 100.0
    } else {
        0.0
    }
}

/// Point-in-time CPU/memory snapshot via the `sysinfo` crate.
///
/// Uses `Mutex<System>` for interior mutability since probes take `&self`
/// but `sysinfo::System` needs `&mut self` to refresh. CPU usage needs two
/// refreshes separated by the crate's minimum sampling interval.
pub struct HostProbe {
    sys: Mutex<System>,
}

impl HostProbe {
    #[must_use]
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
        }
    }

    /// Collects a snapshot stamped with the given hostname.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Unavailable` if the internal mutex is poisoned.
    pub fn snapshot(&self, hostname: &str) -> Result<HostSnapshot, ProbeError> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| ProbeError::Unavailable(format!("system lock poisoned: {e}")))?;

        sys.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let cpu_usage_pct: Vec<f32> = sys.cpus().iter().map(sysinfo::Cpu::cpu_usage).collect();
        let total = sys.total_memory();
        let used = sys.used_memory();

        Ok(HostSnapshot {
            timestamp: Utc::now(),
            hostname: hostname.to_owned(),
            cpu_usage_pct,
            memory: MemoryUsage {
                total,
                used,
                percent: safe_percent(used, total),
            },
        })
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Hostname of the collecting machine, or `"unknown"` when the platform
/// does not report one.
#[must_use]
pub fn local_hostname() -> String {
    System::host_name().unwrap_or_else(|| "unknown".to_owned())
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_positive_memory() {
        let probe = HostProbe::new();
        let snapshot = probe.snapshot("testhost").expect("snapshot");
        assert_eq!(snapshot.hostname, "testhost");
        assert!(snapshot.memory.total > 0, "total RAM should be > 0");
        assert!(snapshot.memory.used <= snapshot.memory.total);
        assert!((0.0..=100.0).contains(&snapshot.memory.percent));
    }

    #[test]
    fn snapshot_reports_one_usage_per_core() {
        let probe = HostProbe::new();
        let snapshot = probe.snapshot("testhost").expect("snapshot");
        assert!(!snapshot.cpu_usage_pct.is_empty(), "should have >= 1 core");
        for usage in &snapshot.cpu_usage_pct {
            assert!((0.0..=100.0).contains(usage), "usage {usage} out of range");
        }
    }

    #[test]
    fn snapshot_fails_on_poisoned_mutex() {
        let probe = HostProbe::new();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = probe.sys.lock().expect("not yet poisoned");
            panic!("intentional panic to poison the mutex");
        }));

        assert!(probe.snapshot("h").is_err());
    }

    #[test]
    fn safe_percent_returns_zero_for_zero_denominator() {
        assert!((safe_percent(100, 0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn safe_percent_computes_correctly() {
        assert!((safe_percent(50, 100) - 50.0).abs() < f64::EPSILON);
        assert!((safe_percent(1, 4) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn local_hostname_is_not_empty() {
        assert!(!local_hostname().is_empty());
    }

    #[test]
    fn default_creates_valid_probe() {
        let probe = HostProbe::default();
        assert!(probe.snapshot("h").is_ok());
    }
}
