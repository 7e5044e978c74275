// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CPU utilisation monitoring.
//!
//! Reads CPU state from:
//! - `/proc/stat`: aggregate jiffy counters. Utilisation is the busy
//!   fraction between two consecutive readings, so a [`CpuProbe`] keeps the
//!   previous counters around.
//! - `/sys/devices/system/cpu/online`: online core count.
//! - `/proc/loadavg`: 1-minute load average, used as a coarse fallback
//!   when `/proc/stat` is missing.

use crate::sysfs::{parse_u64, read_sysfs_file};
use crate::TelemetryError;
use std::path::{Path, PathBuf};

/// Kernel list of online CPUs.
const CPU_ONLINE_PATH: &str = "/sys/devices/system/cpu/online";

/// Kernel CPU accounting file.
const PROC_STAT_PATH: &str = "/proc/stat";

/// Load average file.
const LOADAVG_PATH: &str = "/proc/loadavg";

/// Aggregate CPU time counters from the first line of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    /// Jiffies spent idle or waiting on I/O.
    pub idle: u64,
    /// Jiffies across all accounted states.
    pub total: u64,
}

impl CpuTimes {
    /// Parses the aggregate `cpu` line of a `/proc/stat`-formatted string.
    ///
    /// Format: `cpu user nice system idle iowait irq softirq steal guest guest_nice`.
    /// Guest time is already folded into `user`/`nice` by the kernel, so
    /// only the first eight columns are summed.
    pub fn parse(content: &str, source_path: &Path) -> Result<Self, TelemetryError> {
        let line = content
            .lines()
            .find(|l| l.split_whitespace().next() == Some("cpu"))
            .ok_or_else(|| TelemetryError::ParseError {
                path: source_path.display().to_string(),
                detail: "aggregate 'cpu' line not found".to_string(),
            })?;

        let fields = line
            .split_whitespace()
            .skip(1)
            .take(8)
            .map(|v| parse_u64(v, source_path, "jiffies"))
            .collect::<Result<Vec<u64>, _>>()?;

        if fields.len() < 4 {
            return Err(TelemetryError::ParseError {
                path: source_path.display().to_string(),
                detail: format!("expected at least 4 counters, got {}", fields.len()),
            });
        }

        let iowait = fields.get(4).copied().unwrap_or(0);
        Ok(Self {
            idle: fields[3] + iowait,
            total: fields.iter().sum(),
        })
    }

    /// Busy fraction in `[0.0, 1.0]` between `earlier` and `self`.
    ///
    /// Returns `None` when the counters did not advance.
    pub fn utilization_since(&self, earlier: &CpuTimes) -> Option<f64> {
        let total = self.total.checked_sub(earlier.total)?;
        if total == 0 {
            return None;
        }
        let idle = self.idle.saturating_sub(earlier.idle).min(total);
        Some((1.0 - idle as f64 / total as f64).clamp(0.0, 1.0))
    }
}

/// Stateful CPU utilisation probe.
///
/// The probe primes itself on construction, so the first [`CpuProbe::read`]
/// already reports the utilisation since the probe was created.
#[derive(Debug)]
pub struct CpuProbe {
    stat_path: PathBuf,
    previous: Option<CpuTimes>,
    online_cores: u32,
}

impl CpuProbe {
    /// Creates a probe over the host's `/proc/stat`.
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(PROC_STAT_PATH))
    }

    /// Creates a probe over a specific stat file (for testing).
    pub fn with_path(stat_path: PathBuf) -> Self {
        let previous = read_cpu_times(&stat_path).ok();
        let online_cores = online_cores();
        Self {
            stat_path,
            previous,
            online_cores,
        }
    }

    /// Reads the CPU utilisation since the previous call, in `[0.0, 1.0]`.
    pub fn read(&mut self) -> Result<f64, TelemetryError> {
        let current = match read_cpu_times(&self.stat_path) {
            Ok(times) => times,
            Err(TelemetryError::NotAvailable { .. }) => {
                return read_load_per_core(self.online_cores);
            }
            Err(e) => return Err(e),
        };

        let previous = self.previous.replace(current);
        let Some(previous) = previous else {
            return Err(TelemetryError::CounterStalled {
                path: self.stat_path.display().to_string(),
            });
        };

        current
            .utilization_since(&previous)
            .ok_or_else(|| TelemetryError::CounterStalled {
                path: self.stat_path.display().to_string(),
            })
    }
}

impl Default for CpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Core count and coarse load, for host snapshots.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CpuInfo {
    pub online_cores: u32,
    /// `loadavg(1m) / online_cores`, clamped to `[0.0, 1.0]`.
    pub load_per_core: f64,
}

impl CpuInfo {
    pub fn read() -> Result<Self, TelemetryError> {
        let online_cores = online_cores();
        let load_per_core = read_load_per_core(online_cores)?;
        Ok(Self {
            online_cores,
            load_per_core,
        })
    }
}

fn read_cpu_times(path: &Path) -> Result<CpuTimes, TelemetryError> {
    let content = read_sysfs_file(path)?;
    CpuTimes::parse(&content, path)
}

/// Online cores from the sysfs CPU list, or the process's available
/// parallelism when the list is missing or malformed. Never zero.
pub(crate) fn online_cores() -> u32 {
    read_sysfs_file(Path::new(CPU_ONLINE_PATH))
        .ok()
        .and_then(|list| count_cpu_list(&list))
        .unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, |n| n.get() as u32)
        })
}

/// Counts the CPUs in a kernel CPU list such as `0-3,6,8-9`.
fn count_cpu_list(list: &str) -> Option<u32> {
    let count = list
        .split(',')
        .map(|span| match span.trim().split_once('-') {
            Some((lo, hi)) => {
                let lo: u32 = lo.trim().parse().ok()?;
                let hi: u32 = hi.trim().parse().ok()?;
                hi.checked_sub(lo).map(|d| d + 1)
            }
            None => span.trim().parse::<u32>().ok().map(|_| 1),
        })
        .sum::<Option<u32>>()?;
    (count > 0).then_some(count)
}

/// Reads the 1-minute load average and normalises it per core, clamped to
/// `[0.0, 1.0]`.
fn read_load_per_core(online_cores: u32) -> Result<f64, TelemetryError> {
    let path = Path::new(LOADAVG_PATH);
    let content = read_sysfs_file(path)?;

    // Format: "0.35 0.28 0.22 1/234 5678"
    let load_1m: f64 = content
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| TelemetryError::ParseError {
            path: path.display().to_string(),
            detail: format!("expected load average, got '{content}'"),
        })?;

    let cores = online_cores.max(1) as f64;
    Ok((load_1m / cores).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_T0: &str = "\
cpu  100 0 100 800 0 0 0 0 0 0
cpu0 50 0 50 400 0 0 0 0 0 0
intr 12345
";

    const STAT_T1: &str = "\
cpu  250 0 150 900 0 0 0 0 0 0
cpu0 125 0 75 450 0 0 0 0 0 0
intr 12399
";

    #[test]
    fn test_parse_cpu_times() {
        let t = CpuTimes::parse(STAT_T0, Path::new("/proc/stat")).unwrap();
        assert_eq!(t.idle, 800);
        assert_eq!(t.total, 1000);
    }

    #[test]
    fn test_iowait_counts_as_idle() {
        let stat = "cpu  10 0 10 70 10 0 0 0\n";
        let t = CpuTimes::parse(stat, Path::new("/proc/stat")).unwrap();
        assert_eq!(t.idle, 80);
        assert_eq!(t.total, 100);
    }

    #[test]
    fn test_utilization_between_readings() {
        let t0 = CpuTimes::parse(STAT_T0, Path::new("/proc/stat")).unwrap();
        let t1 = CpuTimes::parse(STAT_T1, Path::new("/proc/stat")).unwrap();
        // Δtotal = 300, Δidle = 100 → 2/3 busy.
        let util = t1.utilization_since(&t0).unwrap();
        assert!((util - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_stalled_counters_yield_none() {
        let t0 = CpuTimes::parse(STAT_T0, Path::new("/proc/stat")).unwrap();
        assert_eq!(t0.utilization_since(&t0), None);
    }

    #[test]
    fn test_missing_cpu_line() {
        let result = CpuTimes::parse("intr 1 2 3\n", Path::new("/proc/stat"));
        assert!(matches!(result, Err(TelemetryError::ParseError { .. })));
    }

    #[test]
    fn test_probe_reads_delta_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stat");
        std::fs::write(&path, STAT_T0).unwrap();

        let mut probe = CpuProbe::with_path(path.clone());
        std::fs::write(&path, STAT_T1).unwrap();

        let util = probe.read().unwrap();
        assert!((util - 2.0 / 3.0).abs() < 1e-9);

        // Unchanged file → stalled counters, reported as a per-tick error.
        assert!(matches!(
            probe.read(),
            Err(TelemetryError::CounterStalled { .. })
        ));
    }

    #[test]
    fn test_count_cpu_list() {
        assert_eq!(count_cpu_list("0-7"), Some(8));
        assert_eq!(count_cpu_list("0"), Some(1));
        assert_eq!(count_cpu_list("0-3,6,8-9\n"), Some(7));
        assert_eq!(count_cpu_list(""), None);
        assert_eq!(count_cpu_list("5-2"), None);
        assert_eq!(count_cpu_list("0-x"), None);
    }

    #[test]
    fn test_online_cores_nonzero() {
        assert!(online_cores() >= 1);
    }

    #[test]
    fn test_host_probe_in_range() {
        if Path::new(PROC_STAT_PATH).exists() {
            let mut probe = CpuProbe::new();
            std::thread::sleep(std::time::Duration::from_millis(50));
            if let Ok(util) = probe.read() {
                assert!((0.0..=1.0).contains(&util));
            }
        }
    }
}
