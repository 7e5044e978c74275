// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Point-in-time view of the host, taken outside any profiling run.

use crate::{CpuInfo, GpuProbe, MemoryInfo, TelemetryError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Below this much available memory a run is likely to page.
const LOW_MEMORY_MB: u64 = 256;

/// Above this 1-minute load per core the workload competes for CPU.
const SATURATED_LOAD_PER_CORE: f64 = 0.9;

/// Whether the host is quiet enough for meaningful measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCondition {
    Ready,
    LowMemory,
    CpuSaturated,
}

impl std::fmt::Display for HostCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HostCondition::Ready => "ready",
            HostCondition::LowMemory => "low memory",
            HostCondition::CpuSaturated => "cpu saturated",
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SystemSnapshot {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    /// Absent when the host has no readable GPU busy counter.
    pub gpu_utilization: Option<f64>,
    /// Milliseconds since the Unix epoch.
    pub captured_at_ms: u64,
}

impl SystemSnapshot {
    /// Reads every probe once.
    ///
    /// Memory must be readable. CPU topology falls back to the process's
    /// available parallelism with zero load.
    pub fn capture() -> Result<Self, TelemetryError> {
        let memory = MemoryInfo::read()?;

        let cpu = match CpuInfo::read() {
            Ok(cpu) => cpu,
            Err(e) => {
                tracing::debug!("cpu info unavailable: {e}");
                CpuInfo {
                    online_cores: std::thread::available_parallelism()
                        .map_or(1, |n| n.get() as u32),
                    load_per_core: 0.0,
                }
            }
        };

        let gpu_utilization = GpuProbe::detect().and_then(|probe| {
            probe
                .read()
                .map_err(|e| tracing::warn!("gpu counter unreadable: {e}"))
                .ok()
        });

        let captured_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);

        Ok(Self {
            cpu,
            memory,
            gpu_utilization,
            captured_at_ms,
        })
    }

    pub fn has_gpu(&self) -> bool {
        self.gpu_utilization.is_some()
    }

    /// Memory is checked before CPU load.
    pub fn condition(&self) -> HostCondition {
        if self.memory.available_mb() < LOW_MEMORY_MB {
            HostCondition::LowMemory
        } else if self.cpu.load_per_core > SATURATED_LOAD_PER_CORE {
            HostCondition::CpuSaturated
        } else {
            HostCondition::Ready
        }
    }

    /// One-line description, e.g.
    /// `8 cores @ 0.12 load/core | mem 41% (4711 of 7852 MB free) | gpu absent | ready`.
    pub fn summary(&self) -> String {
        let gpu = self
            .gpu_utilization
            .map_or_else(|| "gpu absent".to_string(), |g| format!("gpu {:.0}%", g * 100.0));
        format!(
            "{} cores @ {:.2} load/core | mem {:.0}% ({} of {} MB free) | {gpu} | {}",
            self.cpu.online_cores,
            self.cpu.load_per_core,
            self.memory.pressure() * 100.0,
            self.memory.available_mb(),
            self.memory.total_mb(),
            self.condition(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(free_mb: u64, load: f64, gpu: Option<f64>) -> SystemSnapshot {
        SystemSnapshot {
            cpu: CpuInfo {
                online_cores: 8,
                load_per_core: load,
            },
            memory: MemoryInfo {
                total_kb: 8192 * 1024,
                available_kb: free_mb * 1024,
            },
            gpu_utilization: gpu,
            captured_at_ms: 1_760_000_000_000,
        }
    }

    #[test]
    fn test_capture_on_linux() {
        if std::path::Path::new("/proc/meminfo").exists() {
            let snap = SystemSnapshot::capture().unwrap();
            assert!(snap.memory.total_kb > 0);
            assert!(snap.cpu.online_cores >= 1);
            assert!(snap.captured_at_ms > 0);
        }
    }

    #[test]
    fn test_conditions() {
        assert_eq!(snapshot(4096, 0.2, None).condition(), HostCondition::Ready);
        assert_eq!(snapshot(100, 0.2, None).condition(), HostCondition::LowMemory);
        assert_eq!(snapshot(4096, 1.5, None).condition(), HostCondition::CpuSaturated);
        // Memory wins when both apply.
        assert_eq!(snapshot(100, 1.5, None).condition(), HostCondition::LowMemory);
    }

    #[test]
    fn test_summary() {
        let s = snapshot(4096, 0.12, None).summary();
        assert!(s.starts_with("8 cores @ 0.12 load/core"));
        assert!(s.contains("mem 50% (4096 of 8192 MB free)"));
        assert!(s.ends_with("gpu absent | ready"));

        let with_gpu = snapshot(4096, 0.12, Some(0.42));
        assert!(with_gpu.has_gpu());
        assert!(with_gpu.summary().contains("gpu 42%"));
    }
}
