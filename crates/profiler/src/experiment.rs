// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Experiment identity and host environment.
//!
//! An [`ExperimentContext`] is created once per CLI invocation and passed
//! explicitly to whatever needs it. It fixes the experiment id, creation
//! time, configuration snapshot and environment, and hands out run ids
//! from a monotonically increasing counter.

use crate::ProfilerConfig;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Version string recorded in every report.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host description stored in reports.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnvironmentInfo {
    pub hostname: String,
    pub os: String,
    pub architecture: String,
    pub logical_cores: usize,
    /// Absent when `/proc/meminfo` cannot be read.
    pub total_memory_mb: Option<u64>,
    pub gpu_telemetry_available: bool,
    pub tool_version: String,
}

impl EnvironmentInfo {
    /// Describes the running host.
    pub fn capture() -> Self {
        let total_memory_mb = match telemetry::MemoryInfo::read() {
            Ok(memory) => Some(memory.total_mb()),
            Err(e) => {
                tracing::debug!("memory info unavailable: {e}");
                None
            }
        };

        let logical_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            hostname: hostname(),
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            logical_cores,
            total_memory_mb,
            gpu_telemetry_available: telemetry::GpuProbe::detect().is_some(),
            tool_version: TOOL_VERSION.to_string(),
        }
    }
}

fn hostname() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// The serialisable part of an experiment, embedded in reports.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExperimentMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub tool_version: String,
    pub config: ProfilerConfig,
}

/// Identity, configuration and environment of one profiling session.
#[derive(Debug)]
pub struct ExperimentContext {
    id: String,
    created_at: DateTime<Utc>,
    config: ProfilerConfig,
    environment: EnvironmentInfo,
    reports: AtomicU64,
}

impl ExperimentContext {
    /// Starts an experiment on the current host.
    pub fn new(config: ProfilerConfig) -> Self {
        Self::with_environment(config, EnvironmentInfo::capture())
    }

    /// Starts an experiment with a given environment description.
    pub fn with_environment(config: ProfilerConfig, environment: EnvironmentInfo) -> Self {
        let id = format!("exp-{}", uuid::Uuid::new_v4());
        tracing::info!("experiment {id} started");
        Self {
            id,
            created_at: Utc::now(),
            config,
            environment,
            reports: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn environment(&self) -> &EnvironmentInfo {
        &self.environment
    }

    /// Returns a fresh run id: `<experiment id>-<counter>`, counting from 1.
    pub fn next_run_id(&self) -> String {
        let n = self.reports.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{n:04}", self.id)
    }

    pub fn metadata(&self) -> ExperimentMetadata {
        ExperimentMetadata {
            id: self.id.clone(),
            created_at: self.created_at,
            tool_version: TOOL_VERSION.to_string(),
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvironmentInfo {
        EnvironmentInfo {
            hostname: "bench-host".into(),
            os: "linux".into(),
            architecture: "aarch64".into(),
            logical_cores: 4,
            total_memory_mb: Some(4096),
            gpu_telemetry_available: false,
            tool_version: TOOL_VERSION.into(),
        }
    }

    #[test]
    fn test_run_ids_increase() {
        let ctx = ExperimentContext::with_environment(ProfilerConfig::default(), env());
        let a = ctx.next_run_id();
        let b = ctx.next_run_id();
        assert!(a.starts_with("exp-"));
        assert!(a.ends_with("-0001"));
        assert!(b.ends_with("-0002"));
        assert!(a < b);
    }

    #[test]
    fn test_distinct_experiments() {
        let a = ExperimentContext::with_environment(ProfilerConfig::default(), env());
        let b = ExperimentContext::with_environment(ProfilerConfig::default(), env());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_metadata_snapshot() {
        let config = ProfilerConfig {
            runs: 2,
            ..Default::default()
        };
        let ctx = ExperimentContext::with_environment(config, env());
        let meta = ctx.metadata();
        assert_eq!(meta.id, ctx.id());
        assert_eq!(meta.config.runs, 2);
        assert_eq!(meta.tool_version, TOOL_VERSION);
    }

    #[test]
    fn test_capture_environment() {
        let env = EnvironmentInfo::capture();
        assert!(env.logical_cores >= 1);
        assert!(!env.hostname.is_empty());
        assert_eq!(env.os, std::env::consts::OS);
    }
}
