// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compute backends and the registry that creates them by id.
//!
//! # Built-in backends
//!
//! | Id | Workers |
//! |---|---|
//! | `cpu` | one thread per available core |
//! | `cpu-single` | one thread |

use crate::{ExecutionOutcome, ProfilerError, Workload};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// What a backend exposes to the profiler.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BackendCapabilities {
    /// Device class, e.g. `"cpu"`.
    pub device: String,
    /// Maximum number of units executed concurrently.
    pub parallelism: usize,
    /// Whether GPU utilisation should be sampled while this backend runs.
    pub gpu_telemetry: bool,
}

/// A compute backend.
///
/// The profiler calls `setup` once before a backend's runs and `teardown`
/// once after them, whether or not the runs succeeded. `execute` runs on a
/// blocking thread while the sampler polls the host.
pub trait Backend: Send + Sync {
    fn id(&self) -> &str;

    fn capabilities(&self) -> BackendCapabilities;

    fn setup(&self) -> Result<(), ProfilerError> {
        Ok(())
    }

    /// Runs `workload` to completion, or until `cancel` is set.
    fn execute(
        &self,
        workload: &dyn Workload,
        cancel: &AtomicBool,
    ) -> Result<ExecutionOutcome, ProfilerError>;

    fn teardown(&self) {}
}

// ── CPU backend ────────────────────────────────────────────────

/// Runs workload units on a fixed number of OS threads.
#[derive(Debug, Clone)]
pub struct CpuBackend {
    id: String,
    threads: usize,
}

impl CpuBackend {
    pub fn new(id: impl Into<String>, threads: usize) -> Self {
        Self {
            id: id.into(),
            threads: threads.max(1),
        }
    }

    /// One worker per available core.
    pub fn all_cores() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new("cpu", threads)
    }

    /// A single worker.
    pub fn single_thread() -> Self {
        Self::new("cpu-single", 1)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Backend for CpuBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            device: "cpu".to_string(),
            parallelism: self.threads,
            gpu_telemetry: false,
        }
    }

    fn setup(&self) -> Result<(), ProfilerError> {
        tracing::debug!("backend '{}' ready with {} threads", self.id, self.threads);
        Ok(())
    }

    fn execute(
        &self,
        workload: &dyn Workload,
        cancel: &AtomicBool,
    ) -> Result<ExecutionOutcome, ProfilerError> {
        let units = workload.units();
        let workers = self.threads.min(units).max(1);
        let next = AtomicUsize::new(0);
        let start = Instant::now();

        let joined = std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            if index >= units || cancel.load(Ordering::Relaxed) {
                                break;
                            }
                            let unit_start = Instant::now();
                            let tokens = workload.run_unit(index, cancel);
                            done.push((index, tokens, unit_start.elapsed()));
                        }
                        done
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        });

        let mut outcome = ExecutionOutcome::new(self.id.clone(), workers);
        for worker in joined {
            let done = worker.map_err(|_| ProfilerError::Backend {
                backend: self.id.clone(),
                detail: format!("worker thread panicked while running '{}'", workload.name()),
            })?;
            for (index, tokens, elapsed) in done {
                outcome.record_unit(index, tokens, elapsed);
            }
        }
        outcome.finalise(start.elapsed(), cancel.load(Ordering::Relaxed));

        tracing::debug!("{}", outcome.summary());
        Ok(outcome)
    }
}

// ── Registry ───────────────────────────────────────────────────

/// Creates a backend instance.
pub type BackendFactory = Box<dyn Fn() -> Arc<dyn Backend> + Send + Sync>;

/// Backends available by id.
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in `cpu` and `cpu-single` backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("cpu", Box::new(|| Arc::new(CpuBackend::all_cores())));
        registry.register("cpu-single", Box::new(|| Arc::new(CpuBackend::single_thread())));
        registry
    }

    /// Adds or replaces the factory for `id`.
    pub fn register(&mut self, id: impl Into<String>, factory: BackendFactory) {
        self.factories.insert(id.into(), factory);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids in lexical order.
    pub fn ids(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Instantiates the backend registered under `id`.
    pub fn create(&self, id: &str) -> Result<Arc<dyn Backend>, ProfilerError> {
        let factory = self
            .factories
            .get(id.trim())
            .ok_or_else(|| ProfilerError::UnknownBackend {
                name: id.to_string(),
                available: self.ids().join(", "),
            })?;
        Ok(factory())
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkloadConfig;
    use crate::SyntheticTextWorkload;

    fn workload(prompts: usize) -> SyntheticTextWorkload {
        SyntheticTextWorkload::new(&WorkloadConfig {
            max_new_tokens: 10,
            hidden_size: 8,
            prompts: (0..prompts).map(|i| format!("prompt {i}")).collect(),
        })
    }

    #[test]
    fn test_cpu_backend_runs_every_unit() {
        let backend = CpuBackend::new("cpu", 3);
        let cancel = AtomicBool::new(false);
        let outcome = backend.execute(&workload(5), &cancel).unwrap();

        assert_eq!(outcome.tokens_generated, 50);
        assert_eq!(outcome.units.len(), 5);
        assert_eq!(outcome.threads, 3);
        assert!(!outcome.cancelled);
        let indices: Vec<usize> = outcome.units.iter().map(|u| u.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_workers_capped_by_units() {
        let backend = CpuBackend::new("cpu", 16);
        let outcome = backend
            .execute(&workload(2), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(outcome.threads, 2);
    }

    #[test]
    fn test_cancelled_before_start() {
        let backend = CpuBackend::single_thread();
        let outcome = backend.execute(&workload(3), &AtomicBool::new(true)).unwrap();
        assert_eq!(outcome.tokens_generated, 0);
        assert!(outcome.cancelled);
    }

    #[test]
    fn test_capabilities() {
        let caps = CpuBackend::single_thread().capabilities();
        assert_eq!(caps.device, "cpu");
        assert_eq!(caps.parallelism, 1);
        assert!(!caps.gpu_telemetry);
    }

    #[test]
    fn test_registry_defaults() {
        let registry = BackendRegistry::default();
        assert_eq!(registry.ids(), vec!["cpu", "cpu-single"]);
        assert_eq!(registry.create("cpu-single").unwrap().id(), "cpu-single");
        assert_eq!(registry.create(" cpu ").unwrap().id(), "cpu");
    }

    #[test]
    fn test_registry_unknown() {
        let err = BackendRegistry::default().create("tpu").err().unwrap();
        match err {
            ProfilerError::UnknownBackend { name, available } => {
                assert_eq!(name, "tpu");
                assert_eq!(available, "cpu, cpu-single");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registry_custom() {
        let mut registry = BackendRegistry::new();
        registry.register("cpu-2", Box::new(|| Arc::new(CpuBackend::new("cpu-2", 2))));
        assert!(registry.contains("cpu-2"));
        assert!(!registry.contains("cpu"));
        assert_eq!(registry.create("cpu-2").unwrap().capabilities().parallelism, 2);
    }
}
