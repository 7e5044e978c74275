// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runs workloads on backends while the sampler records telemetry.
//!
//! ```text
//! Orchestrator::run_once
//!     │  start sampler ── tokio task, owns the series
//!     │  spawn_blocking(backend.execute)
//!     │  await execution  ─or─  abort signal
//!     │  stop sampler  (always)
//!     ▼
//!   RunResult
//!
//! Orchestrator::profile_backend
//!     setup → warmup runs (discarded) → measured runs → teardown
//!     → combine → summarise → score
//!
//! Orchestrator::compare
//!     profile_backend for each id, one at a time → recommend
//! ```

use crate::{
    AbortSignal, Backend, BackendCapabilities, BackendRegistry, ProfilerConfig, ProfilerError,
    SyntheticTextWorkload, Workload,
};
use analyzer::{summarize_run, RunResult, RunStatistics, SeriesSummary};
use scoring::{recommend, EfficiencyModel, ObjectiveMode, Recommendation, Scorecard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use telemetry::{Sampler, SystemSource, TelemetrySource};

/// Builds the telemetry source for a backend's runs.
pub type SourceFactory =
    Arc<dyn Fn(&BackendCapabilities) -> Box<dyn TelemetrySource> + Send + Sync>;

/// Everything measured and derived for one backend.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BackendProfile {
    pub capabilities: BackendCapabilities,
    /// Measured runs folded into one.
    pub combined: RunResult,
    pub summary: SeriesSummary,
    pub scorecard: Scorecard,
    pub statistics: RunStatistics,
}

/// Profiles of every compared backend plus the resulting recommendation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Comparison {
    pub profiles: Vec<BackendProfile>,
    pub recommendation: Recommendation,
}

impl Comparison {
    /// Statistics for each backend, in profiling order.
    pub fn statistics(&self) -> Vec<RunStatistics> {
        self.profiles.iter().map(|p| p.statistics.clone()).collect()
    }
}

/// Drives profiling experiments.
pub struct Orchestrator {
    config: ProfilerConfig,
    model: EfficiencyModel,
    registry: BackendRegistry,
    workload: Arc<dyn Workload>,
    source_factory: SourceFactory,
    abort: AbortSignal,
}

impl Orchestrator {
    /// Creates an orchestrator with the built-in backends, the synthetic
    /// text workload and host telemetry.
    pub fn new(config: ProfilerConfig) -> Result<Self, ProfilerError> {
        config.validate()?;
        let model = EfficiencyModel::new(config.scoring)?;
        let workload = Arc::new(SyntheticTextWorkload::new(&config.workload));

        Ok(Self {
            config,
            model,
            registry: BackendRegistry::with_defaults(),
            workload,
            source_factory: Arc::new(host_source),
            abort: AbortSignal::never(),
        })
    }

    pub fn with_registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_workload(mut self, workload: Arc<dyn Workload>) -> Self {
        self.workload = workload;
        self
    }

    pub fn with_source_factory(mut self, factory: SourceFactory) -> Self {
        self.source_factory = factory;
        self
    }

    /// Aborts in-flight runs when `signal` fires.
    pub fn with_abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort = signal;
        self
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn workload(&self) -> &dyn Workload {
        self.workload.as_ref()
    }

    /// Executes the workload once on `backend` with the sampler running.
    ///
    /// The sampler is stopped on every path. If the abort signal fires
    /// first, execution is asked to cancel and the partial series is
    /// returned inside [`ProfilerError::Aborted`].
    pub async fn run_once(&self, backend: &Arc<dyn Backend>) -> Result<RunResult, ProfilerError> {
        let backend_id = backend.id().to_string();
        let source = (self.source_factory)(&backend.capabilities());
        let sampler = Sampler::new(self.config.sample_interval(), source).start();

        let cancel = Arc::new(AtomicBool::new(false));
        let mut task = {
            let backend = Arc::clone(backend);
            let workload = Arc::clone(&self.workload);
            let cancel = Arc::clone(&cancel);
            tokio::task::spawn_blocking(move || backend.execute(workload.as_ref(), &cancel))
        };

        let joined = tokio::select! {
            biased;
            _ = self.abort.aborted() => None,
            joined = &mut task => Some(joined),
        };

        let Some(joined) = joined else {
            cancel.store(true, Ordering::Relaxed);
            let partial = sampler.stop().await?;
            // Units check the cancel flag per token, so this returns quickly.
            if let Err(e) = task.await {
                tracing::warn!("backend '{backend_id}' task failed after abort: {e}");
            }
            tracing::warn!(
                "run on '{backend_id}' aborted, keeping {} partial samples",
                partial.len()
            );
            return Err(ProfilerError::Aborted {
                backend: backend_id,
                partial,
            });
        };

        let series = sampler.stop().await?;
        let outcome = joined.map_err(|e| ProfilerError::Backend {
            backend: backend_id.clone(),
            detail: format!("execution task failed: {e}"),
        })??;

        tracing::info!(
            "{} ({} samples, {} skipped ticks)",
            outcome.summary(),
            series.len(),
            series.skipped_ticks(),
        );

        Ok(RunResult::from_execution(
            backend_id,
            outcome.tokens_generated,
            outcome.duration,
            series,
        ))
    }

    /// Runs warmup and measured iterations on `backend` and scores the
    /// combined result.
    ///
    /// `teardown` is called even when setup or a run fails.
    pub async fn profile_backend(
        &self,
        backend: Arc<dyn Backend>,
    ) -> Result<BackendProfile, ProfilerError> {
        let id = backend.id().to_string();
        tracing::info!(
            "profiling '{id}' (runs={}, warmup={})",
            self.config.runs,
            self.config.warmup_runs
        );

        if let Err(e) = backend.setup() {
            backend.teardown();
            return Err(e);
        }
        let runs = self.execute_runs(&backend).await;
        backend.teardown();
        let runs = runs?;

        let combined = RunResult::combine(&runs)?;
        let summary = summarize_run(&combined)?;
        let scorecard = self.model.score(&combined, &summary);
        let statistics =
            RunStatistics::from_runs(&runs, self.config.analysis.outlier_threshold())?;

        tracing::info!("{}", scorecard.summary());

        Ok(BackendProfile {
            capabilities: backend.capabilities(),
            combined,
            summary,
            scorecard,
            statistics,
        })
    }

    async fn execute_runs(
        &self,
        backend: &Arc<dyn Backend>,
    ) -> Result<Vec<RunResult>, ProfilerError> {
        let id = backend.id();
        let total = self.config.warmup_runs + self.config.runs;
        let mut measured = Vec::with_capacity(self.config.runs);

        for iteration in 0..total {
            let run = self.run_once(backend).await?;
            if iteration < self.config.warmup_runs {
                tracing::debug!("[{id}] warmup {} complete", iteration + 1);
                continue;
            }
            tracing::debug!(
                "[{id}] run {} complete: {:.4}s",
                iteration - self.config.warmup_runs + 1,
                run.duration_seconds()
            );
            measured.push(run);
        }
        Ok(measured)
    }

    /// Profiles each backend id in turn and recommends one under `mode`.
    pub async fn compare(
        &self,
        backend_ids: &[String],
        mode: ObjectiveMode,
    ) -> Result<Comparison, ProfilerError> {
        if backend_ids.is_empty() {
            return Err(ProfilerError::Config("no backends to compare".into()));
        }

        let backends = backend_ids
            .iter()
            .map(|id| self.registry.create(id))
            .collect::<Result<Vec<_>, _>>()?;

        let mut profiles = Vec::with_capacity(backends.len());
        for backend in backends {
            profiles.push(self.profile_backend(backend).await?);
        }

        let scorecards: Vec<Scorecard> = profiles.iter().map(|p| p.scorecard.clone()).collect();
        let recommendation = recommend(&scorecards, mode)?;
        tracing::info!("{}", recommendation.rationale);

        Ok(Comparison {
            profiles,
            recommendation,
        })
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("workload", &self.workload.name())
            .finish()
    }
}

fn host_source(caps: &BackendCapabilities) -> Box<dyn TelemetrySource> {
    if caps.gpu_telemetry {
        Box::new(SystemSource::detect())
    } else {
        Box::new(SystemSource::cpu_only())
    }
}
