// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # profiler
//!
//! Profiles a text-generation workload across interchangeable backends and
//! produces a sealed recommendation report.
//!
//! The profiler ties together:
//! - `telemetry`: the concurrent sampler.
//! - `analyzer`: series summaries and cross-run statistics.
//! - `scoring`: the efficiency model and recommendation engine.
//! - `integrity`: canonical fingerprints for the report.
//!
//! # Pipeline
//! ```text
//! Backend::execute ─┐
//!                   ├─▶ RunResult ─▶ summarize ─▶ score ─▶ recommend ─▶ seal ─▶ Report
//! Sampler ──────────┘
//! ```
//!
//! Backends run one at a time. During a run the workload executes on a
//! blocking thread while the sampler task polls the host; the two share no
//! mutable state.
//!
//! # Example
//! ```no_run
//! use profiler::{ExperimentContext, Orchestrator, ProfilerConfig, ReportAssembler};
//!
//! # async fn example() -> Result<(), profiler::ProfilerError> {
//! let config = ProfilerConfig::default();
//! let ctx = ExperimentContext::new(config.clone());
//! let orchestrator = Orchestrator::new(config.clone())?;
//!
//! let comparison = orchestrator.compare(&config.backends, config.objective).await?;
//! let assembler = ReportAssembler::new(&config.report_dir);
//! let report = assembler.assemble(&ctx, orchestrator.workload().info(), &comparison)?;
//! let paths = assembler.write(&report)?;
//! println!("{}", paths.json.display());
//! # Ok(())
//! # }
//! ```

mod abort;
mod backend;
mod config;
mod error;
mod experiment;
mod metrics;
mod orchestrator;
mod report;
mod workload;

pub use abort::{abort_channel, AbortHandle, AbortSignal};
pub use backend::{Backend, BackendCapabilities, BackendFactory, BackendRegistry, CpuBackend};
pub use config::{AnalysisConfig, ProfilerConfig, WorkloadConfig};
pub use error::ProfilerError;
pub use experiment::{EnvironmentInfo, ExperimentContext, ExperimentMetadata, TOOL_VERSION};
pub use metrics::{ExecutionOutcome, UnitMetrics};
pub use orchestrator::{BackendProfile, Comparison, Orchestrator, SourceFactory};
pub use report::{
    load_report, verify_report_file, CsvSummary, Report, ReportAssembler, ReportBody,
    ReportMetrics, ReportPaths,
};
pub use workload::{SyntheticTextWorkload, Workload, WorkloadInfo};
