// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sealed report artifacts.
//!
//! A [`Report`] is assembled from a finished [`Comparison`], sealed with
//! the integrity layer and written as pretty JSON (`<run_id>.json`) plus a
//! one-row CSV summary (`<run_id>.csv`). The fingerprint covers every
//! top-level field except `integrity` itself, so any edit to the JSON file
//! is caught by [`verify_report_file`].

use crate::{Comparison, EnvironmentInfo, ExperimentContext, ExperimentMetadata, ProfilerError};
use crate::workload::WorkloadInfo;
use analyzer::RunStatistics;
use integrity::{IntegrityRecord, IntegrityReport};
use scoring::{ObjectiveMode, Recommendation};
use std::path::{Path, PathBuf};

/// Headline numbers of the winning backend.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReportMetrics {
    pub throughput: f64,
    pub efficiency: f64,
    pub stability: f64,
    pub energy_proxy: f64,
    pub energy_per_1k_tokens: f64,
    pub tokens_generated: u64,
}

/// Everything the fingerprint covers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReportBody {
    pub run_id: String,
    pub experiment: ExperimentMetadata,
    pub environment: EnvironmentInfo,
    pub workload: WorkloadInfo,
    /// The recommended backend.
    pub backend: String,
    pub mode: ObjectiveMode,
    pub metrics: ReportMetrics,
    pub recommendation: Recommendation,
    pub run_statistics: Vec<RunStatistics>,
}

/// A sealed report as written to disk.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Report {
    #[serde(flatten)]
    pub body: ReportBody,
    pub integrity: IntegrityRecord,
}

impl Report {
    /// Seals `body`.
    pub fn seal(body: ReportBody) -> Result<Self, ProfilerError> {
        let integrity = integrity::seal(&body)?;
        Ok(Self { body, integrity })
    }

    /// Whether the body still matches its seal.
    pub fn verify(&self) -> Result<bool, ProfilerError> {
        Ok(integrity::verify(&self.body, &self.integrity)?)
    }

    /// The flattened CSV row.
    pub fn csv_summary(&self) -> CsvSummary {
        let m = &self.body.metrics;
        CsvSummary {
            run_id: self.body.run_id.clone(),
            backend: self.body.backend.clone(),
            mode: self.body.mode.to_string(),
            throughput_tokens_per_sec: m.throughput,
            efficiency_score: m.efficiency,
            stability_score: m.stability,
            energy_per_1k_tokens: m.energy_per_1k_tokens,
            fingerprint: self.integrity.fingerprint.clone(),
        }
    }

    /// Renders the CSV summary, header included.
    pub fn to_csv(&self) -> Result<String, ProfilerError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.serialize(self.csv_summary())
            .map_err(|e| ProfilerError::Report(format!("CSV write error: {e}")))?;
        let data = wtr
            .into_inner()
            .map_err(|e| ProfilerError::Report(format!("CSV writer error: {e}")))?;
        String::from_utf8(data)
            .map_err(|e| ProfilerError::Report(format!("UTF-8 conversion error: {e}")))
    }
}

/// One-row summary written beside the JSON report.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CsvSummary {
    pub run_id: String,
    pub backend: String,
    pub mode: String,
    pub throughput_tokens_per_sec: f64,
    pub efficiency_score: f64,
    pub stability_score: f64,
    pub energy_per_1k_tokens: f64,
    pub fingerprint: String,
}

/// Paths of a written report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

/// Builds, seals and persists reports.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    report_dir: PathBuf,
}

impl ReportAssembler {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Builds and seals the report for `comparison`.
    pub fn assemble(
        &self,
        ctx: &ExperimentContext,
        workload: WorkloadInfo,
        comparison: &Comparison,
    ) -> Result<Report, ProfilerError> {
        let recommendation = comparison.recommendation.clone();
        let winner = recommendation
            .winner()
            .ok_or_else(|| ProfilerError::Report("recommendation has no scorecards".into()))?;

        let metrics = ReportMetrics {
            throughput: winner.throughput,
            efficiency: winner.efficiency_score,
            stability: winner.stability_score,
            energy_proxy: winner.energy_proxy,
            energy_per_1k_tokens: winner.energy_per_1k_tokens,
            tokens_generated: winner.tokens_generated,
        };

        let body = ReportBody {
            run_id: ctx.next_run_id(),
            experiment: ctx.metadata(),
            environment: ctx.environment().clone(),
            workload,
            backend: recommendation.winning_backend_id.clone(),
            mode: recommendation.objective_mode,
            metrics,
            run_statistics: comparison.statistics(),
            recommendation,
        };

        let report = Report::seal(body)?;
        tracing::info!(
            "report {} sealed: {} {}",
            report.body.run_id,
            report.integrity.hash_algorithm,
            report.integrity.fingerprint,
        );
        Ok(report)
    }

    /// Writes `<run_id>.json` and `<run_id>.csv` into the report directory.
    pub fn write(&self, report: &Report) -> Result<ReportPaths, ProfilerError> {
        std::fs::create_dir_all(&self.report_dir)
            .map_err(|e| ProfilerError::io(&self.report_dir, e))?;

        let json_path = self.report_dir.join(format!("{}.json", report.body.run_id));
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| ProfilerError::Report(format!("JSON serialise error: {e}")))?;
        std::fs::write(&json_path, json).map_err(|e| ProfilerError::io(&json_path, e))?;

        let csv_path = self.report_dir.join(format!("{}.csv", report.body.run_id));
        std::fs::write(&csv_path, report.to_csv()?)
            .map_err(|e| ProfilerError::io(&csv_path, e))?;

        tracing::info!("report written to {}", json_path.display());
        Ok(ReportPaths {
            json: json_path,
            csv: csv_path,
        })
    }
}

/// Loads a typed report from disk.
pub fn load_report(path: &Path) -> Result<Report, ProfilerError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProfilerError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        ProfilerError::Report(format!("cannot parse report '{}': {e}", path.display()))
    })
}

/// Re-reads a JSON report and checks it against its integrity envelope.
///
/// Works on the raw JSON document, so reports with unknown extra fields
/// are still checked (and any such field counts as content).
pub fn verify_report_file(path: &Path) -> Result<IntegrityReport, ProfilerError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProfilerError::io(path, e))?;
    let document: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
        ProfilerError::Report(format!("cannot parse report '{}': {e}", path.display()))
    })?;
    let result = integrity::verify_document(&document)?;
    tracing::info!(
        "verified {}: {} ({})",
        path.display(),
        result.status,
        result.fingerprint
    );
    Ok(result)
}
