// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-series summary statistics and the stability score.

use crate::stats::{mean, sample_variance};
use crate::{AnalyzerError, RunResult};
use serde::{Deserialize, Serialize};
use telemetry::TelemetrySeries;

/// Summary of one run's telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Number of samples summarized.
    pub sample_count: usize,
    /// Mean CPU utilisation in `[0, 1]`.
    pub mean_cpu: f64,
    /// Mean memory pressure in `[0, 1]`.
    pub mean_mem: f64,
    /// Mean GPU utilisation over samples that carried one; `None` when
    /// no sample did.
    pub mean_gpu: Option<f64>,
    /// Sample variance of CPU utilisation.
    pub utilization_variance: f64,
    /// `1 - CV(cpu)`, clamped to `[0, 1]`.
    pub stability_score: f64,
}

/// Summarizes a telemetry series.
///
/// Fails with [`AnalyzerError::EmptySeries`] when the series has no
/// samples. A single sample is valid and scores a stability of `1.0`.
pub fn summarize(series: &TelemetrySeries) -> Result<SeriesSummary, AnalyzerError> {
    summarize_for("unattributed", series)
}

/// Summarizes the series of a run, attributing errors to its backend.
pub fn summarize_run(run: &RunResult) -> Result<SeriesSummary, AnalyzerError> {
    summarize_for(run.backend_id(), run.series())
}

fn summarize_for(backend: &str, series: &TelemetrySeries) -> Result<SeriesSummary, AnalyzerError> {
    if series.is_empty() {
        return Err(AnalyzerError::EmptySeries {
            backend: backend.to_string(),
        });
    }

    let cpu: Vec<f64> = series.cpu_values().collect();
    let mem: Vec<f64> = series.memory_values().collect();
    let gpu: Vec<f64> = series.gpu_values().collect();

    let summary = SeriesSummary {
        sample_count: series.len(),
        mean_cpu: mean(&cpu),
        mean_mem: mean(&mem),
        mean_gpu: (!gpu.is_empty()).then(|| mean(&gpu)),
        utilization_variance: sample_variance(&cpu),
        stability_score: stability_score(&cpu),
    };

    tracing::debug!(
        "summary for '{backend}': {} samples, cpu {:.3}, stability {:.4}",
        summary.sample_count,
        summary.mean_cpu,
        summary.stability_score,
    );
    Ok(summary)
}

/// Stability of a utilisation trace: `1 - stddev/mean`, clamped to `[0, 1]`.
///
/// Returns exactly `1.0` for fewer than two values and for a zero mean.
pub fn stability_score(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }

    let m = mean(values);
    if m == 0.0 || !m.is_finite() {
        return 1.0;
    }

    let cv = sample_variance(values).sqrt() / m;
    if !cv.is_finite() {
        return 0.0;
    }
    (1.0 - cv).clamp(0.0, 1.0)
}
