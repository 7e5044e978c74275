// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Completed profiling runs and cross-run statistics.

use crate::stats::{aggregate, filter_outliers, Aggregate};
use crate::AnalyzerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use telemetry::{Sample, TelemetrySeries};

/// The outcome of one workload execution on one backend, together with the
/// telemetry sampled while it ran.
///
/// A `RunResult` is built once the run has finished and is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    backend_id: String,
    throughput_tokens_per_sec: f64,
    tokens_generated: u64,
    duration_seconds: f64,
    series: TelemetrySeries,
}

impl RunResult {
    /// Creates a run from the values reported by the backend adapter.
    ///
    /// Negative or non-finite throughput/duration are stored as `0.0`.
    pub fn new(
        backend_id: impl Into<String>,
        throughput_tokens_per_sec: f64,
        tokens_generated: u64,
        duration_seconds: f64,
        series: TelemetrySeries,
    ) -> Self {
        Self {
            backend_id: backend_id.into(),
            throughput_tokens_per_sec: non_negative(throughput_tokens_per_sec),
            tokens_generated,
            duration_seconds: non_negative(duration_seconds),
            series,
        }
    }

    /// Creates a run from a token count and wall-clock duration, deriving
    /// the throughput.
    pub fn from_execution(
        backend_id: impl Into<String>,
        tokens_generated: u64,
        duration: Duration,
        series: TelemetrySeries,
    ) -> Self {
        let secs = duration.as_secs_f64();
        let throughput = if secs > 0.0 {
            tokens_generated as f64 / secs
        } else {
            0.0
        };
        Self::new(backend_id, throughput, tokens_generated, secs, series)
    }

    /// Folds several measured runs of the same backend into one.
    ///
    /// Tokens and durations are summed and throughput is recomputed from the
    /// totals. Series are concatenated in run order, each shifted past the
    /// end of the previous one so timestamps stay strictly increasing.
    pub fn combine(runs: &[RunResult]) -> Result<RunResult, AnalyzerError> {
        let first = runs
            .first()
            .ok_or(AnalyzerError::EmptyInput { stage: "combine runs" })?;

        if let Some(other) = runs.iter().find(|r| r.backend_id != first.backend_id) {
            return Err(AnalyzerError::MixedBackends {
                stage: "combine runs",
                expected: first.backend_id.clone(),
                found: other.backend_id.clone(),
            });
        }

        let mut samples: Vec<Sample> = Vec::new();
        let mut offset = Duration::ZERO;
        let mut skipped = 0;
        let mut tokens = 0u64;
        let mut seconds = 0.0;

        for run in runs {
            samples.extend(run.series.samples().iter().map(|s| Sample {
                timestamp: s.timestamp.saturating_add(offset),
                ..*s
            }));
            let reported = Duration::try_from_secs_f64(run.duration_seconds)
                .unwrap_or(Duration::MAX);
            let run_span = run.series.span().max(reported);
            offset = offset
                .saturating_add(run_span)
                .saturating_add(Duration::from_nanos(1));
            skipped += run.series.skipped_ticks();
            tokens = tokens.saturating_add(run.tokens_generated);
            seconds += run.duration_seconds;
        }

        let throughput = if seconds > 0.0 {
            tokens as f64 / seconds
        } else {
            0.0
        };

        Ok(RunResult::new(
            first.backend_id.clone(),
            throughput,
            tokens,
            seconds,
            TelemetrySeries::from_samples(samples).with_skipped_ticks(skipped),
        ))
    }

    pub fn backend_id(&self) -> &str {
        &self.backend_id
    }

    pub fn throughput_tokens_per_sec(&self) -> f64 {
        self.throughput_tokens_per_sec
    }

    pub fn tokens_generated(&self) -> u64 {
        self.tokens_generated
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// The telemetry sampled during this run.
    pub fn series(&self) -> &TelemetrySeries {
        &self.series
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Spread of latency and throughput across the measured runs of a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub backend_id: String,
    pub measured_runs: usize,
    pub latency_seconds: Aggregate,
    pub throughput_tokens_per_sec: Aggregate,
    /// Outlier threshold in standard deviations, if filtering was applied.
    pub outlier_threshold: Option<f64>,
}

impl RunStatistics {
    /// Aggregates `runs`, optionally dropping outliers beyond
    /// `outlier_threshold` standard deviations first.
    pub fn from_runs(
        runs: &[RunResult],
        outlier_threshold: Option<f64>,
    ) -> Result<Self, AnalyzerError> {
        let first = runs
            .first()
            .ok_or(AnalyzerError::EmptyInput { stage: "run statistics" })?;

        let mut latency: Vec<f64> = runs.iter().map(|r| r.duration_seconds).collect();
        let mut throughput: Vec<f64> = runs.iter().map(|r| r.throughput_tokens_per_sec).collect();

        if let Some(k) = outlier_threshold {
            latency = filter_outliers(&latency, k);
            throughput = filter_outliers(&throughput, k);
        }

        Ok(Self {
            backend_id: first.backend_id.clone(),
            measured_runs: runs.len(),
            latency_seconds: aggregate(&latency)?,
            throughput_tokens_per_sec: aggregate(&throughput)?,
            outlier_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(backend: &str, tokens: u64, secs: f64, cpu: &[f64]) -> RunResult {
        let series = TelemetrySeries::from_samples(
            cpu.iter()
                .enumerate()
                .map(|(i, &c)| Sample::new(Duration::from_millis(100 * i as u64), c, 0.3, None))
                .collect(),
        );
        RunResult::from_execution(backend, tokens, Duration::from_secs_f64(secs), series)
    }

    #[test]
    fn test_from_execution_throughput() {
        let r = run("cpu", 150, 3.0, &[0.5]);
        assert!((r.throughput_tokens_per_sec() - 50.0).abs() < 1e-9);
        assert_eq!(r.tokens_generated(), 150);
    }

    #[test]
    fn test_zero_duration_has_zero_throughput() {
        let r = RunResult::from_execution("cpu", 10, Duration::ZERO, TelemetrySeries::new());
        assert_eq!(r.throughput_tokens_per_sec(), 0.0);
    }

    #[test]
    fn test_new_sanitizes_values() {
        let r = RunResult::new("cpu", f64::NAN, 1, -2.0, TelemetrySeries::new());
        assert_eq!(r.throughput_tokens_per_sec(), 0.0);
        assert_eq!(r.duration_seconds(), 0.0);
    }

    #[test]
    fn test_combine_sums_and_keeps_order() {
        let a = run("cpu", 100, 2.0, &[0.2, 0.4, 0.6]);
        let b = run("cpu", 100, 2.0, &[0.8, 1.0]);
        let c = RunResult::combine(&[a, b]).unwrap();

        assert_eq!(c.tokens_generated(), 200);
        assert!((c.duration_seconds() - 4.0).abs() < 1e-9);
        assert!((c.throughput_tokens_per_sec() - 50.0).abs() < 1e-9);
        assert_eq!(c.series().len(), 5);

        let cpu: Vec<f64> = c.series().cpu_values().collect();
        assert_eq!(cpu, vec![0.2, 0.4, 0.6, 0.8, 1.0]);
        let stamps: Vec<Duration> = c.series().samples().iter().map(|s| s.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_combine_huge_durations_saturates() {
        let series = TelemetrySeries::from_samples(vec![
            Sample::new(Duration::ZERO, 0.5, 0.3, None),
            Sample::new(Duration::from_millis(100), 0.5, 0.3, None),
        ]);
        let r = RunResult::new("cpu", 1.0, 10, 1.0e20, series);
        let c = RunResult::combine(&[r.clone(), r]).unwrap();
        assert_eq!(c.tokens_generated(), 20);
        assert!(c.throughput_tokens_per_sec() >= 0.0);
    }

    #[test]
    fn test_combine_empty() {
        assert!(matches!(
            RunResult::combine(&[]),
            Err(AnalyzerError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_combine_rejects_mixed_backends() {
        let a = run("cpu", 1, 1.0, &[0.5]);
        let b = run("gpu", 1, 1.0, &[0.5]);
        assert!(matches!(
            RunResult::combine(&[a, b]),
            Err(AnalyzerError::MixedBackends { .. })
        ));
    }

    #[test]
    fn test_run_statistics() {
        let runs = vec![
            run("cpu", 100, 2.0, &[0.5]),
            run("cpu", 100, 2.0, &[0.5]),
            run("cpu", 100, 4.0, &[0.5]),
        ];
        let stats = RunStatistics::from_runs(&runs, None).unwrap();
        assert_eq!(stats.measured_runs, 3);
        assert_eq!(stats.latency_seconds.median, 2.0);
        assert_eq!(stats.throughput_tokens_per_sec.max, 50.0);
        assert_eq!(stats.throughput_tokens_per_sec.min, 25.0);
    }

    #[test]
    fn test_run_statistics_empty() {
        assert!(RunStatistics::from_runs(&[], Some(2.5)).is_err());
    }
}
