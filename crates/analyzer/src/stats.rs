// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Descriptive statistics over plain value lists.

use crate::AnalyzerError;
use serde::{Deserialize, Serialize};

/// z-score of the two-sided 95% normal confidence interval.
const Z_95: f64 = 1.96;

/// Summary statistics of a list of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (`n - 1`); zero for fewer than two values.
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    /// `stddev / mean`, or zero when the mean is zero.
    pub coefficient_of_variation: f64,
    /// Half-width of the 95% confidence interval of the mean.
    pub confidence_95: f64,
    pub samples: usize,
}

/// Aggregates `values` into an [`Aggregate`].
pub fn aggregate(values: &[f64]) -> Result<Aggregate, AnalyzerError> {
    if values.is_empty() {
        return Err(AnalyzerError::EmptyInput { stage: "aggregate" });
    }

    let mean_val = mean(values);
    let stddev = sample_variance(values).sqrt();
    let n = values.len();

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };

    let coefficient_of_variation = if mean_val != 0.0 { stddev / mean_val } else { 0.0 };
    let confidence_95 = if n < 2 {
        0.0
    } else {
        Z_95 * stddev / (n as f64).sqrt()
    };

    Ok(Aggregate {
        mean: mean_val,
        median,
        stddev,
        min: sorted[0],
        max: sorted[n - 1],
        coefficient_of_variation,
        confidence_95,
        samples: n,
    })
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (`n - 1` denominator); zero for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    ss / (values.len() - 1) as f64
}

/// Drops values more than `threshold` standard deviations from the mean.
///
/// Lists shorter than three values, lists with zero spread, and filters
/// that would remove everything are returned unchanged.
pub fn filter_outliers(values: &[f64], threshold: f64) -> Vec<f64> {
    if values.len() < 3 {
        return values.to_vec();
    }

    let m = mean(values);
    let std = sample_variance(values).sqrt();
    if std == 0.0 {
        return values.to_vec();
    }

    let kept: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| (v - m).abs() <= threshold * std)
        .collect();

    if kept.is_empty() {
        values.to_vec()
    } else {
        if kept.len() < values.len() {
            tracing::debug!(
                "outlier filter removed {} of {} values",
                values.len() - kept.len(),
                values.len(),
            );
        }
        kept
    }
}

/// Percentage change from `baseline` to `candidate`.
///
/// Positive means the candidate is larger. A zero baseline yields `0.0`.
pub fn relative_improvement(baseline: f64, candidate: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (candidate - baseline) / baseline * 100.0
}
