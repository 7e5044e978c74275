// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The per-run [`Scorecard`].

use serde::{Deserialize, Serialize};

/// Scores derived from exactly one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub backend_id: String,
    /// Composite efficiency in `[0, 1]`.
    pub efficiency_score: f64,
    /// Utilisation stability in `[0, 1]`.
    pub stability_score: f64,
    /// Estimated energy in CPU-seconds (`mean_cpu × duration`).
    pub energy_proxy: f64,
    /// Energy proxy per 1000 generated tokens; zero when nothing was generated.
    pub energy_per_1k_tokens: f64,
    /// Throughput in tokens/sec.
    pub throughput: f64,
    pub tokens_generated: u64,
}

impl Scorecard {
    /// Builds a scorecard from already-computed values, with no token
    /// accounting. Mostly useful for ranking tests and fixtures.
    ///
    /// NaN inputs are stored as zero so they can never outrank a real score.
    pub fn new(
        backend_id: impl Into<String>,
        efficiency_score: f64,
        stability_score: f64,
        energy_proxy: f64,
        throughput: f64,
    ) -> Self {
        Self {
            backend_id: backend_id.into(),
            efficiency_score: finite_or_zero(efficiency_score),
            stability_score: finite_or_zero(stability_score),
            energy_proxy: finite_or_zero(energy_proxy),
            energy_per_1k_tokens: 0.0,
            throughput: finite_or_zero(throughput),
            tokens_generated: 0,
        }
    }

    /// One-line rendering for logs and CLI tables.
    pub fn summary(&self) -> String {
        format!(
            "{}: efficiency {:.4}, stability {:.4}, {:.2} tok/s, energy {:.3} cpu-s",
            self.backend_id,
            self.efficiency_score,
            self.stability_score,
            self.throughput,
            self.energy_proxy,
        )
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_maps_nan_to_zero() {
        let card = Scorecard::new("cpu", f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        assert_eq!(card.efficiency_score, 0.0);
        assert_eq!(card.stability_score, 0.0);
        assert_eq!(card.energy_proxy, 0.0);
        assert_eq!(card.throughput, 0.0);
    }

    #[test]
    fn test_new_keeps_finite_values() {
        let card = Scorecard::new("gpu", 0.7, 0.9, 3.5, 42.0);
        assert_eq!(card.efficiency_score, 0.7);
        assert_eq!(card.throughput, 42.0);
        assert!(card.summary().starts_with("gpu: efficiency 0.7000"));
    }
}
