// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The weighted efficiency model.

use crate::{Scorecard, ScoringConfig, ScoringError};
use analyzer::{RunResult, SeriesSummary};

/// Scores runs against a validated [`ScoringConfig`].
///
/// Scoring is a pure function of the run, its summary and the config.
#[derive(Debug, Clone, Copy)]
pub struct EfficiencyModel {
    config: ScoringConfig,
}

impl EfficiencyModel {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Derives the [`Scorecard`] for one run.
    pub fn score(&self, run: &RunResult, summary: &SeriesSummary) -> Scorecard {
        let weights = &self.config.weights;
        let reference = &self.config.reference;

        let throughput = run.throughput_tokens_per_sec();
        let stability = unit(summary.stability_score);
        let energy_proxy = summary.mean_cpu.max(0.0) * run.duration_seconds();

        let throughput_norm = unit(throughput / reference.throughput_ceiling_tps);
        let energy_norm = unit(energy_proxy / reference.energy_ceiling_cpu_seconds);

        let efficiency = unit(
            weights.throughput * throughput_norm
                + weights.stability * stability
                + weights.energy * (1.0 - energy_norm),
        );

        let tokens = run.tokens_generated();
        let energy_per_1k_tokens = if tokens > 0 {
            energy_proxy / tokens as f64 * 1000.0
        } else {
            0.0
        };

        tracing::debug!(
            backend = run.backend_id(),
            efficiency,
            stability,
            energy_proxy,
            throughput,
            "Scored run"
        );

        Scorecard {
            backend_id: run.backend_id().to_string(),
            efficiency_score: efficiency,
            stability_score: stability,
            energy_proxy,
            energy_per_1k_tokens,
            throughput,
            tokens_generated: tokens,
        }
    }
}

/// Clamps into `[0, 1]`, mapping NaN to zero.
fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReferenceRanges, ScoringWeights};
    use telemetry::TelemetrySeries;

    fn summary(mean_cpu: f64, stability: f64) -> SeriesSummary {
        SeriesSummary {
            sample_count: 10,
            mean_cpu,
            mean_mem: 0.4,
            mean_gpu: None,
            utilization_variance: 0.0,
            stability_score: stability,
        }
    }

    fn run(backend: &str, tps: f64, tokens: u64, secs: f64) -> RunResult {
        RunResult::new(backend, tps, tokens, secs, TelemetrySeries::new())
    }

    #[test]
    fn test_rejects_invalid_config() {
        let bad = ScoringConfig {
            weights: ScoringWeights {
                throughput: 1.0,
                stability: 1.0,
                energy: 1.0,
            },
            ..Default::default()
        };
        assert!(EfficiencyModel::new(bad).is_err());
    }

    #[test]
    fn test_known_values() {
        let model = EfficiencyModel::new(ScoringConfig::default()).unwrap();
        // energy = 0.5 * 4.0 = 2.0 cpu-s -> norm 0.2
        let card = model.score(&run("cpu", 50.0, 200, 4.0), &summary(0.5, 0.8));

        let expected = 0.4 * 0.5 + 0.3 * 0.8 + 0.3 * (1.0 - 0.2);
        assert!((card.efficiency_score - expected).abs() < 1e-12);
        assert!((card.energy_proxy - 2.0).abs() < 1e-12);
        assert!((card.energy_per_1k_tokens - 10.0).abs() < 1e-12);
        assert_eq!(card.tokens_generated, 200);
        assert_eq!(card.backend_id, "cpu");
    }

    #[test]
    fn test_terms_saturate() {
        let model = EfficiencyModel::new(ScoringConfig::default()).unwrap();
        let card = model.score(&run("cpu", 10_000.0, 1, 1000.0), &summary(1.0, 1.0));
        // throughput saturates at 1.0, energy saturates to the worst term
        assert!((card.efficiency_score - 0.7).abs() < 1e-12);
        assert!(card.efficiency_score <= 1.0);
    }

    #[test]
    fn test_no_tokens_no_per_token_energy() {
        let model = EfficiencyModel::new(ScoringConfig::default()).unwrap();
        let card = model.score(&run("cpu", 0.0, 0, 2.0), &summary(0.5, 1.0));
        assert_eq!(card.energy_per_1k_tokens, 0.0);
        assert!(card.efficiency_score >= 0.0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let model = EfficiencyModel::new(ScoringConfig {
            weights: ScoringWeights {
                throughput: 0.2,
                stability: 0.5,
                energy: 0.3,
            },
            reference: ReferenceRanges {
                throughput_ceiling_tps: 80.0,
                energy_ceiling_cpu_seconds: 5.0,
            },
        })
        .unwrap();
        let r = run("cpu", 42.0, 420, 10.0);
        let s = summary(0.33, 0.91);
        assert_eq!(model.score(&r, &s), model.score(&r, &s));
    }
}
