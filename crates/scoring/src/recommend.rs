// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Ranking scorecards under an objective.

use crate::{ObjectiveMode, Scorecard, ScoringError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Below this stability the rationale carries a deployment caution.
pub const MIN_ACCEPTABLE_STABILITY: f64 = 0.60;

/// The outcome of ranking scorecards under one objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub objective_mode: ObjectiveMode,
    pub winning_backend_id: String,
    /// All scorecards, best first.
    pub scorecards: Vec<Scorecard>,
    pub rationale: String,
}

impl Recommendation {
    /// The winning scorecard.
    pub fn winner(&self) -> Option<&Scorecard> {
        self.scorecards.first()
    }
}

/// Ranks `scorecards` under `mode` and names a winner.
///
/// The result depends only on the scorecard values, never on input order.
pub fn recommend(
    scorecards: &[Scorecard],
    mode: ObjectiveMode,
) -> Result<Recommendation, ScoringError> {
    if scorecards.is_empty() {
        return Err(ScoringError::EmptyInput { stage: "recommend" });
    }

    let mut ranked = scorecards.to_vec();
    ranked.sort_by(|a, b| rank(mode, a, b));

    let winner = &ranked[0];
    let rationale = rationale(mode, winner);

    tracing::info!(
        objective = %mode,
        winner = %winner.backend_id,
        candidates = ranked.len(),
        "Recommendation ready"
    );

    Ok(Recommendation {
        objective_mode: mode,
        winning_backend_id: winner.backend_id.clone(),
        rationale,
        scorecards: ranked,
    })
}

/// Orders better candidates first. Total over all scorecard fields.
fn rank(mode: ObjectiveMode, a: &Scorecard, b: &Scorecard) -> Ordering {
    let primary = match mode {
        ObjectiveMode::Performance => b
            .throughput
            .total_cmp(&a.throughput)
            .then_with(|| b.efficiency_score.total_cmp(&a.efficiency_score)),
        ObjectiveMode::Sustainability => b
            .efficiency_score
            .total_cmp(&a.efficiency_score)
            .then_with(|| b.stability_score.total_cmp(&a.stability_score))
            .then_with(|| b.throughput.total_cmp(&a.throughput)),
    };

    primary
        .then_with(|| a.backend_id.cmp(&b.backend_id))
        .then_with(|| a.energy_proxy.total_cmp(&b.energy_proxy))
        .then_with(|| b.stability_score.total_cmp(&a.stability_score))
        .then_with(|| a.energy_per_1k_tokens.total_cmp(&b.energy_per_1k_tokens))
        .then_with(|| b.tokens_generated.cmp(&a.tokens_generated))
}

fn rationale(mode: ObjectiveMode, w: &Scorecard) -> String {
    let mut text = match mode {
        ObjectiveMode::Performance => format!(
            "{} selected for performance: highest throughput at {:.2} tok/s \
             (efficiency {:.4}, stability {:.4})",
            w.backend_id, w.throughput, w.efficiency_score, w.stability_score
        ),
        ObjectiveMode::Sustainability => format!(
            "{} selected for sustainability: highest efficiency at {:.4} \
             (stability {:.4}, energy proxy {:.3} cpu-s, {:.3} cpu-s per 1K tokens, {:.2} tok/s)",
            w.backend_id,
            w.efficiency_score,
            w.stability_score,
            w.energy_proxy,
            w.energy_per_1k_tokens,
            w.throughput
        ),
    };

    if w.stability_score < MIN_ACCEPTABLE_STABILITY {
        text.push_str(&format!(
            "; caution: stability {:.2} is below {:.2}, expect uneven latency",
            w.stability_score, MIN_ACCEPTABLE_STABILITY
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EfficiencyModel, ScoringConfig, ScoringWeights};
    use analyzer::{RunResult, SeriesSummary};
    use proptest::prelude::*;
    use telemetry::TelemetrySeries;

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            recommend(&[], ObjectiveMode::Performance),
            Err(ScoringError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_single_candidate_wins_both_modes() {
        let cards = vec![Scorecard::new("cpu", 0.5, 0.9, 1.0, 20.0)];
        for mode in ObjectiveMode::ALL {
            let rec = recommend(&cards, mode).unwrap();
            assert_eq!(rec.winning_backend_id, "cpu");
            assert_eq!(rec.winner().map(|c| c.backend_id.as_str()), Some("cpu"));
        }
    }

    #[test]
    fn test_objective_changes_winner() {
        // Stability-leaning weights; equal energy for both backends.
        let model = EfficiencyModel::new(ScoringConfig {
            weights: ScoringWeights {
                throughput: 0.1,
                stability: 0.6,
                energy: 0.3,
            },
            ..Default::default()
        })
        .unwrap();

        let summary = |stability| SeriesSummary {
            sample_count: 20,
            mean_cpu: 0.5,
            mean_mem: 0.3,
            mean_gpu: None,
            utilization_variance: 0.0,
            stability_score: stability,
        };
        let a = model.score(
            &RunResult::new("A", 53.95, 539, 10.0, TelemetrySeries::new()),
            &summary(0.94),
        );
        let b = model.score(
            &RunResult::new("B", 40.0, 400, 10.0, TelemetrySeries::new()),
            &summary(0.99),
        );
        let cards = vec![a, b];

        let sustain = recommend(&cards, ObjectiveMode::Sustainability).unwrap();
        assert_eq!(sustain.winning_backend_id, "B");
        assert!(sustain.rationale.starts_with("B selected for sustainability"));

        let perf = recommend(&cards, ObjectiveMode::Performance).unwrap();
        assert_eq!(perf.winning_backend_id, "A");
    }

    #[test]
    fn test_full_tie_breaks_on_backend_id() {
        let cards = vec![
            Scorecard::new("zeta", 0.5, 0.9, 1.0, 20.0),
            Scorecard::new("alpha", 0.5, 0.9, 1.0, 20.0),
        ];
        for mode in ObjectiveMode::ALL {
            assert_eq!(recommend(&cards, mode).unwrap().winning_backend_id, "alpha");
        }
    }

    #[test]
    fn test_performance_throughput_tie_goes_to_efficiency() {
        let cards = vec![
            Scorecard::new("a-slow", 0.40, 0.9, 1.0, 30.0),
            Scorecard::new("b-lean", 0.70, 0.9, 1.0, 30.0),
        ];
        let rec = recommend(&cards, ObjectiveMode::Performance).unwrap();
        assert_eq!(rec.winning_backend_id, "b-lean");
    }

    #[test]
    fn test_sustainability_efficiency_tie_goes_to_stability() {
        let cards = vec![
            Scorecard::new("a-jittery", 0.60, 0.70, 1.0, 30.0),
            Scorecard::new("b-steady", 0.60, 0.95, 1.0, 30.0),
        ];
        let rec = recommend(&cards, ObjectiveMode::Sustainability).unwrap();
        assert_eq!(rec.winning_backend_id, "b-steady");
    }

    #[test]
    fn test_sustainability_stability_tie_goes_to_throughput() {
        let cards = vec![
            Scorecard::new("a-slow", 0.60, 0.90, 1.0, 20.0),
            Scorecard::new("b-fast", 0.60, 0.90, 1.0, 35.0),
        ];
        let rec = recommend(&cards, ObjectiveMode::Sustainability).unwrap();
        assert_eq!(rec.winning_backend_id, "b-fast");
    }

    #[test]
    fn test_nan_throughput_does_not_win() {
        let cards = vec![
            Scorecard::new("a-broken", 0.9, 0.9, 1.0, f64::NAN),
            Scorecard::new("b-real", 0.5, 0.9, 1.0, 10.0),
        ];
        let rec = recommend(&cards, ObjectiveMode::Performance).unwrap();
        assert_eq!(rec.winning_backend_id, "b-real");
    }

    #[test]
    fn test_low_stability_caution() {
        let cards = vec![Scorecard::new("cpu", 0.4, 0.55, 1.0, 20.0)];
        let rec = recommend(&cards, ObjectiveMode::Sustainability).unwrap();
        assert!(rec.rationale.contains("caution"));

        let steady = vec![Scorecard::new("cpu", 0.4, 0.95, 1.0, 20.0)];
        let rec = recommend(&steady, ObjectiveMode::Sustainability).unwrap();
        assert!(!rec.rationale.contains("caution"));
    }

    #[test]
    fn test_rationale_is_deterministic() {
        let cards = vec![
            Scorecard::new("a", 0.61, 0.8, 2.0, 30.0),
            Scorecard::new("b", 0.66, 0.7, 1.0, 25.0),
        ];
        let first = recommend(&cards, ObjectiveMode::Sustainability).unwrap();
        let second = recommend(&cards, ObjectiveMode::Sustainability).unwrap();
        assert_eq!(first, second);
    }

    fn cards_strategy() -> impl Strategy<Value = Vec<Scorecard>> {
        prop::collection::vec((0.0f64..1.0, 0.0f64..1.0, 0.0f64..200.0, 0u8..4), 1..12).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (eff, stab, tps, bucket))| {
                        // Coarse buckets force frequent ties on the primary keys.
                        let eff = (eff * 4.0).floor() / 4.0;
                        let tps = (tps / 50.0).floor() * 50.0;
                        Scorecard::new(format!("b{}-{i}", bucket), eff, stab, 1.0, tps)
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn test_ranking_ignores_input_order(
            (cards, shuffled) in cards_strategy()
                .prop_flat_map(|c| (Just(c.clone()), Just(c).prop_shuffle()))
        ) {
            for mode in ObjectiveMode::ALL {
                let a = recommend(&cards, mode).unwrap();
                let b = recommend(&shuffled, mode).unwrap();
                prop_assert_eq!(&a.winning_backend_id, &b.winning_backend_id);
                prop_assert_eq!(a.scorecards, b.scorecards);
            }
        }

        #[test]
        fn test_winner_is_maximal(cards in cards_strategy()) {
            let perf = recommend(&cards, ObjectiveMode::Performance).unwrap();
            let best_tps = cards.iter().map(|c| c.throughput).fold(f64::MIN, f64::max);
            prop_assert_eq!(perf.winner().unwrap().throughput, best_tps);

            let sus = recommend(&cards, ObjectiveMode::Sustainability).unwrap();
            let best_eff = cards.iter().map(|c| c.efficiency_score).fold(f64::MIN, f64::max);
            prop_assert_eq!(sus.winner().unwrap().efficiency_score, best_eff);
        }
    }
}
