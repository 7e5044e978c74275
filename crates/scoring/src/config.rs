// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Weights and normalisation ranges of the efficiency model.
//!
//! # TOML Format
//! ```toml
//! [weights]
//! throughput = 0.4
//! stability = 0.3
//! energy = 0.3
//!
//! [reference]
//! throughput_ceiling_tps = 100.0
//! energy_ceiling_cpu_seconds = 10.0
//! ```

use crate::ScoringError;
use serde::{Deserialize, Serialize};

/// Allowed drift of the weight sum from exactly one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative weight of each efficiency term. Must sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub throughput: f64,
    pub stability: f64,
    pub energy: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            throughput: 0.4,
            stability: 0.3,
            energy: 0.3,
        }
    }
}

/// Ceilings that map raw measurements onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRanges {
    /// Throughput (tokens/sec) that scores a full `1.0`.
    pub throughput_ceiling_tps: f64,
    /// Energy proxy (CPU-seconds) that scores the worst energy term.
    pub energy_ceiling_cpu_seconds: f64,
}

impl Default for ReferenceRanges {
    fn default() -> Self {
        Self {
            throughput_ceiling_tps: 100.0,
            energy_ceiling_cpu_seconds: 10.0,
        }
    }
}

/// Complete efficiency model configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoringWeights,
    #[serde(default)]
    pub reference: ReferenceRanges,
}

impl ScoringConfig {
    /// Checks that weights are non-negative and sum to one, and that both
    /// ceilings are positive.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let w = &self.weights;
        for (name, value) in [
            ("throughput", w.throughput),
            ("stability", w.stability),
            ("energy", w.energy),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidConfig(format!(
                    "weight '{name}' must be a non-negative number, got {value}"
                )));
            }
        }

        let sum = w.throughput + w.stability + w.energy;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::InvalidConfig(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }

        let r = &self.reference;
        for (name, value) in [
            ("throughput_ceiling_tps", r.throughput_ceiling_tps),
            ("energy_ceiling_cpu_seconds", r.energy_ceiling_cpu_seconds),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScoringError::InvalidConfig(format!(
                    "reference '{name}' must be positive, got {value}"
                )));
            }
        }

        Ok(())
    }
}
