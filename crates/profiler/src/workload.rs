// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Workloads executed by backends.
//!
//! A [`Workload`] is split into independent units (one per prompt for
//! text generation) so a backend can spread them across its workers. Each
//! unit reports how many tokens it produced.

use crate::config::WorkloadConfig;
use std::sync::atomic::{AtomicBool, Ordering};

/// Describes a workload in reports.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkloadInfo {
    pub kind: String,
    pub model: String,
    pub max_new_tokens: usize,
    pub hidden_size: usize,
    pub prompt_count: usize,
}

/// Token-producing work that a backend can execute.
pub trait Workload: Send + Sync {
    fn name(&self) -> &str;

    /// Number of independent units.
    fn units(&self) -> usize;

    /// Runs unit `index` and returns the tokens it generated.
    ///
    /// Implementations stop early once `cancel` is set and return the
    /// tokens produced up to that point.
    fn run_unit(&self, index: usize, cancel: &AtomicBool) -> u64;

    fn info(&self) -> WorkloadInfo;
}

/// Deterministic stand-in for greedy text generation.
///
/// Every generated token costs one dense `hidden × hidden` matrix-vector
/// product followed by a `tanh` activation; the emitted token id is the
/// arg-max of the product. The weights and the prompt embedding are fixed
/// functions of their indices, so identical configs generate identical
/// token streams.
#[derive(Debug, Clone)]
pub struct SyntheticTextWorkload {
    prompts: Vec<String>,
    max_new_tokens: usize,
    hidden: usize,
    /// Row-major `hidden × hidden`.
    weights: Vec<f32>,
}

impl SyntheticTextWorkload {
    pub fn new(config: &WorkloadConfig) -> Self {
        let hidden = config.hidden_size.max(1);
        let scale = 2.0 / (hidden as f32).sqrt();
        let weights = (0..hidden * hidden)
            .map(|i| {
                let (r, c) = (i / hidden, i % hidden);
                let h = (r * 7919 + c * 104_729) % 2003;
                (h as f32 / 2003.0 - 0.5) * scale
            })
            .collect();

        tracing::debug!(
            "synthetic workload: {} prompts, {} tokens each, hidden {}",
            config.prompts.len(),
            config.max_new_tokens,
            hidden,
        );

        Self {
            prompts: config.prompts.clone(),
            max_new_tokens: config.max_new_tokens,
            hidden,
            weights,
        }
    }

    /// Generates up to `max_new_tokens` token ids for `prompt`.
    pub fn generate(&self, prompt: &str, cancel: &AtomicBool) -> Vec<u32> {
        let mut state = self.embed(prompt);
        let mut next = vec![0.0f32; self.hidden];
        let mut tokens = Vec::with_capacity(self.max_new_tokens);

        for _ in 0..self.max_new_tokens {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            self.matvec(&state, &mut next);
            tokens.push(argmax(&next));
            for (s, &n) in state.iter_mut().zip(next.iter()) {
                *s = n.tanh();
            }
        }
        tokens
    }

    fn embed(&self, prompt: &str) -> Vec<f32> {
        let bytes = prompt.as_bytes();
        (0..self.hidden)
            .map(|i| {
                let b = if bytes.is_empty() { 1 } else { bytes[i % bytes.len()] };
                (b as f32 * (i + 1) as f32 * 0.01).sin() * 0.5
            })
            .collect()
    }

    fn matvec(&self, x: &[f32], out: &mut [f32]) {
        for (row, o) in self.weights.chunks_exact(self.hidden).zip(out.iter_mut()) {
            *o = row.iter().zip(x.iter()).map(|(w, v)| w * v).sum();
        }
    }
}

fn argmax(values: &[f32]) -> u32 {
    values
        .iter()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0 as u32
}

impl Workload for SyntheticTextWorkload {
    fn name(&self) -> &str {
        "text-generation"
    }

    fn units(&self) -> usize {
        self.prompts.len()
    }

    fn run_unit(&self, index: usize, cancel: &AtomicBool) -> u64 {
        match self.prompts.get(index) {
            Some(prompt) => self.generate(prompt, cancel).len() as u64,
            None => 0,
        }
    }

    fn info(&self) -> WorkloadInfo {
        WorkloadInfo {
            kind: self.name().to_string(),
            model: "synthetic-matvec".to_string(),
            max_new_tokens: self.max_new_tokens,
            hidden_size: self.hidden,
            prompt_count: self.prompts.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SyntheticTextWorkload {
        SyntheticTextWorkload::new(&WorkloadConfig {
            max_new_tokens: 12,
            hidden_size: 16,
            prompts: vec!["alpha".into(), "beta".into()],
        })
    }

    #[test]
    fn test_generates_requested_tokens() {
        let w = small();
        let cancel = AtomicBool::new(false);
        assert_eq!(w.units(), 2);
        assert_eq!(w.run_unit(0, &cancel), 12);
        assert_eq!(w.run_unit(5, &cancel), 0);
    }

    #[test]
    fn test_deterministic() {
        let cancel = AtomicBool::new(false);
        let a = small().generate("alpha", &cancel);
        let b = small().generate("alpha", &cancel);
        assert_eq!(a, b);
        assert!(a.iter().all(|&t| t < 16));
    }

    #[test]
    fn test_cancel_stops_generation() {
        let w = small();
        let cancel = AtomicBool::new(true);
        assert_eq!(w.run_unit(0, &cancel), 0);
    }

    #[test]
    fn test_info() {
        let info = small().info();
        assert_eq!(info.kind, "text-generation");
        assert_eq!(info.prompt_count, 2);
        assert_eq!(info.hidden_size, 16);
    }
}
