// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution metrics reported by a backend.
//!
//! [`ExecutionOutcome`] is what a backend hands back after running a
//! workload: token count and wall-clock time, plus per-unit detail for
//! logs. Telemetry is collected separately by the sampler.

use std::time::Duration;

/// Metrics for one completed workload unit.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UnitMetrics {
    pub index: usize,
    pub tokens: u64,
    pub duration: Duration,
}

/// Aggregate metrics for a complete workload execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExecutionOutcome {
    pub backend_id: String,
    /// Worker threads the backend used.
    pub threads: usize,
    /// Total wall-clock time for the execution.
    pub duration: Duration,
    pub tokens_generated: u64,
    pub units: Vec<UnitMetrics>,
    /// Whether execution stopped early on a cancel request.
    pub cancelled: bool,
}

impl ExecutionOutcome {
    /// Creates an empty outcome.
    pub fn new(backend_id: impl Into<String>, threads: usize) -> Self {
        Self {
            backend_id: backend_id.into(),
            threads,
            duration: Duration::ZERO,
            tokens_generated: 0,
            units: Vec::new(),
            cancelled: false,
        }
    }

    /// Records one completed unit.
    pub fn record_unit(&mut self, index: usize, tokens: u64, duration: Duration) {
        self.tokens_generated += tokens;
        self.units.push(UnitMetrics {
            index,
            tokens,
            duration,
        });
    }

    /// Finalises with the total wall-clock time.
    pub fn finalise(&mut self, total: Duration, cancelled: bool) {
        self.duration = total;
        self.cancelled = cancelled;
        self.units.sort_by_key(|u| u.index);
    }

    /// Returns tokens per second throughput.
    pub fn tokens_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs <= 0.0 || self.tokens_generated == 0 {
            return 0.0;
        }
        self.tokens_generated as f64 / secs
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Execution on {}: {:.2}ms total, {} units on {} threads, {} tokens ({:.1} tok/s){}",
            self.backend_id,
            self.duration.as_secs_f64() * 1000.0,
            self.units.len(),
            self.threads,
            self.tokens_generated,
            self.tokens_per_second(),
            if self.cancelled { ", cancelled" } else { "" },
        )
    }
}
