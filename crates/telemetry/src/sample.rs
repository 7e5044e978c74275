// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Telemetry samples and the per-run time series.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One telemetry reading taken at a sampler tick.
///
/// Utilisation values are fractions in `[0.0, 1.0]`. A `None` GPU value
/// means the host had no GPU source; it is not the same as an idle GPU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Time since the sampler started.
    pub timestamp: Duration,
    /// CPU busy fraction.
    pub cpu_utilization: f64,
    /// Fraction of physical memory in use.
    pub memory_pressure: f64,
    /// GPU busy fraction, absent when no GPU source exists.
    pub gpu_utilization: Option<f64>,
}

impl Sample {
    /// Builds a sample, clamping every utilisation to `[0.0, 1.0]`.
    ///
    /// Non-finite readings are mapped to `0.0` for CPU/memory and to
    /// absent for the GPU.
    pub fn new(
        timestamp: Duration,
        cpu_utilization: f64,
        memory_pressure: f64,
        gpu_utilization: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            cpu_utilization: unit(cpu_utilization),
            memory_pressure: unit(memory_pressure),
            gpu_utilization: gpu_utilization
                .filter(|g| g.is_finite())
                .map(|g| g.clamp(0.0, 1.0)),
        }
    }
}

fn unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Ordered samples collected during one run.
///
/// Only the sampler appends to a series; once handed to the caller it is
/// read-only. Timestamps are strictly increasing but may be sparse when
/// ticks were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySeries {
    samples: Vec<Sample>,
    skipped_ticks: u64,
}

impl TelemetrySeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from already-collected samples.
    ///
    /// Samples are sorted by timestamp and duplicates of an earlier
    /// timestamp are dropped, preserving the strictly increasing order.
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        samples.dedup_by_key(|s| s.timestamp);
        Self {
            samples,
            skipped_ticks: 0,
        }
    }

    /// Appends a sample. Out-of-order samples are rejected.
    pub(crate) fn push(&mut self, sample: Sample) -> bool {
        if let Some(last) = self.samples.last() {
            if sample.timestamp <= last.timestamp {
                return false;
            }
        }
        self.samples.push(sample);
        true
    }

    pub(crate) fn record_skip(&mut self) {
        self.skipped_ticks += 1;
    }

    /// Sets the skipped-tick counter, used when merging series.
    pub fn with_skipped_ticks(mut self, skipped: u64) -> Self {
        self.skipped_ticks = skipped;
        self
    }

    /// The recorded samples in timestamp order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Ticks that produced no sample because a reading failed.
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks
    }

    /// Timestamp of the last sample, or zero for an empty series.
    pub fn span(&self) -> Duration {
        self.samples.last().map(|s| s.timestamp).unwrap_or_default()
    }

    /// CPU utilisation values in order.
    pub fn cpu_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.cpu_utilization)
    }

    /// Memory pressure values in order.
    pub fn memory_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.memory_pressure)
    }

    /// GPU utilisation values, skipping samples where the GPU was absent.
    pub fn gpu_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().filter_map(|s| s.gpu_utilization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_sample_clamps() {
        let s = Sample::new(ms(1), 1.7, -0.2, Some(2.0));
        assert_eq!(s.cpu_utilization, 1.0);
        assert_eq!(s.memory_pressure, 0.0);
        assert_eq!(s.gpu_utilization, Some(1.0));
    }

    #[test]
    fn test_sample_non_finite() {
        let s = Sample::new(ms(1), f64::NAN, f64::INFINITY, Some(f64::NAN));
        assert_eq!(s.cpu_utilization, 0.0);
        assert_eq!(s.memory_pressure, 0.0);
        assert_eq!(s.gpu_utilization, None);
    }

    #[test]
    fn test_push_rejects_out_of_order() {
        let mut series = TelemetrySeries::new();
        assert!(series.push(Sample::new(ms(10), 0.5, 0.5, None)));
        assert!(!series.push(Sample::new(ms(10), 0.6, 0.5, None)));
        assert!(!series.push(Sample::new(ms(5), 0.6, 0.5, None)));
        assert!(series.push(Sample::new(ms(20), 0.6, 0.5, None)));
        assert_eq!(series.len(), 2);
        assert_eq!(series.span(), ms(20));
    }

    #[test]
    fn test_from_samples_sorts() {
        let series = TelemetrySeries::from_samples(vec![
            Sample::new(ms(30), 0.3, 0.1, None),
            Sample::new(ms(10), 0.1, 0.1, None),
            Sample::new(ms(20), 0.2, 0.1, None),
        ]);
        let cpu: Vec<f64> = series.cpu_values().collect();
        assert_eq!(cpu, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_gpu_values_skip_absent() {
        let series = TelemetrySeries::from_samples(vec![
            Sample::new(ms(1), 0.5, 0.5, Some(0.0)),
            Sample::new(ms(2), 0.5, 0.5, None),
            Sample::new(ms(3), 0.5, 0.5, Some(0.8)),
        ]);
        let gpu: Vec<f64> = series.gpu_values().collect();
        assert_eq!(gpu, vec![0.0, 0.8]);
    }
}
