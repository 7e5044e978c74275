// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The background telemetry sampler.
//!
//! [`Sampler::start`] moves the source into a spawned tokio task that polls
//! it once per interval tick. The task owns the growing
//! [`TelemetrySeries`]; [`SamplerHandle::stop`] signals the task over a
//! oneshot channel, joins it and receives the series by value. After
//! `stop` returns the task no longer exists, so nothing can append to the
//! series.
//!
//! Ticks that fire late are skipped rather than bunched up
//! ([`MissedTickBehavior::Skip`]), and a failed reading drops only that
//! tick. Timestamps are therefore strictly increasing but may be sparse.
//!
//! An explicit stop takes one closing reading before the task exits, so a
//! workload shorter than one interval still leaves a sample behind.

use crate::{Sample, TelemetryError, TelemetrySeries, TelemetrySource};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Default polling interval.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Smallest interval accepted; tokio intervals cannot be zero.
const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

/// A configured, not-yet-running sampler.
#[derive(Debug)]
pub struct Sampler<S: TelemetrySource> {
    interval: Duration,
    source: S,
}

impl<S: TelemetrySource> Sampler<S> {
    /// Creates a sampler polling `source` every `interval`.
    pub fn new(interval: Duration, source: S) -> Self {
        Self {
            interval: interval.max(MIN_SAMPLE_INTERVAL),
            source,
        }
    }

    /// The effective polling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the sampling task on the current tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn start(self) -> SamplerHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let gpu_available = self.source.has_gpu();
        tracing::debug!(
            "sampler started: interval {:?}, gpu source {}",
            self.interval,
            if gpu_available { "present" } else { "absent" },
        );
        let task = tokio::spawn(sample_loop(self.source, self.interval, stop_rx));

        SamplerHandle {
            stop_tx,
            task,
            gpu_available,
        }
    }
}

/// Handle to a running sampler.
///
/// The handle is `Send`, so the sampler may be stopped from a different
/// task than the one that started it. Dropping the handle without calling
/// [`SamplerHandle::stop`] also ends the task; its samples are discarded.
#[derive(Debug)]
pub struct SamplerHandle {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<TelemetrySeries>,
    gpu_available: bool,
}

impl SamplerHandle {
    /// Whether samples from this run carry a GPU value.
    pub fn has_gpu(&self) -> bool {
        self.gpu_available
    }

    /// Stops sampling and returns everything collected so far.
    ///
    /// Returns promptly: the task checks the stop signal before every tick
    /// and a single reading never blocks on the workload.
    pub async fn stop(self) -> Result<TelemetrySeries, TelemetryError> {
        // The task may already be gone if it panicked; the join reports that.
        let _ = self.stop_tx.send(());
        let series = self
            .task
            .await
            .map_err(|e| TelemetryError::SamplerTerminated(e.to_string()))?;
        tracing::debug!(
            "sampler stopped: {} samples, {} skipped ticks",
            series.len(),
            series.skipped_ticks(),
        );
        Ok(series)
    }
}

async fn sample_loop<S: TelemetrySource>(
    mut source: S,
    interval: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) -> TelemetrySeries {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = Instant::now();
    let mut series = TelemetrySeries::new();

    loop {
        tokio::select! {
            biased;
            // Err means the handle was dropped; nobody will read a closing sample.
            stop = &mut stop_rx => {
                if stop.is_ok() {
                    record(&mut source, started, &mut series);
                }
                break;
            }
            _ = ticker.tick() => record(&mut source, started, &mut series),
        }
    }

    series
}

/// Takes one reading and appends it, or counts the tick as skipped.
fn record<S: TelemetrySource>(source: &mut S, started: Instant, series: &mut TelemetrySeries) {
    match source.read() {
        Ok(reading) => {
            let sample = Sample::new(
                started.elapsed(),
                reading.cpu_utilization,
                reading.memory_pressure,
                reading.gpu_utilization,
            );
            if !series.push(sample) {
                series.record_skip();
            }
        }
        Err(e @ TelemetryError::CounterStalled { .. }) => {
            series.record_skip();
            tracing::debug!("sampling tick skipped: {e}");
        }
        Err(e) => {
            series.record_skip();
            tracing::warn!("sampling tick skipped: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reading;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Replays a fixed utilisation pattern, failing on every `fail_every`-th read.
    struct ScriptedSource {
        values: Vec<f64>,
        reads: Arc<AtomicUsize>,
        fail_every: Option<usize>,
        gpu: bool,
    }

    impl ScriptedSource {
        fn new(values: Vec<f64>) -> Self {
            Self {
                values,
                reads: Arc::new(AtomicUsize::new(0)),
                fail_every: None,
                gpu: false,
            }
        }
    }

    impl TelemetrySource for ScriptedSource {
        fn has_gpu(&self) -> bool {
            self.gpu
        }

        fn read(&mut self) -> Result<Reading, TelemetryError> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(k) = self.fail_every {
                if (n + 1) % k == 0 {
                    return Err(TelemetryError::NotAvailable {
                        path: "scripted".into(),
                    });
                }
            }
            let cpu = self.values[n % self.values.len()];
            Ok(Reading {
                cpu_utilization: cpu,
                memory_pressure: 0.5,
                gpu_utilization: self.gpu.then_some(0.25),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_samples_once_per_tick() {
        let handle =
            Sampler::new(Duration::from_millis(10), ScriptedSource::new(vec![0.4])).start();
        tokio::time::sleep(Duration::from_millis(55)).await;
        let series = handle.stop().await.unwrap();

        // Ticks at 0, 10, 20, 30, 40, 50 ms plus the closing reading at 55 ms.
        assert!((6..=7).contains(&series.len()), "got {}", series.len());
        assert_eq!(series.skipped_ticks(), 0);
        assert!(series.cpu_values().all(|v| v == 0.4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timestamps_strictly_increase() {
        let handle =
            Sampler::new(Duration::from_millis(5), ScriptedSource::new(vec![0.1, 0.9])).start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let series = handle.stop().await.unwrap();

        let stamps: Vec<Duration> = series.samples().iter().map(|s| s.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_ticks_are_skipped_not_backfilled() {
        let mut source = ScriptedSource::new(vec![0.5]);
        source.fail_every = Some(3);
        let reads = source.reads.clone();

        let handle = Sampler::new(Duration::from_millis(10), source).start();
        tokio::time::sleep(Duration::from_millis(95)).await;
        let series = handle.stop().await.unwrap();

        let total_reads = reads.load(Ordering::SeqCst) as u64;
        assert!(series.skipped_ticks() >= 1);
        assert_eq!(series.len() as u64 + series.skipped_ticks(), total_reads);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gpu_absent_recorded_as_none() {
        let handle =
            Sampler::new(Duration::from_millis(10), ScriptedSource::new(vec![0.5])).start();
        assert!(!handle.has_gpu());
        tokio::time::sleep(Duration::from_millis(30)).await;
        let series = handle.stop().await.unwrap();
        assert!(!series.is_empty());
        assert!(series.samples().iter().all(|s| s.gpu_utilization.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gpu_present_recorded() {
        let mut source = ScriptedSource::new(vec![0.5]);
        source.gpu = true;
        let handle = Sampler::new(Duration::from_millis(10), source).start();
        assert!(handle.has_gpu());
        tokio::time::sleep(Duration::from_millis(30)).await;
        let series = handle.stop().await.unwrap();
        assert!(series.samples().iter().all(|s| s.gpu_utilization == Some(0.25)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_samples_after_stop() {
        let source = ScriptedSource::new(vec![0.5]);
        let reads = source.reads.clone();
        let handle = Sampler::new(Duration::from_millis(10), source).start();
        tokio::time::sleep(Duration::from_millis(35)).await;
        let series = handle.stop().await.unwrap();

        let reads_at_stop = reads.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(reads.load(Ordering::SeqCst), reads_at_stop);
        assert_eq!(series.len(), reads_at_stop);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_from_another_task() {
        let handle = Sampler::new(Duration::from_millis(2), ScriptedSource::new(vec![0.3])).start();
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.stop().await
        });
        let series = stopper.await.unwrap().unwrap();
        assert!(!series.is_empty());
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let sampler = Sampler::new(Duration::ZERO, ScriptedSource::new(vec![0.5]));
        assert_eq!(sampler.interval(), MIN_SAMPLE_INTERVAL);
        let series = sampler.start().stop().await.unwrap();
        assert!(series.len() <= 2);
    }
}
