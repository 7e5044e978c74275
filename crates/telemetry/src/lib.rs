// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # telemetry
//!
//! Samples process and system utilisation while a workload executes on a
//! backend, producing an ordered [`TelemetrySeries`] for the analyzer.
//!
//! # Monitored Metrics
//! - **CPU utilisation**: busy fraction between consecutive `/proc/stat`
//!   readings, falling back to the 1-minute load average per core.
//! - **Memory pressure**: `(MemTotal - MemAvailable) / MemTotal` from
//!   `/proc/meminfo`.
//! - **GPU utilisation**: `gpu_busy_percent` from the DRM sysfs tree, when
//!   the host exposes one. Hosts without a GPU source record the field as
//!   absent, never as zero.
//!
//! # Lifecycle
//! ```text
//! Sampler::new(interval, source)
//!       │  .start()
//!       ▼
//!  SamplerHandle  ── background task appends one Sample per tick
//!       │  .stop().await
//!       ▼
//!  TelemetrySeries  (owned by the caller, immutable)
//! ```
//!
//! The series is owned by the sampling task until `stop()` joins it, so no
//! lock guards the samples at any point.
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use telemetry::{Sampler, SystemSource};
//!
//! # async fn example() -> Result<(), telemetry::TelemetryError> {
//! let handle = Sampler::new(Duration::from_millis(100), SystemSource::detect()).start();
//! // ... run the workload ...
//! let series = handle.stop().await?;
//! println!("{} samples", series.len());
//! # Ok(())
//! # }
//! ```

mod cpu;
mod error;
mod gpu;
mod memory;
mod sample;
mod sampler;
mod snapshot;
mod source;
pub(crate) mod sysfs;

pub use cpu::{CpuInfo, CpuProbe, CpuTimes};
pub use error::TelemetryError;
pub use gpu::GpuProbe;
pub use memory::MemoryInfo;
pub use sample::{Sample, TelemetrySeries};
pub use sampler::{Sampler, SamplerHandle, DEFAULT_SAMPLE_INTERVAL};
pub use snapshot::{HostCondition, SystemSnapshot};
pub use source::{Reading, SystemSource, TelemetrySource};

/// Captures a point-in-time snapshot of the monitored system resources.
///
/// This is a convenience wrapper around [`SystemSnapshot::capture()`].
pub fn snapshot() -> Result<SystemSnapshot, TelemetryError> {
    SystemSnapshot::capture()
}
