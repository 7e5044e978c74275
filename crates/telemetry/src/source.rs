// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`TelemetrySource`] trait and the host-backed implementation.

use crate::memory::MEMINFO_PATH;
use crate::{CpuProbe, GpuProbe, MemoryInfo, TelemetryError};
use std::path::PathBuf;

/// One raw reading from a telemetry source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub cpu_utilization: f64,
    pub memory_pressure: f64,
    pub gpu_utilization: Option<f64>,
}

/// Anything the sampler can poll once per tick.
///
/// A failed `read` is a per-tick error: the sampler logs it and skips the
/// tick. A replacement power sensor would plug in here.
pub trait TelemetrySource: Send + 'static {
    /// Whether this source can report GPU utilisation at all.
    fn has_gpu(&self) -> bool;

    /// Takes one reading.
    fn read(&mut self) -> Result<Reading, TelemetryError>;
}

impl TelemetrySource for Box<dyn TelemetrySource> {
    fn has_gpu(&self) -> bool {
        (**self).has_gpu()
    }

    fn read(&mut self) -> Result<Reading, TelemetryError> {
        (**self).read()
    }
}

/// Reads CPU, memory and (optionally) GPU state from the running host.
#[derive(Debug)]
pub struct SystemSource {
    cpu: CpuProbe,
    meminfo_path: PathBuf,
    gpu: Option<GpuProbe>,
}

impl SystemSource {
    /// Creates a source that reports GPU utilisation only if a GPU busy
    /// counter is found on the host.
    pub fn detect() -> Self {
        Self::with_gpu(GpuProbe::detect())
    }

    /// Creates a source with an explicit GPU probe (or none).
    pub fn with_gpu(gpu: Option<GpuProbe>) -> Self {
        Self {
            cpu: CpuProbe::new(),
            meminfo_path: PathBuf::from(MEMINFO_PATH),
            gpu,
        }
    }

    /// Creates a source that never reports GPU utilisation.
    pub fn cpu_only() -> Self {
        Self::with_gpu(None)
    }
}

impl TelemetrySource for SystemSource {
    fn has_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    fn read(&mut self) -> Result<Reading, TelemetryError> {
        let cpu_utilization = self.cpu.read()?;
        let memory_pressure = MemoryInfo::read_from(&self.meminfo_path)?.pressure();
        let gpu_utilization = match &self.gpu {
            Some(probe) => Some(probe.read()?),
            None => None,
        };

        Ok(Reading {
            cpu_utilization,
            memory_pressure,
            gpu_utilization,
        })
    }
}
