// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for telemetry sampling.

/// Errors that can occur when reading telemetry.
///
/// Everything except [`TelemetryError::SamplerTerminated`] is a per-tick
/// sampling error: the sampler logs it, skips the tick and carries on.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to read a sysfs or procfs file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse a numeric value from a system file.
    #[error("failed to parse value from {path}: {detail}")]
    ParseError { path: String, detail: String },

    /// The expected sysfs/procfs path does not exist on this host.
    #[error("telemetry source not available: {path}")]
    NotAvailable { path: String },

    /// Two consecutive counter readings were identical, so no utilisation
    /// can be derived for this tick.
    #[error("counters at {path} did not advance between readings")]
    CounterStalled { path: String },

    /// The background sampling task could not be joined.
    #[error("sampler task terminated abnormally: {0}")]
    SamplerTerminated(String),
}
