// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the profiler.

use std::path::PathBuf;
use telemetry::TelemetrySeries;

/// Errors that can occur while profiling backends or writing reports.
#[derive(Debug, thiserror::Error)]
pub enum ProfilerError {
    /// The sampler could not be stopped cleanly.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] telemetry::TelemetryError),

    /// A run could not be summarised.
    #[error("analysis error: {0}")]
    Analyzer(#[from] analyzer::AnalyzerError),

    /// Scoring or ranking failed.
    #[error("scoring error: {0}")]
    Scoring(#[from] scoring::ScoringError),

    /// Sealing or verification failed.
    #[error("integrity error: {0}")]
    Integrity(#[from] integrity::IntegrityError),

    /// A backend failed during setup or execution.
    #[error("backend '{backend}' failed: {detail}")]
    Backend { backend: String, detail: String },

    /// No backend is registered under the requested id.
    #[error("unknown backend '{name}'; available: {available}")]
    UnknownBackend { name: String, available: String },

    /// Execution was aborted externally. Carries the telemetry sampled so far.
    #[error("run on backend '{backend}' aborted after {} samples", .partial.len())]
    Aborted {
        backend: String,
        partial: TelemetrySeries,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report could not be assembled or parsed.
    #[error("report error: {0}")]
    Report(String),
}

impl ProfilerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProfilerError::Io {
            path: path.into(),
            source,
        }
    }
}
