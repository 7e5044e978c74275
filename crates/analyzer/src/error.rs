// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the statistical analyzer.

/// Errors that can occur while summarizing telemetry or runs.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The telemetry series contains no samples.
    #[error("telemetry series for backend '{backend}' is empty")]
    EmptySeries { backend: String },

    /// An aggregation stage received no values.
    #[error("no input values for stage '{stage}'")]
    EmptyInput { stage: &'static str },

    /// Runs from different backends were passed to a single-backend stage.
    #[error("stage '{stage}' expected runs of backend '{expected}', found '{found}'")]
    MixedBackends {
        stage: &'static str,
        expected: String,
        found: String,
    },
}
