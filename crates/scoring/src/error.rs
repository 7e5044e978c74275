// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for scoring and recommendation.

/// Errors that can occur while scoring runs or ranking scorecards.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// A recommendation was requested over zero scorecards.
    #[error("no scorecards to rank in stage '{stage}'")]
    EmptyInput { stage: &'static str },

    /// The scoring weights or reference ranges are unusable.
    #[error("invalid scoring configuration: {0}")]
    InvalidConfig(String),

    /// An objective mode name was not recognised.
    #[error("unknown objective mode '{0}'; expected 'performance' or 'sustainability'")]
    UnknownObjective(String),
}
