// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # scoring
//!
//! Turns a finished run into a [`Scorecard`] and ranks scorecards into a
//! [`Recommendation`].
//!
//! # Efficiency model
//! ```text
//! efficiency = w_t · throughput_norm
//!            + w_s · stability
//!            + w_e · (1 - energy_norm)
//! ```
//! Each term is normalised to `[0, 1]` against a [`ReferenceRanges`]
//! ceiling and the weights ([`ScoringWeights`]) sum to one. The energy term
//! uses `mean_cpu × duration` (CPU-seconds) as a proxy; no power sensor is
//! read.
//!
//! # Objectives
//!
//! | Mode | Primary key | Tie-breakers |
//! |---|---|---|
//! | [`ObjectiveMode::Performance`] | throughput ↓ | efficiency ↓, backend id ↑ |
//! | [`ObjectiveMode::Sustainability`] | efficiency ↓ | stability ↓, throughput ↓, backend id ↑ |
//!
//! # Example
//! ```
//! use scoring::{recommend, ObjectiveMode, Scorecard};
//!
//! let cards = vec![
//!     Scorecard::new("cpu", 0.71, 0.94, 3.2, 53.95),
//!     Scorecard::new("gpu", 0.78, 0.99, 1.1, 40.0),
//! ];
//! let rec = recommend(&cards, ObjectiveMode::Sustainability).unwrap();
//! assert_eq!(rec.winning_backend_id, "gpu");
//! ```

mod config;
mod error;
mod model;
mod objective;
mod recommend;
mod scorecard;

pub use config::{ReferenceRanges, ScoringConfig, ScoringWeights};
pub use error::ScoringError;
pub use model::EfficiencyModel;
pub use objective::ObjectiveMode;
pub use recommend::{recommend, Recommendation, MIN_ACCEPTABLE_STABILITY};
pub use scorecard::Scorecard;
