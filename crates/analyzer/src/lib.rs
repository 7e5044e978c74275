// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # analyzer
//!
//! Reduces raw telemetry into the summary statistics the efficiency model
//! consumes.
//!
//! - [`summarize`] turns one [`TelemetrySeries`](telemetry::TelemetrySeries)
//!   into a [`SeriesSummary`] (means, CPU variance, stability score).
//! - [`RunResult`] pairs a backend's execution outcome with the series
//!   sampled while it ran; [`RunResult::combine`] folds several measured
//!   runs of one backend into one.
//! - [`aggregate`], [`filter_outliers`] and [`RunStatistics`] describe the
//!   spread of latency and throughput across repeated runs.
//!
//! Everything here is a pure function of its inputs.
//!
//! # Stability policy
//! Stability is `1 - CV` of CPU utilisation, clamped to `[0, 1]`. Fewer
//! than two samples, or a zero mean, score `1.0`: too little signal is
//! treated optimistically rather than as an error. An *empty* series is
//! still an error for [`summarize`], because there is nothing to describe.

mod error;
mod run;
mod stats;
mod summary;

pub use error::AnalyzerError;
pub use run::{RunResult, RunStatistics};
pub use stats::{aggregate, filter_outliers, mean, relative_improvement, sample_variance, Aggregate};
pub use summary::{stability_score, summarize, summarize_run, SeriesSummary};
