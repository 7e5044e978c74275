// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Profiler configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! sample_interval_ms = 100
//! runs = 5
//! warmup_runs = 1
//! max_runs = 50
//! backends = ["cpu", "cpu-single"]
//! objective = "sustainability"
//! report_dir = "reports"
//!
//! [analysis]
//! filter_outliers = true
//! outlier_std_threshold = 2.5
//!
//! [scoring.weights]
//! throughput = 0.4
//! stability = 0.3
//! energy = 0.3
//!
//! [scoring.reference]
//! throughput_ceiling_tps = 100.0
//! energy_ceiling_cpu_seconds = 10.0
//!
//! [workload]
//! max_new_tokens = 50
//! hidden_size = 256
//! prompts = ["Artificial intelligence will"]
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use crate::ProfilerError;
use scoring::{ObjectiveMode, ScoringConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a profiling session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Telemetry sampling interval in milliseconds.
    pub sample_interval_ms: u64,
    /// Measured runs per backend.
    pub runs: usize,
    /// Discarded runs executed before the measured ones.
    pub warmup_runs: usize,
    /// Upper bound accepted for `runs`.
    pub max_runs: usize,
    /// Backend ids to profile, in order.
    pub backends: Vec<String>,
    pub objective: ObjectiveMode,
    /// Directory where JSON and CSV reports are written.
    pub report_dir: PathBuf,
    pub analysis: AnalysisConfig,
    pub scoring: ScoringConfig,
    pub workload: WorkloadConfig,
}

/// Cross-run statistics settings.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub filter_outliers: bool,
    /// Values further than this many standard deviations from the mean are dropped.
    pub outlier_std_threshold: f64,
}

impl AnalysisConfig {
    /// The outlier threshold to apply, if filtering is enabled.
    pub fn outlier_threshold(&self) -> Option<f64> {
        self.filter_outliers.then_some(self.outlier_std_threshold)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            filter_outliers: true,
            outlier_std_threshold: 2.5,
        }
    }
}

/// Parameters of the synthetic text-generation workload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Tokens generated per prompt.
    pub max_new_tokens: usize,
    /// Width of the per-token matrix-vector product.
    pub hidden_size: usize,
    pub prompts: Vec<String>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 50,
            hidden_size: 256,
            prompts: vec![
                "Artificial intelligence will".to_string(),
                "Future processors enable".to_string(),
                "Efficient computing requires".to_string(),
            ],
        }
    }
}

impl ProfilerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ProfilerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProfilerError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ProfilerError> {
        toml::from_str(toml_str)
            .map_err(|e| ProfilerError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ProfilerError> {
        toml::to_string_pretty(self)
            .map_err(|e| ProfilerError::Config(format!("TOML serialise error: {e}")))
    }

    /// Rejects configurations that cannot produce a meaningful profile.
    pub fn validate(&self) -> Result<(), ProfilerError> {
        if self.runs == 0 {
            return Err(ProfilerError::Config("runs must be at least 1".into()));
        }
        if self.runs > self.max_runs {
            return Err(ProfilerError::Config(format!(
                "runs ({}) exceeds max_runs ({})",
                self.runs, self.max_runs
            )));
        }
        if self.sample_interval_ms == 0 {
            return Err(ProfilerError::Config(
                "sample_interval_ms must be positive".into(),
            ));
        }
        if self.backends.is_empty() {
            return Err(ProfilerError::Config("no backends selected".into()));
        }
        let k = self.analysis.outlier_std_threshold;
        if self.analysis.filter_outliers && (k.is_nan() || k <= 0.0) {
            return Err(ProfilerError::Config(
                "outlier_std_threshold must be positive".into(),
            ));
        }
        if self.workload.max_new_tokens == 0 || self.workload.hidden_size == 0 {
            return Err(ProfilerError::Config(
                "workload max_new_tokens and hidden_size must be positive".into(),
            ));
        }
        if self.workload.prompts.is_empty() {
            return Err(ProfilerError::Config("workload needs at least one prompt".into()));
        }
        self.scoring.validate()?;
        Ok(())
    }

    /// The sampling interval as a [`Duration`].
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100,
            runs: 5,
            warmup_runs: 1,
            max_runs: 50,
            backends: vec!["cpu".to_string()],
            objective: ObjectiveMode::Sustainability,
            report_dir: PathBuf::from("reports"),
            analysis: AnalysisConfig::default(),
            scoring: ScoringConfig::default(),
            workload: WorkloadConfig::default(),
        }
    }
}
