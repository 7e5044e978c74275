// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and the helpers they share.

pub mod compare;
pub mod run;
pub mod status;
pub mod verify;

use profiler::{
    abort_channel, AbortSignal, Comparison, ExperimentContext, Orchestrator, ProfilerConfig,
    ReportAssembler, ReportPaths,
};
use scoring::ObjectiveMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Global flags that shape the configuration.
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
}

impl Overrides {
    /// Loads the config file (or defaults) and applies the global flags.
    pub fn load(&self) -> anyhow::Result<ProfilerConfig> {
        let mut config = match &self.config {
            Some(path) => ProfilerConfig::from_file(path)?,
            None => ProfilerConfig::default(),
        };
        if let Some(dir) = &self.report_dir {
            config.report_dir = dir.clone();
        }
        Ok(config)
    }
}

/// Applies per-command run flags.
pub fn apply_run_flags(
    config: &mut ProfilerConfig,
    runs: Option<usize>,
    warmup: Option<usize>,
    mode: Option<ObjectiveMode>,
) {
    if let Some(runs) = runs {
        config.runs = runs;
    }
    if let Some(warmup) = warmup {
        config.warmup_runs = warmup;
    }
    if let Some(mode) = mode {
        config.objective = mode;
    }
}

/// Aborts in-flight runs on Ctrl-C.
fn abort_on_ctrl_c() -> AbortSignal {
    let (handle, signal) = abort_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, aborting current run");
            handle.abort();
        }
    });
    signal
}

/// Profiles `backends`, then assembles, seals and writes the report.
pub async fn profile_and_report(
    config: ProfilerConfig,
    backends: &[String],
) -> anyhow::Result<(Comparison, ReportPaths, String)> {
    let mode = config.objective;
    let orchestrator = Orchestrator::new(config.clone())?.with_abort_signal(abort_on_ctrl_c());
    let ctx = ExperimentContext::new(config.clone());

    println!("  Experiment: {}", ctx.id());
    println!("  Backends:   {}", backends.join(", "));
    println!("  Mode:       {mode}");
    println!(
        "  Runs:       {} measured + {} warmup, sampling every {} ms",
        config.runs, config.warmup_runs, config.sample_interval_ms
    );
    println!();

    let comparison = orchestrator.compare(backends, mode).await?;

    let assembler = ReportAssembler::new(&config.report_dir);
    let report = assembler.assemble(&ctx, orchestrator.workload().info(), &comparison)?;
    let paths = assembler.write(&report)?;
    Ok((comparison, paths, report.integrity.fingerprint))
}

/// Prints ranked scorecards and the recommendation.
pub fn print_comparison(comparison: &Comparison) {
    let rec = &comparison.recommendation;

    println!("  Scorecards ({} ranking):", rec.objective_mode);
    for (rank, card) in rec.scorecards.iter().enumerate() {
        println!("   {}. {}", rank + 1, card.summary());
    }
    println!();

    println!("  Runs:");
    for profile in &comparison.profiles {
        let s = &profile.statistics;
        println!(
            "   {:<12} {} measured, latency {:.3}s ± {:.3}, {:.1} tok/s ± {:.1}",
            s.backend_id,
            s.measured_runs,
            s.latency_seconds.mean,
            s.latency_seconds.stddev,
            s.throughput_tokens_per_sec.mean,
            s.throughput_tokens_per_sec.stddev,
        );
    }
    println!();

    println!("  Recommendation:");
    println!("   Winner:    {}", rec.winning_backend_id);
    println!("   Rationale: {}", rec.rationale);
    println!();
}

/// Prints where the report went.
pub fn print_paths(paths: &ReportPaths, fingerprint: &str) {
    println!("  Report:");
    println!("   JSON:        {}", paths.json.display());
    println!("   CSV:         {}", paths.csv.display());
    println!("   Fingerprint: sha256 {fingerprint}");
}

/// Creates a visual usage bar (0.0-1.0 scale).
pub fn usage_bar(ratio: f64) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * 20.0).round() as usize;
    let filled = filled.min(20);
    let empty = 20 - filled;
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(empty))
}
