// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pulse
//!
//! Command-line interface for the backend profiler.
//!
//! ## Usage
//! ```bash
//! # Profile one backend
//! pulse run --backend cpu --runs 5 --warmup 1 --mode sustainability
//!
//! # Compare backends and recommend one
//! pulse compare --backends cpu,cpu-single --mode performance
//!
//! # Check a report against its fingerprint
//! pulse verify reports/exp-<id>-0001.json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use scoring::ObjectiveMode;

#[derive(Parser)]
#[command(
    name = "pulse",
    about = "Profiles inference backends and emits tamper-evident recommendation reports",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI flags override it).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory that receives JSON and CSV reports.
    #[arg(long, global = true)]
    report_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile a single backend and write a sealed report.
    Run {
        /// Backend id (see `pulse status` for the registered ids).
        #[arg(short, long, default_value = "cpu")]
        backend: String,

        /// Measured runs.
        #[arg(short, long)]
        runs: Option<usize>,

        /// Warmup runs, discarded before measuring.
        #[arg(short, long)]
        warmup: Option<usize>,

        /// Objective: performance or sustainability.
        #[arg(short, long)]
        mode: Option<ObjectiveMode>,
    },

    /// Profile several backends and recommend one.
    Compare {
        /// Comma-separated backend ids (e.g., "cpu,cpu-single").
        #[arg(short, long)]
        backends: Option<String>,

        /// Measured runs per backend.
        #[arg(short, long)]
        runs: Option<usize>,

        /// Warmup runs per backend.
        #[arg(short, long)]
        warmup: Option<usize>,

        /// Objective: performance or sustainability.
        #[arg(short, long)]
        mode: Option<ObjectiveMode>,
    },

    /// Verify a JSON report against its integrity envelope.
    Verify {
        /// Path to the report.
        report: std::path::PathBuf,
    },

    /// Display current host telemetry and registered backends.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let overrides = commands::Overrides {
        config: cli.config,
        report_dir: cli.report_dir,
    };

    match cli.command {
        Commands::Run {
            backend,
            runs,
            warmup,
            mode,
        } => commands::run::execute(overrides, backend, runs, warmup, mode).await,
        Commands::Compare {
            backends,
            runs,
            warmup,
            mode,
        } => commands::compare::execute(overrides, backends, runs, warmup, mode).await,
        Commands::Verify { report } => {
            if !commands::verify::execute(report)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Status => commands::status::execute().await,
    }
}
