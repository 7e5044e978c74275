// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pulse compare` command: profile several backends one after another
//! and recommend one under the chosen objective.

use super::Overrides;
use scoring::ObjectiveMode;

pub async fn execute(
    overrides: Overrides,
    backends: Option<String>,
    runs: Option<usize>,
    warmup: Option<usize>,
    mode: Option<ObjectiveMode>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              pulse · Backend Comparison             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut config = overrides.load()?;
    super::apply_run_flags(&mut config, runs, warmup, mode);
    if let Some(list) = backends {
        config.backends = parse_backend_list(&list);
    }
    if config.backends.is_empty() {
        anyhow::bail!("no backends given; pass --backends cpu,cpu-single");
    }

    let ids = config.backends.clone();
    let (comparison, paths, fingerprint) = super::profile_and_report(config, &ids).await?;

    super::print_comparison(&comparison);
    super::print_paths(&paths, &fingerprint);

    Ok(())
}

/// Splits a comma-separated list, dropping blanks and repeats.
fn parse_backend_list(list: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
