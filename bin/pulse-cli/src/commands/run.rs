// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pulse run` command: profile a single backend.

use super::Overrides;
use scoring::ObjectiveMode;

pub async fn execute(
    overrides: Overrides,
    backend: String,
    runs: Option<usize>,
    warmup: Option<usize>,
    mode: Option<ObjectiveMode>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              pulse · Backend Profiler               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut config = overrides.load()?;
    super::apply_run_flags(&mut config, runs, warmup, mode);
    config.backends = vec![backend.trim().to_string()];

    let backends = config.backends.clone();
    let (comparison, paths, fingerprint) = super::profile_and_report(config, &backends).await?;

    if let Some(profile) = comparison.profiles.first() {
        let s = &profile.summary;
        println!("  Telemetry:");
        println!("   Samples:      {}", s.sample_count);
        println!("   CPU:          {:.1}%  {}", s.mean_cpu * 100.0, super::usage_bar(s.mean_cpu));
        println!("   Memory:       {:.1}%  {}", s.mean_mem * 100.0, super::usage_bar(s.mean_mem));
        match s.mean_gpu {
            Some(gpu) => {
                println!("   GPU:          {:.1}%  {}", gpu * 100.0, super::usage_bar(gpu))
            }
            None => println!("   GPU:          not available"),
        }
        println!("   Stability:    {:.4}", s.stability_score);
        println!();

        let card = &profile.scorecard;
        println!("  Score:");
        println!(
            "   Throughput:   {:.2} tok/s ({} tokens)",
            card.throughput, card.tokens_generated
        );
        println!(
            "   Energy proxy: {:.3} cpu-s ({:.3} per 1k tokens)",
            card.energy_proxy, card.energy_per_1k_tokens
        );
        println!("   Efficiency:   {:.4}", card.efficiency_score);
        println!();
    }

    println!("  {}", comparison.recommendation.rationale);
    println!();
    super::print_paths(&paths, &fingerprint);

    Ok(())
}
