// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pulse status` command: display host telemetry and registered backends.
//!
//! Reads the same procfs/sysfs sources the sampler uses. Containers and
//! hosts without a GPU counter still work; the GPU line reads "absent".

use super::usage_bar;
use telemetry::HostCondition;

pub async fn execute() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               pulse · Host Status                   ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let snapshot = telemetry::snapshot()?;

    // ── Memory ─────────────────────────────────────────────────
    println!("  Memory");
    let total = snapshot.memory.total_mb();
    let avail = snapshot.memory.available_mb();
    let used = total.saturating_sub(avail);
    let pressure = snapshot.memory.pressure();
    println!("   Total:        {total} MB");
    println!("   Available:    {avail} MB");
    println!(
        "   Used:         {used} MB ({:.1}%)  {}",
        pressure * 100.0,
        usage_bar(pressure)
    );
    println!();

    // ── CPU ────────────────────────────────────────────────────
    println!("  CPU");
    println!("   Online cores: {}", snapshot.cpu.online_cores);
    println!(
        "   Load (1m):    {:.2} per core  {}",
        snapshot.cpu.load_per_core,
        usage_bar(snapshot.cpu.load_per_core)
    );
    println!();

    // ── GPU ────────────────────────────────────────────────────
    println!("  GPU");
    match snapshot.gpu_utilization {
        Some(busy) => println!("   Busy:         {:.1}%  {}", busy * 100.0, usage_bar(busy)),
        None => println!("   Counter:      absent (GPU field omitted from samples)"),
    }
    println!();

    // ── Backends ───────────────────────────────────────────────
    let registry = profiler::BackendRegistry::with_defaults();
    println!("  Backends");
    for id in registry.ids() {
        let backend = registry.create(id)?;
        let caps = backend.capabilities();
        println!(
            "   {id:<12} {} x{}{}",
            caps.device,
            caps.parallelism,
            if caps.gpu_telemetry { ", gpu telemetry" } else { "" }
        );
    }
    println!();

    // ── Assessment ─────────────────────────────────────────────
    println!("  Assessment");
    match snapshot.condition() {
        HostCondition::Ready => println!("   Status:       Ready to profile"),
        busy => println!(
            "   Status:       {} (results will be noisy)",
            busy.to_string().to_uppercase()
        ),
    }
    println!();
    println!("{}", snapshot.summary());

    Ok(())
}
