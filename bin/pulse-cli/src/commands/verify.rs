// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `pulse verify` command: recompute a report's fingerprint.

use std::path::PathBuf;

/// Returns whether the report is intact.
pub fn execute(report: PathBuf) -> anyhow::Result<bool> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              pulse · Report Verification            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let result = profiler::verify_report_file(&report)?;

    println!("  Report:    {}", report.display());
    println!("  Algorithm: {}", result.algorithm);
    println!("  Recorded:  {}", result.fingerprint);
    println!("  Computed:  {}", result.computed_fingerprint);
    println!();
    match result.status {
        integrity::IntegrityStatus::Valid => println!("  Status:    VALID"),
        integrity::IntegrityStatus::Tampered => {
            println!("  Status:    TAMPERED");
            println!("   The report was modified after it was sealed.");
        }
    }

    Ok(result.verified)
}
