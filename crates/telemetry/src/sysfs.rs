// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared helpers for reading kernel pseudo-files.

use crate::TelemetryError;
use std::path::Path;

/// Reads a sysfs/procfs file and returns its trimmed content.
pub(crate) fn read_sysfs_file(path: &Path) -> Result<String, TelemetryError> {
    if !path.exists() {
        return Err(TelemetryError::NotAvailable {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| TelemetryError::ReadError {
            path: path.display().to_string(),
            source: e,
        })
}

/// Parses an unsigned integer field, attributing failures to `path`.
pub(crate) fn parse_u64(value: &str, path: &Path, what: &str) -> Result<u64, TelemetryError> {
    value.trim().parse::<u64>().map_err(|_| TelemetryError::ParseError {
        path: path.display().to_string(),
        detail: format!("expected integer {what}, got '{value}'"),
    })
}
