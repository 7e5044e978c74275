// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory pressure from `/proc/meminfo`.
//!
//! Pressure is the share of physical memory the kernel does not report as
//! `MemAvailable`. `MemFree` is ignored; it undercounts reclaimable cache.

use crate::sysfs::{parse_u64, read_sysfs_file};
use crate::TelemetryError;
use std::path::Path;

/// Default path to the kernel memory info file.
pub(crate) const MEMINFO_PATH: &str = "/proc/meminfo";

const KB_PER_MB: u64 = 1024;

/// Physical memory totals, in kB as the kernel reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MemoryInfo {
    pub total_kb: u64,
    /// Never larger than `total_kb`.
    pub available_kb: u64,
}

impl MemoryInfo {
    /// Reads `/proc/meminfo`.
    pub fn read() -> Result<Self, TelemetryError> {
        Self::read_from(Path::new(MEMINFO_PATH))
    }

    pub fn read_from(path: &Path) -> Result<Self, TelemetryError> {
        let content = read_sysfs_file(path)?;
        Self::parse(&content, path)
    }

    /// Parses `/proc/meminfo`-formatted text.
    pub fn parse(content: &str, source_path: &Path) -> Result<Self, TelemetryError> {
        let total_kb = meminfo_kb(content, "MemTotal", source_path)?;
        let available_kb = meminfo_kb(content, "MemAvailable", source_path)?;
        Ok(Self {
            total_kb,
            available_kb: available_kb.min(total_kb),
        })
    }

    pub fn used_kb(&self) -> u64 {
        self.total_kb - self.available_kb
    }

    /// Used fraction of physical memory in `[0.0, 1.0]`; zero if the total
    /// is zero.
    pub fn pressure(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        self.used_kb() as f64 / self.total_kb as f64
    }

    pub fn available_mb(&self) -> u64 {
        self.available_kb / KB_PER_MB
    }

    pub fn total_mb(&self) -> u64 {
        self.total_kb / KB_PER_MB
    }
}

/// Value of the `key:` line, in kB.
fn meminfo_kb(content: &str, key: &str, source_path: &Path) -> Result<u64, TelemetryError> {
    let value = content
        .lines()
        .find_map(|line| {
            let (name, rest) = line.split_once(':')?;
            (name.trim() == key).then(|| rest.trim().trim_end_matches("kB").trim())
        })
        .ok_or_else(|| TelemetryError::ParseError {
            path: source_path.display().to_string(),
            detail: format!("{key} not found"),
        })?;
    parse_u64(value, source_path, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:        8041436 kB
MemFree:          512044 kB
MemAvailable:    6030936 kB
Buffers:          211300 kB
Cached:          4718032 kB
SwapTotal:       2097148 kB
";

    fn info(total_kb: u64, available_kb: u64) -> MemoryInfo {
        MemoryInfo {
            total_kb,
            available_kb,
        }
    }

    #[test]
    fn test_parse_meminfo() {
        let m = MemoryInfo::parse(MEMINFO, Path::new(MEMINFO_PATH)).unwrap();
        assert_eq!(m.total_kb, 8_041_436);
        assert_eq!(m.available_kb, 6_030_936);
        assert_eq!(m.used_kb(), 2_010_500);
        assert_eq!(m.total_mb(), 7852);
        assert_eq!(m.available_mb(), 5889);
    }

    #[test]
    fn test_pressure() {
        assert!((info(4000, 1000).pressure() - 0.75).abs() < 1e-12);
        assert_eq!(info(4000, 4000).pressure(), 0.0);
        assert_eq!(info(0, 0).pressure(), 0.0);
    }

    #[test]
    fn test_available_capped_at_total() {
        let m = MemoryInfo::parse(
            "MemTotal: 1000 kB\nMemAvailable: 1500 kB\n",
            Path::new(MEMINFO_PATH),
        )
        .unwrap();
        assert_eq!(m.available_kb, 1000);
        assert_eq!(m.pressure(), 0.0);
    }

    #[test]
    fn test_missing_field() {
        let result = MemoryInfo::parse("MemTotal: 1000 kB\nMemFree: 10 kB\n", Path::new("x"));
        match result {
            Err(TelemetryError::ParseError { detail, .. }) => {
                assert!(detail.contains("MemAvailable"))
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_number() {
        let result = MemoryInfo::parse("MemTotal: lots kB\nMemAvailable: 1 kB\n", Path::new("x"));
        assert!(matches!(result, Err(TelemetryError::ParseError { .. })));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, MEMINFO).unwrap();
        assert_eq!(MemoryInfo::read_from(&path).unwrap().total_kb, 8_041_436);
    }

    #[test]
    fn test_read_from_missing_file() {
        let result = MemoryInfo::read_from(Path::new("/no/such/meminfo"));
        assert!(matches!(result, Err(TelemetryError::NotAvailable { .. })));
    }
}
