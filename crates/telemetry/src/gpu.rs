// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GPU utilisation via the DRM sysfs tree.
//!
//! Drivers that expose a busy counter (amdgpu, some Intel/i915 builds)
//! publish it at `/sys/class/drm/card*/device/gpu_busy_percent` as an
//! integer percentage. Hosts without such a file have no GPU source and
//! every sample records the GPU field as absent.

use crate::sysfs::{parse_u64, read_sysfs_file};
use crate::TelemetryError;
use std::path::{Path, PathBuf};

/// DRM class directory.
const DRM_BASE: &str = "/sys/class/drm";

/// Busy-counter file name under `card*/device/`.
const BUSY_FILE: &str = "gpu_busy_percent";

/// Reads utilisation from one GPU busy-percent file.
#[derive(Debug, Clone)]
pub struct GpuProbe {
    path: PathBuf,
}

impl GpuProbe {
    /// Scans the DRM tree for the first card exposing a busy counter.
    pub fn detect() -> Option<Self> {
        Self::detect_in(Path::new(DRM_BASE))
    }

    /// Scans a specific DRM-like directory (for testing).
    pub fn detect_in(base: &Path) -> Option<Self> {
        let mut cards: Vec<PathBuf> = std::fs::read_dir(base)
            .ok()?
            .filter_map(|e| e.ok())
            .filter(|e| {
                let name = e.file_name();
                let name = name.to_string_lossy();
                name.starts_with("card") && name[4..].chars().all(|c| c.is_ascii_digit())
            })
            .map(|e| e.path().join("device").join(BUSY_FILE))
            .filter(|p| p.exists())
            .collect();

        cards.sort();
        let path = cards.into_iter().next()?;
        tracing::debug!("GPU utilisation source: {}", path.display());
        Some(Self { path })
    }

    /// Creates a probe over an explicit busy-percent file.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the underlying busy counter.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current GPU utilisation in `[0.0, 1.0]`.
    pub fn read(&self) -> Result<f64, TelemetryError> {
        let content = read_sysfs_file(&self.path)?;
        let percent = parse_u64(&content, &self.path, "busy percentage")?;
        Ok((percent as f64 / 100.0).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_drm(busy: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let device = dir.path().join("card0").join("device");
        std::fs::create_dir_all(&device).unwrap();
        std::fs::create_dir_all(dir.path().join("card0-HDMI-A-1")).unwrap();
        if let Some(value) = busy {
            std::fs::write(device.join(BUSY_FILE), value).unwrap();
        }
        dir
    }

    #[test]
    fn test_detect_and_read() {
        let dir = fake_drm(Some("37\n"));
        let probe = GpuProbe::detect_in(dir.path()).unwrap();
        assert!((probe.read().unwrap() - 0.37).abs() < 1e-9);
    }

    #[test]
    fn test_detect_without_busy_counter() {
        let dir = fake_drm(None);
        assert!(GpuProbe::detect_in(dir.path()).is_none());
    }

    #[test]
    fn test_detect_missing_base() {
        assert!(GpuProbe::detect_in(Path::new("/no/such/drm")).is_none());
    }

    #[test]
    fn test_clamps_over_hundred() {
        let dir = fake_drm(Some("140"));
        let probe = GpuProbe::detect_in(dir.path()).unwrap();
        assert_eq!(probe.read().unwrap(), 1.0);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let dir = fake_drm(Some("busy"));
        let probe = GpuProbe::detect_in(dir.path()).unwrap();
        assert!(matches!(probe.read(), Err(TelemetryError::ParseError { .. })));
    }
}
