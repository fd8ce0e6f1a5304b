// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitscanError};

/// Largest accepted white border, in pixels.
pub const MAX_BORDER_PX: u32 = 1024;

/// Tuning for the per-image segmentation and rectification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of candidate regions extracted from one scan.
    pub max_regions: usize,
    /// Sigma of the fixed 5x5 Gaussian blur used for noise suppression.
    pub blur_sigma: f32,
    /// Chebyshev radius of the square closing element (4 gives 9x9).
    pub close_radius: u8,
    /// White border added on all four sides of every extracted photo.
    pub border_px: u32,
    /// JPEG quality (1-100) for written photos.
    pub jpeg_quality: u8,
    /// Smallest rectified side length accepted; thinner regions are degenerate.
    pub min_side_px: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_regions: 5,
            blur_sigma: 1.1,
            close_radius: 4,
            border_px: 10,
            jpeg_quality: 95,
            min_side_px: 2,
        }
    }
}

/// Batch scheduling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of source images processed concurrently.
    pub max_parallelism: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_parallelism: 4 }
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extraction: ExtractionConfig,
    pub batch: BatchConfig,
    /// Where extracted photos go. `None` means the data-directory default.
    pub output_dir: Option<PathBuf>,
    /// Reveal the output directory in the file browser after a batch.
    pub reveal_output: bool,
}

impl AppConfig {
    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let ex = &self.extraction;
        if ex.max_regions == 0 {
            return Err(SplitscanError::Config("max_regions must be at least 1".into()));
        }
        if !(1..=100).contains(&ex.jpeg_quality) {
            return Err(SplitscanError::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                ex.jpeg_quality
            )));
        }
        if !ex.blur_sigma.is_finite() || ex.blur_sigma <= 0.0 {
            return Err(SplitscanError::Config(format!(
                "blur_sigma must be positive, got {}",
                ex.blur_sigma
            )));
        }
        if ex.border_px > MAX_BORDER_PX {
            return Err(SplitscanError::Config(format!(
                "border_px must be at most {}, got {}",
                MAX_BORDER_PX, ex.border_px
            )));
        }
        if ex.min_side_px == 0 {
            return Err(SplitscanError::Config("min_side_px must be at least 1".into()));
        }
        if self.batch.max_parallelism == 0 {
            return Err(SplitscanError::Config(
                "max_parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
