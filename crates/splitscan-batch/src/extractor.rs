// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photo extractor — runs the full pipeline for one scanned image: load,
// mask, detect, then rectify, frame and persist each candidate region.
//
// A failed region never stops its siblings. The image as a whole only fails
// when it cannot be loaded, has no candidate regions, or every region fails.

use std::path::{Path, PathBuf};

use chrono::Local;
use image::RgbImage;
use splitscan_core::config::ExtractionConfig;
use splitscan_core::error::{ErrorScope, Result, SplitscanError};
use splitscan_core::types::{ExtractionResult, RegionFailure};
use splitscan_vision::{ImageProcessor, Region, find_regions, preprocess, rectify};
use tracing::{debug, info, instrument, warn};

use crate::output::{OutputDir, OutputNamer};

/// Extracts the individual photos found on one scanned page.
#[derive(Debug, Clone, Default)]
pub struct PhotoExtractor {
    config: ExtractionConfig,
}

impl PhotoExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract every detected photo of `source` into `output`.
    ///
    /// Outputs are listed in rank order (largest region first); regions that
    /// failed are reported alongside them rather than as an error.
    #[instrument(skip(self, output), fields(source = %source.display()))]
    pub fn extract(&self, source: &Path, output: &OutputDir) -> Result<ExtractionResult> {
        let scan = ImageProcessor::open(source)?.into_rgb();

        let regions = {
            let mask = preprocess(&scan, &self.config);
            find_regions(&mask, self.config.max_regions)?
        };
        debug!(count = regions.len(), "candidate regions");

        let namer = OutputNamer::for_source(source, Local::now());
        self.extract_regions(source, &scan, &regions, &namer, output)
    }

    /// Rectify and persist each region independently.
    pub(crate) fn extract_regions(
        &self,
        source: &Path,
        scan: &RgbImage,
        regions: &[Region],
        namer: &OutputNamer,
        output: &OutputDir,
    ) -> Result<ExtractionResult> {
        let mut outputs = Vec::with_capacity(regions.len());
        let mut region_failures = Vec::new();

        for (rank, region) in regions.iter().enumerate() {
            match self.extract_region(scan, region, rank, namer, output) {
                Ok(path) => {
                    debug!(rank, path = %path.display(), "photo written");
                    outputs.push(path);
                }
                Err(err) => skip_region(rank, err, &mut region_failures)?,
            }
        }

        if outputs.is_empty() {
            return Err(SplitscanError::AllRegionsFailed {
                attempted: regions.len(),
            });
        }

        info!(
            written = outputs.len(),
            skipped = region_failures.len(),
            "extraction complete"
        );
        Ok(ExtractionResult {
            source: source.to_path_buf(),
            outputs,
            region_failures,
        })
    }

    fn extract_region(
        &self,
        scan: &RgbImage,
        region: &Region,
        rank: usize,
        namer: &OutputNamer,
        output: &OutputDir,
    ) -> Result<PathBuf> {
        let photo = rectify(scan, region, self.config.min_side_px)?;
        let bytes = ImageProcessor::from_rgb(photo)
            .with_border(self.config.border_px)
            .to_jpeg_bytes(self.config.jpeg_quality)?;
        output.write_photo(namer, rank, &bytes)
    }
}

/// Record a region-scoped failure and carry on; wider errors stop the image.
fn skip_region(
    rank: usize,
    err: SplitscanError,
    region_failures: &mut Vec<RegionFailure>,
) -> Result<()> {
    if err.scope() != ErrorScope::Region {
        return Err(err);
    }
    warn!(rank, error = %err, "skipping region");
    region_failures.push(RegionFailure {
        rank,
        message: err.to_string(),
    });
    Ok(())
}

/// Extract the photos of one scan into `output_dir` with default settings.
///
/// Creates `output_dir` if needed and returns the written paths in rank
/// order.
pub fn extract_photos(input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let output = OutputDir::prepare(output_dir)?;
    let result = PhotoExtractor::default().extract(input, &output)?;
    Ok(result.outputs)
}
