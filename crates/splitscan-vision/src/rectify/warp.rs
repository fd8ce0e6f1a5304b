// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectifier — projects one candidate region of the scan onto an upright,
// axis-aligned raster.

use image::RgbImage;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use splitscan_core::error::{Result, SplitscanError};
use tracing::{debug, instrument};

use crate::raster::processor::WHITE;
use crate::rectify::geometry::min_area_rect;
use crate::segment::regions::Region;

/// Rectify one region of `source` into an upright photo.
///
/// ## Pipeline
///
/// 1. Fit the minimum-area oriented rectangle around the region's points
/// 2. Take the upright size, transposing tall rectangles, truncated to
///    whole pixels
/// 3. Map the rectangle's corners onto `(0,h-1), (0,0), (w-1,0), (w-1,h-1)`
///    with a projective transform
/// 4. Warp the source through it into a `w` x `h` buffer (bilinear, white
///    outside the scan)
///
/// Regions whose upright size has a side shorter than `min_side` pixels, or
/// whose corners do not define a solvable transform, fail with
/// [`SplitscanError::Rectification`]; nothing is produced for them.
#[instrument(skip_all, fields(points = region.points.len(), area = region.area))]
pub fn rectify(source: &RgbImage, region: &Region, min_side: u32) -> Result<RgbImage> {
    let rect = min_area_rect(&region.points);
    let (width, height) = rect.upright_size();
    debug!(
        center = ?rect.center,
        size = ?rect.size,
        angle = rect.angle_degrees,
        width,
        height,
        "Oriented rectangle fitted"
    );

    let min_side = min_side.max(1);
    if width < min_side || height < min_side {
        return Err(SplitscanError::Rectification(format!(
            "degenerate rectangle {}x{} (minimum side {} px)",
            width, height, min_side
        )));
    }

    let (right, bottom) = ((width - 1) as f32, (height - 1) as f32);
    let dest: [(f32, f32); 4] = [
        (0.0, bottom), // bottom-left
        (0.0, 0.0),    // top-left
        (right, 0.0),  // top-right
        (right, bottom), // bottom-right
    ];

    let projection = Projection::from_control_points(rect.upright_corners(), dest)
        .ok_or_else(|| {
            SplitscanError::Rectification(format!(
                "no perspective transform for {}x{} rectangle",
                width, height
            ))
        })?;

    let mut output = RgbImage::new(width, height);
    warp_into(source, &projection, Interpolation::Bilinear, WHITE, &mut output);

    if output.width() == 0 || output.height() == 0 {
        return Err(SplitscanError::Rectification("warp produced an empty image".into()));
    }
    Ok(output)
}
