// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region detector — outer contours of the foreground mask, ranked by the
// area they enclose.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;
use splitscan_core::error::{Result, SplitscanError};
use tracing::{debug, info, instrument};

/// The closed outer boundary of one foreground blob, in mask coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Boundary pixels in traversal order.
    pub points: Vec<Point<i32>>,
    /// Polygon area enclosed by `points`; only used for ranking.
    pub area: f64,
}

impl Region {
    /// Build a region from boundary points, deriving its area.
    pub fn new(points: Vec<Point<i32>>) -> Self {
        let area = polygon_area(&points);
        Self { points, area }
    }
}

/// Find the outermost contours of `mask` and keep the `max_regions` largest.
///
/// Holes and blobs nested inside holes are ignored. Regions come back
/// sorted by area, largest first; equal areas keep discovery order.
///
/// Fails with [`SplitscanError::NoRegions`] when the mask has no foreground.
#[instrument(skip(mask), fields(width = mask.width(), height = mask.height()))]
pub fn find_regions(mask: &GrayImage, max_regions: usize) -> Result<Vec<Region>> {
    let mut regions: Vec<Region> = find_contours::<i32>(mask)
        .into_iter()
        .filter(|contour| matches!(contour.border_type, BorderType::Outer))
        .filter(|contour| contour.parent.is_none())
        .map(|contour| Region::new(contour.points))
        .collect();

    if regions.is_empty() {
        debug!("Mask has no external contours");
        return Err(SplitscanError::NoRegions);
    }

    let found = regions.len();
    regions.sort_by(|a, b| b.area.total_cmp(&a.area));
    regions.truncate(max_regions);

    info!(found, kept = regions.len(), "Candidate regions selected");
    Ok(regions)
}

/// Area of a closed polygon via the shoelace formula.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += i64::from(points[i].x) * i64::from(points[j].y);
        twice_area -= i64::from(points[j].x) * i64::from(points[i].y);
    }
    twice_area.unsigned_abs() as f64 / 2.0
}
