// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// splitscan-vision — The geometric core of the photo splitter.
//
// Provides source raster handling (load, alpha flattening, border padding,
// JPEG encoding), segmentation (luminance, blur, inverted Otsu binarization,
// morphological closing, external contour ranking) and rectification
// (minimum-area oriented rectangle, perspective warp to an upright photo).

pub mod raster;
pub mod rectify;
pub mod segment;

// Re-export the primary entry points so callers can use `splitscan_vision::preprocess` etc.
pub use crate::raster::processor::ImageProcessor;
pub use crate::rectify::geometry::{OrientedRect, min_area_rect};
pub use crate::rectify::warp::rectify;
pub use crate::segment::preprocess::preprocess;
pub use crate::segment::regions::{Region, find_regions};
