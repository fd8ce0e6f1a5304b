// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification — oriented minimum-area rectangle fitting and the
// perspective warp that turns a rotated photo into an upright one.

pub mod geometry;
pub mod warp;

pub use geometry::{OrientedRect, min_area_rect};
pub use warp::rectify;
