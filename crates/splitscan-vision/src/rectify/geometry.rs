// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry for rectification: rotating-calipers minimum area
// rectangle over the region's convex hull, and the corner ordering used to
// build the warp.

use imageproc::point::Point;

/// Minimum-area rectangle enclosing a region.
///
/// ## Angle convention
///
/// `angle_degrees` lies in `[-90, 0)` and is the direction of the `width`
/// axis, measured in image coordinates (y grows downwards, so negative
/// angles tilt the axis upwards). `height` runs along the perpendicular
/// axis. An axis-aligned rectangle is therefore reported at -90 degrees with
/// its sides transposed, and any angle below -45 means the width axis is
/// closer to vertical than horizontal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub center: (f32, f32),
    /// `(width, height)` along the rectangle's own axes.
    pub size: (f32, f32),
    pub angle_degrees: f32,
}

impl OrientedRect {
    /// Build a rectangle from an arbitrary axis direction, normalising the
    /// angle into `[-90, 0)` and transposing the sides where needed.
    pub fn from_axis(center: (f32, f32), width: f32, height: f32, axis_degrees: f32) -> Self {
        let mut angle = axis_degrees;
        let (mut width, mut height) = (width, height);

        while angle >= 90.0 {
            angle -= 180.0;
        }
        while angle < -90.0 {
            angle += 180.0;
        }
        if angle >= 0.0 {
            angle -= 90.0;
            std::mem::swap(&mut width, &mut height);
        }

        Self {
            center,
            size: (width, height),
            angle_degrees: angle,
        }
    }

    /// Whether the width axis is closer to vertical than horizontal.
    pub fn is_tall(&self) -> bool {
        self.angle_degrees < -45.0
    }

    /// Corner points in image space.
    ///
    /// Order: width-axis start/height-axis end, width start/height start,
    /// width end/height start, width end/height end. For a rectangle with
    /// a near-horizontal width axis that is bottom-left, top-left,
    /// top-right, bottom-right.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let theta = self.angle_degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        let (cx, cy) = self.center;
        let (half_w, half_h) = (self.size.0 / 2.0, self.size.1 / 2.0);

        // Width axis u = (cos, sin), height axis v = (-sin, cos).
        let at = |su: f32, sv: f32| {
            (
                cx + su * half_w * cos - sv * half_h * sin,
                cy + su * half_w * sin + sv * half_h * cos,
            )
        };
        [at(-1.0, 1.0), at(-1.0, -1.0), at(1.0, -1.0), at(1.0, 1.0)]
    }

    /// Integer size of the upright photo, `(width, height)`, truncated.
    ///
    /// Tall rectangles are transposed so the result reads in the same
    /// orientation as the scan.
    pub fn upright_size(&self) -> (u32, u32) {
        let (w, h) = if self.is_tall() {
            (self.size.1, self.size.0)
        } else {
            self.size
        };
        (w.max(0.0) as u32, h.max(0.0) as u32)
    }

    /// Corners ordered bottom-left, top-left, top-right, bottom-right as
    /// seen in the upright photo.
    pub fn upright_corners(&self) -> [(f32, f32); 4] {
        let [c0, c1, c2, c3] = self.corners();
        if self.is_tall() {
            [c1, c2, c3, c0]
        } else {
            [c0, c1, c2, c3]
        }
    }

    pub fn area(&self) -> f32 {
        self.size.0 * self.size.1
    }
}

/// Fit the minimum-area rectangle around `points` using rotating calipers
/// over the convex hull.
///
/// Degenerate inputs still produce a rectangle: a single point gives zero
/// size, collinear points give zero height.
pub fn min_area_rect(points: &[Point<i32>]) -> OrientedRect {
    let hull = convex_hull(points);

    match hull.len() {
        0 => return OrientedRect::from_axis((0.0, 0.0), 0.0, 0.0, 0.0),
        1 => {
            let (x, y) = hull[0];
            return OrientedRect::from_axis((x as f32, y as f32), 0.0, 0.0, 0.0);
        }
        _ => {}
    }

    let mut best: Option<(f64, OrientedRect)> = None;
    let n = hull.len();
    for i in 0..n {
        let (px, py) = hull[i];
        let (qx, qy) = hull[(i + 1) % n];
        let (ex, ey) = (qx - px, qy - py);
        let length = ex.hypot(ey);
        if length < f64::EPSILON {
            continue;
        }
        let (ux, uy) = (ex / length, ey / length);
        let (nx, ny) = (-uy, ux);

        let (mut min_u, mut max_u) = (f64::MAX, f64::MIN);
        let (mut min_v, mut max_v) = (f64::MAX, f64::MIN);
        for &(x, y) in &hull {
            let along = x * ux + y * uy;
            let across = x * nx + y * ny;
            min_u = min_u.min(along);
            max_u = max_u.max(along);
            min_v = min_v.min(across);
            max_v = max_v.max(across);
        }

        let (width, height) = (max_u - min_u, max_v - min_v);
        let area = width * height;
        if best.as_ref().is_some_and(|(best_area, _)| *best_area <= area) {
            continue;
        }

        let mid_u = (min_u + max_u) / 2.0;
        let mid_v = (min_v + max_v) / 2.0;
        let center = (mid_u * ux + mid_v * nx, mid_u * uy + mid_v * ny);
        let rect = OrientedRect::from_axis(
            (center.0 as f32, center.1 as f32),
            width as f32,
            height as f32,
            uy.atan2(ux).to_degrees() as f32,
        );
        best = Some((area, rect));
    }

    best.map(|(_, rect)| rect)
        .unwrap_or_else(|| OrientedRect::from_axis((0.0, 0.0), 0.0, 0.0, 0.0))
}

/// Convex hull of `points` as floating-point vertices.
///
/// Contours revisit pixels, so duplicates are dropped before the scan; the
/// hull's angular sort needs distinct points to be a total order.
fn convex_hull(points: &[Point<i32>]) -> Vec<(f64, f64)> {
    let mut unique: Vec<(i32, i32)> = points.iter().map(|p| (p.x, p.y)).collect();
    unique.sort_unstable();
    unique.dedup();

    let unique: Vec<Point<i32>> = unique.into_iter().map(|(x, y)| Point::new(x, y)).collect();
    imageproc::geometry::convex_hull(unique)
        .into_iter()
        .map(|p| (f64::from(p.x), f64::from(p.y)))
        .collect()
}
