// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic scans shared by the extractor and coordinator tests.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GREY: Rgb<u8> = Rgb([128, 128, 128]);

/// Blank flatbed scan.
pub fn white_scan(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, WHITE)
}

fn rotated_polygon(center: (f32, f32), w: f32, h: f32, degrees: f32) -> Vec<Point<i32>> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]
        .iter()
        .map(|&(fx, fy)| {
            let (lx, ly) = (fx * w, fy * h);
            Point::new(
                (center.0 + lx * cos - ly * sin).round() as i32,
                (center.1 + lx * sin + ly * cos).round() as i32,
            )
        })
        .collect()
}

/// Lay a `w` x `h` photo with an 8px black frame onto the scan.
pub fn place_photo(scan: &mut RgbImage, center: (f32, f32), w: f32, h: f32, degrees: f32) {
    draw_polygon_mut(scan, &rotated_polygon(center, w, h, degrees), BLACK);
    draw_polygon_mut(
        scan,
        &rotated_polygon(center, w - 16.0, h - 16.0, degrees),
        GREY,
    );
}

/// A small scan with one tilted and one straight photo.
pub fn two_photo_scan() -> RgbImage {
    let mut scan = white_scan(480, 320);
    place_photo(&mut scan, (130.0, 160.0), 160.0, 110.0, 8.0);
    place_photo(&mut scan, (350.0, 160.0), 140.0, 200.0, 0.0);
    scan
}

pub fn save_png(dir: &Path, name: &str, scan: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    scan.save(&path).expect("save fixture");
    path
}

/// Names of the files in `dir`, sorted.
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read_dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
