// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the splitscan-vision crate. Covers the
// segmentation path (mask derivation + contour ranking) and single-region
// rectification on a synthetic two-photo scan.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use splitscan_core::ExtractionConfig;
use splitscan_vision::{find_regions, preprocess, rectify};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// An 800x600 white scan holding one tilted and one straight grey photo.
fn synthetic_scan() -> RgbImage {
    let mut scan = RgbImage::from_pixel(800, 600, Rgb([255, 255, 255]));
    let tilted = [
        Point::new(80, 120),
        Point::new(330, 80),
        Point::new(360, 260),
        Point::new(110, 300),
    ];
    let straight = [
        Point::new(450, 200),
        Point::new(720, 200),
        Point::new(720, 500),
        Point::new(450, 500),
    ];
    draw_polygon_mut(&mut scan, &tilted, Rgb([90, 90, 90]));
    draw_polygon_mut(&mut scan, &straight, Rgb([120, 100, 80]));
    scan
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_segmentation(c: &mut Criterion) {
    let scan = synthetic_scan();
    let config = ExtractionConfig::default();

    c.bench_function("preprocess + find_regions (800x600)", |b| {
        b.iter(|| {
            let mask = preprocess(black_box(&scan), &config);
            black_box(find_regions(&mask, config.max_regions).ok());
        });
    });
}

fn bench_rectification(c: &mut Criterion) {
    let scan = synthetic_scan();
    let config = ExtractionConfig::default();
    let mask = preprocess(&scan, &config);
    let regions = match find_regions(&mask, config.max_regions) {
        Ok(regions) => regions,
        Err(_) => return,
    };

    c.bench_function("rectify largest region", |b| {
        b.iter(|| black_box(rectify(black_box(&scan), &regions[0], config.min_side_px).ok()));
    });
}

criterion_group!(benches, bench_segmentation, bench_rectification);
criterion_main!(benches);
