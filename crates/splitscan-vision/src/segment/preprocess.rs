// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessor — turns a colour scan into a binary foreground mask in which
// every photo is a solid blob of 255 on a 0 background.

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::close;
use splitscan_core::ExtractionConfig;
use tracing::{debug, instrument};

/// Mask value for foreground (photo) pixels.
pub const FOREGROUND: u8 = 255;
/// Mask value for scanner-bed pixels.
pub const BACKGROUND: u8 = 0;

/// Width of the smoothing kernel.
pub const BLUR_TAPS: usize = 5;

/// Derive the foreground mask of a scan.
///
/// ## Pipeline
///
/// 1. Luminance conversion
/// 2. 5x5 Gaussian blur (`blur_sigma`) to suppress sensor and dust noise
/// 3. Otsu's global threshold with inverted polarity: pixels at or below the
///    level become foreground, so photos lying on a bright bed light up
/// 4. Morphological closing with a square element of Chebyshev radius
///    `close_radius`, bridging thin seams and speckle inside a photo so that
///    it yields one contour
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn preprocess(image: &RgbImage, config: &ExtractionConfig) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let blurred = smooth(&gray, config.blur_sigma);

    // A uniform scan has no split and yields 0, leaving it all background.
    let level = otsu_level(&blurred);
    debug!(level, "Otsu threshold computed");

    let binary = threshold(&blurred, level, ThresholdType::BinaryInverted);
    let closed = close(&binary, Norm::LInf, config.close_radius);
    debug!(close_radius = config.close_radius, "Foreground mask closed");
    closed
}

/// Normalised Gaussian taps over `BLUR_TAPS` samples.
fn gaussian_taps(sigma: f32) -> [f32; BLUR_TAPS] {
    let half = (BLUR_TAPS / 2) as f32;
    let mut taps = [0.0f32; BLUR_TAPS];
    for (i, tap) in taps.iter_mut().enumerate() {
        let x = i as f32 - half;
        *tap = (-(x * x) / (2.0 * sigma * sigma)).exp();
    }
    let sum: f32 = taps.iter().sum();
    taps.iter_mut().for_each(|tap| *tap /= sum);
    taps
}

/// Separable 5x5 Gaussian blur, accumulated in `f32` and rounded once.
pub(crate) fn smooth(gray: &GrayImage, sigma: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let float: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([f32::from(gray.get_pixel(x, y).0[0])]));
    let smoothed = separable_filter_equal(&float, &gaussian_taps(sigma));
    GrayImage::from_fn(width, height, |x, y| {
        Luma([smoothed.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8])
    })
}
