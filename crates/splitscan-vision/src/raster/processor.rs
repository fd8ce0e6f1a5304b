// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — source loading, colour normalisation, border padding and
// JPEG encoding. Operates on opaque 8-bit RGB rasters using the `image` crate.

use std::path::Path;

use image::{DynamicImage, Rgb, RgbImage};
use splitscan_core::error::{Result, SplitscanError};
use tracing::{debug, info, instrument};

/// Background colour of a flatbed scan and of the padding around extracted photos.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// An opaque RGB raster moving through the extraction pipeline.
///
/// Construction always normalises the colour mode, so every downstream stage
/// can assume three 8-bit channels with no transparency. Transformations
/// consume `self` and return a new `ImageProcessor`, enabling chaining:
///
/// ```ignore
/// let jpeg = ImageProcessor::from_rgb(rectified)
///     .with_border(10)
///     .to_jpeg_bytes(95)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: RgbImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load a source scan from a file path.
    ///
    /// The path must name an existing regular file; the format is detected
    /// by `image` (JPEG, PNG, BMP and friends).
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SplitscanError::ImageLoad(format!(
                "input file does not exist: {}",
                path.display()
            )));
        }

        let decoded = image::open(path).map_err(|err| {
            SplitscanError::ImageLoad(format!("failed to open {}: {}", path.display(), err))
        })?;
        info!(
            width = decoded.width(),
            height = decoded.height(),
            color = ?decoded.color(),
            "Source image loaded"
        );
        Ok(Self::from_dynamic(decoded))
    }

    /// Wrap an already-decoded image, flattening any alpha channel onto white.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let image = if image.color().has_alpha() {
            debug!("Flattening alpha channel onto white");
            flatten_onto_white(&image)
        } else {
            image.to_rgb8()
        };
        Self { image }
    }

    /// Wrap an opaque RGB buffer as-is.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying RGB buffer.
    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Consume the processor and return the underlying RGB buffer.
    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Pad the image with a white frame `px` pixels wide on every side.
    pub fn with_border(self, px: u32) -> Self {
        if px == 0 {
            return self;
        }
        let (w, h) = self.image.dimensions();
        let mut canvas = RgbImage::from_pixel(w + 2 * px, h + 2 * px, WHITE);
        image::imageops::replace(&mut canvas, &self.image, i64::from(px), i64::from(px));
        Self { image: canvas }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        self.image.write_with_encoder(encoder).map_err(|err| {
            SplitscanError::Persistence(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Composite a possibly translucent image onto an opaque white background.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let image::Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let alpha = u32::from(a);
        let blend = |channel: u8| -> u8 {
            ((u32::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}
