// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode embedded image streams, downscale oversized
// images, and normalise to RGB before OCR. Operates on in-memory images
// using the `image` crate.

use image::{DynamicImage, ImageFormat, RgbImage};
use pagetally_core::error::TallyError;
use pagetally_core::types::{ImageEncoding, RawImage};
use tracing::{debug, instrument};

/// Image pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining:
///
/// ```ignore
/// let raw = ImageProcessor::from_encoded(&bytes, &ImageEncoding::Jpeg)?
///     .fit_within(1000)
///     .to_raw_rgb();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode encoded bytes, using `encoding` as a format hint.
    #[instrument(skip(data), fields(data_len = data.len(), encoding = encoding.extension()))]
    pub fn from_encoded(data: &[u8], encoding: &ImageEncoding) -> Result<Self, TallyError> {
        let format = match encoding {
            ImageEncoding::Png => ImageFormat::Png,
            ImageEncoding::Jpeg => ImageFormat::Jpeg,
            ImageEncoding::Bmp => ImageFormat::Bmp,
            ImageEncoding::Tiff => ImageFormat::Tiff,
            ImageEncoding::Other(name) => {
                return Err(TallyError::UnsupportedImage(name.clone()));
            }
        };
        let img = image::load_from_memory_with_format(data, format).map_err(|err| {
            TallyError::ImageError(format!(
                "failed to decode {} image: {}",
                encoding.extension(),
                err
            ))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap raw samples produced by a rasterizer.
    pub fn from_raw(raw: &RawImage) -> Result<Self, TallyError> {
        let rgb = raw.to_rgb();
        let buffer = RgbImage::from_raw(rgb.width, rgb.height, rgb.samples).ok_or_else(|| {
            TallyError::ImageError(format!(
                "sample buffer does not match {}x{} RGB",
                raw.width, raw.height
            ))
        })?;
        Ok(Self {
            image: DynamicImage::ImageRgb8(buffer),
        })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
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

    // -- Transformations ------------------------------------------------------

    /// Downscale so neither side exceeds `max_dimension`, preserving aspect
    /// ratio. Images already within bounds are returned untouched.
    pub fn fit_within(self, max_dimension: u32) -> Self {
        if self.image.width() <= max_dimension && self.image.height() <= max_dimension {
            return self;
        }
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            max_dimension,
            "Downscaling image"
        );
        let resized = self.image.resize(
            max_dimension,
            max_dimension,
            image::imageops::FilterType::Lanczos3,
        );
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Normalise to 8-bit RGB samples.
    pub fn to_raw_rgb(&self) -> RawImage {
        let rgb = self.image.to_rgb8();
        let (width, height) = rgb.dimensions();
        RawImage::new(width, height, 3, rgb.into_raw())
    }

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, TallyError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), TallyError> {
        self.image.save(path.as_ref()).map_err(|err| {
            TallyError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
pub(crate) fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, TallyError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        TallyError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}
