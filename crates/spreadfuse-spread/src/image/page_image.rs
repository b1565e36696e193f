// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page image — decode, proportional height scaling and encode for a single
// comic page. Operates on in-memory images using the `image` crate.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use spreadfuse_core::error::SpreadfuseError;
use tracing::{debug, info, instrument};

/// A single decoded page.
///
/// Transformations consume `self` and return a new `PageImage`, so the
/// decoded pixels are never modified in place.
///
/// ```ignore
/// let jpeg = PageImage::from_bytes(&bytes)?
///     .scale_to_height(2400)
///     .to_jpeg_bytes(90)?;
/// ```
pub struct PageImage {
    image: DynamicImage,
}

impl PageImage {
    // -- Construction ---------------------------------------------------------

    /// Decode a page from raw encoded bytes (JPEG, PNG).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, SpreadfuseError> {
        let img = image::load_from_memory(data).map_err(|err| {
            SpreadfuseError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Page decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resize proportionally so the page is exactly `height` pixels tall.
    ///
    /// The new width is truncated and never drops below one pixel. Uses
    /// Lanczos3 filtering.
    #[instrument(skip(self))]
    pub fn scale_to_height(self, height: u32) -> Self {
        let (w, h) = (self.image.width(), self.image.height());
        if h == height || h == 0 || height == 0 {
            return self;
        }
        let width = ((w as u64 * height as u64) / h as u64).max(1) as u32;
        info!(from_w = w, from_h = h, width, height, "Scaling page");
        let resized =
            self.image
                .resize_exact(width, height, image::imageops::FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the page as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, SpreadfuseError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the page as JPEG bytes with the given quality (1-100).
    ///
    /// JPEG has no alpha channel, so the page is flattened to RGB first.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, SpreadfuseError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            SpreadfuseError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }

    /// Encode in the format implied by `file_name`'s extension. JPEG for
    /// `.jpg`/`.jpeg`, PNG for everything else.
    pub fn encode_for_name(
        &self,
        file_name: &str,
        jpeg_quality: u8,
    ) -> Result<Vec<u8>, SpreadfuseError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => self.to_jpeg_bytes(jpeg_quality),
            _ => self.to_png_bytes(),
        }
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<Vec<u8>, SpreadfuseError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        SpreadfuseError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}
