// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Border sampling — the vertical pixel strip along one edge of a page.

use image::{DynamicImage, RgbImage};
use spreadfuse_core::error::{Result, SpreadfuseError};
use spreadfuse_core::types::{BorderWidth, Side};

/// A strip of full-height pixel columns taken from one edge of a page.
#[derive(Debug, Clone)]
pub struct BorderSample {
    side: Side,
    pixels: RgbImage,
    source_width: u32,
    source_height: u32,
}

impl BorderSample {
    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of pixel columns in the strip.
    pub fn columns(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Dimensions of the page the strip was taken from.
    pub fn source_dimensions(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Sum of the RGB channels for every pixel in the strip. Three times the
    /// channel mean, kept exact so cutoffs can be compared without rounding.
    pub fn channel_sums(&self) -> impl Iterator<Item = u16> + '_ {
        self.pixels.pixels().map(|p| {
            let [r, g, b] = p.0;
            r as u16 + g as u16 + b as u16
        })
    }
}

/// Take the `border_width` outermost columns from `side` of `image`.
///
/// Alpha is discarded; only colour matters for spread detection. Fails with
/// [`SpreadfuseError::InvalidDimension`] when the resolved width is zero or
/// wider than the image.
pub fn sample_border(
    image: &DynamicImage,
    side: Side,
    border_width: BorderWidth,
) -> Result<BorderSample> {
    let (width, height) = (image.width(), image.height());
    let columns = border_width.resolve(width);
    if columns == 0 || columns > width {
        return Err(SpreadfuseError::InvalidDimension {
            requested: columns,
            available: width,
        });
    }

    let x = match side {
        Side::Left => 0,
        Side::Right => width - columns,
    };
    let pixels = image.crop_imm(x, 0, columns, height).to_rgb8();

    Ok(BorderSample {
        side,
        pixels,
        source_width: width,
        source_height: height,
    })
}
