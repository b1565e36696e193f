// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page merger — composites two pages side by side into one spread.

use std::borrow::Cow;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage, imageops};
use spreadfuse_core::error::{Result, SpreadfuseError};
use spreadfuse_core::types::HeightPolicy;
use tracing::{debug, instrument};

use crate::image::page_image::PageImage;

/// Composite `left` and `right` into one image, top-aligned, with the gap
/// under the shorter page filled white.
///
/// The result is `left.width + right.width` wide and as tall as the taller
/// page. `right` starts at x = `left.width`.
pub fn merge(left: &DynamicImage, right: &DynamicImage) -> Result<DynamicImage> {
    merge_with_policy(left, right, HeightPolicy::Pad)
}

/// Composite two pages, reconciling unequal heights according to `policy`.
///
/// With [`HeightPolicy::Scale`] the shorter page is first resized
/// proportionally to the taller height, so the output width is the sum of the
/// scaled widths. Fails with [`SpreadfuseError::DimensionMismatch`] when
/// either page has a zero dimension.
#[instrument(skip_all, fields(
    left_w = left.width(),
    left_h = left.height(),
    right_w = right.width(),
    right_h = right.height(),
    policy = ?policy
))]
pub fn merge_with_policy(
    left: &DynamicImage,
    right: &DynamicImage,
    policy: HeightPolicy,
) -> Result<DynamicImage> {
    let degenerate = |img: &DynamicImage| img.width() == 0 || img.height() == 0;
    if degenerate(left) || degenerate(right) {
        return Err(SpreadfuseError::DimensionMismatch {
            left: left.dimensions(),
            right: right.dimensions(),
        });
    }

    let height = left.height().max(right.height());
    let (left, right): (Cow<'_, DynamicImage>, Cow<'_, DynamicImage>) = match policy {
        HeightPolicy::Pad => (Cow::Borrowed(left), Cow::Borrowed(right)),
        HeightPolicy::Scale => (scaled(left, height), scaled(right, height)),
    };
    let width = left.width() + right.width();

    let merged = if left.color().has_alpha() || right.color().has_alpha() {
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        imageops::replace(&mut canvas, &left.to_rgba8(), 0, 0);
        imageops::replace(&mut canvas, &right.to_rgba8(), left.width() as i64, 0);
        DynamicImage::ImageRgba8(canvas)
    } else {
        let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        imageops::replace(&mut canvas, &left.to_rgb8(), 0, 0);
        imageops::replace(&mut canvas, &right.to_rgb8(), left.width() as i64, 0);
        DynamicImage::ImageRgb8(canvas)
    };

    debug!(width, height, "spread composited");
    Ok(merged)
}

fn scaled(page: &DynamicImage, height: u32) -> Cow<'_, DynamicImage> {
    if page.height() == height {
        return Cow::Borrowed(page);
    }
    Cow::Owned(
        PageImage::from_dynamic(page.clone())
            .scale_to_height(height)
            .into_dynamic(),
    )
}
