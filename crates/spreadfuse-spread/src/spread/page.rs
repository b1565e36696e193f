// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page model — input pages in reading order and the slots of a fused
// sequence.

use image::DynamicImage;
use spreadfuse_core::error::SpreadfuseError;
use tracing::warn;

use crate::image::page_image::PageImage;

/// Pixel content of an input page.
#[derive(Debug, Clone)]
pub enum PageContent {
    Decoded(DynamicImage),
    /// The source bytes could not be decoded.
    Undecodable { reason: String },
}

/// One page of a comic, named after its source file.
#[derive(Debug, Clone)]
pub struct Page {
    /// Path of the page relative to the archive root, e.g. `ch01/003.jpg`.
    pub name: String,
    pub content: PageContent,
    /// Encoded bytes the page was decoded from, if it came from a file.
    /// Pages left unmerged are repackaged from these without re-encoding.
    pub source_bytes: Option<Vec<u8>>,
}

impl Page {
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            name: name.into(),
            content: PageContent::Decoded(image),
            source_bytes: None,
        }
    }

    /// Decode `bytes` into a page. A decode failure does not error; the page
    /// is marked undecodable so it can never join a spread.
    pub fn decode(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let content = match PageImage::from_bytes(&bytes) {
            Ok(img) => PageContent::Decoded(img.into_dynamic()),
            Err(err) => {
                warn!(page = %name, error = %err, "page could not be decoded, it will not be merged");
                PageContent::Undecodable {
                    reason: err.to_string(),
                }
            }
        };
        Self {
            name,
            content,
            source_bytes: Some(bytes),
        }
    }

    /// The decoded image, or `None` for an undecodable page.
    pub fn image(&self) -> Option<&DynamicImage> {
        match &self.content {
            PageContent::Decoded(img) => Some(img),
            PageContent::Undecodable { .. } => None,
        }
    }

    /// The decode failure for this page, if any.
    pub fn decode_error(&self) -> Option<SpreadfuseError> {
        match &self.content {
            PageContent::Decoded(_) => None,
            PageContent::Undecodable { reason, .. } => Some(SpreadfuseError::DecodeFailure {
                page: self.name.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// One slot of a fused sequence.
///
/// Indices refer to positions in the input sequence.
#[derive(Debug, Clone)]
pub enum FusedPage {
    /// An input page passed through untouched.
    Original { index: usize, page: Page },
    /// Two adjacent input pages composited into one spread.
    Merged {
        left: usize,
        right: usize,
        /// Name of the earlier page of the pair.
        name: String,
        image: DynamicImage,
    },
}

impl FusedPage {
    pub fn name(&self) -> &str {
        match self {
            Self::Original { page, .. } => &page.name,
            Self::Merged { name, .. } => name,
        }
    }

    /// Input indices this slot was built from, in ascending order.
    pub fn source_indices(&self) -> Vec<usize> {
        match self {
            Self::Original { index, .. } => vec![*index],
            Self::Merged { left, right, .. } => vec![*left, *right],
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }

    /// Pixel dimensions, or `None` for an undecodable page.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Original { page, .. } => page.image().map(|img| (img.width(), img.height())),
            Self::Merged { image, .. } => Some((image.width(), image.height())),
        }
    }
}
