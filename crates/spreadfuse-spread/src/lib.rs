// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// spreadfuse-spread — Spread detection and merge engine.
//
// Samples the facing borders of adjacent pages, classifies each pair as a
// double-page spread or not, composites spreads side by side, and walks an
// ordered page sequence producing the fused output. Operates purely on
// decoded in-memory images; archive I/O lives in `spreadfuse-archive`.

pub mod image;
pub mod spread;

// Re-export the primary items so callers can use `spreadfuse_spread::fuse` etc.
pub use crate::image::page_image::PageImage;
pub use crate::spread::border::{BorderSample, sample_border};
pub use crate::spread::classifier::is_spread;
pub use crate::spread::fuser::{FuseReport, PairDecision, SequenceFuser, fuse};
pub use crate::spread::merger::merge;
pub use crate::spread::page::{FusedPage, Page, PageContent};
