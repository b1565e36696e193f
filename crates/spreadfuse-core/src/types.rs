// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for spread detection.

use serde::{Deserialize, Serialize};

/// Which vertical edge of a page a border strip is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Width of the border strip sampled from a page edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderWidth {
    /// A fixed number of pixel columns.
    Pixels(u32),
    /// A fraction of the image width (0.0, 1.0], resolved per image.
    Fraction(f32),
}

impl BorderWidth {
    /// Resolve to a pixel count for an image `image_width` pixels wide.
    ///
    /// Fractions round to the nearest pixel but never below one column, so a
    /// tiny page still yields a sample.
    pub fn resolve(self, image_width: u32) -> u32 {
        match self {
            Self::Pixels(px) => px,
            Self::Fraction(fraction) => {
                let px = (image_width as f64 * fraction as f64).round() as u32;
                px.max(1)
            }
        }
    }
}

impl Default for BorderWidth {
    fn default() -> Self {
        Self::Pixels(5)
    }
}

/// Page order inside a merged spread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingDirection {
    /// Western order: the earlier page is the left half of the spread.
    #[default]
    LeftToRight,
    /// Manga order: the earlier page is the right half of the spread.
    RightToLeft,
}

impl ReadingDirection {
    /// The edge of the earlier page that faces the later page.
    pub fn facing_side_of_earlier(self) -> Side {
        match self {
            Self::LeftToRight => Side::Right,
            Self::RightToLeft => Side::Left,
        }
    }
}

/// How pages of different heights are reconciled before compositing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightPolicy {
    /// Top-align both pages and fill the gap under the shorter one with white.
    #[default]
    Pad,
    /// Scale the shorter page proportionally up to the taller height.
    Scale,
}

/// What happens to the scratch directory after an archive is processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Remove extracted files once the archive has been written.
    #[default]
    Delete,
    /// Leave extracted files on disk for inspection.
    Retain,
}

/// Why a pair of adjacent pages was (or was not) merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeReason {
    /// A facing edge is a solid black frame (flashback or transition page).
    EdgeFullyBlack { side: Side, ratio: f64 },
    /// A facing edge carries no non-white pixel at all.
    BlankEdge { side: Side },
    /// Visible non-white, non-black content on both facing edges.
    ContentOnBothEdges,
    /// One of the pages could not be decoded.
    Undecodable { side: Side },
    /// A border could not be sampled from one of the pages.
    SamplingFailed { detail: String },
    /// Classified as a spread, but compositing the pair failed.
    MergeFailed { detail: String },
}

impl std::fmt::Display for MergeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EdgeFullyBlack { side, ratio } => {
                write!(f, "{side} page edge fully black ({:.0}% black)", ratio * 100.0)
            }
            Self::BlankEdge { side } => write!(f, "{side} page edge blank"),
            Self::ContentOnBothEdges => f.write_str("visible content on both facing edges"),
            Self::Undecodable { side } => write!(f, "{side} page undecodable"),
            Self::SamplingFailed { detail } => write!(f, "border sampling failed: {detail}"),
            Self::MergeFailed { detail } => write!(f, "merge failed: {detail}"),
        }
    }
}

/// Outcome of classifying one adjacent pair.
///
/// `side` in the reasons refers to the page's position in the pair: `Left` is
/// the earlier page, `Right` the later one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeDecision {
    pub merge: bool,
    pub reason: MergeReason,
}

impl MergeDecision {
    pub fn merge(reason: MergeReason) -> Self {
        Self { merge: true, reason }
    }

    pub fn keep_apart(reason: MergeReason) -> Self {
        Self {
            merge: false,
            reason,
        }
    }
}
