// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spread classifier — decides from the two facing border strips whether an
// adjacent pair of pages is one continuous spread.
//
// Two guards run before a merge is accepted:
//
// 1. Black frame. An edge whose share of black pixels reaches the threshold
//    is a stylistic frame (flashbacks, chapter transitions). Such frames sit
//    on both facing edges of unrelated pages and would otherwise look like
//    continuous artwork.
// 2. Blank edge. An edge without a single non-white pixel is page margin,
//    i.e. a page boundary rather than art running across the gutter.

use spreadfuse_core::config::SpreadConfig;
use spreadfuse_core::types::{MergeDecision, MergeReason, Side};
use tracing::trace;

use super::border::BorderSample;

/// Pixel statistics of one border strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStats {
    /// Fraction of pixels whose RGB mean is at or below the black cutoff.
    pub black_ratio: f64,
    /// At least one pixel has an RGB mean below the white cutoff.
    pub has_non_white: bool,
}

/// Measure a border strip against the configured cutoffs.
pub fn edge_stats(sample: &BorderSample, config: &SpreadConfig) -> EdgeStats {
    let mut total = 0u64;
    let mut black = 0u64;
    let mut has_non_white = false;

    // mean <= cutoff  <=>  sum <= 3 * cutoff, without truncating the mean.
    let black_sum = 3 * u16::from(config.black_pixel_cutoff);
    let white_sum = 3 * u16::from(config.white_pixel_cutoff);

    for sum in sample.channel_sums() {
        total += 1;
        if sum <= black_sum {
            black += 1;
        }
        if sum < white_sum {
            has_non_white = true;
        }
    }

    let black_ratio = if total == 0 {
        0.0
    } else {
        black as f64 / total as f64
    };
    EdgeStats {
        black_ratio,
        has_non_white,
    }
}

/// Classify a pair of facing borders.
///
/// `earlier` is the facing edge of the first page in reading order, `later`
/// the facing edge of the page after it. Sides in the returned reason name
/// the page's slot in the pair (`Left` = earlier).
pub fn is_spread(
    earlier: &BorderSample,
    later: &BorderSample,
    config: &SpreadConfig,
) -> MergeDecision {
    let stats = [
        (Side::Left, edge_stats(earlier, config)),
        (Side::Right, edge_stats(later, config)),
    ];
    trace!(
        earlier_black = stats[0].1.black_ratio,
        later_black = stats[1].1.black_ratio,
        "facing edge statistics"
    );

    // Ties count as black: the comparison is >=.
    for (side, edge) in &stats {
        if edge.black_ratio >= config.black_threshold_ratio {
            return MergeDecision::keep_apart(MergeReason::EdgeFullyBlack {
                side: *side,
                ratio: edge.black_ratio,
            });
        }
    }

    for (side, edge) in &stats {
        if !edge.has_non_white {
            return MergeDecision::keep_apart(MergeReason::BlankEdge { side: *side });
        }
    }

    MergeDecision::merge(MergeReason::ContentOnBothEdges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spread::border::sample_border;
    use image::{DynamicImage, Rgb, RgbImage};
    use spreadfuse_core::types::BorderWidth;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const GRAY: Rgb<u8> = Rgb([128, 128, 128]);

    /// A 5-column border of 10 rows; the first `n` rows use `top`, the rest `rest`.
    fn strip(top: Rgb<u8>, n: u32, rest: Rgb<u8>) -> BorderSample {
        let img = RgbImage::from_fn(5, 10, |_, y| if y < n { top } else { rest });
        sample_border(&DynamicImage::ImageRgb8(img), Side::Left, BorderWidth::Pixels(5)).unwrap()
    }

    fn config() -> SpreadConfig {
        SpreadConfig::default()
    }

    #[test]
    fn gray_content_on_both_edges_merges() {
        let a = strip(GRAY, 6, WHITE);
        let b = strip(GRAY, 6, WHITE);
        let decision = is_spread(&a, &b, &config());
        assert!(decision.merge);
        assert_eq!(decision.reason, MergeReason::ContentOnBothEdges);
    }

    #[test]
    fn half_black_edges_do_not_merge() {
        let a = strip(BLACK, 5, GRAY);
        let b = strip(BLACK, 5, GRAY);
        let decision = is_spread(&a, &b, &config());
        assert!(!decision.merge);
        assert!(matches!(
            decision.reason,
            MergeReason::EdgeFullyBlack { side: Side::Left, ratio } if (ratio - 0.5).abs() < 1e-9
        ));
    }

    #[test]
    fn black_on_one_side_is_enough_to_refuse() {
        let a = strip(GRAY, 10, GRAY);
        let b = strip(BLACK, 9, GRAY);
        let decision = is_spread(&a, &b, &config());
        assert!(matches!(
            decision.reason,
            MergeReason::EdgeFullyBlack { side: Side::Right, .. }
        ));
    }

    #[test]
    fn ratio_equal_to_threshold_refuses() {
        let a = strip(BLACK, 4, GRAY);
        let b = strip(GRAY, 10, GRAY);
        let tied = SpreadConfig {
            black_threshold_ratio: 0.4,
            ..config()
        };
        assert!(!is_spread(&a, &b, &tied).merge);

        let above = SpreadConfig {
            black_threshold_ratio: 0.41,
            ..config()
        };
        assert!(is_spread(&a, &b, &above).merge);
    }

    #[test]
    fn all_white_edge_is_blank() {
        let a = strip(GRAY, 3, WHITE);
        let b = strip(WHITE, 10, WHITE);
        let decision = is_spread(&a, &b, &config());
        assert!(!decision.merge);
        assert_eq!(decision.reason, MergeReason::BlankEdge { side: Side::Right });
    }

    #[test]
    fn near_white_counts_as_white() {
        // Mean 252 sits above the default white cutoff of 250.
        let a = strip(Rgb([252, 252, 252]), 10, WHITE);
        let b = strip(GRAY, 10, GRAY);
        assert_eq!(
            is_spread(&a, &b, &config()).reason,
            MergeReason::BlankEdge { side: Side::Left }
        );
    }

    #[test]
    fn black_cutoff_uses_exact_mean() {
        // Mean 20.67 is above the default cutoff of 20.
        let dark_gray = edge_stats(&strip(Rgb([20, 21, 21]), 10, WHITE), &config());
        assert_eq!(dark_gray.black_ratio, 0.0);
        assert!(dark_gray.has_non_white);

        let at_cutoff = edge_stats(&strip(Rgb([20, 20, 20]), 10, WHITE), &config());
        assert_eq!(at_cutoff.black_ratio, 1.0);
    }

    #[test]
    fn white_cutoff_uses_exact_mean() {
        // Mean 249.67 is below the default white cutoff of 250.
        let off_white = edge_stats(&strip(Rgb([249, 250, 250]), 10, WHITE), &config());
        assert!(off_white.has_non_white);

        let at_cutoff = edge_stats(&strip(Rgb([250, 250, 250]), 10, WHITE), &config());
        assert!(!at_cutoff.has_non_white);
    }

    #[test]
    fn black_guard_wins_over_blank_guard() {
        let a = strip(BLACK, 10, BLACK);
        let b = strip(WHITE, 10, WHITE);
        assert!(matches!(
            is_spread(&a, &b, &config()).reason,
            MergeReason::EdgeFullyBlack { .. }
        ));
    }

    #[test]
    fn classification_is_idempotent() {
        let a = strip(GRAY, 6, WHITE);
        let b = strip(BLACK, 2, GRAY);
        let first = is_spread(&a, &b, &config());
        let second = is_spread(&a, &b, &config());
        assert_eq!(first, second);
    }

    #[test]
    fn edge_stats_counts_black_share() {
        let stats = edge_stats(&strip(BLACK, 3, WHITE), &config());
        assert!((stats.black_ratio - 0.3).abs() < 1e-9);
        assert!(stats.has_non_white);
    }
}
