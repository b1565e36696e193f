// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sequence fuser — walks an ordered page list with a cursor, merging each
// adjacent pair classified as a spread.
//
// Cursor rules:
//   - last page: emit unchanged, stop
//   - pair is a spread: emit the composite, advance by two
//   - otherwise: emit the current page, advance by one
//
// A page consumed by a merge is never looked at again, so no page can end up
// in two spreads. Pair classification is read-only and can be computed for
// every pair up front on the rayon pool; the cursor pass itself is always
// sequential.

use image::DynamicImage;
use rayon::prelude::*;
use serde::Serialize;
use spreadfuse_core::config::SpreadConfig;
use spreadfuse_core::error::{Result, SpreadfuseError};
use spreadfuse_core::types::{MergeDecision, MergeReason, ReadingDirection, Side};
use tracing::{debug, info, instrument, warn};

use super::border::sample_border;
use super::classifier::is_spread;
use super::merger::merge_with_policy;
use super::page::{FusedPage, Page};

/// Decision taken for one adjacent pair the cursor evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairDecision {
    /// Index of the earlier page.
    pub earlier: usize,
    /// Index of the later page.
    pub later: usize,
    pub decision: MergeDecision,
}

/// Fused sequence plus the decisions that produced it.
#[derive(Debug, Clone)]
pub struct FuseReport {
    pub pages: Vec<FusedPage>,
    /// One entry per pair the cursor evaluated, in cursor order.
    pub decisions: Vec<PairDecision>,
}

impl FuseReport {
    pub fn merged_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_merged()).count()
    }
}

/// Spread detection over a whole page sequence.
pub struct SequenceFuser {
    config: SpreadConfig,
}

impl SequenceFuser {
    pub fn new(config: SpreadConfig) -> Self {
        Self { config }
    }

    /// Classify `earlier` followed by `later`.
    ///
    /// Undecodable pages and pages too narrow for the border never merge;
    /// these are reported through the decision reason, not as errors.
    pub fn classify_pair(&self, earlier: &Page, later: &Page) -> MergeDecision {
        let (Some(earlier_img), Some(later_img)) = (earlier.image(), later.image()) else {
            let side = if earlier.image().is_none() {
                Side::Left
            } else {
                Side::Right
            };
            return MergeDecision::keep_apart(MergeReason::Undecodable { side });
        };

        let facing = self.config.reading_direction.facing_side_of_earlier();
        let samples = sample_border(earlier_img, facing, self.config.border_width).and_then(
            |a| sample_border(later_img, facing.opposite(), self.config.border_width).map(|b| (a, b)),
        );

        match samples {
            Ok((a, b)) => is_spread(&a, &b, &self.config),
            Err(err) => {
                warn!(
                    earlier = %earlier.name,
                    later = %later.name,
                    error = %err,
                    "border sampling failed, keeping pages apart"
                );
                MergeDecision::keep_apart(MergeReason::SamplingFailed {
                    detail: err.to_string(),
                })
            }
        }
    }

    /// Fuse `pages` and return only the output sequence.
    pub fn fuse(&self, pages: Vec<Page>) -> Vec<FusedPage> {
        self.fuse_with_report(pages).pages
    }

    /// Fuse `pages`, also returning the decision for every evaluated pair.
    #[instrument(skip_all, fields(pages = pages.len(), parallel = self.config.parallel))]
    pub fn fuse_with_report(&self, pages: Vec<Page>) -> FuseReport {
        let total = pages.len();

        // Classifies pairs the cursor will later skip as well.
        let mut precomputed: Vec<Option<MergeDecision>> = if self.config.parallel && total > 2 {
            pages
                .par_windows(2)
                .map(|pair| Some(self.classify_pair(&pair[0], &pair[1])))
                .collect()
        } else {
            Vec::new()
        };

        let mut output = Vec::with_capacity(total);
        let mut decisions = Vec::with_capacity(total.saturating_sub(1));
        let mut remaining = pages.into_iter().enumerate();
        let mut cursor = remaining.next();

        while let Some((i, earlier)) = cursor.take() {
            let Some((j, later)) = remaining.next() else {
                output.push(FusedPage::Original {
                    index: i,
                    page: earlier,
                });
                break;
            };

            let decision = precomputed
                .get_mut(i)
                .and_then(Option::take)
                .unwrap_or_else(|| self.classify_pair(&earlier, &later));

            if !decision.merge {
                debug!(page = %earlier.name, reason = %decision.reason, "no spread");
                decisions.push(PairDecision {
                    earlier: i,
                    later: j,
                    decision,
                });
                output.push(FusedPage::Original {
                    index: i,
                    page: earlier,
                });
                // The later page stays available for the next pair.
                cursor = Some((j, later));
                continue;
            }

            let composite = self.composite(&earlier, &later);
            emit_spread(
                (i, earlier),
                (j, later),
                decision,
                composite,
                &mut output,
                &mut decisions,
            );
            cursor = remaining.next();
        }

        let report = FuseReport {
            pages: output,
            decisions,
        };
        info!(
            input = total,
            output = report.pages.len(),
            merged = report.merged_count(),
            "sequence fused"
        );
        report
    }

    /// Composite a classified pair in reading order.
    fn composite(&self, earlier: &Page, later: &Page) -> Result<DynamicImage> {
        let (Some(a), Some(b)) = (earlier.image(), later.image()) else {
            return Err(SpreadfuseError::ImageError(
                "cannot composite an undecodable page".into(),
            ));
        };
        let policy = self.config.height_policy;
        match self.config.reading_direction {
            ReadingDirection::LeftToRight => merge_with_policy(a, b, policy),
            ReadingDirection::RightToLeft => merge_with_policy(b, a, policy),
        }
    }
}

/// Record a pair classified as a spread. If compositing failed, both pages
/// go to the output unmerged and the decision becomes `MergeFailed`.
fn emit_spread(
    (i, earlier): (usize, Page),
    (j, later): (usize, Page),
    decision: MergeDecision,
    composite: Result<DynamicImage>,
    output: &mut Vec<FusedPage>,
    decisions: &mut Vec<PairDecision>,
) {
    match composite {
        Ok(image) => {
            info!(
                earlier = %earlier.name,
                later = %later.name,
                width = image.width(),
                height = image.height(),
                "spread detected, pages merged"
            );
            decisions.push(PairDecision {
                earlier: i,
                later: j,
                decision,
            });
            output.push(FusedPage::Merged {
                left: i,
                right: j,
                name: earlier.name,
                image,
            });
        }
        Err(err) => {
            warn!(
                earlier = %earlier.name,
                later = %later.name,
                error = %err,
                "merge failed, emitting both pages unmerged"
            );
            decisions.push(PairDecision {
                earlier: i,
                later: j,
                decision: MergeDecision::keep_apart(MergeReason::MergeFailed {
                    detail: err.to_string(),
                }),
            });
            output.push(FusedPage::Original {
                index: i,
                page: earlier,
            });
            output.push(FusedPage::Original {
                index: j,
                page: later,
            });
        }
    }
}

/// Fuse `pages` with the given settings.
pub fn fuse(pages: Vec<Page>, config: &SpreadConfig) -> Vec<FusedPage> {
    SequenceFuser::new(config.clone()).fuse(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use spreadfuse_core::types::BorderWidth;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const GRAY: Rgb<u8> = Rgb([128, 128, 128]);

    /// 20x10 white page whose left/right 5-column edges are filled with
    /// `edge` on the top `rows` rows.
    fn page(name: &str, left: (Rgb<u8>, u32), right: (Rgb<u8>, u32)) -> Page {
        let img = RgbImage::from_fn(20, 10, |x, y| {
            if x < 5 && y < left.1 {
                left.0
            } else if x >= 15 && y < right.1 {
                right.0
            } else {
                WHITE
            }
        });
        Page::new(name, DynamicImage::ImageRgb8(img))
    }

    fn blank(name: &str) -> Page {
        page(name, (WHITE, 0), (WHITE, 0))
    }

    /// Page whose both edges are 60% mid-gray.
    fn art(name: &str) -> Page {
        page(name, (GRAY, 6), (GRAY, 6))
    }

    fn configs() -> [SpreadConfig; 2] {
        [
            SpreadConfig {
                parallel: false,
                ..Default::default()
            },
            SpreadConfig {
                parallel: true,
                ..Default::default()
            },
        ]
    }

    /// Every input index appears exactly once across the output.
    fn assert_partition(output: &[FusedPage], input_len: usize) {
        let mut seen: Vec<usize> = output.iter().flat_map(|p| p.source_indices()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..input_len).collect::<Vec<_>>());
        assert!(output.len() <= input_len);
    }

    #[test]
    fn empty_sequence_stays_empty() {
        for config in configs() {
            assert!(fuse(Vec::new(), &config).is_empty());
        }
    }

    #[test]
    fn single_page_passes_through() {
        let report = SequenceFuser::new(SpreadConfig::default()).fuse_with_report(vec![art("001.jpg")]);
        assert_eq!(report.pages.len(), 1);
        assert!(report.decisions.is_empty());
        assert!(matches!(&report.pages[0], FusedPage::Original { index: 0, .. }));
    }

    #[test]
    fn gray_facing_edges_merge_into_one_spread() {
        for config in configs() {
            let out = fuse(vec![art("001.jpg"), art("002.jpg")], &config);
            assert_eq!(out.len(), 1);
            match &out[0] {
                FusedPage::Merged { left, right, name, image } => {
                    assert_eq!((*left, *right), (0, 1));
                    assert_eq!(name, "001.jpg");
                    assert_eq!(image.width(), 40);
                    assert_eq!(image.height(), 10);
                }
                other => panic!("expected a merged spread, got {other:?}"),
            }
        }
    }

    #[test]
    fn white_facing_edges_stay_apart() {
        for config in configs() {
            let out = fuse(vec![blank("001.jpg"), blank("002.jpg")], &config);
            assert_eq!(out.len(), 2);
            assert_eq!(out[0].name(), "001.jpg");
            assert_eq!(out[1].name(), "002.jpg");
            assert!(out.iter().all(|p| !p.is_merged()));
        }
    }

    #[test]
    fn half_black_facing_edges_stay_apart() {
        for config in configs() {
            let a = page("001.jpg", (WHITE, 0), (BLACK, 5));
            let b = page("002.jpg", (BLACK, 5), (WHITE, 0));
            let report = SequenceFuser::new(config).fuse_with_report(vec![a, b]);
            assert_eq!(report.pages.len(), 2);
            assert!(matches!(
                report.decisions[0].decision.reason,
                MergeReason::EdgeFullyBlack { .. }
            ));
        }
    }

    #[test]
    fn merged_page_is_never_reused() {
        // Three pages that would all pair up: only the first two merge.
        for config in configs() {
            let out = fuse(vec![art("001"), art("002"), art("003")], &config);
            assert_eq!(out.len(), 2);
            assert!(out[0].is_merged());
            assert!(matches!(&out[1], FusedPage::Original { index: 2, .. }));
            assert_partition(&out, 3);
        }
    }

    #[test]
    fn cursor_advances_by_one_after_rejection() {
        // 001 is blank on its right edge, 002+003 form a spread.
        for config in configs() {
            let out = fuse(
                vec![page("001", (GRAY, 6), (WHITE, 0)), art("002"), art("003"), blank("004")],
                &config,
            );
            assert_eq!(out.len(), 3);
            assert!(matches!(&out[0], FusedPage::Original { index: 0, .. }));
            assert!(matches!(&out[1], FusedPage::Merged { left: 1, right: 2, .. }));
            assert!(matches!(&out[2], FusedPage::Original { index: 3, .. }));
            assert_partition(&out, 4);
        }
    }

    #[test]
    fn undecodable_page_never_merges() {
        for config in configs() {
            let pages = vec![
                art("001"),
                Page::decode("002", b"corrupt".to_vec()),
                art("003"),
            ];
            let report = SequenceFuser::new(config).fuse_with_report(pages);
            assert_eq!(report.pages.len(), 3);
            assert_eq!(
                report.decisions[0].decision.reason,
                MergeReason::Undecodable { side: Side::Right }
            );
            assert_eq!(
                report.decisions[1].decision.reason,
                MergeReason::Undecodable { side: Side::Left }
            );
            assert_partition(&report.pages, 3);
        }
    }

    #[test]
    fn narrow_page_is_kept_apart_not_fatal() {
        let narrow = Page::new("001", DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 10, GRAY)));
        let config = SpreadConfig {
            border_width: BorderWidth::Pixels(5),
            ..Default::default()
        };
        let report = SequenceFuser::new(config).fuse_with_report(vec![narrow, art("002")]);
        assert_eq!(report.pages.len(), 2);
        assert!(matches!(
            report.decisions[0].decision.reason,
            MergeReason::SamplingFailed { .. }
        ));
    }

    #[test]
    fn right_to_left_puts_later_page_on_the_left() {
        // Earlier page: gray on its LEFT edge; later page: gray on its RIGHT
        // edge. Those are the facing edges in right-to-left order.
        let earlier = page("001", (GRAY, 6), (WHITE, 0));
        let later = page("002", (WHITE, 0), (GRAY, 6));
        let config = SpreadConfig {
            reading_direction: ReadingDirection::RightToLeft,
            parallel: false,
            ..Default::default()
        };
        let out = fuse(vec![earlier, later], &config);
        assert_eq!(out.len(), 1);
        let FusedPage::Merged { image, name, .. } = &out[0] else {
            panic!("expected a merged spread");
        };
        assert_eq!(name, "001");
        let rgb = image.to_rgb8();
        // Later page occupies x 0..20, its gray right edge sits at 15..20;
        // the earlier page's gray left edge follows at 20..25.
        assert_eq!(rgb.get_pixel(17, 0).0, GRAY.0);
        assert_eq!(rgb.get_pixel(22, 0).0, GRAY.0);
        assert_eq!(rgb.get_pixel(2, 0).0, WHITE.0);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let build = || {
            vec![
                art("001"),
                art("002"),
                blank("003"),
                art("004"),
                page("005", (BLACK, 10), (GRAY, 6)),
                art("006"),
                art("007"),
            ]
        };
        let [seq, par] = configs();
        let a = SequenceFuser::new(seq).fuse_with_report(build());
        let b = SequenceFuser::new(par).fuse_with_report(build());
        assert_eq!(a.decisions, b.decisions);
        let names = |r: &FuseReport| r.pages.iter().map(|p| p.name().to_owned()).collect::<Vec<_>>();
        assert_eq!(names(&a), names(&b));
        assert_partition(&a.pages, 7);
    }

    #[test]
    fn failed_composite_emits_both_pages_unmerged() {
        let mut output = Vec::new();
        let mut decisions = Vec::new();
        emit_spread(
            (4, art("005")),
            (5, art("006")),
            MergeDecision::merge(MergeReason::ContentOnBothEdges),
            Err(SpreadfuseError::DimensionMismatch {
                left: (0, 10),
                right: (20, 10),
            }),
            &mut output,
            &mut decisions,
        );

        assert_eq!(output.len(), 2);
        assert!(matches!(&output[0], FusedPage::Original { index: 4, .. }));
        assert!(matches!(&output[1], FusedPage::Original { index: 5, .. }));
        assert_eq!((decisions[0].earlier, decisions[0].later), (4, 5));
        assert!(!decisions[0].decision.merge);
        assert!(matches!(
            &decisions[0].decision.reason,
            MergeReason::MergeFailed { detail } if detail.contains("degenerate")
        ));
    }

    #[test]
    fn successful_composite_emits_one_spread() {
        let mut output = Vec::new();
        let mut decisions = Vec::new();
        let image = DynamicImage::ImageRgb8(RgbImage::new(40, 10));
        emit_spread(
            (0, art("001")),
            (1, art("002")),
            MergeDecision::merge(MergeReason::ContentOnBothEdges),
            Ok(image),
            &mut output,
            &mut decisions,
        );
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].source_indices(), vec![0, 1]);
        assert!(decisions[0].decision.merge);
    }

    #[test]
    fn composite_refuses_undecodable_page() {
        let fuser = SequenceFuser::new(SpreadConfig::default());
        let broken = Page::decode("002", b"corrupt".to_vec());
        assert!(matches!(
            fuser.composite(&art("001"), &broken),
            Err(SpreadfuseError::ImageError(_))
        ));
    }
}
