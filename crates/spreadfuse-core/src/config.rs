// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpreadfuseError};
use crate::types::{BorderWidth, CleanupPolicy, HeightPolicy, ReadingDirection};

/// Tunables for spread detection and merging.
///
/// Passed explicitly to the classifier and fuser; two fuse calls with
/// different configs never observe each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadConfig {
    /// Width of the strip sampled from each facing edge.
    pub border_width: BorderWidth,
    /// Fraction of black pixels at or above which an edge counts as a solid
    /// black frame.
    pub black_threshold_ratio: f64,
    /// A pixel whose RGB mean is at or below this value is black.
    pub black_pixel_cutoff: u8,
    /// A pixel whose RGB mean is below this value is non-white.
    pub white_pixel_cutoff: u8,
    /// Which page of a pair ends up on the left of the composite.
    pub reading_direction: ReadingDirection,
    /// How pages of unequal height are composited.
    pub height_policy: HeightPolicy,
    /// Classify adjacent pairs on the rayon pool before the cursor pass.
    pub parallel: bool,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            border_width: BorderWidth::default(),
            black_threshold_ratio: 0.45,
            black_pixel_cutoff: 20,
            white_pixel_cutoff: 250,
            reading_direction: ReadingDirection::default(),
            height_policy: HeightPolicy::default(),
            parallel: true,
        }
    }
}

impl SpreadConfig {
    /// Reject values the classifier cannot act on sensibly.
    pub fn validate(&self) -> Result<()> {
        match self.border_width {
            BorderWidth::Pixels(0) => {
                return Err(SpreadfuseError::InvalidConfig(
                    "border width must be at least one pixel".into(),
                ));
            }
            BorderWidth::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                return Err(SpreadfuseError::InvalidConfig(format!(
                    "border fraction must be in (0, 1], got {f}"
                )));
            }
            _ => {}
        }
        if !(0.0..=1.0).contains(&self.black_threshold_ratio) {
            return Err(SpreadfuseError::InvalidConfig(format!(
                "black threshold ratio must be in [0, 1], got {}",
                self.black_threshold_ratio
            )));
        }
        if self.black_pixel_cutoff >= self.white_pixel_cutoff {
            return Err(SpreadfuseError::InvalidConfig(format!(
                "black cutoff ({}) must be below white cutoff ({})",
                self.black_pixel_cutoff, self.white_pixel_cutoff
            )));
        }
        Ok(())
    }
}

/// Settings for the archive extraction and repackaging collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Appended to the input file stem to name the output archive.
    pub output_suffix: String,
    /// What happens to extracted files after processing.
    pub cleanup: CleanupPolicy,
    /// Parent directory for scratch space. Defaults to the system temp dir
    /// (or the archive's directory when extracted files are retained).
    pub temp_root: Option<PathBuf>,
    /// JPEG quality (1-100) for merged spreads.
    pub jpeg_quality: u8,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            output_suffix: "_fused".into(),
            cleanup: CleanupPolicy::default(),
            temp_root: None,
            jpeg_quality: 90,
        }
    }
}

impl ArchiveConfig {
    pub fn validate(&self) -> Result<()> {
        if self.output_suffix.is_empty() {
            return Err(SpreadfuseError::InvalidConfig(
                "output suffix must not be empty, it would overwrite the input".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SpreadfuseError::InvalidConfig(format!(
                "JPEG quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Complete settings as read from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub spread: SpreadConfig,
    pub archive: ArchiveConfig,
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.spread.validate()?;
        self.archive.validate()
    }
}
