// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and how they layer over a config file.

use std::path::PathBuf;

use clap::Parser;
use spreadfuse_core::error::Result;
use spreadfuse_core::{AppConfig, BorderWidth, CleanupPolicy, HeightPolicy, ReadingDirection};

#[derive(Debug, Parser)]
#[command(name = "spreadfuse")]
#[command(version)]
#[command(about = "Merge two-page spreads in comic archives (.cbz)", long_about = None)]
pub struct Cli {
    /// A .cbz file, or a folder whose .cbz files are all processed
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Border strip width in pixels
    #[arg(long, value_name = "PX", conflicts_with = "border_fraction")]
    pub border_px: Option<u32>,

    /// Border strip width as a fraction of the page width
    #[arg(long, value_name = "FRACTION")]
    pub border_fraction: Option<f32>,

    /// Fraction of black border pixels that marks a framed edge
    #[arg(long, value_name = "RATIO")]
    pub black_threshold: Option<f64>,

    /// RGB mean at or below which a pixel is black
    #[arg(long, value_name = "0-255")]
    pub black_cutoff: Option<u8>,

    /// RGB mean below which a pixel is not white
    #[arg(long, value_name = "0-255")]
    pub white_cutoff: Option<u8>,

    /// Place the later page on the left (manga order)
    #[arg(long)]
    pub right_to_left: bool,

    /// Scale pages to a common height instead of padding
    #[arg(long)]
    pub scale_heights: bool,

    /// JPEG quality for merged spreads (1-100)
    #[arg(long, value_name = "Q")]
    pub jpeg_quality: Option<u8>,

    /// Suffix appended to output archive names
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Keep extracted files instead of deleting them
    #[arg(long)]
    pub keep_temp: bool,

    /// Directory for extracted files
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Classify page pairs on a single thread
    #[arg(long)]
    pub no_parallel: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Settings for this run: the config file (or defaults) with flags applied.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut AppConfig) {
        let spread = &mut config.spread;
        if let Some(px) = self.border_px {
            spread.border_width = BorderWidth::Pixels(px);
        }
        if let Some(fraction) = self.border_fraction {
            spread.border_width = BorderWidth::Fraction(fraction);
        }
        if let Some(ratio) = self.black_threshold {
            spread.black_threshold_ratio = ratio;
        }
        if let Some(cutoff) = self.black_cutoff {
            spread.black_pixel_cutoff = cutoff;
        }
        if let Some(cutoff) = self.white_cutoff {
            spread.white_pixel_cutoff = cutoff;
        }
        if self.right_to_left {
            spread.reading_direction = ReadingDirection::RightToLeft;
        }
        if self.scale_heights {
            spread.height_policy = HeightPolicy::Scale;
        }
        if self.no_parallel {
            spread.parallel = false;
        }

        let archive = &mut config.archive;
        if let Some(quality) = self.jpeg_quality {
            archive.jpeg_quality = quality;
        }
        if let Some(suffix) = &self.suffix {
            archive.output_suffix = suffix.clone();
        }
        if self.keep_temp {
            archive.cleanup = CleanupPolicy::Retain;
        }
        if let Some(dir) = &self.temp_dir {
            archive.temp_root = Some(dir.clone());
        }
    }
}
