// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch driver — runs extract → fuse → write over one archive or every `.cbz`
// in a folder.
//
// A failing archive is recorded and skipped; the remaining archives are still
// processed. Only an unusable input path fails the whole run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use spreadfuse_core::config::AppConfig;
use spreadfuse_core::error::{Result, SpreadfuseError};
use spreadfuse_core::human_errors::{HumanError, humanize_error};
use spreadfuse_spread::{PairDecision, SequenceFuser};
use tracing::{error, info, instrument, warn};

use crate::extractor::ArchiveExtractor;
use crate::writer::ArchiveWriter;

/// Result of processing a single archive.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutcome {
    pub input: PathBuf,
    #[serde(flatten)]
    pub status: ArchiveStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveStatus {
    Fused {
        output: PathBuf,
        pages_in: usize,
        pages_out: usize,
        merged: usize,
        /// Pages that could not be decoded and were copied unchanged.
        undecodable: Vec<String>,
        decisions: Vec<PairDecision>,
    },
    Failed {
        error: String,
        help: HumanError,
    },
}

/// Outcome of a whole run, one entry per archive in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub archives: Vec<ArchiveOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.archives
            .iter()
            .filter(|a| matches!(a.status, ArchiveStatus::Fused { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.archives.len() - self.succeeded()
    }
}

/// Drives the spread engine over comic archives on disk.
pub struct BatchDriver {
    extractor: ArchiveExtractor,
    fuser: SequenceFuser,
    writer: ArchiveWriter,
    output_suffix: String,
}

impl BatchDriver {
    /// Build a driver; fails with `InvalidConfig` on out-of-range settings.
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let output_suffix = config.archive.output_suffix.clone();
        Ok(Self {
            extractor: ArchiveExtractor::new(config.archive.clone()),
            fuser: SequenceFuser::new(config.spread),
            writer: ArchiveWriter::new(config.archive),
            output_suffix,
        })
    }

    /// Archives to process for `path`: the file itself, or the `.cbz` files
    /// directly inside a folder, sorted by name. Earlier outputs (names
    /// ending in the output suffix) are skipped.
    pub fn enumerate(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if path.is_file() {
            if is_cbz(path) {
                return Ok(vec![path.to_path_buf()]);
            }
            return Err(SpreadfuseError::InvalidInput {
                path: path.to_path_buf(),
                reason: "not a .cbz file".into(),
            });
        }
        if !path.is_dir() {
            return Err(SpreadfuseError::InvalidInput {
                path: path.to_path_buf(),
                reason: "no such file or folder".into(),
            });
        }

        let mut archives = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let candidate = entry?.path();
            if !candidate.is_file() || !is_cbz(&candidate) {
                continue;
            }
            if self.is_previous_output(&candidate) {
                info!(archive = %candidate.display(), "skipping earlier output");
                continue;
            }
            archives.push(candidate);
        }
        archives.sort();
        Ok(archives)
    }

    /// Process every archive found at `path`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn run(&self, path: &Path) -> Result<BatchReport> {
        let archives = self.enumerate(path)?;
        if archives.is_empty() {
            warn!("no .cbz files found");
            return Ok(BatchReport::default());
        }
        info!(count = archives.len(), "processing archives");

        let mut report = BatchReport::default();
        for archive in archives {
            let status = match self.process_archive(&archive) {
                Ok(status) => status,
                Err(err) => {
                    error!(archive = %archive.display(), error = %err, "archive failed, skipping");
                    ArchiveStatus::Failed {
                        error: err.to_string(),
                        help: humanize_error(&err),
                    }
                }
            };
            report.archives.push(ArchiveOutcome {
                input: archive,
                status,
            });
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "all archives processed"
        );
        Ok(report)
    }

    /// Extract, fuse and repackage a single archive.
    #[instrument(skip(self), fields(archive = %archive.display()))]
    pub fn process_archive(&self, archive: &Path) -> Result<ArchiveStatus> {
        let extracted = self.extractor.extract(archive)?;
        let pages = extracted.into_pages();
        let pages_in = pages.len();
        let undecodable = pages
            .iter()
            .filter(|p| p.image().is_none())
            .map(|p| p.name.clone())
            .collect();

        let fused = self.fuser.fuse_with_report(pages);
        let pages_out = fused.pages.len();

        let output = self.writer.output_path(archive);
        let summary = self.writer.write(fused.pages, &output)?;

        Ok(ArchiveStatus::Fused {
            output: summary.path,
            pages_in,
            pages_out,
            merged: summary.merged,
            undecodable,
            decisions: fused.decisions,
        })
    }

    fn is_previous_output(&self, path: &Path) -> bool {
        path.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(&self.output_suffix))
    }
}

fn is_cbz(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cbz"))
}
