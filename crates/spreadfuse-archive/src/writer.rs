// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archive writer — packs a fused page sequence into a new `.cbz`.
//
// Entry names keep reading order: untouched pages keep their original name,
// spreads are named after the earlier page of the pair.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use spreadfuse_core::config::ArchiveConfig;
use spreadfuse_core::error::{Result, SpreadfuseError};
use spreadfuse_spread::{FusedPage, PageContent, PageImage};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::zip_err;

/// What was written to an output archive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub entries: usize,
    pub merged: usize,
}

/// Packs fused sequences according to an [`ArchiveConfig`].
pub struct ArchiveWriter {
    config: ArchiveConfig,
}

impl ArchiveWriter {
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// `<dir>/<stem><suffix>.cbz` next to `input`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        input.with_file_name(format!("{stem}{}.cbz", self.config.output_suffix))
    }

    /// Write `pages` in order into a deflate-compressed archive at `dest`.
    ///
    /// The archive is assembled in a temporary file next to `dest` and moved
    /// into place once complete, so a failure never leaves a truncated file.
    #[instrument(skip(self, pages), fields(dest = %dest.display(), pages = pages.len()))]
    pub fn write(&self, pages: Vec<FusedPage>, dest: &Path) -> Result<WriteSummary> {
        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let staging = NamedTempFile::new_in(&parent)?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut zip = zip::ZipWriter::new(staging.as_file());
        let entries = pages.len();
        let mut used = HashSet::new();
        let mut merged = 0;

        for page in pages {
            let is_merged = page.is_merged();
            let (name, bytes) = self.encode_entry(page)?;
            let name = unique_name(&name, &mut used);
            debug!(entry = %name, bytes = bytes.len(), merged = is_merged, "writing entry");
            zip.start_file(name.as_str(), options).map_err(zip_err)?;
            zip.write_all(&bytes)?;
            if is_merged {
                merged += 1;
            }
        }
        zip.finish().map_err(zip_err)?;

        staging.persist(dest).map_err(|err| SpreadfuseError::Io(err.error))?;

        info!(entries, merged, "archive written");
        Ok(WriteSummary {
            path: dest.to_path_buf(),
            entries,
            merged,
        })
    }

    /// Entry name and encoded bytes for one output slot.
    fn encode_entry(&self, page: FusedPage) -> Result<(String, Vec<u8>)> {
        match page {
            FusedPage::Original { page, .. } => {
                if let Some(bytes) = page.source_bytes {
                    return Ok((page.name, bytes));
                }
                let image = match page.content {
                    PageContent::Decoded(image) => image,
                    PageContent::Undecodable { reason } => {
                        return Err(SpreadfuseError::DecodeFailure {
                            page: page.name,
                            reason,
                        });
                    }
                };
                let bytes = PageImage::from_dynamic(image)
                    .encode_for_name(&page.name, self.config.jpeg_quality)?;
                Ok((page.name, bytes))
            }
            FusedPage::Merged { name, image, .. } => {
                let bytes = PageImage::from_dynamic(image).to_jpeg_bytes(self.config.jpeg_quality)?;
                Ok((with_extension(&name, "jpg"), bytes))
            }
        }
    }
}

/// Replace the extension of the last path segment of `name`.
fn with_extension(name: &str, ext: &str) -> String {
    let (dir, file) = match name.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, name),
    };
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    match dir {
        Some(dir) => format!("{dir}/{stem}.{ext}"),
        None => format!("{stem}.{ext}"),
    }
}

/// `name`, or `name` with `_N` before the extension if already taken.
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_owned()) {
        return name.to_owned();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.ends_with('/') && !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        })
        .find(|candidate| used.insert(candidate.clone()))
        .unwrap_or_else(|| name.to_owned())
}
