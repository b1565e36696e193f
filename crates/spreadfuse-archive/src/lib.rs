// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// spreadfuse-archive — The file-level collaborators around the spread engine:
// unpacking a `.cbz` into an ordered page sequence, packing a fused sequence
// back into a new `.cbz`, and driving both over a folder of archives.

pub mod batch;
pub mod extractor;
pub mod writer;

pub use batch::{ArchiveOutcome, ArchiveStatus, BatchDriver, BatchReport};
pub use extractor::{ArchiveExtractor, ExtractedArchive};
pub use writer::{ArchiveWriter, WriteSummary};

/// Convert a `zip::result::ZipError` into a `SpreadfuseError::Archive`.
pub(crate) fn zip_err(err: zip::result::ZipError) -> spreadfuse_core::SpreadfuseError {
    spreadfuse_core::SpreadfuseError::Archive(err.to_string())
}
