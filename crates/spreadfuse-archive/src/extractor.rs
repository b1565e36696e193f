// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archive extractor — unpacks a `.cbz` into a scratch directory and loads its
// page images in reading order.
//
// Reading order is the ascending relative path of each image file, exactly as
// stored in the archive. Pages are never re-sorted by content.

use std::fs::File;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use spreadfuse_core::config::ArchiveConfig;
use spreadfuse_core::error::{Result, SpreadfuseError};
use spreadfuse_core::types::CleanupPolicy;
use spreadfuse_spread::Page;
use tempfile::TempDir;
use tracing::{debug, info, instrument};

use crate::zip_err;

/// File extensions recognised as page images.
const PAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Directory (under the temp root) that retained extractions are written to.
const RETAINED_DIR: &str = "temp_spread_fuse";

/// Where extracted files live while an archive is processed.
#[derive(Debug)]
enum ScratchDir {
    /// Removed when dropped.
    Temporary(TempDir),
    /// Left on disk.
    Retained(PathBuf),
}

impl ScratchDir {
    fn path(&self) -> &Path {
        match self {
            Self::Temporary(dir) => dir.path(),
            Self::Retained(path) => path,
        }
    }
}

/// Pages of one archive, plus the scratch directory they were unpacked to.
#[derive(Debug)]
pub struct ExtractedArchive {
    pub source: PathBuf,
    pub pages: Vec<Page>,
    scratch: ScratchDir,
}

impl ExtractedArchive {
    /// Directory holding the extracted files.
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Take the pages. A temporary scratch directory is removed here.
    pub fn into_pages(self) -> Vec<Page> {
        if let ScratchDir::Retained(path) = &self.scratch {
            info!(path = %path.display(), "extracted files retained");
        }
        self.pages
    }
}

/// Unpacks comic archives according to an [`ArchiveConfig`].
pub struct ArchiveExtractor {
    config: ArchiveConfig,
}

impl ArchiveExtractor {
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// Unpack `archive_path` and decode every page image in it.
    ///
    /// Pages that fail to decode are kept as undecodable pages. The archive
    /// as a whole fails only when it cannot be read or holds no page images.
    #[instrument(skip_all, fields(archive = %archive_path.display()))]
    pub fn extract(&self, archive_path: &Path) -> Result<ExtractedArchive> {
        let file = File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file).map_err(zip_err)?;

        let scratch = self.scratch_dir(archive_path)?;
        debug!(scratch = %scratch.path().display(), entries = archive.len(), "unpacking");
        archive.extract(scratch.path()).map_err(zip_err)?;

        let root = scratch.path();
        let mut files = Vec::new();
        collect_page_files(root, &mut files)?;
        let mut named: Vec<(String, PathBuf)> = files
            .into_iter()
            .map(|path| (relative_name(root, &path), path))
            .collect();
        named.sort_by(|a, b| a.0.cmp(&b.0));

        if named.is_empty() {
            return Err(SpreadfuseError::Archive(format!(
                "no page images in {}",
                archive_path.display()
            )));
        }

        let pages = named
            .into_par_iter()
            .map(|(name, path)| -> Result<Page> {
                let bytes = std::fs::read(&path)?;
                Ok(Page::decode(name, bytes))
            })
            .collect::<Result<Vec<_>>>()?;

        let undecodable = pages.iter().filter(|p| p.image().is_none()).count();
        info!(pages = pages.len(), undecodable, "archive extracted");

        Ok(ExtractedArchive {
            source: archive_path.to_path_buf(),
            pages,
            scratch,
        })
    }

    fn scratch_dir(&self, archive_path: &Path) -> Result<ScratchDir> {
        match self.config.cleanup {
            CleanupPolicy::Delete => {
                let mut builder = tempfile::Builder::new();
                builder.prefix("spreadfuse-");
                let dir = match &self.config.temp_root {
                    Some(root) => {
                        std::fs::create_dir_all(root)?;
                        builder.tempdir_in(root)?
                    }
                    None => builder.tempdir()?,
                };
                Ok(ScratchDir::Temporary(dir))
            }
            CleanupPolicy::Retain => {
                let root = match &self.config.temp_root {
                    Some(root) => root.clone(),
                    None => archive_path.parent().map(Path::to_path_buf).unwrap_or_default(),
                }
                .join(RETAINED_DIR);
                let stem = archive_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "archive".into());
                let dir = root.join(format!("{stem}_extract"));
                // Stale pages from an earlier run would otherwise be picked up.
                if dir.exists() {
                    std::fs::remove_dir_all(&dir)?;
                }
                std::fs::create_dir_all(&dir)?;
                Ok(ScratchDir::Retained(dir))
            }
        }
    }
}

/// Recursively gather files with a page-image extension under `dir`.
fn collect_page_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_page_files(&path, out)?;
        } else if is_page_image(&path) {
            out.push(path);
        }
    }
    Ok(())
}

pub(crate) fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PAGE_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p)))
}

/// `path` relative to `root`, with `/` separators on every platform.
fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{page_png, write_cbz};

    fn extractor(cleanup: CleanupPolicy, temp_root: &Path) -> ArchiveExtractor {
        ArchiveExtractor::new(ArchiveConfig {
            cleanup,
            temp_root: Some(temp_root.to_path_buf()),
            ..Default::default()
        })
    }

    #[test]
    fn pages_come_back_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let cbz = dir.path().join("vol1.cbz");
        write_cbz(
            &cbz,
            &[
                ("010.png", page_png(false)),
                ("002.PNG", page_png(true)),
                ("notes.txt", b"not a page".to_vec()),
                ("extra/001.png", page_png(false)),
                ("001.jpg", b"corrupt jpeg".to_vec()),
            ],
        );

        let extracted = extractor(CleanupPolicy::Delete, &dir.path().join("tmp"))
            .extract(&cbz)
            .unwrap();
        let names: Vec<&str> = extracted.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["001.jpg", "002.PNG", "010.png", "extra/001.png"]);

        assert!(extracted.pages[0].image().is_none(), "corrupt page is undecodable");
        assert!(extracted.pages[1].image().is_some());
    }

    #[test]
    fn delete_policy_removes_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cbz = dir.path().join("a.cbz");
        write_cbz(&cbz, &[("001.png", page_png(true))]);

        let extracted = extractor(CleanupPolicy::Delete, dir.path()).extract(&cbz).unwrap();
        let scratch = extracted.scratch_path().to_path_buf();
        assert!(scratch.join("001.png").exists());

        let pages = extracted.into_pages();
        assert_eq!(pages.len(), 1);
        assert!(!scratch.exists());
    }

    #[test]
    fn retain_policy_keeps_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cbz = dir.path().join("chapter.cbz");
        write_cbz(&cbz, &[("001.png", page_png(true))]);

        let extractor = ArchiveExtractor::new(ArchiveConfig {
            cleanup: CleanupPolicy::Retain,
            ..Default::default()
        });
        let extracted = extractor.extract(&cbz).unwrap();
        let scratch = extracted.scratch_path().to_path_buf();
        assert_eq!(scratch, dir.path().join("temp_spread_fuse").join("chapter_extract"));

        drop(extracted.into_pages());
        assert!(scratch.join("001.png").exists());
    }

    #[test]
    fn archive_without_pages_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cbz = dir.path().join("empty.cbz");
        write_cbz(&cbz, &[("readme.txt", b"hello".to_vec())]);

        let err = extractor(CleanupPolicy::Delete, dir.path()).extract(&cbz).unwrap_err();
        assert!(matches!(err, SpreadfuseError::Archive(msg) if msg.contains("no page images")));
    }

    #[test]
    fn non_zip_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cbz = dir.path().join("fake.cbz");
        std::fs::write(&cbz, b"this is not a zip").unwrap();

        let err = extractor(CleanupPolicy::Delete, dir.path()).extract(&cbz).unwrap_err();
        assert!(matches!(err, SpreadfuseError::Archive(_)));
    }

    #[test]
    fn page_extension_check_ignores_case() {
        assert!(is_page_image(Path::new("a/B.JPEG")));
        assert!(is_page_image(Path::new("x.png")));
        assert!(!is_page_image(Path::new("x.gif")));
        assert!(!is_page_image(Path::new("png")));
    }
}
