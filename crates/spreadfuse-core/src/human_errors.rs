// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the batch report.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity decides whether re-running the same command can help.

use serde::Serialize;

use crate::error::SpreadfuseError;

/// Severity of an error from the reader's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Disk full, file locked — running again later may succeed.
    Transient,
    /// The user must change a setting or pick another path.
    ActionRequired,
    /// The archive itself is broken; retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether re-running may succeed without any change.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `SpreadfuseError` into a `HumanError` for the end-of-run summary.
pub fn humanize_error(err: &SpreadfuseError) -> HumanError {
    match err {
        SpreadfuseError::InvalidDimension { requested, available } => HumanError {
            message: "A page is narrower than the border being checked.".into(),
            suggestion: format!(
                "Lower the border width (currently {requested} px, page is {available} px wide)."
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpreadfuseError::DimensionMismatch { .. } => HumanError {
            message: "An empty page could not be joined with its neighbour.".into(),
            suggestion: "The pages were kept separate. Check the archive for blank image files.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        SpreadfuseError::DecodeFailure { page, .. } => HumanError {
            message: format!("The page \"{page}\" could not be read."),
            suggestion: "The file may be damaged. It was copied as-is into the new archive.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        SpreadfuseError::ImageError(detail) => HumanError {
            message: "A page image could not be processed.".into(),
            suggestion: format!("Check that the archive only holds JPEG or PNG pages. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        SpreadfuseError::Archive(detail) => humanize_archive_error(detail),

        SpreadfuseError::InvalidInput { path, .. } => HumanError {
            message: format!("\"{}\" is not a comic archive or folder.", path.display()),
            suggestion: "Pass a .cbz file or a folder that contains .cbz files.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpreadfuseError::InvalidConfig(detail) => HumanError {
            message: "The settings are not valid.".into(),
            suggestion: format!("Fix the setting and run again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpreadfuseError::Io(io) => match io.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file or folder could not be found.".into(),
                suggestion: "Check the path and try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We are not allowed to read or write a file here.".into(),
                suggestion: "Check the folder permissions, or choose a different temporary folder.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Reading or writing a file failed.".into(),
                suggestion: format!("Make sure there is enough free disk space, then try again. ({io})"),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        SpreadfuseError::Serialization(detail) => HumanError {
            message: "The settings file could not be understood.".into(),
            suggestion: format!("Check the JSON syntax of the settings file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Map zip-level failure details to specific guidance.
fn humanize_archive_error(detail: &str) -> HumanError {
    let lower = detail.to_lowercase();

    if lower.contains("invalid zip") || lower.contains("invalid archive") || lower.contains("eocd") {
        HumanError {
            message: "This file is not a valid comic archive.".into(),
            suggestion: "Only ZIP-based .cbz files are supported. RAR-based .cbr files must be converted first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    } else if lower.contains("no page images") {
        HumanError {
            message: "The archive has no pages in it.".into(),
            suggestion: "Only JPEG and PNG pages are read. The archive was skipped.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    } else if lower.contains("unsupported") {
        HumanError {
            message: "The archive uses a compression method we can't read.".into(),
            suggestion: "Re-create the archive with standard ZIP compression.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    } else {
        HumanError {
            message: "The archive could not be processed.".into(),
            suggestion: format!("Try again. If this keeps happening the archive may be damaged. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}
