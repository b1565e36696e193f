// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for spreadfuse.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all spreadfuse operations.
#[derive(Debug, Error)]
pub enum SpreadfuseError {
    // -- Spread engine errors --
    #[error("border of {requested} px does not fit an image {available} px wide")]
    InvalidDimension { requested: u32, available: u32 },

    #[error("cannot merge degenerate pages: left is {}x{}, right is {}x{}", left.0, left.1, right.0, right.1)]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("page {page} could not be decoded: {reason}")]
    DecodeFailure { page: String, reason: String },

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Archive errors --
    #[error("archive operation failed: {0}")]
    Archive(String),

    #[error("invalid input {}: {reason}", path.display())]
    InvalidInput { path: PathBuf, reason: String },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpreadfuseError>;
