// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for scorectify.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all scorectify operations.
#[derive(Debug, Error)]
pub enum ScorectifyError {
    // -- Loading --
    #[error("unsupported format (expected pdf, jpg, jpeg or png): {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to decode {}: {reason}", path.display())]
    DecodeFailure { path: PathBuf, reason: String },

    // -- Rectification --
    #[error("no line candidates found in the angle search band")]
    NoLineCandidates,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Output --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScorectifyError {
    /// Build a [`ScorectifyError::DecodeFailure`] from any displayable cause.
    pub fn decode(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::DecodeFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScorectifyError>;
