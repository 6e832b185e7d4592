// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for scorectify.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Supported input document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageFormat {
    /// Paginated; every page is rasterized.
    Pdf,
    Jpeg,
    Png,
}

impl PageFormat {
    /// MIME type string, used in logs and reports.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Infer the format from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Infer the format from the suffix of a path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Estimated rotation of a page relative to upright, in degrees.
///
/// Positive values mean the page content is turned clockwise as displayed
/// (stems lean to the right at the top).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkewEstimate(f64);

impl SkewEstimate {
    pub fn from_degrees(degrees: f64) -> Self {
        Self(degrees)
    }

    pub fn from_radians(radians: f64) -> Self {
        Self(radians.to_degrees())
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    /// True when the magnitude is strictly greater than `threshold_degrees`.
    pub fn exceeds(&self, threshold_degrees: f64) -> bool {
        self.0.abs() > threshold_degrees
    }
}

impl fmt::Display for SkewEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}°", self.0)
    }
}
