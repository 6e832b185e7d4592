// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-run report and output file naming.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    /// 1-based page number within the input.
    pub page: usize,
    pub width: u32,
    pub height: u32,
    /// Measured skew, positive when the page leans clockwise.
    pub skew_degrees: f64,
    /// Line candidates behind the estimate; absent on dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<usize>,
    /// Whether the page was rotated, or on dry runs whether it would be.
    pub rotated: bool,
    /// Written file; absent on dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub dry_run: bool,
    pub pages: Vec<PageReport>,
}

/// Output path for page `page` (1-based) of `input`: `<stem>-page-<NNN>.png`
/// inside `output_dir`.
pub fn page_output_path(output_dir: &Path, input: &Path, page: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "score".to_string());
    output_dir.join(format!("{stem}-page-{page:03}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_are_zero_padded_and_one_based() {
        let path = page_output_path(Path::new("out"), Path::new("scans/Op. 27.pdf"), 1);
        assert_eq!(path, PathBuf::from("out/Op. 27-page-001.png"));

        let path = page_output_path(Path::new("."), Path::new("etude.png"), 1234);
        assert_eq!(path, PathBuf::from("./etude-page-1234.png"));
    }

    #[test]
    fn dry_run_pages_omit_output_fields() {
        let report = PageReport {
            page: 2,
            width: 100,
            height: 140,
            skew_degrees: -1.25,
            candidates: None,
            rotated: false,
            output: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["page"], 2);
        assert_eq!(json["skew_degrees"], -1.25);
        assert!(json.get("output").is_none());
        assert!(json.get("candidates").is_none());
    }
}
