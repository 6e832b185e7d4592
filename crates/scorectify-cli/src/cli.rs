// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and their mapping onto loader and rectifier settings.

use std::path::PathBuf;

use clap::Parser;
use scorectify_core::config::{
    DEFAULT_ANGLE_SAMPLES, DEFAULT_MAX_ANGLE_DEGREES, DEFAULT_RESOLUTION_DPI,
    DEFAULT_ROTATION_THRESHOLD_DEGREES,
};
use scorectify_core::{LoaderConfig, RectifyConfig};
use scorectify_document::PdfiumRasterizer;

/// Deskew scanned music score pages
#[derive(Parser, Debug)]
#[command(name = "scorectify")]
#[command(version)]
#[command(about = "Deskew scanned music score pages", long_about = None)]
pub struct Cli {
    /// Input score (PDF, JPEG or PNG)
    pub input: PathBuf,

    /// Directory the rectified pages are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Rasterization resolution for PDF pages, in DPI
    #[arg(short, long, default_value_t = DEFAULT_RESOLUTION_DPI)]
    pub resolution: u32,

    /// Half-width of the searched band around the vertical, in degrees
    #[arg(long, default_value_t = DEFAULT_MAX_ANGLE_DEGREES)]
    pub max_angle: f64,

    /// Number of line orientations sampled across the band
    #[arg(long, default_value_t = DEFAULT_ANGLE_SAMPLES)]
    pub angle_samples: usize,

    /// Skew below or at this magnitude is left uncorrected, in degrees
    #[arg(long, default_value_t = DEFAULT_ROTATION_THRESHOLD_DEGREES)]
    pub rotation_threshold: f64,

    /// Directory holding the PDFium shared library, searched before the
    /// working directory and the system library path
    #[arg(long, value_name = "DIR")]
    pub pdfium_dir: Option<PathBuf>,

    /// Measure skew only; write no images
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON report of every page to stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::with_resolution(self.resolution)
    }

    /// PDF rasterizer, bound to `--pdfium-dir` when given.
    pub fn rasterizer(&self) -> PdfiumRasterizer {
        match &self.pdfium_dir {
            Some(dir) => PdfiumRasterizer::with_library_dir(dir.clone()),
            None => PdfiumRasterizer::new(),
        }
    }

    /// Rectifier settings; options without a flag keep their defaults.
    pub fn rectify_config(&self) -> RectifyConfig {
        RectifyConfig {
            max_angle_degrees: self.max_angle,
            angle_samples: self.angle_samples,
            rotation_threshold_degrees: self.rotation_threshold,
            ..RectifyConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["scorectify", "score.pdf"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("score.pdf"));
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert_eq!(cli.loader_config(), LoaderConfig::default());
        assert_eq!(cli.rectify_config(), RectifyConfig::default());
        assert!(!cli.dry_run);
        assert!(!cli.json);
        assert_eq!(cli.pdfium_dir, None);
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::try_parse_from([
            "scorectify",
            "page.png",
            "--output-dir",
            "out",
            "--resolution",
            "300",
            "--max-angle",
            "3",
            "--angle-samples",
            "30",
            "--rotation-threshold",
            "0.1",
            "--pdfium-dir",
            "/opt/pdfium/lib",
            "--dry-run",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.loader_config().resolution, 300);
        let config = cli.rectify_config();
        assert_eq!(config.max_angle_degrees, 3.0);
        assert_eq!(config.angle_samples, 30);
        assert_eq!(config.rotation_threshold_degrees, 0.1);
        assert_eq!(config.peak_min_distance, RectifyConfig::default().peak_min_distance);
        assert_eq!(cli.pdfium_dir, Some(PathBuf::from("/opt/pdfium/lib")));
        assert!(cli.dry_run && cli.json);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["scorectify"]).is_err());
    }
}
