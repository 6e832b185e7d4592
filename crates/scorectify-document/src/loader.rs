// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page loader — turn a PDF, JPEG or PNG file into an ordered list of page
// images, dispatching on the file suffix.

use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};
use scorectify_core::error::{Result, ScorectifyError};
use scorectify_core::{LoaderConfig, PageFormat};
use tracing::{debug, info, instrument};

use crate::pdf::rasterizer::{PdfRasterizer, PdfiumRasterizer};

/// Loads score files into page images.
///
/// PDF files yield one image per page, in document order, rasterized at
/// `config.resolution` DPI. JPEG and PNG files yield exactly one image.
/// Anything else is rejected before the file is opened.
#[derive(Debug, Clone)]
pub struct Loader<R = PdfiumRasterizer> {
    config: LoaderConfig,
    rasterizer: R,
}

impl Loader<PdfiumRasterizer> {
    /// Create a loader that renders PDFs through PDFium.
    pub fn new(config: LoaderConfig) -> Result<Self> {
        Self::with_rasterizer(config, PdfiumRasterizer::new())
    }
}

impl<R: PdfRasterizer> Loader<R> {
    /// Create a loader with a custom PDF rasterizer.
    pub fn with_rasterizer(config: LoaderConfig, rasterizer: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rasterizer })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load every page of the file at `path`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<Vec<DynamicImage>> {
        let format = PageFormat::from_path(path)
            .ok_or_else(|| ScorectifyError::UnsupportedFormat(path.to_path_buf()))?;
        debug!(mime = format.mime_type(), "Format resolved from suffix");

        let pages = match format {
            PageFormat::Pdf => self.rasterizer.rasterize(path, self.config.resolution)?,
            PageFormat::Jpeg => vec![decode_raster(path, ImageFormat::Jpeg)?],
            PageFormat::Png => vec![decode_raster(path, ImageFormat::Png)?],
        };

        info!(pages = pages.len(), "Loaded score");
        Ok(pages)
    }
}

/// Load every page of `path` with a PDFium-backed loader.
pub fn load(path: &Path, config: &LoaderConfig) -> Result<Vec<DynamicImage>> {
    Loader::new(*config)?.load(path)
}

/// Decode a single-image file in the format its suffix names.
fn decode_raster(path: &Path, format: ImageFormat) -> Result<DynamicImage> {
    let mut reader =
        ImageReader::open(path).map_err(|err| ScorectifyError::decode(path, err))?;
    reader.set_format(format);
    reader
        .decode()
        .map_err(|err| ScorectifyError::decode(path, err))
}

// -- Tests --------------------------------------------------------------------
