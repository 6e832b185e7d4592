// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rasterizer — render every page of a PDF into an in-memory image using
// the PDFium library through `pdfium-render`.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;
use scorectify_core::error::ScorectifyError;
use tracing::{debug, info, instrument};

/// PDF user space is defined at 72 points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Turns a paginated document into one raster per page, in document order.
///
/// Implementations must either return every page or fail; a page that cannot
/// be rendered fails the whole call.
pub trait PdfRasterizer {
    fn rasterize(&self, path: &Path, resolution: u32) -> Result<Vec<DynamicImage>, ScorectifyError>;
}

/// Rasterizer backed by a dynamically loaded PDFium library.
///
/// The library is bound on every call: first from `library_dir` (when set),
/// then from the working directory, then from the system library path.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for the PDFium shared library in `dir` before the default locations.
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(dir.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, PdfiumError> {
        let local = |dir: &Path| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        };
        let bindings = match &self.library_dir {
            Some(dir) => local(dir).or_else(|_| local(Path::new("./"))),
            None => local(Path::new("./")),
        }
        .or_else(|_| Pdfium::bind_to_system_library())?;
        Ok(Pdfium::new(bindings))
    }
}

impl PdfRasterizer for PdfiumRasterizer {
    #[instrument(skip(self), fields(path = %path.display(), resolution))]
    fn rasterize(&self, path: &Path, resolution: u32) -> Result<Vec<DynamicImage>, ScorectifyError> {
        let pdfium = self.bind().map_err(|err| {
            ScorectifyError::decode(path, format!("PDFium library unavailable: {:?}", err))
        })?;

        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|err| ScorectifyError::decode(path, format!("{:?}", err)))?;

        let page_count = document.pages().len();
        info!(page_count, resolution, "Rasterizing PDF");

        let scale = resolution as f32 / POINTS_PER_INCH;
        let mut pages = Vec::with_capacity(page_count as usize);

        for (index, page) in document.pages().iter().enumerate() {
            let pixel_width = (page.width().value * scale).round().max(1.0) as i32;
            let pixel_height = (page.height().value * scale).round().max(1.0) as i32;

            let bitmap = page
                .render_with_config(
                    &PdfRenderConfig::new()
                        .set_target_width(pixel_width)
                        .set_target_height(pixel_height)
                        .render_form_data(true)
                        .render_annotations(true),
                )
                .map_err(|err| {
                    ScorectifyError::decode(
                        path,
                        format!("page {} failed to render: {:?}", index + 1, err),
                    )
                })?;

            debug!(page = index + 1, pixel_width, pixel_height, "Page rendered");
            pages.push(bitmap.as_image());
        }

        Ok(pages)
    }
}
