// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scorectify-document — Page loading and skew rectification for music scores.
//
// Provides the loader (PDF rasterization, JPEG/PNG decode), the raster
// helpers (grayscale normalization, edge-padded rotation) and the
// rectification pipeline (Yen binarization, constrained Hough search,
// median skew estimate, conditional rotation).

pub mod image;
pub mod loader;
pub mod pdf;
pub mod scan;

// Re-export the primary entry points so callers can use `scorectify_document::load` etc.
pub use self::image::processor::ImageProcessor;
pub use loader::{Loader, load};
pub use pdf::rasterizer::{PdfRasterizer, PdfiumRasterizer};
pub use scan::primitives::{ImageprocPrimitives, VisionPrimitives};
pub use scan::rectify::{Rectified, Rectifier, rectify};
