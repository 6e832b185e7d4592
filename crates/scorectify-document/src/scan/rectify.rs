// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Skew rectification — grayscale normalization, Yen binarization, constrained
// Hough search around the vertical, median skew estimate and conditional
// edge-padded rotation back to upright.

use image::{DynamicImage, GrayImage};
use scorectify_core::error::{Result, ScorectifyError};
use scorectify_core::{RectifyConfig, SkewEstimate};
use tracing::{debug, info, instrument, warn};

use super::hough::LineSearch;
use super::primitives::{ImageprocPrimitives, VisionPrimitives};

/// Outcome of rectifying one page.
#[derive(Debug, Clone)]
pub struct Rectified {
    /// Single-channel output page, same dimensions as the input.
    pub image: GrayImage,
    /// Skew measured on the input page.
    pub skew: SkewEstimate,
    /// Number of line candidates the estimate was taken over.
    pub candidates: usize,
    /// Whether a correcting rotation was applied.
    pub rotated: bool,
}

/// Deskews music score pages using near-vertical strokes (stems, barlines)
/// as the orientation signal.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Binarize with Yen's threshold (ink is strictly darker than the threshold)
/// 3. Hough transform restricted to `90° ± max_angle_degrees`
/// 4. Keep separated accumulator peaks
/// 5. Median of the peak orientations minus 90° is the skew estimate
/// 6. Rotate by the negated estimate when its magnitude exceeds the noise
///    threshold, otherwise return the grayscale page untouched
///
/// A rectifier holds no per-page state; one instance can serve any number of
/// pages, from any number of threads when its primitives allow it.
#[derive(Debug, Clone)]
pub struct Rectifier<P = ImageprocPrimitives> {
    config: RectifyConfig,
    search: LineSearch,
    primitives: P,
}

impl Rectifier<ImageprocPrimitives> {
    /// Create a rectifier backed by the default primitives.
    pub fn new(config: RectifyConfig) -> Result<Self> {
        Self::with_primitives(config, ImageprocPrimitives)
    }
}

impl Default for Rectifier<ImageprocPrimitives> {
    fn default() -> Self {
        let config = RectifyConfig::default();
        Self {
            search: LineSearch::from_config(&config),
            config,
            primitives: ImageprocPrimitives,
        }
    }
}

impl<P: VisionPrimitives> Rectifier<P> {
    /// Create a rectifier over custom primitives.
    pub fn with_primitives(config: RectifyConfig, primitives: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            search: LineSearch::from_config(&config),
            config,
            primitives,
        })
    }

    pub fn config(&self) -> &RectifyConfig {
        &self.config
    }

    /// Return a grayscale, deskewed copy of `image`.
    pub fn rectify(&self, image: DynamicImage) -> Result<GrayImage> {
        Ok(self.rectify_with_report(image)?.image)
    }

    /// Like [`Rectifier::rectify`], also reporting the measured skew.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn rectify_with_report(&self, image: DynamicImage) -> Result<Rectified> {
        let gray = self.primitives.grayscale(image);
        let (skew, candidates) = self.measure(&gray)?;

        if !skew.exceeds(self.config.rotation_threshold_degrees) {
            debug!(%skew, "Skew within noise threshold; page left as is");
            return Ok(Rectified {
                image: gray,
                skew,
                candidates,
                rotated: false,
            });
        }

        info!(%skew, candidates, "Correcting page skew");
        let corrected = self.primitives.rotate(&gray, -skew.degrees());
        Ok(Rectified {
            image: corrected,
            skew,
            candidates,
            rotated: true,
        })
    }

    /// Measure the skew of a grayscale page without correcting it.
    pub fn estimate_skew(&self, gray: &GrayImage) -> Result<SkewEstimate> {
        self.measure(gray).map(|(skew, _)| skew)
    }

    fn measure(&self, gray: &GrayImage) -> Result<(SkewEstimate, usize)> {
        let mask = self.primitives.threshold(gray);
        debug!(ink = mask.ink_count(), "Page binarized");

        let candidates = self.primitives.detect_lines(&mask, &self.search);
        let Some(skew) = candidates.median_skew() else {
            warn!("No line candidates in the search band");
            return Err(ScorectifyError::NoLineCandidates);
        };

        debug!(%skew, candidates = candidates.len(), "Skew estimated");
        Ok((skew, candidates.len()))
    }
}

/// Rectify one page with the default configuration.
pub fn rectify(image: DynamicImage) -> Result<GrayImage> {
    let rectifier: Rectifier = Rectifier::default();
    rectifier.rectify(image)
}

// -- Tests --------------------------------------------------------------------
