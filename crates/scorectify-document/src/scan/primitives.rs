// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vision primitives — the image operations the rectifier orchestrates,
// behind a trait so the orchestration can be exercised with canned results.

use image::{DynamicImage, GrayImage};

use super::hough::{AngleCandidateSet, LineSearch, detect_lines};
use super::threshold::{BinaryMask, yen_threshold};
use crate::image::processor::{rotate_edge_padded, to_grayscale};

/// Image operations needed by [`crate::Rectifier`].
pub trait VisionPrimitives {
    /// Reduce a decoded page to one 8-bit intensity channel.
    fn grayscale(&self, image: DynamicImage) -> GrayImage;

    /// Mark ink pixels (intensity strictly below a global threshold).
    fn threshold(&self, gray: &GrayImage) -> BinaryMask;

    /// Detect line orientations within the configured search band.
    fn detect_lines(&self, mask: &BinaryMask, search: &LineSearch) -> AngleCandidateSet;

    /// Rotate clockwise by `degrees`, keeping the canvas size and padding
    /// from the nearest edge.
    fn rotate(&self, gray: &GrayImage, degrees: f64) -> GrayImage;
}

/// Default primitives built on the `image` and `imageproc` crates: Yen
/// binarization, constrained Hough search and bilinear edge-padded rotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocPrimitives;

impl VisionPrimitives for ImageprocPrimitives {
    fn grayscale(&self, image: DynamicImage) -> GrayImage {
        to_grayscale(image)
    }

    fn threshold(&self, gray: &GrayImage) -> BinaryMask {
        let threshold = yen_threshold(gray);
        tracing::debug!(threshold, "Yen threshold computed");
        BinaryMask::from_threshold(gray, threshold)
    }

    fn detect_lines(&self, mask: &BinaryMask, search: &LineSearch) -> AngleCandidateSet {
        detect_lines(mask, search)
    }

    fn rotate(&self, gray: &GrayImage, degrees: f64) -> GrayImage {
        rotate_edge_padded(gray, degrees)
    }
}
