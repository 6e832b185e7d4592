// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global binarization — Yen's threshold over the intensity histogram and the
// ink mask derived from it.

use image::GrayImage;

/// Per-pixel ink flags with the dimensions of the image they came from.
///
/// A pixel is ink when its intensity is strictly below the threshold the
/// mask was built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl BinaryMask {
    /// Mark every pixel of `gray` whose intensity is below `threshold`.
    pub fn from_threshold(gray: &GrayImage, threshold: u8) -> Self {
        let ink = gray.pixels().map(|p| p.0[0] < threshold).collect();
        Self {
            width: gray.width(),
            height: gray.height(),
            ink,
        }
    }

    /// Build a mask from a predicate over pixel coordinates.
    pub fn from_fn(width: u32, height: u32, mut is_ink: impl FnMut(u32, u32) -> bool) -> Self {
        let mut ink = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                ink.push(is_ink(x, y));
            }
        }
        Self { width, height, ink }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.ink[y as usize * self.width as usize + x as usize]
    }

    pub fn ink_count(&self) -> usize {
        self.ink.iter().filter(|&&ink| ink).count()
    }

    /// Coordinates of every ink pixel in row-major order.
    pub fn ink_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.ink
            .iter()
            .enumerate()
            .filter(|(_, ink)| **ink)
            .map(move |(idx, _)| ((idx % width) as u32, (idx / width) as u32))
    }
}

/// Compute Yen's threshold for a grayscale image.
///
/// Yen's criterion picks the split `k` of the histogram (dark class
/// `[min..=k]`, bright class `[k+1..=max]`) maximising
/// `2·ln(P(k)·(1 − P(k))) − ln(Σ_{i≤k} p_i² · Σ_{i>k} p_i²)`, where `P` is the
/// cumulative distribution. The first maximum wins ties.
///
/// The return value is the first intensity of the bright class, so
/// `intensity < threshold` selects exactly the dark class. A single-valued
/// image returns its only intensity, which marks nothing as ink.
pub fn yen_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 0;
    }

    // The histogram spans the observed range only.
    let lo = histogram.iter().position(|&count| count > 0).unwrap_or(0);
    let hi = histogram.iter().rposition(|&count| count > 0).unwrap_or(0);
    if lo == hi {
        return lo as u8;
    }

    let pmf: Vec<f64> = histogram[lo..=hi]
        .iter()
        .map(|&count| count as f64 / total_pixels as f64)
        .collect();
    let bins = pmf.len();

    let mut cumulative = Vec::with_capacity(bins);
    let mut cumulative_sq = Vec::with_capacity(bins);
    let (mut p, mut p_sq) = (0.0f64, 0.0f64);
    for &mass in &pmf {
        p += mass;
        p_sq += mass * mass;
        cumulative.push(p);
        cumulative_sq.push(p_sq);
    }

    // Tail sums of squared mass, `tail_sq[k]` covering bins `k..`.
    let mut tail_sq = vec![0.0f64; bins + 1];
    for k in (0..bins).rev() {
        tail_sq[k] = tail_sq[k + 1] + pmf[k] * pmf[k];
    }

    let mut best_split = 0usize;
    let mut best_criterion = f64::NEG_INFINITY;
    for k in 0..bins - 1 {
        let separation = cumulative[k] * (1.0 - cumulative[k]);
        let concentration = cumulative_sq[k] * tail_sq[k + 1];
        if separation <= 0.0 || concentration <= 0.0 {
            continue;
        }
        let criterion = 2.0 * separation.ln() - concentration.ln();
        if criterion > best_criterion {
            best_criterion = criterion;
            best_split = k;
        }
    }

    (lo + best_split + 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn blank_page_has_no_ink() {
        let gray = GrayImage::from_pixel(32, 32, Luma([250u8]));
        let threshold = yen_threshold(&gray);
        assert_eq!(threshold, 250);
        assert_eq!(BinaryMask::from_threshold(&gray, threshold).ink_count(), 0);
    }

    #[test]
    fn two_level_page_separates_ink_from_paper() {
        let gray = GrayImage::from_fn(20, 20, |x, _| {
            if x == 5 || x == 12 { Luma([0u8]) } else { Luma([255u8]) }
        });
        let threshold = yen_threshold(&gray);
        assert_eq!(threshold, 1);

        let mask = BinaryMask::from_threshold(&gray, threshold);
        assert_eq!(mask.ink_count(), 40);
        assert!(mask.is_ink(5, 3));
        assert!(!mask.is_ink(6, 3));
    }

    #[test]
    fn threshold_falls_between_dark_and_light_clusters() {
        // Dark strokes around 30, paper around 220, a little spread in both.
        let gray = GrayImage::from_fn(64, 64, |x, y| {
            let jitter = ((x * 7 + y * 13) % 11) as u8;
            if x % 8 == 0 { Luma([25 + jitter]) } else { Luma([215 + jitter]) }
        });
        let threshold = yen_threshold(&gray);
        assert!(threshold > 35 && threshold <= 215, "threshold {threshold}");

        let mask = BinaryMask::from_threshold(&gray, threshold);
        assert_eq!(mask.ink_count(), 8 * 64);
    }

    #[test]
    fn ink_pixels_are_reported_row_major() {
        let mask = BinaryMask::from_fn(4, 3, |x, y| (x, y) == (1, 0) || (x, y) == (3, 2));
        let pixels: Vec<_> = mask.ink_pixels().collect();
        assert_eq!(pixels, vec![(1, 0), (3, 2)]);
        assert_eq!(mask.dimensions(), (4, 3));
    }

    #[test]
    fn empty_image_yields_zero_threshold() {
        let gray = GrayImage::new(0, 0);
        assert_eq!(yen_threshold(&gray), 0);
    }
}
