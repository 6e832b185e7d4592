// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Constrained Hough transform — votes ink pixels into an (offset, angle)
// accumulator restricted to a narrow band of near-vertical orientations, then
// extracts well-separated accumulator peaks.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use scorectify_core::{RectifyConfig, SkewEstimate};
use tracing::debug;

use super::threshold::BinaryMask;

/// Parameters of one constrained line search.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSearch {
    /// Line orientations to test, radians from the x-axis (`PI / 2` is vertical).
    pub line_angles: Vec<f64>,
    /// Minimum peak separation along the offset axis, in cells.
    pub min_distance: usize,
    /// Minimum peak separation along the angle axis, in cells.
    pub min_angle: usize,
    /// Peaks must hold more than this fraction of the strongest cell.
    pub threshold_ratio: f64,
}

impl LineSearch {
    pub fn from_config(config: &RectifyConfig) -> Self {
        Self {
            line_angles: config.line_angles(),
            min_distance: config.peak_min_distance,
            min_angle: config.peak_min_angle,
            threshold_ratio: config.peak_threshold_ratio,
        }
    }
}

impl Default for LineSearch {
    fn default() -> Self {
        Self::from_config(&RectifyConfig::default())
    }
}

/// One accepted accumulator maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughPeak {
    /// Line orientation in radians (`PI / 2` is vertical).
    pub angle: f64,
    /// Signed distance of the line from the image origin, in pixels.
    pub offset: f64,
    pub votes: u32,
}

/// Line orientations detected on one page, one entry per accepted peak, in
/// order of decreasing peak strength.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngleCandidateSet {
    angles: Vec<f64>,
}

impl AngleCandidateSet {
    pub fn new(angles: Vec<f64>) -> Self {
        Self { angles }
    }

    pub fn from_peaks(peaks: &[HoughPeak]) -> Self {
        Self::new(peaks.iter().map(|peak| peak.angle).collect())
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Detected orientations in radians from the x-axis.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Median deviation from vertical. `None` when there are no candidates.
    ///
    /// Even-sized sets average the two middle values.
    pub fn median_skew(&self) -> Option<SkewEstimate> {
        if self.angles.is_empty() {
            return None;
        }

        let mut centred: Vec<f64> = self.angles.iter().map(|angle| angle - FRAC_PI_2).collect();
        centred.sort_by(f64::total_cmp);

        let mid = centred.len() / 2;
        let median = if centred.len() % 2 == 1 {
            centred[mid]
        } else {
            (centred[mid - 1] + centred[mid]) / 2.0
        };
        Some(SkewEstimate::from_radians(median))
    }
}

/// Vote grid over (offset, angle). Rows are offsets, columns are angles.
#[derive(Debug, Clone)]
pub struct HoughAccumulator {
    votes: Vec<u32>,
    rows: usize,
    line_angles: Vec<f64>,
    /// Row index of offset zero.
    origin: i64,
}

impl HoughAccumulator {
    /// Vote every ink pixel of `mask` into each of `line_angles`.
    ///
    /// A line with orientation `a` has normal angle `t = a - PI/2` and every
    /// pixel on it satisfies `x·cos t + y·sin t = offset`. Offsets are rounded
    /// to whole pixels over `[-diagonal, diagonal]`.
    pub fn accumulate(mask: &BinaryMask, line_angles: &[f64]) -> Self {
        let (width, height) = mask.dimensions();
        let diagonal = (width as f64).hypot(height as f64).ceil() as i64;
        let rows = (2 * diagonal + 1) as usize;
        let cols = line_angles.len();

        let normals: Vec<(f64, f64)> = line_angles
            .iter()
            .map(|angle| {
                let (sin, cos) = (angle - FRAC_PI_2).sin_cos();
                (cos, sin)
            })
            .collect();

        let mut votes = vec![0u32; rows * cols];
        for (x, y) in mask.ink_pixels() {
            let (x, y) = (x as f64, y as f64);
            for (col, (cos, sin)) in normals.iter().enumerate() {
                let row = (x * cos + y * sin).round() as i64 + diagonal;
                votes[row as usize * cols + col] += 1;
            }
        }

        Self {
            votes,
            rows,
            line_angles: line_angles.to_vec(),
            origin: diagonal,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.line_angles.len()
    }

    /// Votes for `offset` (in pixels) at angle sample `angle_index`.
    pub fn votes_at(&self, offset: i64, angle_index: usize) -> u32 {
        let row = offset + self.origin;
        if row < 0 || row as usize >= self.rows || angle_index >= self.cols() {
            return 0;
        }
        self.votes[row as usize * self.cols() + angle_index]
    }

    pub fn max_votes(&self) -> u32 {
        self.votes.iter().copied().max().unwrap_or(0)
    }

    /// Extract separated local maxima.
    ///
    /// Cells equal to the maximum of their `(2·min_distance+1) × (2·min_angle+1)`
    /// neighbourhood and above `threshold_ratio · max` are grouped into
    /// 8-connected plateaus; each plateau contributes its rounded centroid.
    /// Plateaus are then accepted strongest first, and every accepted peak
    /// clears its neighbourhood so weaker duplicates of the same line drop out.
    pub fn peaks(&self, min_distance: usize, min_angle: usize, threshold_ratio: f64) -> Vec<HoughPeak> {
        let cols = self.cols();
        if cols == 0 || self.rows == 0 {
            return Vec::new();
        }

        let threshold = self.max_votes() as f64 * threshold_ratio;
        let mut local_max = max_filter(&self.votes, self.rows, cols, min_distance, min_angle);

        let candidates = GrayImage::from_fn(cols as u32, self.rows as u32, |col, row| {
            let idx = row as usize * cols + col as usize;
            let votes = self.votes[idx];
            if votes == local_max[idx] && votes as f64 > threshold {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        let labels = connected_components(&candidates, Connectivity::Eight, Luma([0u8]));

        let mut plateaus: BTreeMap<u32, Plateau> = BTreeMap::new();
        for (col, row, label) in labels.enumerate_pixels() {
            let label = label.0[0];
            if label == 0 {
                continue;
            }
            let strength = local_max[row as usize * cols + col as usize];
            plateaus.entry(label).or_default().add(row as usize, col as usize, strength);
        }

        let mut ordered: Vec<Plateau> = plateaus.into_values().collect();
        ordered.sort_by(|a, b| b.strength.cmp(&a.strength));

        let mut peaks = Vec::new();
        for plateau in ordered {
            let (row, col) = plateau.centroid();
            let votes = local_max[row * cols + col];
            if votes as f64 <= threshold {
                continue;
            }

            peaks.push(HoughPeak {
                angle: self.line_angles[col],
                offset: (row as i64 - self.origin) as f64,
                votes,
            });

            let row_span =
                row.saturating_sub(min_distance)..=row.saturating_add(min_distance).min(self.rows - 1);
            let col_span =
                col.saturating_sub(min_angle)..=col.saturating_add(min_angle).min(cols - 1);
            for r in row_span {
                for c in col_span.clone() {
                    local_max[r * cols + c] = 0;
                }
            }
        }

        peaks
    }
}

/// 8-connected group of candidate cells.
#[derive(Debug, Default)]
struct Plateau {
    row_sum: f64,
    col_sum: f64,
    cells: usize,
    strength: u32,
}

impl Plateau {
    fn add(&mut self, row: usize, col: usize, strength: u32) {
        self.row_sum += row as f64;
        self.col_sum += col as f64;
        self.cells += 1;
        self.strength = self.strength.max(strength);
    }

    fn centroid(&self) -> (usize, usize) {
        let cells = self.cells.max(1) as f64;
        (
            (self.row_sum / cells).round() as usize,
            (self.col_sum / cells).round() as usize,
        )
    }
}

/// Separable maximum filter with a zero border.
fn max_filter(values: &[u32], rows: usize, cols: usize, row_radius: usize, col_radius: usize) -> Vec<u32> {
    let mut along_rows = vec![0u32; values.len()];
    for col in 0..cols {
        for row in 0..rows {
            let lo = row.saturating_sub(row_radius);
            let hi = row.saturating_add(row_radius).min(rows - 1);
            along_rows[row * cols + col] = (lo..=hi).map(|r| values[r * cols + col]).max().unwrap_or(0);
        }
    }

    let mut filtered = vec![0u32; values.len()];
    for row in 0..rows {
        let base = row * cols;
        for col in 0..cols {
            let lo = col.saturating_sub(col_radius);
            let hi = col.saturating_add(col_radius).min(cols - 1);
            filtered[base + col] = along_rows[base + lo..=base + hi].iter().copied().max().unwrap_or(0);
        }
    }
    filtered
}

/// Run the constrained transform over `mask` and collect the peak orientations.
pub fn detect_lines(mask: &BinaryMask, search: &LineSearch) -> AngleCandidateSet {
    let accumulator = HoughAccumulator::accumulate(mask, &search.line_angles);
    let peaks = accumulator.peaks(search.min_distance, search.min_angle, search.threshold_ratio);
    debug!(
        rows = accumulator.rows(),
        cols = accumulator.cols(),
        max_votes = accumulator.max_votes(),
        peaks = peaks.len(),
        "Hough search complete"
    );
    AngleCandidateSet::from_peaks(&peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_line_segment_mut;

    fn mask_with_columns(width: u32, height: u32, columns: &[u32], y_range: std::ops::Range<u32>) -> BinaryMask {
        BinaryMask::from_fn(width, height, |x, y| columns.contains(&x) && y_range.contains(&y))
    }

    #[test]
    fn vertical_line_votes_into_the_upright_sample() {
        let mask = mask_with_columns(80, 80, &[30], 10..70);
        let search = LineSearch::default();
        let accumulator = HoughAccumulator::accumulate(&mask, &search.line_angles);

        assert_eq!(accumulator.cols(), 50);
        assert_eq!(accumulator.votes_at(30, 25), 60);
        assert_eq!(accumulator.max_votes(), 60);

        let peaks = accumulator.peaks(2, 2, 0.5);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].angle, FRAC_PI_2);
        assert_eq!(peaks[0].offset, 30.0);
        assert_eq!(peaks[0].votes, 60);
    }

    #[test]
    fn adjacent_duplicate_detections_collapse_into_one_peak() {
        // A two-pixel-wide stroke fills two neighbouring offset cells equally.
        let mask = mask_with_columns(80, 80, &[30, 31], 10..70);
        let candidates = detect_lines(&mask, &LineSearch::default());
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn separate_strokes_give_separate_peaks() {
        let mask = mask_with_columns(100, 100, &[20, 50, 80], 10..90);
        let candidates = detect_lines(&mask, &LineSearch::default());
        assert_eq!(candidates.len(), 3);
        assert!(candidates.angles().iter().all(|&a| a == FRAC_PI_2));
        assert_eq!(candidates.median_skew().unwrap().degrees(), 0.0);
    }

    #[test]
    fn horizontal_clutter_is_ignored() {
        // A staff-like horizontal line spreads its votes thinly across offsets.
        let mask = BinaryMask::from_fn(100, 100, |x, y| {
            (x == 50 && (10..90).contains(&y)) || (y == 40 && (5..95).contains(&x))
        });
        let candidates = detect_lines(&mask, &LineSearch::default());
        assert_eq!(candidates.len(), 1);
        assert!((candidates.angles()[0] - FRAC_PI_2).abs() < 0.5f64.to_radians());
    }

    #[test]
    fn tilted_stroke_is_found_near_its_orientation() {
        // Stroke leaning right at the top: orientation 92° in image coordinates.
        let mut gray = GrayImage::from_pixel(200, 200, Luma([255u8]));
        let lean = 2.0f64.to_radians();
        let half = 80.0f64;
        let (cx, cy) = (100.0f64, 100.0f64);
        draw_line_segment_mut(
            &mut gray,
            ((cx + half * lean.sin()) as f32, (cy - half * lean.cos()) as f32),
            ((cx - half * lean.sin()) as f32, (cy + half * lean.cos()) as f32),
            Luma([0u8]),
        );
        let mask = BinaryMask::from_threshold(&gray, 128);

        let candidates = detect_lines(&mask, &LineSearch::default());
        let skew = candidates.median_skew().expect("stroke should be detected");
        assert!((skew.degrees() - 2.0).abs() <= 0.5, "estimated {}", skew);
    }

    #[test]
    fn oversized_separation_keeps_only_the_strongest_peak() {
        let mask = mask_with_columns(80, 80, &[20, 50], 10..70);
        let accumulator = HoughAccumulator::accumulate(&mask, &LineSearch::default().line_angles);

        let peaks = accumulator.peaks(usize::MAX, usize::MAX, 0.5);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].votes, 60);
    }

    #[test]
    fn empty_mask_has_no_peaks() {
        let mask = BinaryMask::from_fn(40, 40, |_, _| false);
        let candidates = detect_lines(&mask, &LineSearch::default());
        assert!(candidates.is_empty());
        assert!(candidates.median_skew().is_none());
    }

    #[test]
    fn median_of_odd_and_even_sets() {
        let deg = |d: f64| FRAC_PI_2 + d.to_radians();

        let odd = AngleCandidateSet::new(vec![deg(1.0), deg(-3.0), deg(0.4)]);
        assert!((odd.median_skew().unwrap().degrees() - 0.4).abs() < 1e-9);

        let even = AngleCandidateSet::new(vec![deg(0.2), deg(1.0), deg(-4.8), deg(0.6)]);
        assert!((even.median_skew().unwrap().degrees() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn median_resists_a_spurious_minority() {
        let deg = |d: f64| FRAC_PI_2 + d.to_radians();
        let set = AngleCandidateSet::new(vec![deg(1.2), deg(1.2), deg(1.4), deg(-4.8), deg(1.2)]);
        assert!((set.median_skew().unwrap().degrees() - 1.2).abs() < 1e-9);
    }
}
