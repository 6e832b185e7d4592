// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Loader and rectifier configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorectifyError};

/// Rasterization resolution used for PDF pages when none is given.
pub const DEFAULT_RESOLUTION_DPI: u32 = 200;

/// Half-width of the searched band around the vertical orientation.
pub const DEFAULT_MAX_ANGLE_DEGREES: f64 = 5.0;

/// Number of line orientations sampled across the band.
pub const DEFAULT_ANGLE_SAMPLES: usize = 50;

/// Minimum separation between accepted peaks, in accumulator cells.
pub const DEFAULT_PEAK_MIN_DISTANCE: usize = 2;

/// Skew estimates at or below this magnitude are treated as noise.
pub const DEFAULT_ROTATION_THRESHOLD_DEGREES: f64 = 0.005;

/// Fraction of the strongest accumulator cell a peak has to exceed.
pub const DEFAULT_PEAK_THRESHOLD_RATIO: f64 = 0.5;

/// Settings for turning a file into raster pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Dots per inch used when rasterizing paginated documents (PDF).
    /// Flat image formats are decoded at their native size and ignore it.
    pub resolution: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION_DPI,
        }
    }
}

impl LoaderConfig {
    pub fn with_resolution(resolution: u32) -> Self {
        Self { resolution }
    }

    /// Reject a zero resolution.
    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(ScorectifyError::InvalidConfig(
                "resolution must be a positive number of dots per inch".into(),
            ));
        }
        Ok(())
    }
}

/// Tuning knobs for skew estimation and correction.
///
/// The defaults are empirical: a ±5° band sampled 50 times, peaks at least two
/// cells apart, and a 0.005° noise floor below which no rotation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyConfig {
    /// Half-width of the searched band around vertical, in degrees.
    pub max_angle_degrees: f64,
    /// Number of equally spaced orientations over `[90° - max, 90° + max)`.
    pub angle_samples: usize,
    /// Peak separation along the offset axis, in accumulator cells.
    pub peak_min_distance: usize,
    /// Peak separation along the angle axis, in accumulator cells.
    pub peak_min_angle: usize,
    /// A peak must hold more than this fraction of the accumulator maximum.
    pub peak_threshold_ratio: f64,
    /// Estimates with a magnitude at or below this are passed through.
    pub rotation_threshold_degrees: f64,
}

impl Default for RectifyConfig {
    fn default() -> Self {
        Self {
            max_angle_degrees: DEFAULT_MAX_ANGLE_DEGREES,
            angle_samples: DEFAULT_ANGLE_SAMPLES,
            peak_min_distance: DEFAULT_PEAK_MIN_DISTANCE,
            peak_min_angle: DEFAULT_PEAK_MIN_DISTANCE,
            peak_threshold_ratio: DEFAULT_PEAK_THRESHOLD_RATIO,
            rotation_threshold_degrees: DEFAULT_ROTATION_THRESHOLD_DEGREES,
        }
    }
}

impl RectifyConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.max_angle_degrees.is_finite()
            || self.max_angle_degrees <= 0.0
            || self.max_angle_degrees > 45.0
        {
            return Err(ScorectifyError::InvalidConfig(format!(
                "max_angle_degrees must be in (0, 45], got {}",
                self.max_angle_degrees
            )));
        }
        if self.angle_samples == 0 {
            return Err(ScorectifyError::InvalidConfig(
                "angle_samples must be at least 1".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.peak_threshold_ratio) {
            return Err(ScorectifyError::InvalidConfig(format!(
                "peak_threshold_ratio must be in [0, 1), got {}",
                self.peak_threshold_ratio
            )));
        }
        if !self.rotation_threshold_degrees.is_finite() || self.rotation_threshold_degrees < 0.0 {
            return Err(ScorectifyError::InvalidConfig(format!(
                "rotation_threshold_degrees must be a non-negative number, got {}",
                self.rotation_threshold_degrees
            )));
        }
        Ok(())
    }

    /// Sampled line orientations in radians, ascending, measured from the
    /// image x-axis (so `PI / 2` is a perfectly vertical line).
    ///
    /// Sample `i` sits at `90° + max * (2i - n) / n`; the upper end of the band
    /// is excluded and, for even `n`, sample `n / 2` is exactly vertical.
    pub fn line_angles(&self) -> Vec<f64> {
        let max = self.max_angle_degrees.to_radians();
        let n = self.angle_samples as f64;
        (0..self.angle_samples)
            .map(|i| {
                let offset = max * (2.0 * i as f64 - n) / n;
                std::f64::consts::FRAC_PI_2 + offset
            })
            .collect()
    }
}
