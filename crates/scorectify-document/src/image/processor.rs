// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — grayscale normalization, edge-padded rotation and file
// output for single-channel score pages.

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::geometric_transformations::{Interpolation, warp_with};
use scorectify_core::error::ScorectifyError;
use tracing::{debug, instrument};

/// A single-channel page on its way in or out of the pipeline.
pub struct ImageProcessor {
    image: GrayImage,
}

impl ImageProcessor {
    /// Wrap a decoded page, reducing it to a single 8-bit intensity channel.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: to_grayscale(image),
        }
    }

    /// Wrap an image that is already single-channel.
    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    /// Borrow the underlying grayscale buffer.
    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// Write the image to a file. The format is inferred from the file extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ScorectifyError> {
        self.image.save(path.as_ref()).map_err(|err| {
            ScorectifyError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Reduce any decoded image to 8-bit luma. 8-bit grayscale input is moved
/// through untouched.
pub fn to_grayscale(image: DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

/// Largest source coordinate along an axis of `len` pixels that bilinear
/// interpolation still samples: one step below `len - 1`, so a right or
/// bottom neighbour exists.
fn last_sample_coordinate(len: u32) -> f32 {
    (len - 1) as f32 * (1.0 - f32::EPSILON)
}

/// Rotate `gray` clockwise by `degrees` about its centre with bilinear
/// sampling and edge-extension padding. Output dimensions equal the input's.
///
/// Each destination pixel is mapped back into the source frame and the source
/// coordinate is clamped to the image, so corners uncovered by the turn repeat
/// the nearest edge pixel. Sampling runs on an `f32` copy and is rounded back
/// to 8 bits, so flat regions keep their exact intensity.
pub fn rotate_edge_padded(gray: &GrayImage, degrees: f64) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width < 2 || height < 2 || degrees == 0.0 {
        return gray.clone();
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin as f32, cos as f32);
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let max_x = last_sample_coordinate(width);
    let max_y = last_sample_coordinate(height);

    let intensities: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([gray.get_pixel(x, y).0[0] as f32]));

    let warped = warp_with(
        &intensities,
        |x, y| {
            let dx = x - cx;
            let dy = y - cy;
            (
                (cos * dx + sin * dy + cx).clamp(0.0, max_x),
                (-sin * dx + cos * dy + cy).clamp(0.0, max_y),
            )
        },
        Interpolation::Bilinear,
        Luma([0.0f32]),
    );

    let rotated = GrayImage::from_fn(width, height, |x, y| {
        Luma([warped.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8])
    });

    debug!(width, height, degrees, "Edge-padded rotation applied");
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn luma8_input_is_moved_through_unchanged() {
        let gray = GrayImage::from_fn(7, 5, |x, y| Luma([(x * 30 + y) as u8]));
        let out = to_grayscale(DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(out, gray);
    }

    #[test]
    fn neutral_rgb_keeps_its_intensity() {
        let rgb = RgbImage::from_fn(4, 4, |x, _| {
            let v = if x % 2 == 0 { 0u8 } else { 255u8 };
            Rgb([v, v, v])
        });
        let out = to_grayscale(DynamicImage::ImageRgb8(rgb));
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert!(out.get_pixel(1, 0).0[0] >= 254);
    }

    #[test]
    fn zero_rotation_is_identity() {
        let gray = GrayImage::from_fn(9, 9, |x, y| Luma([(x * 20 + y * 3) as u8]));
        assert_eq!(rotate_edge_padded(&gray, 0.0), gray);
    }

    #[test]
    fn rotation_keeps_dimensions() {
        let gray = GrayImage::from_pixel(120, 80, Luma([200u8]));
        assert_eq!(rotate_edge_padded(&gray, 3.5).dimensions(), (120, 80));
    }

    #[test]
    fn edge_padding_introduces_no_border() {
        // A uniform page must stay uniform: out-of-frame samples reuse edge pixels.
        let gray = GrayImage::from_pixel(64, 48, Luma([231u8]));
        let out = rotate_edge_padded(&gray, 4.0);
        assert!(out.pixels().all(|p| p.0[0] == 231));
    }

    #[test]
    fn positive_angle_turns_clockwise() {
        // A dot above the centre moves to the right under a clockwise turn.
        let mut gray = GrayImage::from_pixel(101, 101, Luma([255u8]));
        gray.put_pixel(50, 10, Luma([0u8]));
        let out = rotate_edge_padded(&gray, 90.0);
        assert!(out.get_pixel(90, 50).0[0] < 128);
        assert_eq!(out.get_pixel(10, 50).0[0], 255);
    }

    #[test]
    fn steep_turn_fills_corners_from_the_edges() {
        // Every source pixel is at least 100; an out-of-frame sample that fell
        // back to a fill colour would show up as a darker corner.
        let gray = GrayImage::from_fn(40, 30, |x, y| Luma([100 + (x + 2 * y) as u8]));
        let out = rotate_edge_padded(&gray, 30.0);
        assert!(out.pixels().all(|p| p.0[0] >= 100));
        assert_eq!(out.dimensions(), (40, 30));
    }

    #[test]
    fn clamped_coordinates_stay_inside_the_interpolation_grid() {
        for len in [2u32, 3, 255, 1 << 12, 1 << 16] {
            let max = last_sample_coordinate(len);
            assert!(max < (len - 1) as f32, "len {len}");
            assert_eq!(max.floor() as u32, len - 2, "len {len}");
        }
    }

    #[test]
    fn degenerate_strip_is_returned_as_is() {
        let strip = GrayImage::from_fn(1, 12, |_, y| Luma([(y * 10) as u8]));
        assert_eq!(rotate_edge_padded(&strip, 2.0), strip);
    }

    #[test]
    fn saved_page_decodes_back_to_same_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        ImageProcessor::from_gray(GrayImage::from_pixel(10, 6, Luma([17u8])))
            .save(&path)
            .unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 6));
    }
}
