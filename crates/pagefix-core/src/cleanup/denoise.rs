//! Multi-scale Gaussian smoothing followed by a bilateral pass.
//!
//! Colour input is smoothed on the lightness plane only (8-bit Lab),
//! so halftone and screen patterns are suppressed without smearing hue.
//! The blend weights are not normalized: two passes of
//! `0.4 / 0.4` and `0.6 / 0.4` keep 88% of the original level, which
//! slightly darkens flat regions.

use tracing::debug;

use crate::buffer::{ColorLayout, PixelBuffer};
use crate::color::{merge_lab, split_lab};
use crate::filter::{add_weighted, bilateral, gaussian_blur, Border};

/// `(kernel size, sigma)` for the three smoothing scales.
const SCALES: [(usize, f64); 3] = [(3, 0.5), (5, 1.0), (7, 1.5)];

const BILATERAL_DIAMETER: u32 = 9;
const BILATERAL_SIGMA_COLOR: f32 = 75.0;
const BILATERAL_SIGMA_SPACE: f32 = 75.0;

/// Blend three Gaussian scales of a single plane.
///
/// `fine = 0.4 * g3 + 0.4 * g5`, then `0.6 * fine + 0.4 * g7`, rounding
/// to a sample after each blend.
pub fn multi_scale_smooth(plane: &PixelBuffer) -> PixelBuffer {
    let [g1, g2, g3] =
        SCALES.map(|(ksize, sigma)| gaussian_blur(plane, ksize, sigma, Border::Reflect101));
    let fine = add_weighted(&g1, 0.4, &g2, 0.4);
    add_weighted(&fine, 0.6, &g3, 0.4)
}

/// Suppress moire and halftone noise while keeping edges.
pub fn denoise(image: &PixelBuffer) -> PixelBuffer {
    let smoothed = match image.layout {
        ColorLayout::Gray => multi_scale_smooth(image),
        ColorLayout::Rgb => match split_lab(image) {
            Some([l, a, b]) => merge_lab(&multi_scale_smooth(&l), &a, &b),
            None => multi_scale_smooth(image),
        },
    };
    debug!(layout = ?image.layout, "multi-scale smoothing done");

    bilateral(
        &smoothed,
        BILATERAL_DIAMETER,
        BILATERAL_SIGMA_COLOR,
        BILATERAL_SIGMA_SPACE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(size: u32, a: u8, b: u8) -> PixelBuffer {
        let pixels = (0..size)
            .flat_map(|y| (0..size).map(move |x| if (x + y) % 2 == 0 { a } else { b }))
            .collect();
        PixelBuffer::new(size, size, ColorLayout::Gray, pixels)
    }

    fn variance(buf: &PixelBuffer) -> f64 {
        let n = buf.pixels.len() as f64;
        let mean = buf.pixels.iter().map(|&v| v as f64).sum::<f64>() / n;
        buf.pixels
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n
    }

    #[test]
    fn test_flat_level_keeps_88_percent() {
        let img = PixelBuffer::filled(12, 12, ColorLayout::Gray, 100);
        let smoothed = multi_scale_smooth(&img);
        assert!(smoothed.pixels.iter().all(|&v| v == 88));
    }

    #[test]
    fn test_flat_image_denoise() {
        let img = PixelBuffer::filled(12, 12, ColorLayout::Gray, 200);
        let out = denoise(&img);
        // 200 * 0.88 = 176, and the bilateral pass leaves flat input alone.
        assert!(out.pixels.iter().all(|&v| v == 176));
    }

    #[test]
    fn test_checkerboard_variance_drops() {
        let img = checkerboard(24, 90, 170);
        let out = denoise(&img);
        assert!(variance(&out) < variance(&img) / 10.0);
    }

    #[test]
    fn test_colour_keeps_layout_and_size() {
        let gray = checkerboard(16, 60, 200);
        let colour = crate::color::to_rgb(&gray);
        let out = denoise(&colour);

        assert_eq!(out.layout, ColorLayout::Rgb);
        assert_eq!((out.width, out.height), (16, 16));
    }

    #[test]
    fn test_colour_flat_region_stays_neutral() {
        let img = PixelBuffer::filled(10, 10, ColorLayout::Rgb, 150);
        let out = denoise(&img);
        for px in out.pixels.chunks_exact(3) {
            assert!(px[0].abs_diff(px[1]) <= 2 && px[1].abs_diff(px[2]) <= 2);
            assert!(px[0] < 150);
        }
    }
}
