//! Image cropping with fractional edge positions.
//!
//! The crop rectangle is given as four fractions of the current image
//! size: `left`, `top`, `right`, `bottom`, each in 0.0 to 1.0. Fractions
//! are converted to pixel positions by truncation.
//!
//! # Degenerate rectangles
//!
//! Each axis is checked on its own. If `left >= right` after conversion the
//! crop spans the full width; if `top >= bottom` it spans the full height.
//! A rectangle that is degenerate horizontally can still crop vertically.

use crate::buffer::PixelBuffer;
use crate::params::CropRect;

/// Pixel-space bounds `(left, top, right, bottom)` of `rect` on a
/// `width`×`height` image, after resetting degenerate axes.
pub fn crop_bounds(width: u32, height: u32, rect: &CropRect) -> (u32, u32, u32, u32) {
    let to_px = |fraction: f64, extent: u32| -> u32 {
        ((extent as f64 * fraction.clamp(0.0, 1.0)) as u32).min(extent)
    };

    let mut left = to_px(rect.left, width);
    let mut right = to_px(rect.right, width);
    let mut top = to_px(rect.top, height);
    let mut bottom = to_px(rect.bottom, height);

    if left >= right {
        left = 0;
        right = width;
    }
    if top >= bottom {
        top = 0;
        bottom = height;
    }

    (left, top, right, bottom)
}

/// Crop an image to a fractional rectangle.
///
/// # Example
///
/// ```
/// use pagefix_core::buffer::{ColorLayout, PixelBuffer};
/// use pagefix_core::params::CropRect;
/// use pagefix_core::transform::apply_crop;
///
/// let image = PixelBuffer::filled(100, 100, ColorLayout::Gray, 128);
/// let rect = CropRect { left: 0.25, top: 0.25, right: 0.75, bottom: 0.75 };
/// let cropped = apply_crop(&image, &rect);
/// assert_eq!((cropped.width, cropped.height), (50, 50));
/// ```
pub fn apply_crop(image: &PixelBuffer, rect: &CropRect) -> PixelBuffer {
    let (left, top, right, bottom) = crop_bounds(image.width, image.height, rect);

    if left == 0 && top == 0 && right == image.width && bottom == image.height {
        return image.clone();
    }

    let out_width = right - left;
    let out_height = bottom - top;
    let ch = image.channels();
    let row_len = out_width as usize * ch;

    let mut output = Vec::with_capacity(row_len * out_height as usize);
    for y in top..bottom {
        let start = image.index(left, y);
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    PixelBuffer::new(out_width, out_height, image.layout, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ColorLayout;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        PixelBuffer::new(width, height, ColorLayout::Rgb, pixels)
    }

    fn rect(left: f64, top: f64, right: f64, bottom: f64) -> CropRect {
        CropRect {
            left,
            top,
            right,
            bottom,
        }
    }

    #[test]
    fn test_full_crop() {
        let img = test_image(100, 100);
        let result = apply_crop(&img, &CropRect::default());

        assert_eq!(result, img);
    }

    #[test]
    fn test_half_crop() {
        let img = test_image(100, 100);
        let result = apply_crop(&img, &rect(0.0, 0.0, 0.5, 0.5));

        assert_eq!(result.width, 50);
        assert_eq!(result.height, 50);
    }

    #[test]
    fn test_center_crop() {
        let img = test_image(10, 10);
        let result = apply_crop(&img, &rect(0.2, 0.2, 0.8, 0.8));

        // 0.2 * 10 = 2, 0.8 * 10 = 8
        assert_eq!(result.width, 6);
        assert_eq!(result.height, 6);

        // First pixel should be from position (2, 2) in the original
        // Value at (2, 2) = (2 * 10 + 2) % 256 = 22
        assert_eq!(result.pixels[0], 22);
    }

    #[test]
    fn test_fractions_truncate() {
        // 0.39 * 10 = 3.9 -> 3, 0.71 * 10 = 7.1 -> 7
        assert_eq!(crop_bounds(10, 10, &rect(0.39, 0.0, 0.71, 1.0)), (3, 0, 7, 10));
    }

    #[test]
    fn test_inverted_horizontal_resets_width_only() {
        let img = test_image(100, 100);
        let result = apply_crop(&img, &rect(0.9, 0.1, 0.2, 0.9));

        assert_eq!(result.width, 100);
        assert_eq!(result.height, 80);
        // First row comes from y = 10.
        assert_eq!(result.pixels[0], ((10 * 100) % 256) as u8);
    }

    #[test]
    fn test_inverted_vertical_resets_height_only() {
        let img = test_image(100, 100);
        let result = apply_crop(&img, &rect(0.25, 0.7, 0.75, 0.3));

        assert_eq!(result.width, 50);
        assert_eq!(result.height, 100);
    }

    #[test]
    fn test_equal_edges_reset() {
        assert_eq!(crop_bounds(40, 30, &rect(0.5, 0.5, 0.5, 0.5)), (0, 0, 40, 30));
    }

    #[test]
    fn test_tiny_span_truncating_to_same_pixel_resets() {
        // 0.501 * 10 and 0.509 * 10 both truncate to 5.
        assert_eq!(crop_bounds(10, 10, &rect(0.501, 0.0, 0.509, 1.0)), (0, 0, 10, 10));
    }

    #[test]
    fn test_gray_crop() {
        let img = PixelBuffer::new(4, 1, ColorLayout::Gray, vec![1, 2, 3, 4]);
        let result = apply_crop(&img, &rect(0.5, 0.0, 1.0, 1.0));
        assert_eq!(result.pixels, vec![3, 4]);
        assert_eq!(result.layout, ColorLayout::Gray);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
