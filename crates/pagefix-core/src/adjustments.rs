//! Photometric adjustments.
//!
//! Each adjustment is a pure function that returns a new buffer and is a
//! strict no-op at its neutral value, so an untouched slider never
//! perturbs the image.
//!
//! ## Pipeline Order
//! 1. Contrast
//! 2. Brightness
//! 3. Sharpen
//! 4. Blur
//!
//! Point operations (contrast, brightness) go through a 256-entry lookup
//! table; results are rounded and saturated to 0..=255.

use crate::buffer::PixelBuffer;
use crate::filter::{add_weighted, convolve3x3, gaussian_blur, saturate, Border};

/// Build a lookup table for a per-sample point operation.
#[inline]
fn lut(f: impl Fn(f32) -> f32) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = saturate(f(i as f32));
    }
    table
}

/// Scale every sample by `factor`.
///
/// Formula: `output = clamp(round(input * factor), 0, 255)`
///
/// # Example
/// ```
/// use pagefix_core::adjustments::apply_contrast;
/// use pagefix_core::buffer::{ColorLayout, PixelBuffer};
///
/// let image = PixelBuffer::new(2, 1, ColorLayout::Gray, vec![100, 200]);
/// assert_eq!(apply_contrast(&image, 1.5).pixels, vec![150, 255]);
/// ```
pub fn apply_contrast(image: &PixelBuffer, factor: f64) -> PixelBuffer {
    if factor == 1.0 {
        return image.clone();
    }
    let factor = factor as f32;
    let table = lut(|s| s * factor);
    image.map_samples(|s| table[s as usize])
}

/// Shift every sample by `offset * 2.55` levels.
///
/// `offset` is in slider units (-100 to 100), so the full range spans
/// roughly -255 to +255 sample levels.
pub fn apply_brightness(image: &PixelBuffer, offset: f64) -> PixelBuffer {
    if offset == 0.0 {
        return image.clone();
    }
    let delta = (offset * 2.55) as f32;
    let table = lut(|s| s + delta);
    image.map_samples(|s| table[s as usize])
}

/// Sharpening kernel for a given weight: every neighbour is `-weight` and
/// the center is `8 * weight + 1`, so the kernel always sums to one.
pub fn sharpen_kernel(weight: f32) -> [[f32; 3]; 3] {
    let n = -weight;
    [[n, n, n], [n, 8.0 * weight + 1.0, n], [n, n, n]]
}

/// Sharpen with a weighted 3×3 kernel and blend with the original.
///
/// Formula: `output = original * (1 - weight) + convolved * weight`
pub fn apply_sharpen(image: &PixelBuffer, weight: f64) -> PixelBuffer {
    if weight <= 0.0 {
        return image.clone();
    }
    let weight = weight as f32;
    let convolved = convolve3x3(image, &sharpen_kernel(weight));
    add_weighted(image, 1.0 - weight, &convolved, weight)
}

/// Gaussian blur with kernel size `2 * radius + 1`, sigma derived from
/// the size.
pub fn apply_blur(image: &PixelBuffer, radius: u32) -> PixelBuffer {
    if radius == 0 {
        return image.clone();
    }
    let ksize = 2 * radius as usize + 1;
    gaussian_blur(image, ksize, 0.0, Border::Reflect101)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
