//! Separable Gaussian blur with explicit kernel size.

use super::{saturate, Border};
use crate::buffer::PixelBuffer;

/// Precomputed kernels used for small sizes when no sigma is given.
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[
        0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
    ],
];

/// Sigma implied by a kernel size when the caller passes `sigma <= 0`.
#[inline]
pub fn sigma_for_size(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Build a normalized 1-D Gaussian kernel of odd length `ksize`.
///
/// With `sigma <= 0` the sigma is derived from the size; sizes up to 7
/// then use fixed binomial-like tables.
pub fn gaussian_kernel(ksize: usize, sigma: f64) -> Vec<f32> {
    debug_assert!(ksize % 2 == 1, "Gaussian kernel size must be odd");

    if sigma <= 0.0 && ksize <= 7 {
        return SMALL_KERNELS[ksize / 2].to_vec();
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        sigma_for_size(ksize)
    };
    let scale = -0.5 / (sigma * sigma);
    let center = (ksize / 2) as f64;

    let raw: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|w| (w / sum) as f32).collect()
}

/// Blur with a `ksize`×`ksize` Gaussian.
///
/// `ksize` must be odd. `sigma <= 0` selects the sigma from the size.
pub fn gaussian_blur(image: &PixelBuffer, ksize: usize, sigma: f64, border: Border) -> PixelBuffer {
    if ksize <= 1 || image.is_empty() {
        return image.clone();
    }

    let kernel = gaussian_kernel(ksize, sigma);
    let radius = (ksize / 2) as i64;
    let (w, h) = (image.width as usize, image.height as usize);
    let ch = image.channels();

    // Horizontal pass into f32 so rounding happens once.
    let mut horizontal = vec![0f32; w * h * ch];
    for y in 0..h {
        let row = y * w * ch;
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0f32;
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = border.resolve(x as i64 + k as i64 - radius, w);
                    acc += image.pixels[row + sx * ch + c] as f32 * weight;
                }
                horizontal[row + x * ch + c] = acc;
            }
        }
    }

    let mut output = vec![0u8; w * h * ch];
    for y in 0..h {
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0f32;
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = border.resolve(y as i64 + k as i64 - radius, h);
                    acc += horizontal[(sy * w + x) * ch + c] * weight;
                }
                output[(y * w + x) * ch + c] = saturate(acc);
            }
        }
    }

    PixelBuffer::new(image.width, image.height, image.layout, output)
}
