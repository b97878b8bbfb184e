//! Neighbourhood filters shared by the photometric stages and the
//! cleanup/denoise engine.
//!
//! All filters work on any [`PixelBuffer`] layout, treating each channel
//! independently unless stated otherwise, and always return a new buffer.
//!
//! # Borders
//!
//! Samples outside the image are synthesised according to [`Border`].
//! The default everywhere is [`Border::Reflect101`] (`gfedcb|abcdefgh|gfedcba`);
//! the adaptive threshold uses [`Border::Replicate`] (`aaaaaa|abcdefgh|hhhhhhh`).

mod bilateral;
mod convolve;
mod gaussian;

pub use bilateral::bilateral;
pub use convolve::convolve3x3;
pub use gaussian::{gaussian_blur, gaussian_kernel, sigma_for_size};

use crate::buffer::PixelBuffer;

/// Out-of-range sample policy for neighbourhood filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Border {
    /// Mirror around the edge pixel without repeating it.
    #[default]
    Reflect101,
    /// Repeat the edge pixel.
    Replicate,
}

impl Border {
    /// Map a possibly out-of-range coordinate into `0..len`.
    #[inline]
    pub fn resolve(self, i: i64, len: usize) -> usize {
        let n = len as i64;
        if (0..n).contains(&i) {
            return i as usize;
        }
        if n == 1 {
            return 0;
        }
        match self {
            Border::Replicate => i.clamp(0, n - 1) as usize,
            Border::Reflect101 => {
                let period = 2 * (n - 1);
                let mut j = i.rem_euclid(period);
                if j >= n {
                    j = period - j;
                }
                j as usize
            }
        }
    }
}

/// Round and saturate a filter result to a sample.
#[inline]
pub(crate) fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Per-sample `a * alpha + b * beta`, rounded and saturated.
///
/// Both buffers must have the same dimensions and layout.
pub fn add_weighted(a: &PixelBuffer, alpha: f32, b: &PixelBuffer, beta: f32) -> PixelBuffer {
    debug_assert_eq!(a.width, b.width);
    debug_assert_eq!(a.height, b.height);
    debug_assert_eq!(a.layout, b.layout);

    let pixels = a
        .pixels
        .iter()
        .zip(&b.pixels)
        .map(|(&x, &y)| saturate(x as f32 * alpha + y as f32 * beta))
        .collect();
    PixelBuffer::new(a.width, a.height, a.layout, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ColorLayout;

    #[test]
    fn test_reflect101_indices() {
        let b = Border::Reflect101;
        assert_eq!(b.resolve(-1, 5), 1);
        assert_eq!(b.resolve(-2, 5), 2);
        assert_eq!(b.resolve(5, 5), 3);
        assert_eq!(b.resolve(6, 5), 2);
        assert_eq!(b.resolve(3, 5), 3);
    }

    #[test]
    fn test_replicate_indices() {
        let b = Border::Replicate;
        assert_eq!(b.resolve(-3, 5), 0);
        assert_eq!(b.resolve(9, 5), 4);
    }

    #[test]
    fn test_single_pixel_axis() {
        assert_eq!(Border::Reflect101.resolve(-4, 1), 0);
        assert_eq!(Border::Replicate.resolve(4, 1), 0);
    }

    #[test]
    fn test_reflect_far_outside() {
        // Kernels wider than the image still land inside it.
        let b = Border::Reflect101;
        for i in -20..20 {
            assert!(b.resolve(i, 3) < 3);
        }
    }

    #[test]
    fn test_add_weighted_saturates() {
        let a = PixelBuffer::new(2, 1, ColorLayout::Gray, vec![200, 10]);
        let b = PixelBuffer::new(2, 1, ColorLayout::Gray, vec![200, 10]);
        let out = add_weighted(&a, 1.0, &b, 1.0);
        assert_eq!(out.pixels, vec![255, 20]);
    }

    #[test]
    fn test_add_weighted_blend() {
        let a = PixelBuffer::new(1, 1, ColorLayout::Gray, vec![100]);
        let b = PixelBuffer::new(1, 1, ColorLayout::Gray, vec![200]);
        let out = add_weighted(&a, 0.4, &b, 0.4);
        assert_eq!(out.pixels, vec![120]);
    }
}
