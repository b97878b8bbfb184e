//! Inverse-mapping warp shared by rotation and perspective correction.
//!
//! For each pixel in the output canvas we map back through the inverse of
//! the forward transform and sample the source with bilinear
//! interpolation. Source positions outside the image read as flat white,
//! so exposed canvas blends smoothly into a white border.

use nalgebra::{Matrix3, Vector3};

use crate::buffer::PixelBuffer;

/// Value used for every channel outside the source image.
pub const BORDER_VALUE: u8 = 255;

/// Warp `image` into a `dst_w`×`dst_h` canvas using the forward transform
/// `forward` (source pixel coordinates to destination pixel coordinates).
///
/// Returns `None` when `forward` is not invertible.
pub fn warp(
    image: &PixelBuffer,
    forward: &Matrix3<f64>,
    dst_w: u32,
    dst_h: u32,
) -> Option<PixelBuffer> {
    let inverse = forward.try_inverse()?;
    let ch = image.channels();
    let mut output = vec![BORDER_VALUE; dst_w as usize * dst_h as usize * ch];
    let mut pixel = [0u8; 3];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let v = inverse * Vector3::new(dst_x as f64, dst_y as f64, 1.0);
            if v.z.abs() < f64::EPSILON {
                continue;
            }
            let src_x = v.x / v.z;
            let src_y = v.y / v.z;

            sample_bilinear(image, src_x, src_y, &mut pixel[..ch]);

            let dst_idx = (dst_y as usize * dst_w as usize + dst_x as usize) * ch;
            output[dst_idx..dst_idx + ch].copy_from_slice(&pixel[..ch]);
        }
    }

    Some(PixelBuffer::new(dst_w, dst_h, image.layout, output))
}

/// Read one sample, or the border value when `(x, y)` is off the image.
#[inline]
fn sample_or_border(image: &PixelBuffer, x: i64, y: i64, c: usize) -> f64 {
    if x < 0 || y < 0 || x >= image.width as i64 || y >= image.height as i64 {
        BORDER_VALUE as f64
    } else {
        image.sample(x as u32, y as u32, c) as f64
    }
}

/// Sample a pixel using bilinear interpolation.
///
/// Considers the 4 nearest pixels and weights their contribution by
/// distance; neighbours off the image contribute the border value.
fn sample_bilinear(image: &PixelBuffer, x: f64, y: f64, out: &mut [u8]) {
    let (w, h) = (image.width as f64, image.height as f64);

    // Entirely outside, including the one-pixel blend band.
    if !x.is_finite() || !y.is_finite() || x <= -1.0 || y <= -1.0 || x >= w || y >= h {
        out.fill(BORDER_VALUE);
        return;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    for (c, slot) in out.iter_mut().enumerate() {
        let p00 = sample_or_border(image, x0, y0, c);
        let p10 = sample_or_border(image, x0 + 1, y0, c);
        let p01 = sample_or_border(image, x0, y0 + 1, c);
        let p11 = sample_or_border(image, x0 + 1, y0 + 1, c);

        let v = p00 * (1.0 - fx) * (1.0 - fy)
            + p10 * fx * (1.0 - fy)
            + p01 * (1.0 - fx) * fy
            + p11 * fx * fy;
        *slot = v.clamp(0.0, 255.0).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ColorLayout;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x + y) * 8) as u8))
            .collect();
        PixelBuffer::new(width, height, ColorLayout::Gray, pixels)
    }

    #[test]
    fn test_identity_warp() {
        let img = gradient(10, 8);
        let out = warp(&img, &Matrix3::identity(), 10, 8).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_translation_exposes_white() {
        let img = PixelBuffer::filled(4, 4, ColorLayout::Rgb, 0);
        let shift = Matrix3::new(1.0, 0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);

        let out = warp(&img, &shift, 6, 4).unwrap();

        assert_eq!(out.sample(0, 0, 0), 255);
        assert_eq!(out.sample(1, 2, 1), 255);
        assert_eq!(out.sample(2, 2, 2), 0);
        assert_eq!(out.sample(5, 3, 0), 0);
    }

    #[test]
    fn test_half_pixel_blends_with_border() {
        let img = PixelBuffer::filled(2, 1, ColorLayout::Gray, 0);
        let shift = Matrix3::new(1.0, 0.0, 0.5, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);

        let out = warp(&img, &shift, 3, 1).unwrap();

        // x = 0 maps to source -0.5: half border, half black.
        assert_eq!(out.sample(0, 0, 0), 128);
    }

    #[test]
    fn test_singular_transform_rejected() {
        let img = gradient(4, 4);
        assert!(warp(&img, &Matrix3::zeros(), 4, 4).is_none());
    }
}
