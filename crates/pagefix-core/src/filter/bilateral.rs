//! Edge-preserving bilateral smoothing.
//!
//! Each output pixel is a weighted mean over a circular window of
//! `diameter / 2` pixels radius. The weight is the product of a spatial
//! Gaussian on the offset and a range Gaussian on the colour difference.
//! For colour images the difference is the L1 distance over all three
//! channels, so all channels share one weight per neighbour.

use super::{saturate, Border};
use crate::buffer::PixelBuffer;

/// Apply a bilateral filter.
///
/// * `diameter` - window diameter in pixels (radius is `diameter / 2`)
/// * `sigma_color` - range sigma in intensity levels
/// * `sigma_space` - spatial sigma in pixels
pub fn bilateral(
    image: &PixelBuffer,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> PixelBuffer {
    let radius = (diameter / 2).max(1) as i64;
    let (w, h) = (image.width as usize, image.height as usize);
    let ch = image.channels();
    let border = Border::Reflect101;

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    // Window offsets and spatial weights, restricted to the inscribed circle.
    let mut window = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r = ((dx * dx + dy * dy) as f32).sqrt();
            if r <= radius as f32 {
                window.push((dx, dy, (r * r * space_coeff).exp()));
            }
        }
    }

    // Range weights indexed by the summed absolute difference.
    let max_diff = 255 * ch;
    let color_lut: Vec<f32> = (0..=max_diff)
        .map(|d| {
            let d = d as f32;
            (d * d * color_coeff).exp()
        })
        .collect();

    let mut output = vec![0u8; image.pixels.len()];
    let mut acc = [0f32; 3];

    for y in 0..h {
        for x in 0..w {
            let center = (y * w + x) * ch;
            let mut weight_sum = 0f32;
            acc[..ch].iter_mut().for_each(|v| *v = 0.0);

            for &(dx, dy, space_weight) in &window {
                let sx = border.resolve(x as i64 + dx, w);
                let sy = border.resolve(y as i64 + dy, h);
                let idx = (sy * w + sx) * ch;

                let diff: usize = (0..ch)
                    .map(|c| image.pixels[idx + c].abs_diff(image.pixels[center + c]) as usize)
                    .sum();
                let weight = space_weight * color_lut[diff];

                for (c, slot) in acc[..ch].iter_mut().enumerate() {
                    *slot += image.pixels[idx + c] as f32 * weight;
                }
                weight_sum += weight;
            }

            for (c, slot) in acc[..ch].iter().enumerate() {
                output[center + c] = saturate(slot / weight_sum);
            }
        }
    }

    PixelBuffer::new(image.width, image.height, image.layout, output)
}
