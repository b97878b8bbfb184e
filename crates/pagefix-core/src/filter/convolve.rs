//! General 3×3 correlation filter.

use super::{saturate, Border};
use crate::buffer::PixelBuffer;

/// Correlate every channel with a row-major 3×3 `kernel` anchored at its center.
pub fn convolve3x3(image: &PixelBuffer, kernel: &[[f32; 3]; 3]) -> PixelBuffer {
    let (w, h) = (image.width as usize, image.height as usize);
    let ch = image.channels();
    let border = Border::Reflect101;
    let mut output = vec![0u8; image.pixels.len()];

    for y in 0..h {
        let rows = [
            border.resolve(y as i64 - 1, h),
            y,
            border.resolve(y as i64 + 1, h),
        ];
        for x in 0..w {
            let cols = [
                border.resolve(x as i64 - 1, w),
                x,
                border.resolve(x as i64 + 1, w),
            ];
            for c in 0..ch {
                let mut acc = 0f32;
                for (ky, &sy) in rows.iter().enumerate() {
                    for (kx, &sx) in cols.iter().enumerate() {
                        acc += image.pixels[(sy * w + sx) * ch + c] as f32 * kernel[ky][kx];
                    }
                }
                output[(y * w + x) * ch + c] = saturate(acc);
            }
        }
    }

    PixelBuffer::new(image.width, image.height, image.layout, output)
}
