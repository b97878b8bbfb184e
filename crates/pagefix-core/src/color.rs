//! Colour-space helpers: intensity conversion and 8-bit CIE L*a*b*.
//!
//! Intensity uses the ITU-R BT.601 weights, which is what document
//! scanners and the cleanup threshold are tuned against. The Lab
//! conversion packs each component into a byte (L scaled to 0..=255,
//! a/b offset by 128) so the denoise path can filter the lightness
//! plane with the same u8 kernels as everything else.

use crate::buffer::{ColorLayout, PixelBuffer};

/// ITU-R BT.601 coefficient for the red channel.
pub const GRAY_R: f32 = 0.299;

/// ITU-R BT.601 coefficient for the green channel.
pub const GRAY_G: f32 = 0.587;

/// ITU-R BT.601 coefficient for the blue channel.
pub const GRAY_B: f32 = 0.114;

// D65 reference white.
const WHITE_X: f32 = 0.950_456;
const WHITE_Z: f32 = 1.088_754;

const LAB_EPSILON: f32 = 0.008_856;
const LAB_KAPPA: f32 = 903.3;

/// Intensity of an RGB triple, rounded to the nearest level.
#[inline]
pub fn gray_u8(r: u8, g: u8, b: u8) -> u8 {
    let v = GRAY_R * r as f32 + GRAY_G * g as f32 + GRAY_B * b as f32;
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert a buffer to single-channel intensity.
///
/// Gray input is returned as a copy.
pub fn to_gray(image: &PixelBuffer) -> PixelBuffer {
    match image.layout {
        ColorLayout::Gray => image.clone(),
        ColorLayout::Rgb => {
            let pixels = image
                .pixels
                .chunks_exact(3)
                .map(|p| gray_u8(p[0], p[1], p[2]))
                .collect();
            PixelBuffer::new(image.width, image.height, ColorLayout::Gray, pixels)
        }
    }
}

/// Replicate a single-channel buffer into three identical channels.
///
/// Colour input is returned as a copy.
pub fn to_rgb(image: &PixelBuffer) -> PixelBuffer {
    match image.layout {
        ColorLayout::Rgb => image.clone(),
        ColorLayout::Gray => {
            let pixels = image.pixels.iter().flat_map(|&v| [v, v, v]).collect();
            PixelBuffer::new(image.width, image.height, ColorLayout::Rgb, pixels)
        }
    }
}

#[inline]
fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

#[inline]
fn lab_f_inv(f: f32) -> f32 {
    let t = f * f * f;
    if t > LAB_EPSILON {
        t
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert one RGB pixel to CIE L*a*b*: `L` in 0..=100, `a` and `b`
/// unbounded around zero.
pub fn rgb_to_lab(rgb: [u8; 3]) -> [f32; 3] {
    let r = srgb_to_linear(rgb[0] as f32 / 255.0);
    let g = srgb_to_linear(rgb[1] as f32 / 255.0);
    let b = srgb_to_linear(rgb[2] as f32 / 255.0);

    let x = (0.412_453 * r + 0.357_580 * g + 0.180_423 * b) / WHITE_X;
    let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
    let z = (0.019_334 * r + 0.119_193 * g + 0.950_227 * b) / WHITE_Z;

    let l = if y > LAB_EPSILON {
        116.0 * y.cbrt() - 16.0
    } else {
        LAB_KAPPA * y
    };
    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));

    [l, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert one RGB pixel to packed 8-bit Lab (`L * 255 / 100`, `a + 128`,
/// `b + 128`).
pub fn rgb_to_lab_u8(rgb: [u8; 3]) -> [u8; 3] {
    let [l, a, b] = rgb_to_lab(rgb);
    [to_byte(l * 255.0 / 100.0), to_byte(a + 128.0), to_byte(b + 128.0)]
}

/// Convert one packed 8-bit Lab pixel back to RGB.
pub fn lab_u8_to_rgb(lab: [u8; 3]) -> [u8; 3] {
    lab_to_rgb([
        lab[0] as f32 * 100.0 / 255.0,
        lab[1] as f32 - 128.0,
        lab[2] as f32 - 128.0,
    ])
}

/// Convert CIE L*a*b* back to RGB, clipping out-of-gamut values.
pub fn lab_to_rgb(lab: [f32; 3]) -> [u8; 3] {
    let [l, a, b] = lab;

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let y = if l > LAB_KAPPA * LAB_EPSILON {
        fy * fy * fy
    } else {
        l / LAB_KAPPA
    };
    let x = lab_f_inv(fx) * WHITE_X;
    let z = lab_f_inv(fz) * WHITE_Z;

    let r = 3.240_479 * x - 1.537_150 * y - 0.498_535 * z;
    let g = -0.969_256 * x + 1.875_992 * y + 0.041_556 * z;
    let bl = 0.055_648 * x - 0.204_043 * y + 1.057_311 * z;

    [
        to_byte(linear_to_srgb(r.clamp(0.0, 1.0)) * 255.0),
        to_byte(linear_to_srgb(g.clamp(0.0, 1.0)) * 255.0),
        to_byte(linear_to_srgb(bl.clamp(0.0, 1.0)) * 255.0),
    ]
}

/// Split a colour buffer into packed L, a and b planes.
///
/// Returns `None` for gray input.
pub fn split_lab(image: &PixelBuffer) -> Option<[PixelBuffer; 3]> {
    if image.layout != ColorLayout::Rgb {
        return None;
    }
    let n = image.pixel_count();
    let mut planes = [
        Vec::with_capacity(n),
        Vec::with_capacity(n),
        Vec::with_capacity(n),
    ];
    for p in image.pixels.chunks_exact(3) {
        let lab = rgb_to_lab_u8([p[0], p[1], p[2]]);
        for (plane, v) in planes.iter_mut().zip(lab) {
            plane.push(v);
        }
    }
    let [l, a, b] = planes;
    let plane = |data| PixelBuffer::new(image.width, image.height, ColorLayout::Gray, data);
    Some([plane(l), plane(a), plane(b)])
}

/// Merge packed L, a and b planes back into an RGB buffer.
pub fn merge_lab(l: &PixelBuffer, a: &PixelBuffer, b: &PixelBuffer) -> PixelBuffer {
    debug_assert_eq!(l.pixels.len(), a.pixels.len());
    debug_assert_eq!(l.pixels.len(), b.pixels.len());

    let pixels = l
        .pixels
        .iter()
        .zip(&a.pixels)
        .zip(&b.pixels)
        .flat_map(|((&lv, &av), &bv)| lab_u8_to_rgb([lv, av, bv]))
        .collect();
    PixelBuffer::new(l.width, l.height, ColorLayout::Rgb, pixels)
}
