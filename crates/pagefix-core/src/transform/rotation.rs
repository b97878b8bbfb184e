//! Image rotation about the center with canvas growth.
//!
//! The forward transform rotates around the integer center
//! `(width / 2, height / 2)`, then translates so the rotated content is
//! centered on a canvas just large enough to hold every corner:
//!
//! ```text
//! new_w = round(h * |sin θ| + w * |cos θ|)
//! new_h = round(h * |cos θ| + w * |sin θ|)
//! ```
//!
//! Pixels are resampled bilinearly and any exposed border is flat white.
//! Positive angles rotate counter-clockwise as seen on screen.

use nalgebra::Matrix3;
use tracing::debug;

use super::warp::warp;
use crate::buffer::PixelBuffer;

/// Rotation part of the forward transform: `(cos θ, sin θ)`.
#[inline]
fn rotation_terms(angle_degrees: f64) -> (f64, f64) {
    let angle_rad = angle_degrees.to_radians();
    (angle_rad.cos(), angle_rad.sin())
}

/// Canvas that holds a `width`×`height` page turned by `angle_degrees`.
/// Never smaller than 1×1.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let (cos, sin) = rotation_terms(angle_degrees);
    let (cos, sin) = (cos.abs(), sin.abs());
    let (w, h) = (width as f64, height as f64);

    let new_w = (h * sin + w * cos).round() as u32;
    let new_h = (h * cos + w * sin).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Forward (source to destination) transform for a rotation onto a
/// canvas of `dst_w`×`dst_h`.
pub fn rotation_matrix(
    width: u32,
    height: u32,
    angle_degrees: f64,
    dst_w: u32,
    dst_h: u32,
) -> Matrix3<f64> {
    let (alpha, beta) = rotation_terms(angle_degrees);
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;

    let tx = (1.0 - alpha) * cx - beta * cy + (dst_w as f64 / 2.0 - cx);
    let ty = beta * cx + (1.0 - alpha) * cy + (dst_h as f64 / 2.0 - cy);

    Matrix3::new(alpha, beta, tx, -beta, alpha, ty, 0.0, 0.0, 1.0)
}

/// Rotate an image about its center.
///
/// An angle of exactly zero returns an unchanged copy. Otherwise the
/// output canvas is expanded to fit the whole rotated image.
pub fn apply_rotation(image: &PixelBuffer, angle_degrees: f64) -> PixelBuffer {
    if angle_degrees == 0.0 {
        return image.clone();
    }

    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, angle_degrees);
    let forward = rotation_matrix(image.width, image.height, angle_degrees, dst_w, dst_h);
    debug!(angle_degrees, dst_w, dst_h, "rotating");

    // A rotation matrix always has determinant 1.
    warp(image, &forward, dst_w, dst_h).unwrap_or_else(|| image.clone())
}
