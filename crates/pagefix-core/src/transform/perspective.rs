//! Four-corner perspective warp.
//!
//! Each image corner can be pushed by an offset expressed as a fraction of
//! half the image width (x) or half the image height (y). The projective
//! transform taking the original corners to the pushed ones is solved
//! directly, and the output canvas is the bounding box of the pushed
//! corners, translated so its top-left lands on the origin.

use nalgebra::{Matrix3, SMatrix, SVector};
use tracing::{debug, warn};

use super::warp::warp;
use crate::buffer::PixelBuffer;
use crate::params::CornerOffsets;

/// A point in pixel coordinates.
pub type Point = (f64, f64);

/// Solve the homography mapping each `src[i]` onto `dst[i]`.
///
/// Returns `None` if the four correspondences are degenerate
/// (e.g. three collinear points).
pub fn perspective_transform(src: &[Point; 4], dst: &[Point; 4]) -> Option<Matrix3<f64>> {
    if has_collinear_triple(src) || has_collinear_triple(dst) {
        return None;
    }

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (i, (&(x, y), &(u, v))) in src.iter().zip(dst).enumerate() {
        let r = 2 * i;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -x * u;
        a[(r, 7)] = -y * u;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -x * v;
        a[(r + 1, 7)] = -y * v;
        b[r + 1] = v;
    }

    let h = a.lu().solve(&b)?;
    if h.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0))
}

/// True if any three of the four points lie on one line.
fn has_collinear_triple(points: &[Point; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

    TRIPLES.iter().any(|&[i, j, k]| {
        let (a, b, c) = (points[i], points[j], points[k]);
        let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
        cross.abs() < 1e-9
    })
}

/// Image corners in top-left, top-right, bottom-left, bottom-right order.
pub fn source_corners(width: u32, height: u32) -> [Point; 4] {
    let right = width as f64 - 1.0;
    let bottom = height as f64 - 1.0;
    [(0.0, 0.0), (right, 0.0), (0.0, bottom), (right, bottom)]
}

/// Corners after applying `offsets`, in the same order as [`source_corners`].
pub fn destination_corners(width: u32, height: u32, offsets: &CornerOffsets) -> [Point; 4] {
    let scale_x = width as f64 * 0.5;
    let scale_y = height as f64 * 0.5;
    let src = source_corners(width, height);

    let mut dst = src;
    for (point, offset) in dst.iter_mut().zip(offsets.as_array()) {
        point.0 += offset.x * scale_x;
        point.1 += offset.y * scale_y;
    }
    dst
}

/// Apply a four-corner perspective warp.
///
/// All-zero offsets return an unchanged copy. Collapsed corners that make
/// the transform singular also leave the image unchanged.
pub fn apply_perspective(image: &PixelBuffer, offsets: &CornerOffsets) -> PixelBuffer {
    if offsets.is_zero() {
        return image.clone();
    }

    let src = source_corners(image.width, image.height);
    let dst = destination_corners(image.width, image.height, offsets);

    let Some(homography) = perspective_transform(&src, &dst) else {
        warn!(?dst, "perspective corners are degenerate; leaving image unchanged");
        return image.clone();
    };

    let (min_x, max_x) = dst
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
    let (min_y, max_y) = dst
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));

    // Truncate like the bounding box of integer pixel corners, but never collapse.
    let dst_w = ((max_x - min_x) as u32).max(1);
    let dst_h = ((max_y - min_y) as u32).max(1);

    let translate = Matrix3::new(1.0, 0.0, -min_x, 0.0, 1.0, -min_y, 0.0, 0.0, 1.0);
    let forward = translate * homography;
    debug!(dst_w, dst_h, "warping perspective");

    match warp(image, &forward, dst_w, dst_h) {
        Some(out) => out,
        None => {
            warn!("perspective transform is not invertible; leaving image unchanged");
            image.clone()
        }
    }
}
