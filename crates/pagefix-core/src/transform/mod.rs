//! Geometry operations: perspective warp, rotation and cropping.
//!
//! Every operation is a pure function from an input buffer to a new
//! buffer; none of them mutate their input.
//!
//! # Coordinate System
//!
//! - Origin is the top-left pixel, x grows right, y grows down
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Corner offsets are fractions of half the image width/height
//! - Crop edges are fractions (0.0 to 1.0) of the current image size
//!
//! Rotation and perspective grow the canvas to fit the transformed image
//! and fill exposed areas with white.

mod crop;
mod perspective;
mod rotation;
mod warp;

pub use crop::{apply_crop, crop_bounds};
pub use perspective::{
    apply_perspective, destination_corners, perspective_transform, source_corners, Point,
};
pub use rotation::{apply_rotation, compute_rotated_bounds, rotation_matrix};
pub use warp::{warp, BORDER_VALUE};
