//! Camera orientation from EXIF metadata.
//!
//! Phones store pages sideways and record the fix in tag 0x0112; the pixels
//! are rotated upright before cleanup sees them.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::DynamicImage;

/// How the stored pixels must be turned to appear upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Upright,
    Mirrored,
    UpsideDown,
    MirroredUpsideDown,
    /// Mirrored along the top-left to bottom-right diagonal.
    Transposed,
    /// Needs a quarter turn clockwise.
    TurnedLeft,
    /// Mirrored along the other diagonal.
    Transversed,
    /// Needs a quarter turn counter-clockwise.
    TurnedRight,
}

impl Orientation {
    /// Map an EXIF orientation tag value. Values outside 1..=8 are treated
    /// as upright.
    pub fn from_tag(value: u32) -> Self {
        use Orientation::*;
        const BY_TAG: [Orientation; 8] = [
            Upright,
            Mirrored,
            UpsideDown,
            MirroredUpsideDown,
            Transposed,
            TurnedLeft,
            Transversed,
            TurnedRight,
        ];
        value
            .checked_sub(1)
            .and_then(|i| BY_TAG.get(i as usize).copied())
            .unwrap_or_default()
    }
}

/// Look up the orientation tag in any EXIF-bearing container.
///
/// No metadata, or metadata the reader rejects, counts as upright.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(_) => return Orientation::Upright,
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from_tag)
        .unwrap_or_default()
}

/// Turn a decoded image upright.
pub fn apply_orientation(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Upright => image,
        Orientation::Mirrored => image.fliph(),
        Orientation::UpsideDown => image.rotate180(),
        Orientation::MirroredUpsideDown => image.flipv(),
        Orientation::Transposed => image.rotate90().fliph(),
        Orientation::TurnedLeft => image.rotate90(),
        Orientation::Transversed => image.rotate270().fliph(),
        Orientation::TurnedRight => image.rotate270(),
    }
}
