//! The adjustable parameter set and its validation.
//!
//! Every field is independent and can be changed at any time. Numeric
//! values are checked against their documented ranges before anything is
//! written, so a rejected update always leaves the previous value in place.
//!
//! | Parameter          | Default | Range          |
//! |--------------------|---------|----------------|
//! | contrast           | 1.0     | 0 to 2         |
//! | brightness         | 0       | -100 to 100    |
//! | sharpness          | 0       | 0 to 1         |
//! | blur_radius        | 0       | 0 to 20 (int)  |
//! | rotation           | 0       | -180 to 180    |
//! | corner offsets x/y | 0       | -1 to 1        |
//! | crop edges         | 0,0,1,1 | 0 to 1         |
//!
//! The three toggles (`moire_enabled`, `perspective_enabled`,
//! `crop_enabled`) gate their stages regardless of the numeric values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a parameter update is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The name does not match any parameter.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// The value lies outside the parameter's documented range.
    #[error("{parameter} must be between {min} and {max}, got {value}")]
    OutOfRange {
        parameter: Parameter,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The value is NaN or infinite.
    #[error("{parameter} must be a finite number")]
    NotFinite { parameter: Parameter },

    /// The parameter only accepts whole numbers.
    #[error("{parameter} must be a whole number, got {value}")]
    NotInteger { parameter: Parameter, value: f64 },

    /// A toggle was given a number or a number was given a toggle.
    #[error("{parameter} expects a {expected} value")]
    WrongKind {
        parameter: Parameter,
        expected: &'static str,
    },

    /// The textual value could not be parsed.
    #[error("Invalid value for {parameter}: {input}")]
    Unparseable { parameter: Parameter, input: String },
}

/// A value for [`ParameterSet::set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Toggle(bool),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Toggle(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Toggle(v) => write!(f, "{}", v),
        }
    }
}

/// Displacement of one image corner, as fractions of half the image
/// width (`x`) and height (`y`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    /// Check whether both components are zero.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Offsets for the four corners used by the perspective warp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerOffsets {
    pub top_left: Offset,
    pub top_right: Offset,
    pub bottom_left: Offset,
    pub bottom_right: Offset,
}

impl CornerOffsets {
    /// Corners in top-left, top-right, bottom-left, bottom-right order.
    pub fn as_array(&self) -> [Offset; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Check whether every offset is zero.
    pub fn is_zero(&self) -> bool {
        self.as_array().iter().all(Offset::is_zero)
    }
}

/// Crop rectangle as fractions of the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for CropRect {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: 1.0,
            bottom: 1.0,
        }
    }
}

impl CropRect {
    /// Check whether the rectangle covers the whole frame.
    pub fn is_full_frame(&self) -> bool {
        self.left <= 0.0 && self.top <= 0.0 && self.right >= 1.0 && self.bottom >= 1.0
    }
}

/// The full set of adjustable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Contrast scale factor (0 to 2, 1 = unchanged)
    pub contrast: f64,
    /// Brightness offset (-100 to 100), scaled by 2.55 to sample levels
    pub brightness: f64,
    /// Sharpening blend weight (0 to 1)
    pub sharpness: f64,
    /// Gaussian blur radius in pixels (0 to 20)
    pub blur_radius: u32,
    /// Rotation in degrees (-180 to 180, positive = counter-clockwise)
    pub rotation: f64,
    /// Perspective corner offsets
    pub offsets: CornerOffsets,
    /// Crop rectangle
    pub crop: CropRect,
    /// Start from a moire-free re-derivation of the source
    pub moire_enabled: bool,
    /// Apply the perspective warp
    pub perspective_enabled: bool,
    /// Apply the crop
    pub crop_enabled: bool,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            brightness: 0.0,
            sharpness: 0.0,
            blur_radius: 0,
            rotation: 0.0,
            offsets: CornerOffsets::default(),
            crop: CropRect::default(),
            moire_enabled: false,
            perspective_enabled: false,
            crop_enabled: false,
        }
    }
}

/// Names of every settable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Contrast,
    Brightness,
    Sharpness,
    BlurRadius,
    Rotation,
    TopLeftX,
    TopLeftY,
    TopRightX,
    TopRightY,
    BottomLeftX,
    BottomLeftY,
    BottomRightX,
    BottomRightY,
    CropLeft,
    CropTop,
    CropRight,
    CropBottom,
    MoireEnabled,
    PerspectiveEnabled,
    CropEnabled,
}

impl Parameter {
    /// Every parameter, in display order.
    pub const ALL: [Parameter; 20] = [
        Parameter::Contrast,
        Parameter::Brightness,
        Parameter::Sharpness,
        Parameter::BlurRadius,
        Parameter::Rotation,
        Parameter::TopLeftX,
        Parameter::TopLeftY,
        Parameter::TopRightX,
        Parameter::TopRightY,
        Parameter::BottomLeftX,
        Parameter::BottomLeftY,
        Parameter::BottomRightX,
        Parameter::BottomRightY,
        Parameter::CropLeft,
        Parameter::CropTop,
        Parameter::CropRight,
        Parameter::CropBottom,
        Parameter::MoireEnabled,
        Parameter::PerspectiveEnabled,
        Parameter::CropEnabled,
    ];

    /// The snake_case name used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Parameter::Contrast => "contrast",
            Parameter::Brightness => "brightness",
            Parameter::Sharpness => "sharpness",
            Parameter::BlurRadius => "blur_radius",
            Parameter::Rotation => "rotation",
            Parameter::TopLeftX => "top_left_x",
            Parameter::TopLeftY => "top_left_y",
            Parameter::TopRightX => "top_right_x",
            Parameter::TopRightY => "top_right_y",
            Parameter::BottomLeftX => "bottom_left_x",
            Parameter::BottomLeftY => "bottom_left_y",
            Parameter::BottomRightX => "bottom_right_x",
            Parameter::BottomRightY => "bottom_right_y",
            Parameter::CropLeft => "crop_left",
            Parameter::CropTop => "crop_top",
            Parameter::CropRight => "crop_right",
            Parameter::CropBottom => "crop_bottom",
            Parameter::MoireEnabled => "moire_enabled",
            Parameter::PerspectiveEnabled => "perspective_enabled",
            Parameter::CropEnabled => "crop_enabled",
        }
    }

    /// Check whether this parameter is a boolean toggle.
    pub fn is_toggle(self) -> bool {
        matches!(
            self,
            Parameter::MoireEnabled | Parameter::PerspectiveEnabled | Parameter::CropEnabled
        )
    }

    /// Inclusive `(min, max)` range for numeric parameters.
    pub fn range(self) -> Option<(f64, f64)> {
        use Parameter::*;
        match self {
            Contrast => Some((0.0, 2.0)),
            Brightness => Some((-100.0, 100.0)),
            Sharpness => Some((0.0, 1.0)),
            BlurRadius => Some((0.0, 20.0)),
            Rotation => Some((-180.0, 180.0)),
            TopLeftX | TopLeftY | TopRightX | TopRightY | BottomLeftX | BottomLeftY
            | BottomRightX | BottomRightY => Some((-1.0, 1.0)),
            CropLeft | CropTop | CropRight | CropBottom => Some((0.0, 1.0)),
            MoireEnabled | PerspectiveEnabled | CropEnabled => None,
        }
    }

    /// Check a value without applying it.
    pub fn check(self, value: ParamValue) -> Result<(), ValidationError> {
        match (self.range(), value) {
            (None, ParamValue::Toggle(_)) => Ok(()),
            (None, ParamValue::Number(_)) => Err(ValidationError::WrongKind {
                parameter: self,
                expected: "boolean",
            }),
            (Some(_), ParamValue::Toggle(_)) => Err(ValidationError::WrongKind {
                parameter: self,
                expected: "numeric",
            }),
            (Some((min, max)), ParamValue::Number(v)) => {
                if !v.is_finite() {
                    return Err(ValidationError::NotFinite { parameter: self });
                }
                if v < min || v > max {
                    return Err(ValidationError::OutOfRange {
                        parameter: self,
                        value: v,
                        min,
                        max,
                    });
                }
                if self == Parameter::BlurRadius && v.fract() != 0.0 {
                    return Err(ValidationError::NotInteger {
                        parameter: self,
                        value: v,
                    });
                }
                Ok(())
            }
        }
    }

    /// Parse a textual value of the right kind for this parameter.
    ///
    /// Toggles accept `true`/`false`, `on`/`off` and `1`/`0`.
    pub fn parse_value(self, input: &str) -> Result<ParamValue, ValidationError> {
        let trimmed = input.trim();
        let unparseable = || ValidationError::Unparseable {
            parameter: self,
            input: input.to_string(),
        };

        if self.is_toggle() {
            match trimmed.to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => Ok(ParamValue::Toggle(true)),
                "false" | "off" | "0" => Ok(ParamValue::Toggle(false)),
                _ => Err(unparseable()),
            }
        } else {
            trimmed
                .parse::<f64>()
                .map(ParamValue::Number)
                .map_err(|_| unparseable())
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Parameter::ALL
            .into_iter()
            .find(|p| p.name() == key)
            .ok_or_else(|| ValidationError::UnknownParameter(key.to_string()))
    }
}

impl ParameterSet {
    /// Create a parameter set with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Read the current value of one parameter.
    pub fn get(&self, parameter: Parameter) -> ParamValue {
        use Parameter::*;
        match parameter {
            Contrast => self.contrast.into(),
            Brightness => self.brightness.into(),
            Sharpness => self.sharpness.into(),
            BlurRadius => (self.blur_radius as f64).into(),
            Rotation => self.rotation.into(),
            TopLeftX => self.offsets.top_left.x.into(),
            TopLeftY => self.offsets.top_left.y.into(),
            TopRightX => self.offsets.top_right.x.into(),
            TopRightY => self.offsets.top_right.y.into(),
            BottomLeftX => self.offsets.bottom_left.x.into(),
            BottomLeftY => self.offsets.bottom_left.y.into(),
            BottomRightX => self.offsets.bottom_right.x.into(),
            BottomRightY => self.offsets.bottom_right.y.into(),
            CropLeft => self.crop.left.into(),
            CropTop => self.crop.top.into(),
            CropRight => self.crop.right.into(),
            CropBottom => self.crop.bottom.into(),
            MoireEnabled => self.moire_enabled.into(),
            PerspectiveEnabled => self.perspective_enabled.into(),
            CropEnabled => self.crop_enabled.into(),
        }
    }

    /// Validate and apply one update. On error nothing changes.
    pub fn set(&mut self, parameter: Parameter, value: ParamValue) -> Result<(), ValidationError> {
        parameter.check(value)?;

        match value {
            ParamValue::Toggle(on) => {
                if let Some(slot) = self.toggle_mut(parameter) {
                    *slot = on;
                }
            }
            ParamValue::Number(v) if parameter == Parameter::BlurRadius => {
                self.blur_radius = v as u32;
            }
            ParamValue::Number(v) => {
                if let Some(slot) = self.number_mut(parameter) {
                    *slot = v;
                }
            }
        }
        Ok(())
    }

    fn toggle_mut(&mut self, parameter: Parameter) -> Option<&mut bool> {
        match parameter {
            Parameter::MoireEnabled => Some(&mut self.moire_enabled),
            Parameter::PerspectiveEnabled => Some(&mut self.perspective_enabled),
            Parameter::CropEnabled => Some(&mut self.crop_enabled),
            _ => None,
        }
    }

    fn number_mut(&mut self, parameter: Parameter) -> Option<&mut f64> {
        use Parameter::*;
        let slot = match parameter {
            Contrast => &mut self.contrast,
            Brightness => &mut self.brightness,
            Sharpness => &mut self.sharpness,
            Rotation => &mut self.rotation,
            TopLeftX => &mut self.offsets.top_left.x,
            TopLeftY => &mut self.offsets.top_left.y,
            TopRightX => &mut self.offsets.top_right.x,
            TopRightY => &mut self.offsets.top_right.y,
            BottomLeftX => &mut self.offsets.bottom_left.x,
            BottomLeftY => &mut self.offsets.bottom_left.y,
            BottomRightX => &mut self.offsets.bottom_right.x,
            BottomRightY => &mut self.offsets.bottom_right.y,
            CropLeft => &mut self.crop.left,
            CropTop => &mut self.crop.top,
            CropRight => &mut self.crop.right,
            CropBottom => &mut self.crop.bottom,
            BlurRadius | MoireEnabled | PerspectiveEnabled | CropEnabled => return None,
        };
        Some(slot)
    }

    /// Check every field, e.g. after loading a set from a config file.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Parameter::ALL
            .into_iter()
            .try_for_each(|p| p.check(self.get(p)))
    }
}
