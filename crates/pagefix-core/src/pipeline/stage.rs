//! The ordered stage list and the recompute fold.

use tracing::debug;

use crate::adjustments::{apply_blur, apply_brightness, apply_contrast, apply_sharpen};
use crate::buffer::PixelBuffer;
use crate::cleanup::remove_moire;
use crate::params::ParameterSet;
use crate::transform::{apply_crop, apply_perspective, apply_rotation};

/// Which buffer a recompute starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeSource {
    /// The cleaned single-channel baseline, used as is.
    Baseline,
    /// The pre-cleanup source, re-derived through moire removal.
    PreCleanup,
}

impl RecomputeSource {
    /// Pick the source selected by the moire toggle.
    pub fn for_params(params: &ParameterSet) -> Self {
        if params.moire_enabled {
            RecomputeSource::PreCleanup
        } else {
            RecomputeSource::Baseline
        }
    }

    /// Produce the starting buffer.
    pub fn start(self, baseline: &PixelBuffer, pre_cleanup: &PixelBuffer) -> PixelBuffer {
        match self {
            RecomputeSource::Baseline => baseline.clone(),
            RecomputeSource::PreCleanup => remove_moire(pre_cleanup),
        }
    }
}

/// One transform in the recompute chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Perspective,
    Rotate,
    Contrast,
    Brightness,
    Sharpen,
    Blur,
    Crop,
}

impl Stage {
    /// Evaluation order. Each stage consumes the previous stage's output.
    pub const ORDER: [Stage; 7] = [
        Stage::Perspective,
        Stage::Rotate,
        Stage::Contrast,
        Stage::Brightness,
        Stage::Sharpen,
        Stage::Blur,
        Stage::Crop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Perspective => "perspective",
            Stage::Rotate => "rotate",
            Stage::Contrast => "contrast",
            Stage::Brightness => "brightness",
            Stage::Sharpen => "sharpen",
            Stage::Blur => "blur",
            Stage::Crop => "crop",
        }
    }

    /// Whether this stage participates under `params`.
    ///
    /// Perspective and crop also need their toggle; every other stage runs
    /// whenever its value differs from neutral.
    pub fn is_active(self, params: &ParameterSet) -> bool {
        match self {
            Stage::Perspective => params.perspective_enabled && !params.offsets.is_zero(),
            Stage::Rotate => params.rotation != 0.0,
            Stage::Contrast => params.contrast != 1.0,
            Stage::Brightness => params.brightness != 0.0,
            Stage::Sharpen => params.sharpness > 0.0,
            Stage::Blur => params.blur_radius > 0,
            Stage::Crop => params.crop_enabled && !params.crop.is_full_frame(),
        }
    }

    /// Run the stage unconditionally.
    pub fn apply(self, image: &PixelBuffer, params: &ParameterSet) -> PixelBuffer {
        match self {
            Stage::Perspective => apply_perspective(image, &params.offsets),
            Stage::Rotate => apply_rotation(image, params.rotation),
            Stage::Contrast => apply_contrast(image, params.contrast),
            Stage::Brightness => apply_brightness(image, params.brightness),
            Stage::Sharpen => apply_sharpen(image, params.sharpness),
            Stage::Blur => apply_blur(image, params.blur_radius),
            Stage::Crop => apply_crop(image, &params.crop),
        }
    }
}

/// Fold `start` through every active stage in [`Stage::ORDER`].
pub fn run_stages(start: PixelBuffer, params: &ParameterSet) -> PixelBuffer {
    Stage::ORDER
        .into_iter()
        .filter(|stage| stage.is_active(params))
        .fold(start, |image, stage| {
            let out = stage.apply(&image, params);
            debug!(
                stage = stage.name(),
                width = out.width,
                height = out.height,
                "stage applied"
            );
            out
        })
}
