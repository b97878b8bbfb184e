//! The editing session: load, adjust, recompute, save.
//!
//! An [`Editor`] owns the parameter set and, once an image is loaded, the
//! two source buffers every recompute starts from:
//!
//! - the **pre-cleanup** image exactly as decoded, used only by the moire
//!   path
//! - the **baseline**, a single-channel cleaned copy built once at load
//!
//! Every recompute starts over from one of them and folds through
//! [`Stage::ORDER`]; the previous output is never an input. The editor is
//! synchronous and holds no interior mutability, so hosts that add threads
//! must serialize calls themselves.
//!
//! # State
//!
//! ```text
//! Empty ──load──► Loaded ──set_parameter / recompute / reset──► Loaded
//!                   ▲                                              │
//!                   └──────────────────load────────────────────────┘
//! ```
//!
//! A failed load leaves the editor exactly as it was. Parameters survive
//! loads until [`Editor::reset`] is called.

mod stage;

pub use stage::{run_stages, RecomputeSource, Stage};

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::buffer::PixelBuffer;
use crate::cleanup::cleanup;
use crate::decode::{decode_image, DecodeError};
use crate::encode::{encode_image, EncodeError};
use crate::naming::{default_save_name, resolve_save_name};
use crate::params::{ParamValue, Parameter, ParameterSet, ValidationError};

/// Errors raised while loading an image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors raised by recompute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("No image loaded")]
    NoImage,
}

/// Errors raised while saving the output.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("No image loaded")]
    NoImage,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether the editor has an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Empty,
    Loaded,
}

/// Buffers belonging to one loaded image.
#[derive(Debug, Clone)]
struct Session {
    pre_cleanup: PixelBuffer,
    baseline: PixelBuffer,
    output: PixelBuffer,
    source_path: Option<PathBuf>,
}

/// A non-destructive editing session over one image at a time.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    params: ParameterSet,
    session: Option<Session>,
}

impl Editor {
    /// Create an empty editor with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty editor with a starting parameter set.
    pub fn with_parameters(params: ParameterSet) -> Result<Self, ValidationError> {
        params.validate()?;
        Ok(Self {
            params,
            session: None,
        })
    }

    pub fn state(&self) -> EditorState {
        match self.session {
            Some(_) => EditorState::Loaded,
            None => EditorState::Empty,
        }
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// The last recomputed output, if an image is loaded.
    pub fn output(&self) -> Option<&PixelBuffer> {
        self.session.as_ref().map(|s| &s.output)
    }

    /// The cleaned single-channel baseline, if an image is loaded.
    pub fn baseline(&self) -> Option<&PixelBuffer> {
        self.session.as_ref().map(|s| &s.baseline)
    }

    /// The image as decoded, before cleanup.
    pub fn pre_cleanup(&self) -> Option<&PixelBuffer> {
        self.session.as_ref().map(|s| &s.pre_cleanup)
    }

    /// Decode `bytes` and start a new session.
    ///
    /// On error nothing changes.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let image = decode_image(bytes)?;
        self.install(image, None);
        Ok(())
    }

    /// Read and decode a file, remembering its name for save suggestions.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load_path(&mut self, path: &Path) -> Result<(), LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decode_image(&bytes)?;
        self.install(image, Some(path.to_path_buf()));
        Ok(())
    }

    /// Start a new session from an already decoded buffer.
    pub fn load_buffer(&mut self, image: PixelBuffer) {
        self.install(image, None);
    }

    #[instrument(skip_all, fields(width = image.width, height = image.height))]
    fn install(&mut self, image: PixelBuffer, source_path: Option<PathBuf>) {
        let baseline = cleanup(&image);
        let output = render(&self.params, &baseline, &image);
        info!(
            layout = ?image.layout,
            out_width = output.width,
            out_height = output.height,
            "image loaded"
        );
        self.session = Some(Session {
            pre_cleanup: image,
            baseline,
            output,
            source_path,
        });
    }

    /// Validate and apply one parameter, then recompute if loaded.
    ///
    /// A rejected value leaves both the parameters and the output as they
    /// were.
    pub fn set_parameter(
        &mut self,
        parameter: Parameter,
        value: impl Into<ParamValue>,
    ) -> Result<(), ValidationError> {
        let value = value.into();
        if let Err(err) = self.params.set(parameter, value) {
            warn!(%parameter, %value, %err, "parameter rejected");
            return Err(err);
        }
        debug!(%parameter, %value, "parameter set");
        self.refresh();
        Ok(())
    }

    /// Replace the whole parameter set after validating it.
    pub fn set_parameters(&mut self, params: ParameterSet) -> Result<(), ValidationError> {
        params.validate()?;
        self.params = params;
        self.refresh();
        Ok(())
    }

    /// Re-render the output of a loaded session; an empty editor only keeps
    /// its parameters.
    fn refresh(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.output = render(&self.params, &session.baseline, &session.pre_cleanup);
        }
    }

    /// Run the pipeline from scratch and return the new output.
    #[instrument(skip(self))]
    pub fn recompute(&mut self) -> Result<&PixelBuffer, PipelineError> {
        let session = self.session.as_mut().ok_or(PipelineError::NoImage)?;
        session.output = render(&self.params, &session.baseline, &session.pre_cleanup);
        Ok(&session.output)
    }

    /// Restore every parameter to its default; the output becomes the
    /// baseline.
    pub fn reset(&mut self) {
        self.params = ParameterSet::default();
        if let Some(session) = &mut self.session {
            session.output = session.baseline.clone();
        }
        info!("parameters reset");
    }

    /// Suggested file name for the current session.
    pub fn suggested_save_name(&self, timestamp: &NaiveDateTime) -> String {
        let original = self.session.as_ref().and_then(|s| s.source_path.as_deref());
        default_save_name(original, timestamp)
    }

    /// Encode the output and write it next to `chosen`, returning the
    /// path actually written.
    ///
    /// The final name gets a timestamp suffix unless it has one already,
    /// and unknown extensions become `.png`. On error the output stays
    /// available for another attempt.
    #[instrument(skip_all, fields(chosen = %chosen.display()))]
    pub fn save(&self, chosen: &Path, timestamp: &NaiveDateTime) -> Result<PathBuf, SaveError> {
        let output = self.output().ok_or(SaveError::NoImage)?;
        let (path, format) = resolve_save_name(chosen, timestamp);

        let bytes = encode_image(output, format)?;
        std::fs::write(&path, &bytes).map_err(|source| SaveError::Io {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), ?format, size = bytes.len(), "saved");
        Ok(path)
    }
}

/// Pick the start buffer for `params` and fold it through every stage.
fn render(params: &ParameterSet, baseline: &PixelBuffer, pre_cleanup: &PixelBuffer) -> PixelBuffer {
    let source = RecomputeSource::for_params(params);
    debug!(?source, "recompute");
    run_stages(source.start(baseline, pre_cleanup), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ColorLayout;

    /// Light page with a dark bar, as colour.
    fn page() -> PixelBuffer {
        let mut img = PixelBuffer::filled(40, 30, ColorLayout::Rgb, 225);
        for y in 12..16 {
            for x in 5..35 {
                let i = img.index(x, y);
                img.pixels[i..i + 3].copy_from_slice(&[30, 30, 30]);
            }
        }
        img
    }

    #[test]
    fn test_new_editor_is_empty() {
        let mut editor = Editor::new();
        assert_eq!(editor.state(), EditorState::Empty);
        assert!(editor.output().is_none());
        assert_eq!(editor.recompute().unwrap_err(), PipelineError::NoImage);
    }

    #[test]
    fn test_load_builds_gray_baseline() {
        let mut editor = Editor::new();
        editor.load_buffer(page());

        assert_eq!(editor.state(), EditorState::Loaded);
        let baseline = editor.baseline().unwrap();
        assert_eq!(baseline.layout, ColorLayout::Gray);
        assert_eq!(baseline.sample(0, 0, 0), 255);
        assert_eq!(baseline.sample(10, 13, 0), 30);
        assert_eq!(editor.output(), Some(baseline));
        assert_eq!(editor.pre_cleanup(), Some(&page()));
    }

    #[test]
    fn test_failed_load_keeps_session() {
        let mut editor = Editor::new();
        editor.load_buffer(page());
        let before = editor.output().cloned();

        assert!(editor.load(b"definitely not an image").is_err());
        assert_eq!(editor.state(), EditorState::Loaded);
        assert_eq!(editor.output().cloned(), before);
    }

    #[test]
    fn test_set_parameter_before_load() {
        let mut editor = Editor::new();
        editor.set_parameter(Parameter::Rotation, 90.0).unwrap();
        editor.load_buffer(page());

        let out = editor.output().unwrap();
        assert_eq!((out.width, out.height), (30, 40));
    }

    #[test]
    fn test_accepted_parameter_rerenders_output() {
        let mut editor = Editor::new();
        editor.load_buffer(page());

        editor.set_parameter(Parameter::Rotation, 90.0).unwrap();
        let out = editor.output().unwrap();
        assert_eq!((out.width, out.height), (30, 40));

        let mut params = ParameterSet::default();
        params.brightness = -40.0;
        editor.set_parameters(params).unwrap();
        let out = editor.output().unwrap();
        assert_eq!((out.width, out.height), (40, 30));
        // 255 - 102
        assert_eq!(out.sample(0, 0, 0), 153);
    }

    #[test]
    fn test_rejected_parameter_keeps_output() {
        let mut editor = Editor::new();
        editor.load_buffer(page());
        editor.set_parameter(Parameter::Brightness, 10.0).unwrap();
        let before = editor.output().cloned();

        assert!(editor.set_parameter(Parameter::Brightness, 500.0).is_err());
        assert_eq!(editor.parameters().brightness, 10.0);
        assert_eq!(editor.output().cloned(), before);
    }

    #[test]
    fn test_moire_path_returns_colour() {
        let mut editor = Editor::new();
        editor.load_buffer(page());
        editor.set_parameter(Parameter::MoireEnabled, true).unwrap();

        let out = editor.recompute().unwrap();
        assert_eq!(out.layout, ColorLayout::Rgb);
        assert_eq!((out.width, out.height), (40, 30));
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut editor = Editor::new();
        editor.load_buffer(page());
        editor.set_parameter(Parameter::Contrast, 1.7).unwrap();
        editor.set_parameter(Parameter::CropEnabled, true).unwrap();
        editor.set_parameter(Parameter::CropRight, 0.5).unwrap();

        editor.reset();

        assert!(editor.parameters().is_default());
        assert_eq!(editor.output(), editor.baseline());
        let recomputed = editor.recompute().unwrap().clone();
        assert_eq!(Some(&recomputed), editor.baseline());
    }

    #[test]
    fn test_set_parameters_validates_whole_set() {
        let mut editor = Editor::new();
        let mut params = ParameterSet::default();
        params.sharpness = 3.0;
        assert!(editor.set_parameters(params).is_err());
        assert!(editor.parameters().is_default());
    }

    #[test]
    fn test_save_without_image() {
        let editor = Editor::new();
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(matches!(
            editor.save(Path::new("out.png"), &ts),
            Err(SaveError::NoImage)
        ));
    }
}
