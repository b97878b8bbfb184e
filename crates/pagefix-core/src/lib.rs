//! Pagefix Core - document image adjustment pipeline
//!
//! This crate turns a photographed or scanned page into a clean, adjustable
//! image. Loading runs a one-time adaptive-threshold cleanup; after that
//! every parameter change recomputes the output from scratch through a
//! fixed chain of stages:
//!
//! ```text
//! source (baseline, or moire-removed pre-cleanup copy)
//!   → perspective → rotate → contrast → brightness → sharpen → blur → crop
//! ```
//!
//! [`Editor`] is the entry point. The individual stages are plain
//! functions in [`transform`], [`adjustments`] and [`cleanup`], usable on
//! their own.
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod adjustments;
pub mod buffer;
pub mod cleanup;
pub mod color;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod naming;
pub mod params;
pub mod pipeline;
pub mod transform;

pub use buffer::{ColorLayout, PixelBuffer};
pub use decode::{decode_image, DecodeError};
pub use encode::{encode_image, EncodeError, OutputFormat};
pub use params::{CornerOffsets, CropRect, Offset, ParamValue, Parameter, ParameterSet, ValidationError};
pub use pipeline::{
    Editor, EditorState, LoadError, PipelineError, RecomputeSource, SaveError, Stage,
};
