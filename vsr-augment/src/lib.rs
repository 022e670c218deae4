//! Data augmentation transforms for video restoration training samples.
//!
//! A [Sample](sample::Sample) is a keyed record of images and metadata.
//! Transforms are configured by `…Init` structs, built into immutable
//! transforms and composed into a [Pipeline](pipeline::Pipeline). Every
//! random decision is drawn from a caller-provided generator.

mod common;
pub mod error;
pub mod ops;
pub mod pipeline;
pub mod processor;
pub mod ratio;
pub mod sample;
pub mod utils;

pub use error::{Result, TransformError};
pub use pipeline::{Pipeline, PipelineInit, Transform, TransformInit};
pub use sample::{Sample, Value};
