//! Error types for editing operations.
//!
//! None of these are fatal: every operation that fails leaves the session in
//! its last known-good state.

use std::path::PathBuf;

use thiserror::Error;

use crate::params::Control;
use crate::pipeline::PipelineStep;
use crate::provider::SampleImage;

/// A rejected user input. Nothing is changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Resize input is not of the form `<width>x<height>`.
    #[error("Invalid size specified: {0:?}")]
    MalformedResize(String),

    /// Resize target covers more pixels than the engine will allocate.
    #[error("Requested size {width}x{height} exceeds {max_pixels} pixels")]
    ResizeTooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    /// Rotation increment is not a finite real number.
    #[error("Invalid rotation angle: {0:?}")]
    MalformedAngle(String),

    /// A control value lies outside its range.
    #[error("{control} value {value} is outside [{min}, {max}]")]
    OutOfRange {
        control: Control,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A stepped control value does not fall on a step.
    #[error("{control} value {value} is not a multiple of {step}")]
    OffStep { control: Control, value: i32, step: i32 },

    /// Edge detection and emboss were both requested.
    #[error("Edges and emboss cannot both be enabled")]
    ConflictingEffects,
}

/// Failure inside a single effect function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    /// The kernel reaches further than the image extends.
    #[error("{kernel}x{kernel} kernel does not fit a {width}x{height} image")]
    KernelTooLarge { kernel: u32, width: u32, height: u32 },

    /// Gaussian kernels must have an odd size.
    #[error("kernel size {0} must be odd")]
    EvenKernel(u32),

    /// A parameter outside what the effect can process.
    #[error("{0}")]
    InvalidParameter(String),

    /// The image buffer could not be handed to the `image` crate.
    #[error("image buffer rejected: {0}")]
    Buffer(String),
}

/// A pipeline step failed; the previously composed image is retained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{step} step failed: {source}")]
pub struct TransformError {
    pub step: PipelineStep,
    #[source]
    pub source: EffectError,
}

impl TransformError {
    pub fn new(step: PipelineStep, source: EffectError) -> Self {
        Self { step, source }
    }
}

/// The base image could not be obtained.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    /// Reading the file failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a decodable image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// No sample directory is configured or the sample file is missing.
    #[error("Sample image {0} is not available")]
    SampleUnavailable(SampleImage),

    /// The user dismissed the selection.
    #[error("Image selection cancelled")]
    Cancelled,
}

/// Umbrella error for session operations.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Load(#[from] ImageLoadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MalformedResize("100x".to_string());
        assert_eq!(err.to_string(), "Invalid size specified: \"100x\"");

        let err = ValidationError::OutOfRange {
            control: Control::Gamma,
            value: 2.5,
            min: 0.0,
            max: 2.0,
        };
        assert_eq!(err.to_string(), "gamma value 2.5 is outside [0, 2]");
    }

    #[test]
    fn test_transform_error_names_step() {
        let err = TransformError::new(
            PipelineStep::Blur,
            EffectError::KernelTooLarge {
                kernel: 11,
                width: 3,
                height: 3,
            },
        );
        assert_eq!(
            err.to_string(),
            "blur step failed: 11x11 kernel does not fit a 3x3 image"
        );
    }

    #[test]
    fn test_edit_error_is_transparent() {
        let err: EditError = ImageLoadError::Cancelled.into();
        assert_eq!(err.to_string(), "Image selection cancelled");
        assert!(matches!(err, EditError::Load(ImageLoadError::Cancelled)));
    }
}
