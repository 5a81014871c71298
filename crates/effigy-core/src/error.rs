//! Error types for effigy.
//!
//! Descriptor handling never fails: malformed input is repaired field by
//! field. These errors only cover operations that touch the outside world.

use thiserror::Error;

/// The main error type for effigy operations.
#[derive(Error, Debug)]
pub enum EffigyError {
    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Image encoding error.
    #[error("image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    /// The requested export format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Raw pixel data did not match the stated dimensions.
    #[error("invalid image data: expected {expected} bytes, got {actual}")]
    InvalidImageData { expected: usize, actual: usize },

    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scene could not be uploaded to the GPU.
    #[error("GPU upload error: {0}")]
    GpuUpload(String),
}

/// A specialized Result type for effigy operations.
pub type Result<T> = std::result::Result<T, EffigyError>;
