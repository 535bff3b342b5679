//! Error types for the Facet variant pipeline and renderer.
//!
//! Errors are organized by stage so every diagnostic names the file, the
//! stage and (for encoding) the exact variant that failed.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::VariantFormat;

/// Top-level error type for Facet operations.
#[derive(Error, Debug)]
pub enum FacetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Build-time pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Render-time manifest resolution errors
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Generator errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source bytes are not a readable raster image. Aborts that image only.
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// One (format, width) transcode failed. Other variants are unaffected.
    #[error("Encode error for {path} ({format} @ {width}w): {message}")]
    Encode {
        path: PathBuf,
        format: VariantFormat,
        width: u32,
        message: String,
    },

    /// Writing a generated file or manifest for `path` failed
    #[error("Write error for {path} -> {target}: {message}")]
    Write {
        path: PathBuf,
        target: PathBuf,
        message: String,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Source is not a png or jpeg
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl PipelineError {
    /// The source file this error belongs to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Decode { path, .. }
            | Self::Encode { path, .. }
            | Self::Write { path, .. }
            | Self::Timeout { path, .. }
            | Self::FileTooLarge { path, .. }
            | Self::ImageTooLarge { path, .. }
            | Self::UnsupportedFormat { path, .. } => path,
            Self::FileNotFound(path) => path,
        }
    }

    /// Whether this failure invalidated the whole source image
    /// (as opposed to a single variant of it).
    pub fn is_fatal_for_image(&self) -> bool {
        !matches!(self, Self::Encode { .. } | Self::Write { .. })
    }
}

/// Render-time errors obtaining a manifest for a symbolic reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The registry has no entry for this reference
    #[error("No manifest registered for '{0}'")]
    UnknownReference(String),

    /// The registered manifest location does not exist
    #[error("Manifest not found: {0}")]
    NotFound(PathBuf),

    /// Transport or I/O failure while loading
    #[error("Failed to load manifest for '{reference}': {message}")]
    Load { reference: String, message: String },

    /// The manifest could not be parsed
    #[error("Malformed manifest for '{reference}': {message}")]
    Parse { reference: String, message: String },
}

/// Convenience type alias for Facet results.
pub type Result<T> = std::result::Result<T, FacetError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
