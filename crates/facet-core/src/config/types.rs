//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory that receives variant files, manifests and the registry
    pub output_dir: PathBuf,

    /// URL prefix prepended to every emitted path (e.g. "/static/")
    pub public_path: String,

    /// Sub-directory of `output_dir` holding variant files
    pub images_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./dist"),
            public_path: String::new(),
            images_dir: "images".to_string(),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of concurrent decode/transcode jobs
    pub parallel_workers: usize,

    /// Accepted source extensions
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: default_workers(),
            supported_formats: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

/// One job per core; encoding is CPU-bound.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 16384,
            decode_timeout_ms: 10000,
        }
    }
}

/// PNG compression effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// Resampling filter used for every resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Triangle => "triangle",
            Self::CatmullRom => "catmull_rom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        }
    }
}

impl From<ResampleFilter> for image::imageops::FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => Self::Nearest,
            ResampleFilter::Triangle => Self::Triangle,
            ResampleFilter::CatmullRom => Self::CatmullRom,
            ResampleFilter::Gaussian => Self::Gaussian,
            ResampleFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Variant generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantsConfig {
    /// Target widths; every eligible format is emitted at each one
    pub breakpoints: Vec<u32>,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// PNG compression effort
    pub png_compression: PngCompression,

    /// Resampling filter
    pub resample_filter: ResampleFilter,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            breakpoints: vec![300, 600, 1200, 2000],
            jpeg_quality: 85,
            png_compression: PngCompression::Default,
            resample_filter: ResampleFilter::Lanczos3,
        }
    }
}

/// Placeholder (low-resolution preview) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    /// Whether to embed a placeholder in each manifest
    pub enabled: bool,

    /// Placeholder width in pixels
    pub size: u32,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 20,
        }
    }
}

/// A viewport range mapped to a requested display width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    /// Inclusive upper bound of the viewport width, in CSS pixels
    pub max_viewport: u32,

    /// Display width requested for viewports in this range
    pub display: u32,
}

/// Render-time settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Ordered viewport rules, narrowest first
    pub display_sizes: Vec<DisplaySize>,

    /// Display width when no rule matches
    pub default_display: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            display_sizes: vec![
                DisplaySize {
                    max_viewport: 600,
                    display: 300,
                },
                DisplaySize {
                    max_viewport: 1200,
                    display: 600,
                },
            ],
            default_display: 1200,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
