//! Core data types shared by the generator and the renderer.
//!
//! The [`Manifest`] is the only artifact that crosses from build time to
//! render time. The renderer never looks at source pixels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PipelineError;

/// An output encoding for generated variants.
///
/// Declaration order is the order variants appear in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantFormat {
    Webp,
    Png,
    Jpeg,
}

impl VariantFormat {
    /// Every format the generator knows how to emit.
    pub const ALL: [VariantFormat; 3] = [Self::Webp, Self::Png, Self::Jpeg];

    /// File extension used in generated file names.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// IANA media type.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Stable lowercase name, also used as hash input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for VariantFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One generated asset: a resized, re-encoded copy of a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Public, content-addressed path (`<public_path><images_dir>/<name>-<width>-<hash8>.<ext>`)
    pub path: String,

    /// Pixel width; always one of the configured breakpoints
    pub width: u32,

    /// Pixel height, derived from the source aspect ratio
    pub height: u32,

    /// Output encoding
    pub format: VariantFormat,

    /// Encoder quality (100 for lossless encodings)
    pub quality: u8,
}

/// The generator's complete output for one source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Symbolic reference (source file name) this manifest is registered under
    pub name: String,

    /// Primary `src`: the largest fallback-format variant
    pub src: String,

    /// Low-resolution preview as a `data:` URI
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub placeholder: Option<String>,

    /// Source width in pixels
    pub width: u32,

    /// Source height in pixels
    pub height: u32,

    /// Alpha verdict shared by every format decision for this image
    pub has_alpha: bool,

    /// Every variant that was successfully produced
    pub images: Vec<Variant>,
}

impl Manifest {
    /// Variants of one format, in width order.
    pub fn variants_of(&self, format: VariantFormat) -> Vec<&Variant> {
        let mut variants: Vec<&Variant> =
            self.images.iter().filter(|v| v.format == format).collect();
        variants.sort_by_key(|v| v.width);
        variants
    }

    /// Whether at least one variant of `format` exists.
    pub fn has_format(&self, format: VariantFormat) -> bool {
        self.images.iter().any(|v| v.format == format)
    }
}

/// One manifest written by a build.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltManifest {
    /// Symbolic reference the manifest is registered under
    pub reference: String,
    /// Source file it was generated from
    pub source: PathBuf,
    /// Location relative to the output directory
    pub location: String,
    pub manifest: Manifest,
}

/// Summary of a build across all sources.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Successfully generated manifests, ordered by source path
    pub manifests: Vec<BuiltManifest>,
    /// Every failure, whole-image and per-variant
    pub failures: Vec<PipelineError>,
    pub images_discovered: usize,
    pub variants_written: usize,
    pub variants_reused: usize,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Sources that produced no manifest at all.
    pub fn failed_images(&self) -> usize {
        self.failures.iter().filter(|e| e.is_fatal_for_image()).count()
    }

    /// Individual (format, width) pairs that were dropped.
    pub fn failed_variants(&self) -> usize {
        self.failures.len() - self.failed_images()
    }

    pub fn images_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.manifests.len() as f64 / secs
        } else {
            0.0
        }
    }
}
