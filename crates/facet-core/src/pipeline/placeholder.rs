//! Low-resolution placeholder generation with WebP output.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::{PlaceholderConfig, PngCompression};
use crate::types::VariantFormat;

use super::transcode::{encode_as, Transcoder, LOSSLESS_QUALITY};

/// Placeholders are always WebP, independent of the eligibility rule.
pub const PLACEHOLDER_FORMAT: VariantFormat = VariantFormat::Webp;

/// Generates tiny previews shown while the full variant loads.
pub struct PlaceholderGenerator {
    config: PlaceholderConfig,
}

impl PlaceholderGenerator {
    /// Create a new placeholder generator with the given configuration.
    pub fn new(config: PlaceholderConfig) -> Self {
        Self { config }
    }

    /// Generate a placeholder as a `data:image/webp;base64,...` URI.
    ///
    /// Returns `None` if placeholders are disabled or encoding fails.
    pub fn generate(&self, image: &DynamicImage) -> Option<String> {
        let bytes = self.generate_bytes(image)?;
        Some(format!(
            "data:{};base64,{}",
            PLACEHOLDER_FORMAT.mime_type(),
            BASE64.encode(bytes)
        ))
    }

    /// Generate the raw placeholder bytes.
    pub fn generate_bytes(&self, image: &DynamicImage) -> Option<Vec<u8>> {
        if !self.config.enabled {
            return None;
        }

        let width = self.config.size;
        let height = Transcoder::target_height(image.width(), image.height(), width);
        let small = image.resize_exact(width, height, FilterType::Triangle);

        match encode_as(
            &small,
            PLACEHOLDER_FORMAT,
            LOSSLESS_QUALITY,
            PngCompression::Default,
        ) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!("Placeholder encoding failed: {}", e);
                None
            }
        }
    }

    /// Check if placeholder generation is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}
