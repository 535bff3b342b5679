//! Resize + encode for one (format, width) pair.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageResult};
use std::io::Cursor;

use crate::config::{PngCompression, VariantsConfig};
use crate::types::VariantFormat;

use super::decode::SourceImage;
use super::eligibility::EligibleFormats;
use super::hash::Hasher;
use super::naming::variant_file_name;

/// Quality recorded for lossless encodings.
pub const LOSSLESS_QUALITY: u8 = 100;

/// One planned transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantJob {
    pub format: VariantFormat,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    /// Content-derived file name (no directory)
    pub file_name: String,
}

/// Plans and executes transcodes with a fixed resampling policy.
#[derive(Debug, Clone)]
pub struct Transcoder {
    config: VariantsConfig,
}

impl Transcoder {
    pub fn new(config: VariantsConfig) -> Self {
        Self { config }
    }

    /// Encoder quality for a format.
    pub fn quality_for(&self, format: VariantFormat) -> u8 {
        match format {
            VariantFormat::Jpeg => self.config.jpeg_quality,
            VariantFormat::Png | VariantFormat::Webp => LOSSLESS_QUALITY,
        }
    }

    /// Every encoder setting that affects output bytes, folded into the name hash.
    pub fn settings_key(&self, format: VariantFormat) -> String {
        let filter = self.config.resample_filter.as_str();
        match format {
            VariantFormat::Jpeg => format!("{};q{}", filter, self.config.jpeg_quality),
            VariantFormat::Png => format!("{};{:?}", filter, self.config.png_compression),
            VariantFormat::Webp => format!("{};lossless", filter),
        }
    }

    /// Height that preserves the source aspect ratio at `width`.
    pub fn target_height(source_width: u32, source_height: u32, width: u32) -> u32 {
        if source_width == 0 {
            return 1;
        }
        let height = (u64::from(width) * u64::from(source_height) + u64::from(source_width) / 2)
            / u64::from(source_width);
        height.clamp(1, u64::from(u32::MAX)) as u32
    }

    /// Plan one job per breakpoint for each eligible format.
    pub fn plan(
        &self,
        source: &SourceImage,
        eligible: EligibleFormats,
        stem: &str,
    ) -> Vec<VariantJob> {
        let formats = eligible.formats();
        let mut jobs = Vec::with_capacity(formats.len() * self.config.breakpoints.len());
        for format in formats {
            let settings = self.settings_key(format);
            for &width in &self.config.breakpoints {
                let token = Hasher::variant_token(&source.content_hash, width, format, &settings);
                jobs.push(VariantJob {
                    format,
                    width,
                    height: Self::target_height(source.width, source.height, width),
                    quality: self.quality_for(format),
                    file_name: variant_file_name(stem, width, &token, format),
                });
            }
        }
        jobs
    }

    /// Resize and encode. CPU-bound; call from a blocking context.
    pub fn encode(&self, image: &DynamicImage, job: &VariantJob) -> ImageResult<Vec<u8>> {
        let resized = image.resize_exact(job.width, job.height, self.config.resample_filter.into());
        encode_as(&resized, job.format, job.quality, self.config.png_compression)
    }
}

/// Encode an already-sized image in one of the variant formats.
pub(crate) fn encode_as(
    image: &DynamicImage,
    format: VariantFormat,
    quality: u8,
    png_compression: PngCompression,
) -> ImageResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    match format {
        VariantFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        }
        VariantFormat::Png => {
            let compression = match png_compression {
                PngCompression::Fast => CompressionType::Fast,
                PngCompression::Default => CompressionType::Default,
                PngCompression::Best => CompressionType::Best,
            };
            let encoder = PngEncoder::new_with_quality(&mut buffer, compression, PngFilter::Adaptive);
            image.write_with_encoder(encoder)?;
        }
        VariantFormat::Webp => {
            // The WebP encoder only accepts 8-bit RGB(A)
            let eight_bit = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };
            eight_bit.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
        }
    }
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decode::tests::png_bytes;
    use crate::pipeline::decode::ImageDecoder;
    use std::path::Path;

    fn source(alpha: bool) -> SourceImage {
        ImageDecoder::decode_bytes_sync(png_bytes(64, 32, alpha), Path::new("src.png")).unwrap()
    }

    fn transcoder(breakpoints: Vec<u32>) -> Transcoder {
        Transcoder::new(VariantsConfig {
            breakpoints,
            ..VariantsConfig::default()
        })
    }

    #[test]
    fn test_target_height_preserves_aspect() {
        assert_eq!(Transcoder::target_height(2000, 1000, 300), 150);
        assert_eq!(Transcoder::target_height(3, 2, 2), 1);
        assert_eq!(Transcoder::target_height(1000, 1, 10), 1);
    }

    #[test]
    fn test_plan_covers_every_breakpoint_per_eligible_format() {
        let src = source(true);
        let jobs = transcoder(vec![300, 600]).plan(&src, EligibleFormats::for_alpha(true), "src");
        let pairs: Vec<(VariantFormat, u32)> = jobs.iter().map(|j| (j.format, j.width)).collect();
        assert_eq!(
            pairs,
            vec![
                (VariantFormat::Webp, 300),
                (VariantFormat::Webp, 600),
                (VariantFormat::Png, 300),
                (VariantFormat::Png, 600),
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let src = source(false);
        let t = transcoder(vec![300]);
        let a = t.plan(&src, EligibleFormats::for_alpha(false), "src");
        let b = t.plan(&src, EligibleFormats::for_alpha(false), "src");
        assert_eq!(a, b);
        assert!(a[1].file_name.starts_with("src-300-"));
        assert!(a[1].file_name.ends_with(".jpg"));
        assert_eq!(a[1].quality, 85);
    }

    #[test]
    fn test_jpeg_quality_changes_file_name() {
        let src = source(false);
        let eligible = EligibleFormats::for_alpha(false);
        let a = transcoder(vec![300]).plan(&src, eligible, "src");
        let b = Transcoder::new(VariantsConfig {
            breakpoints: vec![300],
            jpeg_quality: 60,
            ..VariantsConfig::default()
        })
        .plan(&src, eligible, "src");
        assert_eq!(a[0].file_name, b[0].file_name); // webp unaffected
        assert_ne!(a[1].file_name, b[1].file_name);
    }

    #[test]
    fn test_encode_each_format() {
        let src = source(true);
        let t = transcoder(vec![16]);
        for format in VariantFormat::ALL {
            let job = VariantJob {
                format,
                width: 16,
                height: 8,
                quality: t.quality_for(format),
                file_name: String::new(),
            };
            let bytes = t.encode(&src.image, &job).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (16, 8), "{format}");
        }
    }

    #[test]
    fn test_webp_output_is_riff() {
        let src = source(false);
        let bytes = encode_as(&src.image, VariantFormat::Webp, 100, PngCompression::Default).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
    }
}
