//! Source decoding with format detection, the alpha probe, and timeout support.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

use super::hash::Hasher;

/// Source decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// A decoded source image.
///
/// `has_alpha` is probed exactly once, at decode time, and every format
/// decision for this image reads this field.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Path the bytes were read from
    pub path: PathBuf,
    /// BLAKE3 hash of the source bytes (hex)
    pub content_hash: String,
    /// Decoded bitmap, shared read-only by every transcode job
    pub image: Arc<DynamicImage>,
    /// Detected container format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Whether the decoded color type carries an alpha channel
    pub has_alpha: bool,
    /// Original file size in bytes
    pub file_size: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read and decode a source file.
    pub async fn decode(&self, path: &Path) -> Result<SourceImage, PipelineError> {
        let bytes = Self::read(path).await?;
        self.run_decode(bytes, path, None).await
    }

    /// Read and decode a source file while holding a worker permit.
    ///
    /// The permit moves into the blocking decode and is released when the
    /// decode actually finishes, even if the caller already gave up on a
    /// timeout.
    pub async fn decode_holding(
        &self,
        path: &Path,
        permit: OwnedSemaphorePermit,
    ) -> Result<SourceImage, PipelineError> {
        let bytes = Self::read(path).await?;
        self.run_decode(bytes, path, Some(permit)).await
    }

    /// Decode a source from an in-memory byte buffer with validation and timeout.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<SourceImage, PipelineError> {
        self.run_decode(bytes, path, None).await
    }

    async fn read(path: &Path) -> Result<Vec<u8>, PipelineError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {}", e),
            })
    }

    async fn run_decode(
        &self,
        bytes: Vec<u8>,
        path: &Path,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Result<SourceImage, PipelineError> {
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                Self::decode_bytes_sync(bytes, &path_owned)
            })
            .await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(PipelineError::ImageTooLarge {
                        path: path.to_path_buf(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    pub(crate) fn decode_bytes_sync(
        bytes: Vec<u8>,
        path: &Path,
    ) -> Result<SourceImage, PipelineError> {
        use std::io::Cursor;

        let file_size = bytes.len() as u64;
        let content_hash = Hasher::content_hash_from_bytes(&bytes);
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f @ (ImageFormat::Png | ImageFormat::Jpeg)) => f,
            Some(other) => {
                return Err(PipelineError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: format!("{:?}", other).to_lowercase(),
                })
            }
            None => {
                return Err(PipelineError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                })
            }
        };
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        let has_alpha = image.color().has_alpha();
        tracing::trace!(
            "Probed {:?}: {}x{} alpha={}",
            path,
            width,
            height,
            has_alpha
        );

        Ok(SourceImage {
            path: path.to_path_buf(),
            content_hash,
            image: Arc::new(image),
            format,
            width,
            height,
            has_alpha,
            file_size,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};
    use std::io::Cursor;

    /// Encode a small gradient as PNG, with or without an alpha channel.
    pub(crate) fn png_bytes(width: u32, height: u32, alpha: bool) -> Vec<u8> {
        let image = if alpha {
            DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
                Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
            }))
        } else {
            DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
                Rgb([(x % 256) as u8, (y % 256) as u8, 64])
            }))
        };
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    /// Encode a small gradient as JPEG.
    pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, 32, (y % 256) as u8])
        }));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn test_timed_out_decode_holds_permit_until_finished() {
        use tokio::sync::Semaphore;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, png_bytes(2000, 2000, false)).unwrap();

        let workers = Arc::new(Semaphore::new(1));
        let permit = Arc::clone(&workers).acquire_owned().await.unwrap();
        let decoder = ImageDecoder::new(LimitsConfig {
            decode_timeout_ms: 0,
            ..LimitsConfig::default()
        });

        let err = decoder.decode_holding(&path, permit).await.unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { .. }));
        // The abandoned decode still occupies the worker slot
        assert_eq!(workers.available_permits(), 0);

        let released = tokio::time::timeout(Duration::from_secs(30), workers.acquire()).await;
        assert!(released.is_ok());
    }

    #[test]
    fn test_alpha_probe_png_with_alpha() {
        let decoded =
            ImageDecoder::decode_bytes_sync(png_bytes(40, 20, true), Path::new("a.png")).unwrap();
        assert!(decoded.has_alpha);
        assert_eq!((decoded.width, decoded.height), (40, 20));
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn test_alpha_probe_opaque_png() {
        let decoded =
            ImageDecoder::decode_bytes_sync(png_bytes(40, 20, false), Path::new("b.png")).unwrap();
        assert!(!decoded.has_alpha);
    }

    #[test]
    fn test_jpeg_never_has_alpha() {
        let decoded =
            ImageDecoder::decode_bytes_sync(jpeg_bytes(32, 32), Path::new("c.jpg")).unwrap();
        assert!(!decoded.has_alpha);
        assert_eq!(decoded.format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes behind a .jpg name are still detected as PNG
        let decoded =
            ImageDecoder::decode_bytes_sync(png_bytes(8, 8, false), Path::new("misnamed.jpg"))
                .unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = ImageDecoder::decode_bytes_sync(vec![0u8; 64], Path::new("junk.png"));
        assert!(result.is_err());
    }

    #[test]
    fn test_same_bytes_same_content_hash() {
        let bytes = png_bytes(16, 16, true);
        let a = ImageDecoder::decode_bytes_sync(bytes.clone(), Path::new("a.png")).unwrap();
        let b = ImageDecoder::decode_bytes_sync(bytes, Path::new("b.png")).unwrap();
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[tokio::test]
    async fn test_decode_rejects_oversized_dimensions() {
        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 10,
            ..LimitsConfig::default()
        });
        let err = decoder
            .decode_from_bytes(png_bytes(20, 5, false), Path::new("wide.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ImageTooLarge { width: 20, .. }));
    }
}
