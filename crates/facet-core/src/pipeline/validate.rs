//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates source files before processing.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - File starts with PNG or JPEG magic bytes
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path)?;

        Ok(())
    }

    /// Check file magic bytes against the accepted source formats.
    fn check_magic_bytes(&self, path: &Path) -> Result<(), PipelineError> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = [0u8; 8];
        let bytes_read = file.read(&mut header).unwrap_or(0);

        if bytes_read < 3 {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        if !Self::is_source_header(&header, bytes_read) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Not a PNG or JPEG (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }

    /// PNG (`89 50 4E 47 0D 0A 1A 0A`) or JPEG (`FF D8 FF`).
    fn is_source_header(header: &[u8; 8], bytes_read: usize) -> bool {
        if bytes_read >= 3 && header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
            return true;
        }

        bytes_read >= 8 && header == b"\x89PNG\r\n\x1a\n"
    }
}
