//! Content hashing for source identity and cache-safe variant names.

use blake3::Hasher as Blake3Hasher;

use crate::types::VariantFormat;

/// Length of the content-derived token embedded in variant file names.
pub const TOKEN_LEN: usize = 8;

/// BLAKE3-based hashing helpers.
pub struct Hasher;

impl Hasher {
    /// Generate a BLAKE3 hash from an in-memory byte buffer.
    pub fn content_hash_from_bytes(data: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }

    /// Derive the 8-character token for one variant.
    ///
    /// Inputs are the source content hash, the target width, the output
    /// format and an encoder-settings string. Identical inputs always yield
    /// the same token; changing any of them yields a new one.
    pub fn variant_token(
        source_hash: &str,
        width: u32,
        format: VariantFormat,
        settings: &str,
    ) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(source_hash.as_bytes());
        hasher.update(b"\0");
        hasher.update(&width.to_le_bytes());
        hasher.update(format.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(settings.as_bytes());
        let hex = hasher.finalize().to_hex();
        hex.as_str()[..TOKEN_LEN].to_string()
    }
}
