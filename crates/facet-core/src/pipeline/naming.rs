//! Content-addressed file names: `<basename>-<width>-<hash8>.<ext>`.

use std::ffi::OsStr;
use std::path::Path;

use crate::types::VariantFormat;

/// URL-safe stem of a source file ("Large Original.png" → "Large-Original").
pub fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("image")
        .replace(' ', "-")
}

/// Symbolic reference a source is registered under (its file name).
pub fn reference_of(path: &Path) -> String {
    path.file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("image")
        .to_string()
}

/// File name of one variant.
pub fn variant_file_name(stem: &str, width: u32, token: &str, format: VariantFormat) -> String {
    format!("{}-{}-{}.{}", stem, width, token, format.extension())
}

/// File name of the manifest for one source.
pub fn manifest_file_name(stem: &str, source_hash: &str) -> String {
    let short = source_hash.get(..8).unwrap_or(source_hash);
    format!("{}-{}.json", stem, short)
}

/// Public path of a generated file, joined under `public_path` and `images_dir`.
pub fn public_url(public_path: &str, images_dir: &str, file_name: &str) -> String {
    let dir = images_dir.trim_matches('/');
    if public_path.is_empty() {
        format!("{}/{}", dir, file_name)
    } else {
        format!("{}/{}/{}", public_path.trim_end_matches('/'), dir, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_file_name() {
        assert_eq!(
            variant_file_name("large_original", 300, "1a2b3c4d", VariantFormat::Jpeg),
            "large_original-300-1a2b3c4d.jpg"
        );
        assert_eq!(
            variant_file_name("logo", 2000, "deadbeef", VariantFormat::Webp),
            "logo-2000-deadbeef.webp"
        );
    }

    #[test]
    fn test_stem_replaces_spaces() {
        assert_eq!(file_stem_of(Path::new("/a/Large Original.png")), "Large-Original");
        assert_eq!(reference_of(Path::new("/a/Large Original.png")), "Large Original.png");
    }

    #[test]
    fn test_public_url() {
        assert_eq!(public_url("", "images", "a.webp"), "images/a.webp");
        assert_eq!(public_url("/static/", "images/", "a.webp"), "/static/images/a.webp");
        assert_eq!(
            public_url("/assets", "img", "a.png"),
            "/assets/img/a.png"
        );
    }

    #[test]
    fn test_manifest_file_name_uses_short_hash() {
        assert_eq!(manifest_file_name("hero", "0123456789abcdef"), "hero-01234567.json");
    }
}
