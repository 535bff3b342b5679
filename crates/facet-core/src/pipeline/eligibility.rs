//! Alpha-driven format eligibility.
//!
//! webp is always emitted; png only for images with alpha and jpeg only for
//! images without. A source therefore produces webp plus exactly one of
//! png/jpeg, never both.

use crate::types::VariantFormat;

/// Whether `format` may be emitted for a source with the given alpha verdict.
pub const fn is_eligible(has_alpha: bool, format: VariantFormat) -> bool {
    match format {
        VariantFormat::Webp => true,
        VariantFormat::Png => has_alpha,
        VariantFormat::Jpeg => !has_alpha,
    }
}

/// The eligible formats for one source image, evaluated once from its probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleFormats {
    has_alpha: bool,
}

impl EligibleFormats {
    pub fn for_alpha(has_alpha: bool) -> Self {
        Self { has_alpha }
    }

    /// Eligible formats in manifest order.
    pub fn formats(&self) -> Vec<VariantFormat> {
        VariantFormat::ALL
            .into_iter()
            .filter(|format| is_eligible(self.has_alpha, *format))
            .collect()
    }

    pub fn contains(&self, format: VariantFormat) -> bool {
        is_eligible(self.has_alpha, format)
    }

    /// The raster format paired with webp for this image.
    pub fn raster(&self) -> VariantFormat {
        if self.has_alpha {
            VariantFormat::Png
        } else {
            VariantFormat::Jpeg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webp_always_eligible() {
        assert!(is_eligible(true, VariantFormat::Webp));
        assert!(is_eligible(false, VariantFormat::Webp));
    }

    #[test]
    fn test_png_and_jpeg_are_mutually_exclusive() {
        for has_alpha in [true, false] {
            let png = is_eligible(has_alpha, VariantFormat::Png);
            let jpeg = is_eligible(has_alpha, VariantFormat::Jpeg);
            assert!(png ^ jpeg, "alpha={has_alpha}");
        }
    }

    #[test]
    fn test_formats_with_alpha() {
        let eligible = EligibleFormats::for_alpha(true);
        assert_eq!(
            eligible.formats(),
            vec![VariantFormat::Webp, VariantFormat::Png]
        );
        assert_eq!(eligible.raster(), VariantFormat::Png);
        assert!(!eligible.contains(VariantFormat::Jpeg));
    }

    #[test]
    fn test_formats_without_alpha() {
        let eligible = EligibleFormats::for_alpha(false);
        assert_eq!(
            eligible.formats(),
            vec![VariantFormat::Webp, VariantFormat::Jpeg]
        );
        assert_eq!(eligible.raster(), VariantFormat::Jpeg);
    }
}
