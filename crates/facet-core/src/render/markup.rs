//! Candidate lists, sizes hints and HTML for a resolved manifest.

use maud::{html, Markup};
use std::fmt;

use crate::config::{DisplaySize, RenderConfig};
use crate::types::{Manifest, Variant, VariantFormat};

/// Raster format served to surfaces without WebP support.
///
/// A manifest never carries both png and jpeg variants, so this reduces to
/// "is there any png".
pub fn fallback_format(manifest: &Manifest) -> VariantFormat {
    if manifest.has_format(VariantFormat::Png) {
        VariantFormat::Png
    } else {
        VariantFormat::Jpeg
    }
}

/// Width-ordered `"path 300w, path 600w"` list for one format.
pub fn candidate_list(manifest: &Manifest, format: VariantFormat) -> String {
    manifest
        .variants_of(format)
        .iter()
        .map(|v| format!("{} {}w", v.path, v.width))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Composite candidate string: webp first, then the fallback format.
pub fn srcset(manifest: &Manifest) -> String {
    [VariantFormat::Webp, fallback_format(manifest)]
        .into_iter()
        .map(|format| candidate_list(manifest, format))
        .filter(|list| !list.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fixed viewport → display-width mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizesHint {
    rules: Vec<DisplaySize>,
    default_display: u32,
}

impl SizesHint {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            rules: config.display_sizes.clone(),
            default_display: config.default_display,
        }
    }

    /// Display width requested at a viewport width.
    pub fn requested_width(&self, viewport: u32) -> u32 {
        self.rules
            .iter()
            .find(|rule| viewport <= rule.max_viewport)
            .map_or(self.default_display, |rule| rule.display)
    }
}

impl Default for SizesHint {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl fmt::Display for SizesHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "(max-width: {}px) {}px, ", rule.max_viewport, rule.display)?;
        }
        write!(f, "{}px", self.default_display)
    }
}

/// The candidate a surface picks for `format` at `viewport`: the narrowest
/// variant at or above the requested display width, else the widest one.
pub fn select_candidate<'a>(
    manifest: &'a Manifest,
    format: VariantFormat,
    sizes: &SizesHint,
    viewport: u32,
) -> Option<&'a Variant> {
    let requested = sizes.requested_width(viewport);
    let candidates = manifest.variants_of(format);
    candidates
        .iter()
        .find(|v| v.width >= requested)
        .or_else(|| candidates.last())
        .copied()
}

/// A fully resolved `<img>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    pub src: String,
    pub srcset: String,
    pub sizes: String,
    pub alt: String,
    pub placeholder: Option<String>,
}

impl ImageElement {
    pub fn from_manifest(manifest: &Manifest, alt: &str, sizes: &SizesHint) -> Self {
        Self {
            src: manifest.src.clone(),
            srcset: srcset(manifest),
            sizes: sizes.to_string(),
            alt: alt.to_string(),
            placeholder: manifest.placeholder.clone(),
        }
    }

    fn placeholder_style(&self) -> Option<String> {
        self.placeholder
            .as_ref()
            .map(|uri| format!("background-image: url({}); background-size: cover;", uri))
    }

    pub fn to_markup(&self) -> Markup {
        html! {
            img src=(self.src) srcset=(self.srcset) sizes=(self.sizes) alt=(self.alt)
                style=[self.placeholder_style()];
        }
    }
}

/// Shown while the manifest is pending.
pub fn loading_markup() -> Markup {
    html! {
        div class="responsive-image loading" { "Loading image..." }
    }
}

/// Shown when the manifest could not be obtained.
pub fn failed_markup(alt: &str) -> Markup {
    html! {
        div class="responsive-image error" role="img" aria-label=(alt) { "Image unavailable" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(format: VariantFormat, width: u32) -> Variant {
        Variant {
            path: format!("images/a-{}-00000000.{}", width, format.extension()),
            width,
            height: width / 2,
            format,
            quality: 100,
        }
    }

    fn manifest(formats: &[VariantFormat], widths: &[u32]) -> Manifest {
        let mut images = Vec::new();
        for &format in formats {
            for &width in widths {
                images.push(variant(format, width));
            }
        }
        Manifest {
            name: "a.png".to_string(),
            src: "images/a-600-00000000.png".to_string(),
            placeholder: None,
            width: 600,
            height: 300,
            has_alpha: true,
            images,
        }
    }

    #[test]
    fn test_fallback_png_when_present() {
        let m = manifest(&[VariantFormat::Webp, VariantFormat::Png], &[300]);
        assert_eq!(fallback_format(&m), VariantFormat::Png);
    }

    #[test]
    fn test_fallback_jpeg_otherwise() {
        let m = manifest(&[VariantFormat::Webp, VariantFormat::Jpeg], &[300]);
        assert_eq!(fallback_format(&m), VariantFormat::Jpeg);
        let webp_only = manifest(&[VariantFormat::Webp], &[300]);
        assert_eq!(fallback_format(&webp_only), VariantFormat::Jpeg);
    }

    #[test]
    fn test_srcset_webp_then_fallback() {
        let m = manifest(&[VariantFormat::Png, VariantFormat::Webp], &[600, 300]);
        assert_eq!(
            srcset(&m),
            "images/a-300-00000000.webp 300w, images/a-600-00000000.webp 600w, \
             images/a-300-00000000.png 300w, images/a-600-00000000.png 600w"
        );
    }

    #[test]
    fn test_srcset_skips_empty_lists() {
        let m = manifest(&[VariantFormat::Webp], &[300]);
        assert_eq!(srcset(&m), "images/a-300-00000000.webp 300w");
        let none = manifest(&[], &[]);
        assert_eq!(srcset(&none), "");
    }

    #[test]
    fn test_default_sizes_hint() {
        assert_eq!(
            SizesHint::default().to_string(),
            "(max-width: 600px) 300px, (max-width: 1200px) 600px, 1200px"
        );
    }

    #[test]
    fn test_requested_width_boundaries() {
        let sizes = SizesHint::default();
        assert_eq!(sizes.requested_width(320), 300);
        assert_eq!(sizes.requested_width(600), 300);
        assert_eq!(sizes.requested_width(601), 600);
        assert_eq!(sizes.requested_width(1200), 600);
        assert_eq!(sizes.requested_width(1920), 1200);
    }

    #[test]
    fn test_select_candidate() {
        let m = manifest(&[VariantFormat::Webp], &[300, 600, 1200, 2000]);
        let sizes = SizesHint::default();
        let pick = |viewport| select_candidate(&m, VariantFormat::Webp, &sizes, viewport).map(|v| v.width);
        assert_eq!(pick(400), Some(300));
        assert_eq!(pick(1000), Some(600));
        assert_eq!(pick(2560), Some(1200));

        let small = manifest(&[VariantFormat::Webp], &[300]);
        assert_eq!(
            select_candidate(&small, VariantFormat::Webp, &sizes, 2560).map(|v| v.width),
            Some(300)
        );
        assert!(select_candidate(&small, VariantFormat::Png, &sizes, 2560).is_none());
    }

    #[test]
    fn test_img_markup_escapes_alt() {
        let mut m = manifest(&[VariantFormat::Webp, VariantFormat::Png], &[300]);
        m.placeholder = Some("data:image/webp;base64,AAAA".to_string());
        let element = ImageElement::from_manifest(&m, "Tom & \"Jerry\"", &SizesHint::default());
        let html = element.to_markup().into_string();
        assert!(html.starts_with("<img "));
        assert!(html.contains(r#"src="images/a-600-00000000.png""#));
        assert!(html.contains("alt=\"Tom &amp; &quot;Jerry&quot;\""));
        assert!(html.contains("background-image: url(data:image/webp;base64,AAAA)"));
    }

    #[test]
    fn test_img_without_placeholder_has_no_style() {
        let m = manifest(&[VariantFormat::Webp, VariantFormat::Jpeg], &[300]);
        let html = ImageElement::from_manifest(&m, "x", &SizesHint::default())
            .to_markup()
            .into_string();
        assert!(!html.contains("style="));
    }

    #[test]
    fn test_state_markup() {
        assert_eq!(
            loading_markup().into_string(),
            r#"<div class="responsive-image loading">Loading image...</div>"#
        );
        let failed = failed_markup("A cat").into_string();
        assert!(failed.contains(r#"role="img""#));
        assert!(failed.contains(r#"aria-label="A cat""#));
    }
}
