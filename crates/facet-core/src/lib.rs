//! Facet Core - responsive image variants and the markup that serves them.
//!
//! Build time turns each source raster into a set of resized variants across
//! WebP plus exactly one of PNG (sources with alpha) or JPEG (opaque sources),
//! a tiny placeholder, and a manifest. Render time resolves a symbolic
//! reference to that manifest and emits an `<img>` with a composite `srcset`.
//!
//! ```text
//! Source → Validate → Decode (alpha probe) → Transcode × breakpoints → Manifest → Registry
//!                                                                          ↓
//!                                       Reference → ManifestSource → ResponsiveImage → <img>
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use facet_core::{Config, Facet, GenerateOptions};
//!
//! #[tokio::main]
//! async fn main() -> facet_core::Result<()> {
//!     let facet = Facet::new(Config::load()?);
//!     let sources = facet.discover("./assets".as_ref());
//!     let report = facet.build(&sources, &GenerateOptions::default(), |_, _| {}).await?;
//!     println!("{} manifests", report.manifests.len());
//!
//!     let image = facet.image("large_original.png", "A large original");
//!     image.settled().await;
//!     println!("{}", image.render().into_string());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, FacetError, PipelineError, PipelineResult, ResolutionError, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{GenerateOptions, ImageOutcome, ManifestStore, VariantGenerator};
pub use registry::AssetRegistry;
pub use render::{ManifestSource, RegistrySource, RenderState, ResponsiveImage, SizesHint};
pub use types::{BuildReport, BuiltManifest, Manifest, Variant, VariantFormat};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Facet - the main entry point for building and rendering.
pub struct Facet {
    config: Config,
    generator: VariantGenerator,
    store: ManifestStore,
}

impl Facet {
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing Facet v{}", VERSION);
        let generator = VariantGenerator::new(&config);
        let store = ManifestStore::new(&config);
        Self {
            config,
            generator,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Source images under `input` (a file or a directory).
    pub fn discover(&self, input: &Path) -> Vec<PathBuf> {
        self.generator
            .discover(input)
            .into_iter()
            .map(|file| file.path)
            .collect()
    }

    /// Generate every source, write one manifest per success and merge them
    /// into the registry.
    ///
    /// Per-image and per-variant failures are collected in the report; only
    /// a failure to write the registry itself is returned as an error.
    pub async fn build<F>(
        &self,
        sources: &[PathBuf],
        options: &GenerateOptions,
        on_image: F,
    ) -> Result<BuildReport>
    where
        F: FnMut(&Path, &PipelineResult<ImageOutcome>),
    {
        let start = Instant::now();
        let mut report = BuildReport {
            images_discovered: sources.len(),
            ..BuildReport::default()
        };

        let mut outcomes = Vec::new();
        for result in self.generator.generate_all(sources, options, on_image).await {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => report.failures.push(e),
            }
        }
        outcomes.sort_by(|a, b| a.source.cmp(&b.source));

        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        for mut outcome in outcomes {
            report.variants_written += outcome.written;
            report.variants_reused += outcome.reused;
            report.failures.append(&mut outcome.failures);

            let location = match self.store.write_manifest(&outcome).await {
                Ok(location) => location,
                Err(e) => {
                    tracing::error!("{}", e);
                    report.failures.push(e);
                    continue;
                }
            };

            let reference = outcome.manifest.name.clone();
            if let Some(previous) = claimed.insert(reference.clone(), outcome.source.clone()) {
                tracing::warn!(
                    "Reference '{}' produced by both {:?} and {:?}; registering the latter",
                    reference,
                    previous,
                    outcome.source
                );
                report.manifests.retain(|m| m.reference != reference);
            }
            report.manifests.push(BuiltManifest {
                reference,
                source: outcome.source,
                location,
                manifest: outcome.manifest,
            });
        }

        if !report.manifests.is_empty() {
            self.store
                .update_registry(
                    report
                        .manifests
                        .iter()
                        .map(|m| (m.reference.clone(), m.location.clone())),
                )
                .await?;
        }

        report.elapsed = start.elapsed();
        tracing::info!(
            "Built {} manifest(s) from {} source(s) in {:?} ({} variants written, {} reused, {} failure(s))",
            report.manifests.len(),
            report.images_discovered,
            report.elapsed,
            report.variants_written,
            report.variants_reused,
            report.failures.len()
        );
        Ok(report)
    }

    /// Manifest source backed by this configuration's registry.
    pub fn registry_source(&self) -> RegistrySource {
        RegistrySource::new(self.config.registry_path())
    }

    /// A responsive image for `reference`, resolving through the registry.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn image(&self, reference: &str, alt: &str) -> ResponsiveImage {
        ResponsiveImage::new(Arc::new(self.registry_source()), reference, alt)
            .with_sizes(SizesHint::from_config(&self.config.render))
    }
}
