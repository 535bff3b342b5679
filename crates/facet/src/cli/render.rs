//! The `facet render` command.

use clap::Args;
use facet_core::render::{fallback_format, select_candidate};
use facet_core::{Config, RegistrySource, RenderState, ResponsiveImage, SizesHint, VariantFormat};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `render` command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Symbolic reference, e.g. the source file name `large_original.png`
    pub reference: String,

    /// Alternative text for the image
    #[arg(long)]
    pub alt: String,

    /// Registry file (defaults to `<output_dir>/registry.json`)
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Also report which candidates a surface of this width would pick
    #[arg(long)]
    pub viewport: Option<u32>,
}

/// Execute the render command.
///
/// The markup is always printed, including the fallback element when the
/// reference cannot be resolved; that case still exits non-zero.
pub async fn execute(args: RenderArgs, config: Config) -> anyhow::Result<()> {
    let registry = args.registry.unwrap_or_else(|| config.registry_path());
    let sizes = SizesHint::from_config(&config.render);

    let image = ResponsiveImage::new(Arc::new(RegistrySource::new(registry)), args.reference, args.alt)
        .with_sizes(sizes.clone());
    let state = image.settled().await;

    println!("{}", image.render().into_string());

    match state {
        RenderState::Resolved(manifest) => {
            if let Some(viewport) = args.viewport {
                let requested = sizes.requested_width(viewport);
                eprintln!("  viewport {}px → display {}px", viewport, requested);
                for format in [VariantFormat::Webp, fallback_format(&manifest)] {
                    match select_candidate(&manifest, format, &sizes, viewport) {
                        Some(variant) => {
                            eprintln!("    {:<5} {} ({}w)", format, variant.path, variant.width)
                        }
                        None => eprintln!("    {:<5} (none)", format),
                    }
                }
            }
            Ok(())
        }
        RenderState::Failed(e) => Err(e.into()),
        RenderState::Pending => anyhow::bail!("Manifest resolution did not settle"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_registry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = RenderArgs {
            reference: "missing.png".to_string(),
            alt: "Missing".to_string(),
            registry: Some(dir.path().join("registry.json")),
            viewport: None,
        };
        let err = execute(args, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
