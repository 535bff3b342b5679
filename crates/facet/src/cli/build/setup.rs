//! Applying command-line overrides on top of the loaded config.

use facet_core::Config;

use super::BuildArgs;

/// Fold CLI flags into `config`, then re-normalize and re-validate.
pub fn apply_overrides(mut config: Config, args: &BuildArgs) -> anyhow::Result<Config> {
    if let Some(dir) = &args.out_dir {
        config.general.output_dir = dir.clone();
    }
    if let Some(public_path) = &args.public_path {
        config.general.public_path = public_path.clone();
    }
    if !args.breakpoints.is_empty() {
        config.variants.breakpoints = args.breakpoints.clone();
    }
    if let Some(quality) = args.jpeg_quality {
        config.variants.jpeg_quality = quality;
    }
    if let Some(parallel) = args.parallel {
        config.processing.parallel_workers = parallel;
    }
    if args.no_placeholder {
        config.placeholder.enabled = false;
    }

    config.normalize();
    config.validate()?;
    Ok(config)
}
