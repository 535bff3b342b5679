//! The `facet config` command for configuration management.

use clap::{Args, Subcommand};
use facet_core::Config;
use std::path::{Path, PathBuf};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
///
/// `explicit` is the `--config` path, if one was given.
pub async fn execute(
    args: ConfigArgs,
    config: Config,
    explicit: Option<PathBuf>,
) -> anyhow::Result<()> {
    let path = explicit.unwrap_or_else(Config::default_path);

    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            init_config(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Write the default configuration to `path`.
fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        init_config(&path, false).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.variants.breakpoints, vec![300, 600, 1200, 2000]);
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[placeholder]\nsize = 10\n").unwrap();

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().placeholder.size, 20);
    }
}
