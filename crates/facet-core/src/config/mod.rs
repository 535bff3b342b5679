//! Configuration management for Facet.
//!
//! Configuration is loaded from the platform config directory (or an explicit
//! path) with sensible defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Facet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Variant generation settings
    pub variants: VariantsConfig,

    /// Placeholder settings
    pub placeholder: PlaceholderConfig,

    /// Render-time settings
    pub render: RenderConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse, normalize and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.facet.facet/config.toml
    /// - Linux: ~/.config/facet/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\facet\config\config.toml
    ///
    /// Falls back to ~/.facet/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "facet", "facet")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".facet").join("config.toml")
            })
    }

    /// Get the resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.general.output_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Directory that receives variant files.
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir().join(&self.general.images_dir)
    }

    /// Directory that receives per-image manifests.
    pub fn manifests_dir(&self) -> PathBuf {
        self.output_dir().join("manifests")
    }

    /// Location of the reference → manifest registry.
    pub fn registry_path(&self) -> PathBuf {
        self.output_dir().join("registry.json")
    }

    /// Sort and de-duplicate breakpoints.
    pub fn normalize(&mut self) {
        self.variants.breakpoints.sort_unstable();
        self.variants.breakpoints.dedup();
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.variants.breakpoints, vec![300, 600, 1200, 2000]);
        assert_eq!(config.variants.jpeg_quality, 85);
        assert_eq!(config.placeholder.size, 20);
        assert!(config.processing.parallel_workers > 0);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[variants]"));
        assert!(toml.contains("breakpoints"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [variants]
            breakpoints = [1200, 300, 600, 300]
            jpeg_quality = 70
            "#,
        )
        .unwrap();
        assert_eq!(config.variants.breakpoints, vec![300, 600, 1200]);
        assert_eq!(config.variants.jpeg_quality, 70);
        assert_eq!(config.placeholder.size, 20);
        assert_eq!(config.general.images_dir, "images");
    }

    #[test]
    fn test_enum_settings_parse() {
        let config = Config::from_toml(
            r#"
            [variants]
            png_compression = "best"
            resample_filter = "catmull_rom"
            "#,
        )
        .unwrap();
        assert_eq!(config.variants.png_compression, PngCompression::Best);
        assert_eq!(config.variants.resample_filter, ResampleFilter::CatmullRom);
    }

    #[test]
    fn test_output_paths() {
        let mut config = Config::default();
        config.general.output_dir = PathBuf::from("/srv/site");
        assert_eq!(config.images_dir(), PathBuf::from("/srv/site/images"));
        assert_eq!(config.registry_path(), PathBuf::from("/srv/site/registry.json"));
        assert_eq!(config.manifests_dir(), PathBuf::from("/srv/site/manifests"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[placeholder]\nsize = 32\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.placeholder.size, 32);
    }
}
