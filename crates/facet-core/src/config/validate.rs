//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.variants.breakpoints.is_empty() {
            return Err(ConfigError::ValidationError(
                "variants.breakpoints must not be empty".into(),
            ));
        }
        if self.variants.breakpoints.contains(&0) {
            return Err(ConfigError::ValidationError(
                "variants.breakpoints must all be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.variants.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "variants.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.placeholder.size == 0 {
            return Err(ConfigError::ValidationError(
                "placeholder.size must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.general.images_dir.trim_matches('/').is_empty() {
            return Err(ConfigError::ValidationError(
                "general.images_dir must name a directory under output_dir".into(),
            ));
        }
        if self.render.default_display == 0 {
            return Err(ConfigError::ValidationError(
                "render.default_display must be > 0".into(),
            ));
        }
        let ascending = self
            .render
            .display_sizes
            .windows(2)
            .all(|pair| pair[0].max_viewport < pair[1].max_viewport);
        if !ascending {
            return Err(ConfigError::ValidationError(
                "render.display_sizes must be strictly ascending by max_viewport".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplaySize;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parallel_workers() {
        let mut config = Config::default();
        config.processing.parallel_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parallel_workers"));
    }

    #[test]
    fn test_validate_rejects_empty_breakpoints() {
        let mut config = Config::default();
        config.variants.breakpoints.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("breakpoints"));
    }

    #[test]
    fn test_validate_rejects_zero_breakpoint() {
        let mut config = Config::default();
        config.variants.breakpoints = vec![0, 300];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("breakpoints"));
    }

    #[test]
    fn test_validate_rejects_invalid_jpeg_quality() {
        let mut config = Config::default();
        config.variants.jpeg_quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));

        config.variants.jpeg_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));
    }

    #[test]
    fn test_validate_rejects_zero_placeholder_size() {
        let mut config = Config::default();
        config.placeholder.size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("placeholder.size"));
    }

    #[test]
    fn test_validate_rejects_unordered_display_sizes() {
        let mut config = Config::default();
        config.render.display_sizes = vec![
            DisplaySize {
                max_viewport: 1200,
                display: 600,
            },
            DisplaySize {
                max_viewport: 600,
                display: 300,
            },
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("display_sizes"));
    }

    #[test]
    fn test_validate_rejects_root_images_dir() {
        for images_dir in ["", "/", "//"] {
            let mut config = Config::default();
            config.general.images_dir = images_dir.to_string();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("images_dir"), "{:?}", images_dir);
        }
    }
}
