//! Source discovery: a single file or a recursively walked directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers source images.
pub struct FileDiscovery {
    config: ProcessingConfig,
    exclude: Option<PathBuf>,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            config,
            exclude: None,
        }
    }

    /// Skip everything under `dir` (the build output, when it lives inside the input tree).
    pub fn excluding(mut self, dir: PathBuf) -> Self {
        self.exclude = Some(dir);
        self
    }

    /// Discover all supported source images at a path.
    ///
    /// If path is a file, returns it if supported.
    /// If path is a directory, recursively finds all supported files.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        let mut files = Vec::new();

        let exclude = self
            .exclude
            .as_ref()
            .map(|dir| dir.canonicalize().unwrap_or_else(|_| dir.clone()));

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| match &exclude {
                Some(dir) => e.path().canonicalize().map_or(true, |p| !p.starts_with(dir)),
                None => true,
            })
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && self.is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}
