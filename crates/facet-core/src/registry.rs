//! Reference → manifest registry.
//!
//! The registry is the only indirection between a symbolic reference such as
//! `"large_original.png"` and the manifest describing its variants. Locations
//! are stored relative to the registry file so an output directory can be
//! moved or served as-is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ResolutionError;

/// Current on-disk registry format version.
pub const REGISTRY_VERSION: u32 = 1;

/// Map of symbolic references to manifest locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegistry {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    REGISTRY_VERSION
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self {
            version: REGISTRY_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Parse a registry document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load a registry from disk; a missing file is an empty registry.
    pub fn load(path: &Path) -> crate::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::from_json(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Register (or re-point) a reference. Returns the previous location.
    pub fn insert(&mut self, reference: impl Into<String>, location: impl Into<String>) -> Option<String> {
        self.entries.insert(reference.into(), location.into())
    }

    /// Relative location registered for `reference`.
    pub fn resolve(&self, reference: &str) -> Result<&str, ResolutionError> {
        self.entries
            .get(reference)
            .map(String::as_str)
            .ok_or_else(|| ResolutionError::UnknownReference(reference.to_string()))
    }

    /// Absolute manifest path for `reference`, given the registry file's path.
    pub fn locate(&self, registry_path: &Path, reference: &str) -> Result<PathBuf, ResolutionError> {
        let location = self.resolve(reference)?;
        let base = registry_path.parent().unwrap_or_else(|| Path::new("."));
        Ok(base.join(location))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_unknown() {
        let mut registry = AssetRegistry::new();
        registry.insert("logo.png", "manifests/logo-0011aabb.json");
        assert_eq!(registry.resolve("logo.png").unwrap(), "manifests/logo-0011aabb.json");
        assert_eq!(
            registry.resolve("missing.png").unwrap_err(),
            ResolutionError::UnknownReference("missing.png".into())
        );
    }

    #[test]
    fn test_locate_is_relative_to_registry() {
        let mut registry = AssetRegistry::new();
        registry.insert("a.jpg", "manifests/a-12345678.json");
        let path = registry
            .locate(Path::new("/srv/dist/registry.json"), "a.jpg")
            .unwrap();
        assert_eq!(path, PathBuf::from("/srv/dist/manifests/a-12345678.json"));
    }

    #[test]
    fn test_insert_repoints_reference() {
        let mut registry = AssetRegistry::new();
        assert!(registry.insert("a.jpg", "old.json").is_none());
        assert_eq!(registry.insert("a.jpg", "new.json").as_deref(), Some("old.json"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_json_round_trip_and_missing_version() {
        let registry = AssetRegistry::from_json(r#"{"entries":{"b.png":"m/b.json"}}"#).unwrap();
        assert_eq!(registry.version, REGISTRY_VERSION);
        let again = AssetRegistry::from_json(&registry.to_json().unwrap()).unwrap();
        assert_eq!(registry, again);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AssetRegistry::load(&dir.path().join("registry.json")).unwrap();
        assert!(registry.is_empty());
    }
}
