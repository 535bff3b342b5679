//! Where the renderer obtains manifests from.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ResolutionError;
use crate::registry::AssetRegistry;
use crate::types::Manifest;

/// Asynchronously resolves a symbolic reference to its manifest.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Manifest, ResolutionError>;
}

/// Reads `registry.json` and the manifest it points to from disk.
///
/// The registry is re-read on every fetch so a running renderer picks up the
/// output of a later build.
#[derive(Debug, Clone)]
pub struct RegistrySource {
    registry_path: PathBuf,
}

impl RegistrySource {
    pub fn new(registry_path: impl Into<PathBuf>) -> Self {
        Self {
            registry_path: registry_path.into(),
        }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }
}

async fn read_text(path: &Path, reference: &str) -> Result<String, ResolutionError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ResolutionError::NotFound(path.to_path_buf())
        } else {
            ResolutionError::Load {
                reference: reference.to_string(),
                message: e.to_string(),
            }
        }
    })
}

#[async_trait]
impl ManifestSource for RegistrySource {
    async fn fetch(&self, reference: &str) -> Result<Manifest, ResolutionError> {
        let registry_json = read_text(&self.registry_path, reference).await?;
        let registry = AssetRegistry::from_json(&registry_json).map_err(|e| ResolutionError::Parse {
            reference: reference.to_string(),
            message: format!("registry: {}", e),
        })?;

        let manifest_path = registry.locate(&self.registry_path, reference)?;
        tracing::debug!("Resolving '{}' via {:?}", reference, manifest_path);

        let manifest_json = read_text(&manifest_path, reference).await?;
        serde_json::from_str(&manifest_json).map_err(|e| ResolutionError::Parse {
            reference: reference.to_string(),
            message: e.to_string(),
        })
    }
}

/// In-process manifests keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    manifests: HashMap<String, Manifest>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, manifest: Manifest) {
        self.manifests.insert(reference.into(), manifest);
    }

    pub fn with(mut self, reference: impl Into<String>, manifest: Manifest) -> Self {
        self.insert(reference, manifest);
        self
    }
}

#[async_trait]
impl ManifestSource for MemorySource {
    async fn fetch(&self, reference: &str) -> Result<Manifest, ResolutionError> {
        self.manifests
            .get(reference)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownReference(reference.to_string()))
    }
}
