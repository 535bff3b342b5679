//! Persisting variants, manifests and the registry.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;
use crate::error::PipelineError;
use crate::registry::AssetRegistry;
use crate::types::Manifest;

use super::generator::ImageOutcome;
use super::naming::{file_stem_of, manifest_file_name};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `bytes` to a sibling temp file, then rename it over `target`.
///
/// Readers never observe a partially written file. Each call gets its own
/// temp name, so concurrent writers of the same target do not interfere.
pub async fn write_atomic(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp: OsString = target.as_os_str().to_owned();
    tmp.push(format!(
        ".{}.{}.part",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let tmp = PathBuf::from(tmp);

    let written = match tokio::fs::write(&tmp, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp, target).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    written
}

/// Writes per-image manifests and maintains the registry file.
pub struct ManifestStore {
    output_dir: PathBuf,
    manifests_dir: PathBuf,
    registry_path: PathBuf,
}

impl ManifestStore {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir(),
            manifests_dir: config.manifests_dir(),
            registry_path: config.registry_path(),
        }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    /// Write the manifest for one generated image.
    ///
    /// Returns the location relative to the output directory, which is what
    /// the registry records.
    pub async fn write_manifest(&self, outcome: &ImageOutcome) -> Result<String, PipelineError> {
        let file_name = manifest_file_name(&file_stem_of(&outcome.source), &outcome.content_hash);
        let target = self.manifests_dir.join(&file_name);
        let write_error = |message: String| PipelineError::Write {
            path: outcome.source.clone(),
            target: target.clone(),
            message,
        };

        let json = serde_json::to_vec_pretty(&outcome.manifest).map_err(|e| write_error(e.to_string()))?;
        tokio::fs::create_dir_all(&self.manifests_dir)
            .await
            .map_err(|e| write_error(e.to_string()))?;
        write_atomic(&target, &json)
            .await
            .map_err(|e| write_error(e.to_string()))?;

        tracing::debug!("Wrote manifest {:?}", target);
        Ok(relative_location(&self.output_dir, &target))
    }

    /// Merge new entries into the registry on disk.
    ///
    /// References from earlier builds that are not part of this one are kept.
    pub async fn update_registry<I>(&self, entries: I) -> crate::Result<AssetRegistry>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut registry = AssetRegistry::load(&self.registry_path)?;
        for (reference, location) in entries {
            if let Some(previous) = registry.insert(reference.clone(), location.clone()) {
                if previous != location {
                    tracing::debug!("Re-pointed '{}': {} -> {}", reference, previous, location);
                }
            }
        }

        if let Some(parent) = self.registry_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_atomic(&self.registry_path, registry.to_json()?.as_bytes()).await?;
        tracing::info!(
            "Registry {:?} now holds {} reference(s)",
            self.registry_path,
            registry.len()
        );
        Ok(registry)
    }

    /// Read a manifest back from its registered location.
    pub async fn read_manifest(&self, location: &str) -> crate::Result<Manifest> {
        let content = tokio::fs::read_to_string(self.output_dir.join(location)).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Forward-slash location of `target` under `base`.
fn relative_location(base: &Path, target: &Path) -> String {
    let relative = target.strip_prefix(base).unwrap_or(target);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
