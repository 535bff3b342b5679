//! Variant generation - wires validation, decode, eligibility, transcode and
//! placeholder stages together for one or many sources.

use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{Manifest, Variant, VariantFormat};

use super::decode::{ImageDecoder, SourceImage};
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::eligibility::EligibleFormats;
use super::naming::{file_stem_of, public_url, reference_of};
use super::placeholder::PlaceholderGenerator;
use super::store::write_atomic;
use super::transcode::{Transcoder, VariantJob};
use super::validate::Validator;

/// Options for controlling generation behavior.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Skip placeholder generation
    pub skip_placeholder: bool,
    /// Re-encode variants even when the content-addressed file already exists
    pub force: bool,
}

/// Everything produced for one source image.
#[derive(Debug)]
pub struct ImageOutcome {
    /// Source path
    pub source: PathBuf,
    /// BLAKE3 hash of the source bytes
    pub content_hash: String,
    /// The manifest describing every variant that was produced
    pub manifest: Manifest,
    /// Per-variant failures; those variants are absent from the manifest
    pub failures: Vec<PipelineError>,
    /// Variants encoded and written in this run
    pub written: usize,
    /// Variants whose content-addressed file already existed
    pub reused: usize,
}

enum JobStatus {
    Written,
    Reused,
}

/// Turns source images into manifests on a bounded worker pool.
pub struct VariantGenerator {
    validator: Validator,
    decoder: ImageDecoder,
    discovery: FileDiscovery,
    transcoder: Arc<Transcoder>,
    placeholder_gen: Arc<PlaceholderGenerator>,
    workers: Arc<Semaphore>,
    parallel: usize,
    images_dir: PathBuf,
    images_dir_name: String,
    public_path: String,
}

impl VariantGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: &Config) -> Self {
        let parallel = config.processing.parallel_workers.max(1);
        Self {
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone())
                .excluding(config.output_dir()),
            transcoder: Arc::new(Transcoder::new(config.variants.clone())),
            placeholder_gen: Arc::new(PlaceholderGenerator::new(config.placeholder.clone())),
            workers: Arc::new(Semaphore::new(parallel)),
            parallel,
            images_dir: config.images_dir(),
            images_dir_name: config.general.images_dir.clone(),
            public_path: config.general.public_path.clone(),
        }
    }

    /// Discover all source images at a path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }

    /// Generate every variant of one source with default options.
    pub async fn generate(&self, path: &Path) -> PipelineResult<ImageOutcome> {
        self.generate_with_options(path, &GenerateOptions::default())
            .await
    }

    /// Generate every variant of one source.
    ///
    /// Fails only when the source itself cannot be read or decoded; a failed
    /// (format, width) pair is recorded in [`ImageOutcome::failures`] and the
    /// remaining variants still complete.
    pub async fn generate_with_options(
        &self,
        path: &Path,
        options: &GenerateOptions,
    ) -> PipelineResult<ImageOutcome> {
        let start = Instant::now();
        tracing::debug!("Generating: {:?}", path);

        self.validator.validate(path)?;

        let decode_start = Instant::now();
        let permit = self.acquire(path).await?;
        let source = self.decoder.decode_holding(path, permit).await?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        // The alpha probe happened once, during decode
        let eligible = EligibleFormats::for_alpha(source.has_alpha);
        let stem = file_stem_of(path);
        let jobs = self.transcoder.plan(&source, eligible, &stem);
        tracing::debug!(
            "  {} job(s) for {:?} (alpha={}, formats={:?})",
            jobs.len(),
            path,
            source.has_alpha,
            eligible.formats()
        );

        tokio::fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|e| PipelineError::Write {
                path: path.to_path_buf(),
                target: self.images_dir.clone(),
                message: e.to_string(),
            })?;

        let transcode_start = Instant::now();
        let results = join_all(
            jobs.into_iter()
                .map(|job| self.run_job(&source, job, options.force)),
        )
        .await;
        tracing::trace!("  Transcode: {:?}", transcode_start.elapsed());

        let mut variants = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        let mut written = 0;
        let mut reused = 0;
        for result in results {
            match result {
                Ok((variant, JobStatus::Written)) => {
                    written += 1;
                    variants.push(variant);
                }
                Ok((variant, JobStatus::Reused)) => {
                    reused += 1;
                    variants.push(variant);
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    failures.push(e);
                }
            }
        }

        if variants.is_empty() && !failures.is_empty() {
            // Nothing usable survived; surface the first failure for the image
            return Err(failures.swap_remove(0));
        }
        variants.sort_by_key(|v| (v.format, v.width));

        let placeholder = if options.skip_placeholder {
            None
        } else {
            self.placeholder(&source).await
        };

        let src = primary_src(&variants, eligible.raster()).unwrap_or_default();

        tracing::debug!(
            "Generated {:?} in {:?} ({} written, {} reused, {} failed)",
            path,
            start.elapsed(),
            written,
            reused,
            failures.len()
        );

        Ok(ImageOutcome {
            source: path.to_path_buf(),
            content_hash: source.content_hash.clone(),
            manifest: Manifest {
                name: reference_of(path),
                src,
                placeholder,
                width: source.width,
                height: source.height,
                has_alpha: source.has_alpha,
                images: variants,
            },
            failures,
            written,
            reused,
        })
    }

    /// Generate many sources concurrently.
    ///
    /// At most `parallel_workers` sources are in flight; all of their decode
    /// and transcode jobs share the same worker permits. A failing source
    /// never stops its siblings. `on_result` is called as each one finishes.
    pub async fn generate_all<F>(
        &self,
        paths: &[PathBuf],
        options: &GenerateOptions,
        mut on_result: F,
    ) -> Vec<PipelineResult<ImageOutcome>>
    where
        F: FnMut(&Path, &PipelineResult<ImageOutcome>),
    {
        let mut results = Vec::with_capacity(paths.len());
        let mut in_flight = stream::iter(paths)
            .map(|path| async move { (path, self.generate_with_options(path, options).await) })
            .buffer_unordered(self.parallel);

        while let Some((path, result)) = in_flight.next().await {
            if let Err(e) = &result {
                tracing::error!("Failed: {:?} - {}", path, e);
            }
            on_result(path, &result);
            results.push(result);
        }
        results
    }

    async fn run_job(
        &self,
        source: &SourceImage,
        job: VariantJob,
        force: bool,
    ) -> PipelineResult<(Variant, JobStatus)> {
        let target = self.images_dir.join(&job.file_name);
        let variant = Variant {
            path: public_url(&self.public_path, &self.images_dir_name, &job.file_name),
            width: job.width,
            height: job.height,
            format: job.format,
            quality: job.quality,
        };

        if !force && tokio::fs::try_exists(&target).await.unwrap_or(false) {
            tracing::trace!("  Reusing {:?}", target);
            return Ok((variant, JobStatus::Reused));
        }

        let permit = self.acquire(&source.path).await?;
        let image = Arc::clone(&source.image);
        let transcoder = Arc::clone(&self.transcoder);
        let task_job = job.clone();
        let encoded =
            tokio::task::spawn_blocking(move || transcoder.encode(&image, &task_job)).await;
        drop(permit);

        let bytes = match encoded {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return Err(encode_error(source, &job, e.to_string())),
            Err(e) => {
                return Err(encode_error(
                    source,
                    &job,
                    format!("Task join error: {}", e),
                ))
            }
        };

        write_atomic(&target, &bytes)
            .await
            .map_err(|e| PipelineError::Write {
                path: source.path.clone(),
                target: target.clone(),
                message: e.to_string(),
            })?;

        Ok((variant, JobStatus::Written))
    }

    async fn placeholder(&self, source: &SourceImage) -> Option<String> {
        if !self.placeholder_gen.is_enabled() {
            return None;
        }
        let _permit = self.acquire(&source.path).await.ok()?;
        let image = Arc::clone(&source.image);
        let generator = Arc::clone(&self.placeholder_gen);
        tokio::task::spawn_blocking(move || generator.generate(&image))
            .await
            .ok()
            .flatten()
    }

    async fn acquire(&self, path: &Path) -> PipelineResult<OwnedSemaphorePermit> {
        Arc::clone(&self.workers)
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Worker pool closed".to_string(),
            })
    }
}

fn encode_error(source: &SourceImage, job: &VariantJob, message: String) -> PipelineError {
    PipelineError::Encode {
        path: source.path.clone(),
        format: job.format,
        width: job.width,
        message,
    }
}

/// The manifest's primary `src`: the widest variant of the raster format,
/// or the widest variant of any format if none of those survived.
pub fn primary_src(variants: &[Variant], raster: VariantFormat) -> Option<String> {
    variants
        .iter()
        .filter(|v| v.format == raster)
        .max_by_key(|v| v.width)
        .or_else(|| variants.iter().max_by_key(|v| v.width))
        .map(|v| v.path.clone())
}
