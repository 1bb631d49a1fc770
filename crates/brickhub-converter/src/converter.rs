//! LDView conversion with a filename-keyed output cache.
//!
//! Each conversion checks the media storage for an existing output first.
//! On a miss (or when a rewrite is requested) LDView runs with a fixed set
//! of flags and the presence of the expected output file decides success.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use brickhub_core::config::converter::{ConverterConfig, SnapshotConfig};
use brickhub_core::traits::storage::StorageProvider;
use tracing::{debug, info, instrument, warn};

use crate::error::ConversionError;
use crate::fixer::StlFixer;
use crate::metrics::{ConversionMetrics, MetricsSnapshot};
use crate::models::{ConvertedFile, OutputKind};
use crate::process::{ProcessRunner, path_arg, path_flag};

/// Converts LDraw models to STL and PNG through LDView.
#[derive(Debug)]
pub struct StlConverter {
    /// LDView binary.
    ldview: PathBuf,
    /// Snapshot flags for PNG output.
    snapshot: SnapshotConfig,
    /// Filesystem for generated web assets.
    media: Arc<dyn StorageProvider>,
    /// LDraw parts library. Conversions refuse to run without it.
    ldraw_library: Option<Arc<dyn StorageProvider>>,
    /// Post-processor for exported STL files.
    fixer: StlFixer,
    runner: ProcessRunner,
    metrics: ConversionMetrics,
}

impl StlConverter {
    /// Create a converter writing into `media`.
    pub fn new(config: &ConverterConfig, media: Arc<dyn StorageProvider>, fixer: StlFixer) -> Self {
        Self {
            ldview: config.ldview_path.clone(),
            snapshot: config.snapshot.clone(),
            media,
            ldraw_library: None,
            fixer,
            runner: ProcessRunner::with_timeout_seconds(config.process_timeout_seconds),
            metrics: ConversionMetrics::new(),
        }
    }

    /// Attach the LDraw parts library.
    pub fn set_ldraw_library(&mut self, library: Arc<dyn StorageProvider>) {
        self.ldraw_library = Some(library);
    }

    /// Builder form of [`StlConverter::set_ldraw_library`].
    pub fn with_ldraw_library(mut self, library: Arc<dyn StorageProvider>) -> Self {
        self.set_ldraw_library(library);
        self
    }

    /// Convert an LDraw model to STL, stored under `models/`.
    pub async fn dat_to_stl(
        &self,
        file: impl AsRef<Path>,
        rewrite: bool,
    ) -> Result<ConvertedFile, ConversionError> {
        self.convert(file.as_ref(), OutputKind::Stl, rewrite).await
    }

    /// Render an LDraw model to PNG, stored under `images/`.
    pub async fn dat_to_png(
        &self,
        file: impl AsRef<Path>,
        rewrite: bool,
    ) -> Result<ConvertedFile, ConversionError> {
        self.convert(file.as_ref(), OutputKind::Png, rewrite).await
    }

    /// Produce `kind` for `file`, reusing the cached output unless `rewrite`.
    #[instrument(skip(self, file), fields(file = %file.display()))]
    pub async fn convert(
        &self,
        file: &Path,
        kind: OutputKind,
        rewrite: bool,
    ) -> Result<ConvertedFile, ConversionError> {
        let library = self
            .ldraw_library
            .as_deref()
            .ok_or(ConversionError::LibraryMissing)?;
        let library_root = local_root(library)?;
        let media_root = local_root(self.media.as_ref())?;

        self.metrics.record_request();

        let subdir = kind.subdir();
        if !self.media.exists(subdir).await? {
            self.media.create_dir(subdir).await?;
        }

        let target = kind.storage_path(file);

        if self.media.exists(&target).await? {
            if !rewrite {
                self.metrics.record_cache_hit();
                debug!(target = %target, "Serving cached output");
                return self.converted_file(kind, target, true).await;
            }
            // The old output must not stand in for the new one.
            self.media.delete(&target).await?;
        }

        let args = self.ldview_arguments(file, kind, library_root, &media_root.join(subdir));

        self.metrics.record_invocation();
        let start = Instant::now();

        if let Err(e) = self.runner.run(&self.ldview, &args).await {
            self.metrics.record_failure();
            self.media.delete(&target).await?;
            return Err(ConversionError::tool_failed(file, kind.label(), e));
        }

        if !self.media.exists(&target).await? {
            self.metrics.record_failure();
            warn!(
                target = %target,
                format = kind.label(),
                "LDView exited cleanly but produced no output"
            );
            return Err(ConversionError::converting_failed(file, kind.label()));
        }

        if kind == OutputKind::Stl {
            if let Err(e) = self.fixer.fix(&media_root.join(&target)).await {
                self.metrics.record_failure();
                warn!(target = %target, error = %e, "STL fixer failed, discarding export");
                self.media.delete(&target).await?;
                return Err(ConversionError::tool_failed(file, kind.label(), e));
            }
        }

        let elapsed = start.elapsed();
        self.metrics.record_success(elapsed);
        info!(
            target = %target,
            elapsed_ms = elapsed.as_millis() as u64,
            "Model converted"
        );

        self.converted_file(kind, target, false).await
    }

    /// LDView arguments for converting `file` into `output_dir`.
    pub fn ldview_arguments(
        &self,
        file: &Path,
        kind: OutputKind,
        library_root: &Path,
        output_dir: &Path,
    ) -> Vec<String> {
        let mut args = vec![path_arg(file), path_flag("-LDrawDir=", library_root)];

        match kind {
            OutputKind::Stl => {
                args.extend([
                    "-ExportFiles=1".to_string(),
                    format!("-ExportSuffix=.{}", kind.extension()),
                    path_flag("-ExportsDir=", output_dir),
                ]);
            }
            OutputKind::Png => {
                let s = &self.snapshot;
                args.extend([
                    "-AutoCrop=0".to_string(),
                    "-SaveAlpha=0".to_string(),
                    format!("-BackgroundColor3={}", s.background_color),
                    format!("-DefaultColor3={}", s.default_color),
                    format!("-SnapshotSuffix=.{}", kind.extension()),
                    "-HiResPrimitives=1".to_string(),
                    "-UseQualityStuds=1".to_string(),
                    "-UseQualityLighting=1".to_string(),
                    format!("-SaveHeight={}", s.height),
                    format!("-SaveWidth={}", s.width),
                    format!("-CurveQuality={}", s.curve_quality),
                    format!("-DefaultLatLong={}", s.default_lat_long),
                    path_flag("-SaveDir=", output_dir),
                    "-SaveSnapshots=1".to_string(),
                ]);
            }
        }

        args
    }

    /// Cached outputs of `kind`, sorted by path.
    pub async fn cached_outputs(&self, kind: OutputKind) -> Result<Vec<ConvertedFile>, ConversionError> {
        let media_root = local_root(self.media.as_ref())?;
        let suffix = format!(".{}", kind.extension());

        let entries = self.media.list(kind.subdir()).await?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.is_directory && e.path.ends_with(&suffix))
            .map(|e| ConvertedFile {
                kind,
                absolute_path: media_root.join(&e.path),
                size_bytes: e.size_bytes,
                modified: e.last_modified,
                storage_path: e.path,
                cached: true,
            })
            .collect())
    }

    /// Remove the cached `kind` output for `file`. Returns whether one existed.
    pub async fn evict(&self, file: &Path, kind: OutputKind) -> Result<bool, ConversionError> {
        let target = kind.storage_path(file);
        if !self.media.exists(&target).await? {
            return Ok(false);
        }
        self.media.delete(&target).await?;
        info!(target = %target, "Evicted cached output");
        Ok(true)
    }

    /// Get a metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn converted_file(
        &self,
        kind: OutputKind,
        storage_path: String,
        cached: bool,
    ) -> Result<ConvertedFile, ConversionError> {
        let meta = self.media.metadata(&storage_path).await?;
        let media_root = local_root(self.media.as_ref())?;
        Ok(ConvertedFile {
            kind,
            absolute_path: media_root.join(&storage_path),
            storage_path,
            size_bytes: meta.size_bytes,
            modified: meta.last_modified,
            cached,
        })
    }
}

/// Local directory behind a storage provider.
fn local_root(storage: &dyn StorageProvider) -> Result<&Path, ConversionError> {
    storage
        .path_prefix()
        .ok_or_else(|| ConversionError::StorageNotLocal {
            provider: storage.provider_type().to_string(),
        })
}
