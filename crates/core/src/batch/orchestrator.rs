//! Batch orchestrator: plans, converts, and packages one request.

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::archive::{build_archive, ARCHIVE_NAME};
use super::config::LimitsConfig;
use super::error::BatchError;
use super::naming;
use super::types::{BatchResult, ConversionRequest, Delivery, PreparedDelivery, UploadedFile};
use crate::cleanup::CleanupGuard;
use crate::convert::{ConversionRouter, OutputCollector};
use crate::format::normalize_extension;
use crate::metrics::{BATCHES_TOTAL, BATCH_FILES};

/// Converts the files of one request, all or nothing.
#[derive(Clone)]
pub struct BatchOrchestrator {
    router: ConversionRouter,
    workspace_dir: PathBuf,
    limits: LimitsConfig,
}

impl BatchOrchestrator {
    pub fn new(router: ConversionRouter, workspace_dir: PathBuf, limits: LimitsConfig) -> Self {
        Self {
            router,
            workspace_dir,
            limits,
        }
    }

    pub fn router(&self) -> &ConversionRouter {
        &self.router
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Validates the request and picks a strategy for every file. Touches
    /// no files and runs no tools.
    pub fn preflight(
        &self,
        uploads: &[UploadedFile],
        target_format: &str,
    ) -> Result<Vec<ConversionRequest>, BatchError> {
        if uploads.is_empty() {
            return Err(BatchError::NoFiles);
        }
        if uploads.len() > self.limits.max_files {
            return Err(BatchError::TooManyFiles {
                count: uploads.len(),
                max: self.limits.max_files,
            });
        }

        let target_ext = normalize_extension(target_format);
        if target_ext.is_empty() {
            return Err(BatchError::MissingTargetFormat);
        }
        if !self.router.table().classify(&target_ext).is_known() {
            return Err(BatchError::UnsupportedFormat {
                extension: target_ext,
            });
        }

        uploads
            .iter()
            .map(|upload| {
                let source_ext = upload.extension();
                let strategy = self
                    .router
                    .plan(&source_ext, &target_ext)
                    .map_err(|source| BatchError::Conversion {
                        file: upload.original_name.clone(),
                        source,
                    })?;
                Ok(ConversionRequest {
                    original_name: upload.original_name.clone(),
                    source_path: upload.path.clone(),
                    source_ext,
                    target_path: naming::target_path(
                        &self.workspace_dir,
                        &upload.original_name,
                        &target_ext,
                    ),
                    target_ext: target_ext.clone(),
                    strategy,
                })
            })
            .collect()
    }

    /// Converts every upload in order. The batch takes ownership of the
    /// uploaded files: on failure they are deleted together with any
    /// output produced so far, and on success they travel with the result.
    pub async fn convert_batch(
        &self,
        uploads: Vec<UploadedFile>,
        target_format: &str,
    ) -> Result<BatchResult, BatchError> {
        let mut guard = CleanupGuard::for_sources(uploads.iter().map(|u| u.path.clone()));

        let requests = match self.preflight(&uploads, target_format) {
            Ok(requests) => requests,
            Err(e) => {
                warn!(error = %e, files = uploads.len(), "Rejected batch");
                return Err(Self::fail(guard, e).await);
            }
        };
        BATCH_FILES.observe(requests.len() as f64);
        info!(
            files = requests.len(),
            target = %requests[0].target_ext,
            "Converting batch"
        );

        let mut outputs = Vec::with_capacity(requests.len());
        for request in &requests {
            let result = self
                .router
                .convert(
                    &request.source_path,
                    &request.target_path,
                    &request.source_ext,
                    &request.target_ext,
                )
                .await;

            match result {
                Ok(set) => {
                    guard.track_outputs(set.paths().iter().cloned());
                    outputs.push(set);
                }
                Err(source) => {
                    error!(
                        file = %request.original_name,
                        strategy = %request.strategy,
                        error = %source,
                        "Conversion failed"
                    );
                    Self::track_leftovers(&mut guard, request).await;
                    let e = BatchError::Conversion {
                        file: request.original_name.clone(),
                        source,
                    };
                    return Err(Self::fail(guard, e).await);
                }
            }
        }

        for (set, request) in outputs.iter().zip(&requests) {
            if let Err(source) = set.verify().await {
                let e = BatchError::Conversion {
                    file: request.original_name.clone(),
                    source,
                };
                return Err(Self::fail(guard, e).await);
            }
        }

        Ok(BatchResult { outputs, guard })
    }

    /// Decides between a single download and an archive, building the
    /// archive if needed.
    pub async fn prepare_delivery(&self, result: BatchResult) -> Result<PreparedDelivery, BatchError> {
        let paths = result.output_paths();
        let BatchResult { mut guard, .. } = result;

        if let [single] = paths.as_slice() {
            let file_name = single
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            BATCHES_TOTAL.with_label_values(&["single"]).inc();
            return Ok(PreparedDelivery {
                delivery: Delivery::Single {
                    path: single.clone(),
                    file_name,
                },
                guard,
            });
        }

        let archive_path = naming::target_path(&self.workspace_dir, ARCHIVE_NAME, "zip");
        guard.track_output(archive_path.clone());
        let entries = paths.len();
        if let Err(e) = build_archive(paths, archive_path.clone()).await {
            error!(error = %e, "Failed to package outputs");
            return Err(Self::fail(guard, e).await);
        }

        BATCHES_TOTAL.with_label_values(&["archive"]).inc();
        info!(entries, path = %archive_path.display(), "Packaged outputs");
        Ok(PreparedDelivery {
            delivery: Delivery::Archive {
                path: archive_path,
                file_name: ARCHIVE_NAME.to_string(),
                entries,
            },
            guard,
        })
    }

    /// [`convert_batch`](Self::convert_batch) followed by
    /// [`prepare_delivery`](Self::prepare_delivery).
    pub async fn run(
        &self,
        uploads: Vec<UploadedFile>,
        target_format: &str,
    ) -> Result<PreparedDelivery, BatchError> {
        let result = self.convert_batch(uploads, target_format).await?;
        self.prepare_delivery(result).await
    }

    /// Claims whatever a failed conversion left at its target, including
    /// page files written before the tool gave up.
    async fn track_leftovers(guard: &mut CleanupGuard, request: &ConversionRequest) {
        guard.track_output(request.target_path.clone());
        if let Ok(partial) = OutputCollector::collect_for(&request.target_path).await {
            guard.track_outputs(partial.into_paths());
        }
    }

    async fn fail(guard: CleanupGuard, e: BatchError) -> BatchError {
        BATCHES_TOTAL.with_label_values(&["failed"]).inc();
        let report = guard.release().await;
        if !report.is_clean() {
            warn!(errors = report.errors.len(), "Cleanup after failed batch was incomplete");
        }
        e
    }
}
