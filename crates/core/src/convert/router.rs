//! Strategy execution.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::collector::{OutputCollector, OutputSet};
use super::error::ConversionError;
use super::strategy::ConversionStrategy;
use crate::cleanup::TempArtifact;
use crate::format::{normalize_extension, Category, FormatTable};
use crate::metrics::{CONVERSIONS_TOTAL, CONVERSION_DURATION};
use crate::tool::{CommandSpec, ToolInvoker};

/// Picks and runs the tool chain for one source/target pair.
#[derive(Clone)]
pub struct ConversionRouter {
    invoker: ToolInvoker,
    table: Arc<FormatTable>,
}

impl ConversionRouter {
    /// Router over the built-in format table.
    pub fn new(invoker: ToolInvoker) -> Self {
        Self::with_table(invoker, Arc::new(FormatTable::global().clone()))
    }

    pub fn with_table(invoker: ToolInvoker, table: Arc<FormatTable>) -> Self {
        Self { invoker, table }
    }

    pub fn invoker(&self) -> &ToolInvoker {
        &self.invoker
    }

    pub fn table(&self) -> &FormatTable {
        &self.table
    }

    /// Resolves the strategy for a pair of extensions without touching the
    /// filesystem.
    pub fn plan(
        &self,
        source_ext: &str,
        target_ext: &str,
    ) -> Result<ConversionStrategy, ConversionError> {
        let source_ext = normalize_extension(source_ext);
        let target_ext = normalize_extension(target_ext);
        let source = self.table.classify(&source_ext);
        let target = self.table.classify(&target_ext);

        for (ext, category) in [(&source_ext, source), (&target_ext, target)] {
            if !category.is_known() {
                return Err(ConversionError::UnsupportedFormat {
                    extension: ext.clone(),
                });
            }
        }

        let strategy = ConversionStrategy::select(source, target, &target_ext);
        if !strategy.is_supported() {
            return Err(ConversionError::UnsupportedConversion {
                from: source,
                to: target,
                target_ext,
            });
        }
        Ok(strategy)
    }

    /// Converts `source_path` towards `target_path` and returns the files
    /// that were actually produced.
    ///
    /// Every intermediate file is gone when this returns, on success and on
    /// failure. Produced outputs are the caller's to release.
    pub async fn convert(
        &self,
        source_path: &Path,
        target_path: &Path,
        source_ext: &str,
        target_ext: &str,
    ) -> Result<OutputSet, ConversionError> {
        let strategy = self.plan(source_ext, target_ext)?;
        let source_ext = normalize_extension(source_ext);
        let target_ext = normalize_extension(target_ext);

        info!(
            source = %source_path.display(),
            target = %target_path.display(),
            strategy = %strategy,
            "Converting"
        );

        let started = Instant::now();
        let result = self
            .execute(strategy, source_path, target_path, &source_ext, &target_ext)
            .await;
        let result = match result {
            Ok(()) => {
                let dir = parent_dir(target_path);
                let base = file_stem(target_path);
                OutputCollector::collect(target_path, dir, &base, &target_ext).await
            }
            Err(e) => Err(e),
        };

        CONVERSION_DURATION
            .with_label_values(&[strategy.as_str()])
            .observe(started.elapsed().as_secs_f64());
        CONVERSIONS_TOTAL
            .with_label_values(&[
                strategy.as_str(),
                if result.is_ok() { "success" } else { "failure" },
            ])
            .inc();

        if let Ok(ref outputs) = result {
            debug!(
                target = %target_path.display(),
                outputs = outputs.len(),
                "Conversion produced outputs"
            );
        }
        result
    }

    async fn execute(
        &self,
        strategy: ConversionStrategy,
        source: &Path,
        target: &Path,
        source_ext: &str,
        target_ext: &str,
    ) -> Result<(), ConversionError> {
        match strategy {
            ConversionStrategy::SameCategoryDirect(Category::Image)
            | ConversionStrategy::ImageToDocumentDirectPdf => {
                self.invoker
                    .run(&CommandSpec::rasterize(source, target))
                    .await?;
            }
            ConversionStrategy::SameCategoryDirect(Category::Document) => {
                if source_ext == target_ext {
                    tokio::fs::copy(source, target)
                        .await
                        .map_err(|e| ConversionError::io("copying document", e))?;
                } else {
                    self.office_to_target(source, target, target_ext).await?;
                }
            }
            ConversionStrategy::SameCategoryDirect(Category::Audio)
            | ConversionStrategy::SameCategoryDirect(Category::Video) => {
                let level = &self.invoker.config().transcoder_log_level;
                self.invoker
                    .run(&CommandSpec::transcode(source, target, level))
                    .await?;
            }
            ConversionStrategy::ImageToDocumentViaPdf => {
                let intermediate = TempArtifact::new(
                    parent_dir(target).join(format!("{}-intermediate.pdf", file_stem(target))),
                );
                let result = self
                    .image_via_pdf(source, target, target_ext, &intermediate)
                    .await;
                intermediate.discard().await;
                result?;
            }
            ConversionStrategy::DocumentToImageViaPdf => {
                let density = self.invoker.config().rasterize_density;
                if source_ext == "pdf" {
                    self.invoker
                        .run(&CommandSpec::rasterize_pages(source, target, density))
                        .await?;
                } else {
                    let intermediate = TempArtifact::new(
                        parent_dir(target).join(format!("{}.pdf", file_stem(source))),
                    );
                    let result = self
                        .document_via_pdf(source, target, density, &intermediate)
                        .await;
                    intermediate.discard().await;
                    result?;
                }
            }
            ConversionStrategy::SameCategoryDirect(Category::Unknown)
            | ConversionStrategy::Unsupported => {
                return Err(ConversionError::conversion_failed(format!(
                    "no tool chain for strategy {strategy}"
                )));
            }
        }
        Ok(())
    }

    async fn image_via_pdf(
        &self,
        source: &Path,
        target: &Path,
        target_ext: &str,
        intermediate: &TempArtifact,
    ) -> Result<(), ConversionError> {
        self.invoker
            .run(&CommandSpec::rasterize(source, intermediate.path()))
            .await?;
        require_file(intermediate.path(), "intermediate PDF").await?;
        self.office_to_target(intermediate.path(), target, target_ext)
            .await
    }

    async fn document_via_pdf(
        &self,
        source: &Path,
        target: &Path,
        density: u32,
        intermediate: &TempArtifact,
    ) -> Result<(), ConversionError> {
        self.invoker
            .run(&CommandSpec::office_convert(
                source,
                "pdf",
                parent_dir(intermediate.path()),
            ))
            .await?;
        require_file(intermediate.path(), "intermediate PDF").await?;
        self.invoker
            .run(&CommandSpec::rasterize_pages(
                intermediate.path(),
                target,
                density,
            ))
            .await?;
        Ok(())
    }

    /// Runs the office converter and moves its self-named output onto
    /// `target`.
    async fn office_to_target(
        &self,
        input: &Path,
        target: &Path,
        target_ext: &str,
    ) -> Result<(), ConversionError> {
        let outdir = parent_dir(target);
        // Owned before the run: the converter may write it and still fail.
        let produced = TempArtifact::new(outdir.join(format!("{}.{target_ext}", file_stem(input))));
        self.invoker
            .run(&CommandSpec::office_convert(input, target_ext, outdir))
            .await?;

        require_file(produced.path(), "office converter output").await?;

        if produced.path() != target {
            tokio::fs::rename(produced.path(), target)
                .await
                .map_err(|e| ConversionError::io("renaming office converter output", e))?;
            debug!(
                from = %produced.path().display(),
                to = %target.display(),
                "Renamed converter output"
            );
        }
        produced.persist();
        Ok(())
    }
}

async fn require_file(path: &Path, what: &str) -> Result<(), ConversionError> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|e| ConversionError::io(format!("checking {what}"), e))?;
    if exists {
        Ok(())
    } else {
        Err(ConversionError::conversion_failed(format!(
            "expected {what} at {} was not created",
            path.display()
        )))
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{dir_listing, write_file};
    use crate::testing::FakeToolRunner;
    use crate::tool::{ToolKind, ToolsConfig};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn router(runner: &Arc<FakeToolRunner>) -> ConversionRouter {
        ConversionRouter::new(ToolInvoker::new(ToolsConfig::default(), runner.clone()))
    }

    #[test]
    fn test_plan() {
        let runner = Arc::new(FakeToolRunner::new());
        let router = router(&runner);

        assert_eq!(
            router.plan("PNG", ".jpg").unwrap(),
            ConversionStrategy::SameCategoryDirect(Category::Image)
        );
        assert_eq!(
            router.plan("png", "pdf").unwrap(),
            ConversionStrategy::ImageToDocumentDirectPdf
        );
        assert!(matches!(
            router.plan("xyz", "png"),
            Err(ConversionError::UnsupportedFormat { extension }) if extension == "xyz"
        ));
        assert!(matches!(
            router.plan("png", "nope"),
            Err(ConversionError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            router.plan("mp3", "mp4"),
            Err(ConversionError::UnsupportedConversion {
                from: Category::Audio,
                to: Category::Video,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_image_direct() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "photo.png");
        let target = temp.path().join("photo-out.jpg");

        let runner = Arc::new(FakeToolRunner::new());
        let outputs = router(&runner)
            .convert(&source, &target, "png", "jpg")
            .await
            .unwrap();

        assert_eq!(outputs.paths(), &[target.clone()]);
        assert_eq!(runner.tools_invoked().await, vec![ToolKind::Rasterizer]);
    }

    #[tokio::test]
    async fn test_image_round_trip_leaves_single_files() {
        let temp = TempDir::new().unwrap();
        let a = write_file(temp.path(), "a.png");
        let b = temp.path().join("b.jpg");
        let c = temp.path().join("c.png");

        let runner = Arc::new(FakeToolRunner::new());
        let router = router(&runner);

        let first = router.convert(&a, &b, "png", "jpg").await.unwrap();
        assert_eq!(first.len(), 1);
        tokio::fs::remove_file(&a).await.unwrap();

        let second = router.convert(&b, &c, "jpg", "png").await.unwrap();
        assert_eq!(second.len(), 1);
        tokio::fs::remove_file(&b).await.unwrap();

        assert_eq!(dir_listing(temp.path()), vec!["c.png"]);
    }

    #[tokio::test]
    async fn test_document_renamed_to_target() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "notes.txt");
        let target = temp.path().join("report.docx");

        let runner = Arc::new(FakeToolRunner::new());
        let outputs = router(&runner)
            .convert(&source, &target, "txt", "docx")
            .await
            .unwrap();

        assert_eq!(outputs.paths(), &[target.clone()]);
        assert!(!temp.path().join("notes.docx").exists());
        assert_eq!(dir_listing(temp.path()), vec!["notes.txt", "report.docx"]);
    }

    #[tokio::test]
    async fn test_document_missing_converter_output() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "notes.txt");
        let target = temp.path().join("report.docx");

        let runner = Arc::new(FakeToolRunner::new());
        runner.set_silent(ToolKind::OfficeConverter).await;
        let err = router(&runner)
            .convert(&source, &target, "txt", "docx")
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::ConversionFailed { .. }));
    }

    #[tokio::test]
    async fn test_document_same_extension_copies() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.pdf");
        let target = temp.path().join("b.pdf");

        let runner = Arc::new(FakeToolRunner::new());
        let outputs = router(&runner)
            .convert(&source, &target, "pdf", "pdf")
            .await
            .unwrap();

        assert_eq!(outputs.paths(), &[target]);
        assert_eq!(runner.conversion_count().await, 0);
    }

    #[tokio::test]
    async fn test_multi_page_pdf_in_page_order() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "deck.pdf");
        let target = temp.path().join("p.png");

        let runner = Arc::new(FakeToolRunner::new());
        runner.set_page_count(3).await;
        let outputs = router(&runner)
            .convert(&source, &target, "pdf", "png")
            .await
            .unwrap();

        let names: Vec<_> = outputs
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["p-1.png", "p-2.png", "p-3.png"]);

        let calls = runner.invocations().await;
        assert_eq!(calls[0].spec.flag_value("-density").unwrap(), "300");
    }

    #[tokio::test]
    async fn test_multi_page_numeric_order_past_nine() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "long.pdf");
        let target = temp.path().join("p.png");

        let runner = Arc::new(FakeToolRunner::new());
        runner.set_page_count(12).await;
        let outputs = router(&runner)
            .convert(&source, &target, "pdf", "png")
            .await
            .unwrap();

        let expected: Vec<PathBuf> = (1..=12)
            .map(|i| temp.path().join(format!("p-{i}.png")))
            .collect();
        assert_eq!(outputs.paths(), expected.as_slice());
    }

    #[tokio::test]
    async fn test_document_to_image_removes_intermediate_pdf() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "letter.docx");
        let target = temp.path().join("letter-out.png");

        let runner = Arc::new(FakeToolRunner::new());
        let outputs = router(&runner)
            .convert(&source, &target, "docx", "png")
            .await
            .unwrap();

        assert_eq!(outputs.paths(), &[target]);
        assert!(!temp.path().join("letter.pdf").exists());
        assert_eq!(
            runner.tools_invoked().await,
            vec![ToolKind::OfficeConverter, ToolKind::Rasterizer]
        );
    }

    #[tokio::test]
    async fn test_image_to_document_removes_intermediate() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "scan.png");
        let target = temp.path().join("scan-out.docx");

        let runner = Arc::new(FakeToolRunner::new());
        let outputs = router(&runner)
            .convert(&source, &target, "png", "docx")
            .await
            .unwrap();

        assert_eq!(outputs.paths(), &[target]);
        assert_eq!(dir_listing(temp.path()), vec!["scan-out.docx", "scan.png"]);
        assert_eq!(
            runner.tools_invoked().await,
            vec![ToolKind::Rasterizer, ToolKind::OfficeConverter]
        );
    }

    #[tokio::test]
    async fn test_image_to_document_second_step_failure_removes_intermediate() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "scan.png");
        let target = temp.path().join("scan-out.docx");

        let runner = Arc::new(FakeToolRunner::new());
        runner.fail_tool(ToolKind::OfficeConverter).await;
        let err = router(&runner)
            .convert(&source, &target, "png", "docx")
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::Tool(_)));
        assert_eq!(dir_listing(temp.path()), vec!["scan.png"]);
    }

    #[tokio::test]
    async fn test_office_output_removed_when_converter_fails_after_writing() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "notes.txt");
        let target = temp.path().join("report.docx");

        let runner = Arc::new(FakeToolRunner::new());
        runner.fail_after_writing(ToolKind::OfficeConverter).await;
        let err = router(&runner)
            .convert(&source, &target, "txt", "docx")
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::Tool(_)));
        assert_eq!(dir_listing(temp.path()), vec!["notes.txt"]);
    }

    #[tokio::test]
    async fn test_image_to_document_partial_office_output_removed() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "scan.png");
        let target = temp.path().join("scan-out.docx");

        let runner = Arc::new(FakeToolRunner::new());
        runner.fail_after_writing(ToolKind::OfficeConverter).await;
        router(&runner)
            .convert(&source, &target, "png", "docx")
            .await
            .unwrap_err();

        assert_eq!(dir_listing(temp.path()), vec!["scan.png"]);
    }

    #[tokio::test]
    async fn test_image_to_pdf_is_direct() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "scan.jpg");
        let target = temp.path().join("scan-out.pdf");

        let runner = Arc::new(FakeToolRunner::new());
        router(&runner)
            .convert(&source, &target, "jpg", "pdf")
            .await
            .unwrap();

        assert_eq!(runner.tools_invoked().await, vec![ToolKind::Rasterizer]);
    }

    #[tokio::test]
    async fn test_media_transcode() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "clip.mov");
        let target = temp.path().join("clip-out.mp4");

        let runner = Arc::new(FakeToolRunner::new());
        router(&runner)
            .convert(&source, &target, "mov", "mp4")
            .await
            .unwrap();

        let calls = runner.invocations().await;
        assert_eq!(calls[0].spec.tool, ToolKind::MediaTranscoder);
        assert_eq!(calls[0].spec.flag_value("-loglevel").unwrap(), "error");
    }

    #[tokio::test]
    async fn test_unsupported_pair_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "song.mp3");
        let target = temp.path().join("song.png");

        let runner = Arc::new(FakeToolRunner::new());
        let err = router(&runner)
            .convert(&source, &target, "mp3", "png")
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::UnsupportedConversion { .. }));
        assert!(runner.invocations().await.is_empty());
    }

    #[tokio::test]
    async fn test_tool_exits_zero_without_output() {
        let temp = TempDir::new().unwrap();
        let source = write_file(temp.path(), "a.png");
        let target = temp.path().join("b.jpg");

        let runner = Arc::new(FakeToolRunner::new());
        runner.set_silent(ToolKind::Rasterizer).await;
        let err = router(&runner)
            .convert(&source, &target, "png", "jpg")
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::NoOutputProduced { .. }));
    }
}
