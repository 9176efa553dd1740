use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, info_span, warn};

use crate::db::{artifact_repo, image_repo, project_repo, span_repo, Database, ImageRow};
use crate::export::StructuredExport;
use crate::model::{ArtifactKind, ImageStatus, TextSpan};
use crate::recognition::{flatten, RecognitionEngine};
use crate::render::{RenderedArtifacts, Renderer};
use crate::sanitize;
use crate::storage::{file_name, file_stem, ArtifactStorage};

use super::config::PipelineConfig;
use super::error::{ImageFailure, PipelineError};
use super::progress::{ProgressEvent, ProgressReporter};
use super::report::{BatchReport, ImageOutcome, ImageReport};
use super::scanner::ImageScanner;

/// Batch orchestrator for one project folder.
///
/// Images are handled one at a time; each image's database writes commit
/// on their own so a later failure never undoes an earlier image.
pub struct Pipeline<E, R> {
    db: Database,
    engine: E,
    renderer: R,
    config: PipelineConfig,
}

impl<E: RecognitionEngine, R: Renderer> Pipeline<E, R> {
    pub fn new(db: Database, engine: E, renderer: R, config: PipelineConfig) -> Self {
        Self {
            db,
            engine,
            renderer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the batch once.
    ///
    /// Per-image failures are recorded in the report and on the image row;
    /// only a missing input folder, an unreadable folder or a store error
    /// aborts the run.
    pub fn run(&self, progress: &dyn ProgressReporter) -> Result<BatchReport, PipelineError> {
        let input_dir = self.config.project_input_dir();
        let output_dir = self.config.project_output_dir();

        let _batch_span = info_span!("batch",
            project = %self.config.project,
            mode = %self.config.mode,
        )
        .entered();

        if !input_dir.is_dir() {
            return Err(PipelineError::InputDirectoryMissing(input_dir));
        }

        let project = project_repo::ensure_project(
            &self.db,
            &self.config.project,
            &input_dir.display().to_string(),
        )?;
        let candidates = ImageScanner::new(&input_dir).scan()?;
        let total = candidates.len();
        info!(
            "Processing {} image(s) for project '{}'",
            total, project.name
        );

        let mut report = BatchReport::new(project.id, &project.name);
        let output_dir_text = output_dir.display().to_string();
        // Artifact stem -> file name of the image that owns it this run.
        let mut claimed_stems: HashMap<String, String> = HashMap::new();

        for (index, source) in candidates.iter().enumerate() {
            let filename = file_name(source);
            progress.report(ProgressEvent::Started {
                index,
                total,
                filename: filename.clone(),
            });

            let image =
                image_repo::register_image(&self.db, project.id, &filename, &output_dir_text)?;
            let stem = file_stem(source);
            let outcome = match claimed_stems.get(&stem) {
                Some(claimed_by) => {
                    let failure = ImageFailure::StemCollision {
                        stem,
                        claimed_by: claimed_by.clone(),
                    };
                    self.mark_failed(&image, source, failure)?
                }
                None => {
                    claimed_stems.insert(stem, filename.clone());
                    self.process_one(&image, source, &output_dir)?
                }
            };

            match &outcome {
                ImageOutcome::Processed { spans, .. } => {
                    progress.report(ProgressEvent::Processed {
                        filename: filename.clone(),
                        spans: *spans,
                    });
                }
                ImageOutcome::Failed { reason } => {
                    progress.report(ProgressEvent::Failed {
                        filename: filename.clone(),
                        reason: reason.clone(),
                    });
                }
            }

            report.images.push(ImageReport {
                image_id: image.id,
                filename,
                outcome,
            });
        }

        progress.report(ProgressEvent::Finished {
            processed: report.processed_count(),
            failed: report.failed_count(),
        });
        Ok(report)
    }

    /// Processes a registered image to a terminal status.
    fn process_one(
        &self,
        image: &ImageRow,
        source: &Path,
        output_dir: &Path,
    ) -> Result<ImageOutcome, PipelineError> {
        let _image_span = info_span!("image",
            image_id = image.id,
            filename = %sanitize::redact_path(source),
        )
        .entered();

        let spans = match self.recognize(source) {
            Ok(spans) => spans,
            Err(failure) => return self.mark_failed(image, source, failure),
        };
        debug!("Recognized {} span(s)", spans.len());

        span_repo::replace_spans(&self.db, image.id, &spans)?;

        let artifacts = match self.produce_artifacts(source, &spans, output_dir) {
            Ok(artifacts) => artifacts,
            Err(failure) => return self.mark_failed(image, source, failure),
        };

        artifact_repo::replace_artifacts(&self.db, image.id, &artifacts, self.config.mode)?;
        image_repo::update_status(&self.db, image.id, ImageStatus::Processed, None)?;

        Ok(ImageOutcome::Processed {
            spans: spans.len(),
            artifacts,
        })
    }

    fn recognize(&self, source: &Path) -> Result<Vec<TextSpan>, ImageFailure> {
        let _step = info_span!("recognize").entered();
        let results = self.engine.predict(source)?;
        Ok(flatten(results)?)
    }

    fn produce_artifacts(
        &self,
        source: &Path,
        spans: &[TextSpan],
        output_dir: &Path,
    ) -> Result<RenderedArtifacts, ImageFailure> {
        let mut artifacts = {
            let _step = info_span!("render").entered();
            self.renderer
                .render(source, spans, output_dir, self.config.mode)?
        };

        if self.config.mode.is_full() {
            let _step = info_span!("export").entered();
            let bytes = StructuredExport::from_spans(spans).to_json_bytes()?;
            let path = ArtifactStorage::new(output_dir).write(
                &file_stem(source),
                ArtifactKind::Json,
                &bytes,
            )?;
            artifacts.insert(ArtifactKind::Json, path);
        }

        Ok(artifacts)
    }

    fn mark_failed(
        &self,
        image: &ImageRow,
        source: &Path,
        failure: ImageFailure,
    ) -> Result<ImageOutcome, PipelineError> {
        let reason = failure.to_string();
        warn!(
            "Error processing {}: {}",
            sanitize::redact_path(source),
            reason
        );
        image_repo::update_status(&self.db, image.id, ImageStatus::Failed, None)?;
        Ok(ImageOutcome::Failed { reason })
    }
}
