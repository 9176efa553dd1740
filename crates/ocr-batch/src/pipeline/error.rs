use std::path::PathBuf;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::error::StorageError;
use crate::recognition::RecognitionError;
use crate::render::RenderError;

/// Errors that abort the whole batch.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input directory '{0}' does not exist")]
    InputDirectoryMissing(PathBuf),

    #[error("Failed to scan '{path}': {reason}")]
    Scan { path: PathBuf, reason: String },

    #[error("Store error: {0}")]
    Database(#[from] DatabaseError),
}

/// Errors confined to a single image. The image is marked `failed` and the
/// batch moves on.
#[derive(Error, Debug)]
pub enum ImageFailure {
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("export failed: {0}")]
    Export(#[from] StorageError),

    #[error("artifact name '{stem}' is already used by '{claimed_by}' in this batch")]
    StemCollision { stem: String, claimed_by: String },
}
