pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod recognition;
pub mod render;
pub mod sanitize;
pub mod storage;

pub use config::{load_config, Config};
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, OcrBatchError, Result, StorageError};
pub use export::StructuredExport;
pub use model::{ArtifactKind, ImageStatus, OutputMode, TextSpan};
pub use pipeline::{
    BatchReport, ImageOutcome, LogProgress, NoopProgress, Pipeline, PipelineConfig,
    PipelineError, ProgressReporter,
};
pub use recognition::{RawRecognition, RecognitionEngine, RecognitionError, TesseractEngine};
pub use render::{OverlayRenderer, OverlayStyle, RenderError, RenderedArtifacts, Renderer};
