pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod runner;
pub mod scanner;

pub use config::PipelineConfig;
pub use error::{ImageFailure, PipelineError};
pub use progress::{LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use report::{BatchReport, ImageOutcome, ImageReport};
pub use runner::Pipeline;
pub use scanner::{is_supported_image, ImageScanner, SUPPORTED_EXTENSIONS};
