use tracing::{info, warn};

/// Events emitted by the pipeline while walking a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// `index` is zero-based.
    Started {
        index: usize,
        total: usize,
        filename: String,
    },
    Processed {
        filename: String,
        spans: usize,
    },
    Failed {
        filename: String,
        reason: String,
    },
    Finished {
        processed: usize,
        failed: usize,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Writes every event to the tracing log.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started {
                index,
                total,
                filename,
            } => info!("[{}/{}] Processing {}", index + 1, total, filename),
            ProgressEvent::Processed { filename, spans } => {
                info!("Done: {} ({} spans)", filename, spans)
            }
            ProgressEvent::Failed { filename, reason } => {
                warn!("Error processing {}: {}", filename, reason)
            }
            ProgressEvent::Finished { processed, failed } => {
                info!("Batch finished: {} processed, {} failed", processed, failed)
            }
        }
    }
}
