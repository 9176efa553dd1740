use crate::render::RenderedArtifacts;

/// What happened to one image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    Processed {
        spans: usize,
        artifacts: RenderedArtifacts,
    },
    Failed {
        reason: String,
    },
}

impl ImageOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, ImageOutcome::Processed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub image_id: i64,
    pub filename: String,
    pub outcome: ImageOutcome,
}

/// Every file visited by one batch run, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub project_id: i64,
    pub project: String,
    pub images: Vec<ImageReport>,
}

impl BatchReport {
    pub fn new(project_id: i64, project: impl Into<String>) -> Self {
        Self {
            project_id,
            project: project.into(),
            images: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.images.len()
    }

    pub fn processed_count(&self) -> usize {
        self.images.iter().filter(|i| i.outcome.is_processed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.processed_count()
    }

    pub fn find(&self, filename: &str) -> Option<&ImageReport> {
        self.images.iter().find(|i| i.filename == filename)
    }
}
