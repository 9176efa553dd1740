use std::path::{Path, PathBuf};

use crate::model::OutputMode;

/// Inputs of one batch run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub project: String,
    pub mode: OutputMode,
}

impl PipelineConfig {
    pub fn new(
        input_root: impl AsRef<Path>,
        output_root: impl AsRef<Path>,
        project: impl Into<String>,
        mode: OutputMode,
    ) -> Self {
        Self {
            input_root: input_root.as_ref().to_path_buf(),
            output_root: output_root.as_ref().to_path_buf(),
            project: project.into(),
            mode,
        }
    }

    /// `input_root/project`, the folder scanned for images.
    pub fn project_input_dir(&self) -> PathBuf {
        self.input_root.join(&self.project)
    }

    /// `output_root/project`, the folder artifacts are written to.
    pub fn project_output_dir(&self) -> PathBuf {
        self.output_root.join(&self.project)
    }
}
