//! Isolated environment for pipeline integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use ocr_batch::db::Database;
use ocr_batch::model::OutputMode;
use ocr_batch::pipeline::{BatchReport, NoopProgress, Pipeline, PipelineConfig, PipelineError};
use ocr_batch::recognition::RecognitionEngine;
use ocr_batch::render::Renderer;

pub struct TestHarness {
    temp_dir: TempDir,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub db: Database,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_root = temp_dir.path().join("input");
        let output_root = temp_dir.path().join("output");
        std::fs::create_dir_all(&input_root).expect("Failed to create input root");

        let db = Database::open(&temp_dir.path().join("db").join("ocr-batch.db"))
            .expect("Failed to open database");

        Self {
            temp_dir,
            input_root,
            output_root,
            db,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Creates `input_root/project` and returns it.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        let dir = self.input_root.join(project);
        std::fs::create_dir_all(&dir).expect("Failed to create project dir");
        dir
    }

    /// Writes raw bytes as an input file of `project`.
    pub fn write_file(&self, project: &str, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.project_dir(project).join(filename);
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    /// Writes a small decodable PNG as an input image of `project`.
    pub fn write_png(&self, project: &str, filename: &str) -> PathBuf {
        let path = self.project_dir(project).join(filename);
        image::RgbImage::from_pixel(24, 16, image::Rgb([200, 200, 200]))
            .save_with_format(&path, image::ImageFormat::Png)
            .expect("Failed to write png");
        path
    }

    pub fn output_dir(&self, project: &str) -> PathBuf {
        self.output_root.join(project)
    }

    pub fn config(&self, project: &str, mode: OutputMode) -> PipelineConfig {
        PipelineConfig::new(&self.input_root, &self.output_root, project, mode)
    }

    pub fn run<E: RecognitionEngine, R: Renderer>(
        &self,
        project: &str,
        mode: OutputMode,
        engine: E,
        renderer: R,
    ) -> Result<BatchReport, PipelineError> {
        Pipeline::new(self.db.clone(), engine, renderer, self.config(project, mode))
            .run(&NoopProgress)
    }
}
