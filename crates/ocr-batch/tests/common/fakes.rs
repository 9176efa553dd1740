#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;

use ocr_batch::model::{ArtifactKind, OutputMode, TextSpan};
use ocr_batch::recognition::{RawRecognition, RecognitionEngine, RecognitionError};
use ocr_batch::render::{RenderError, RenderedArtifacts, Renderer};
use ocr_batch::storage::{file_name, file_stem, ArtifactStorage};

/// Scripted reply for one file name.
#[derive(Clone)]
pub enum Script {
    Results(Vec<RawRecognition>),
    Fail(String),
}

/// Engine replying from a per-filename script. Unscripted files yield no
/// text.
#[derive(Default)]
pub struct ScriptedEngine {
    scripts: HashMap<String, Script>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// One well-formed result object built from `(text, score, box)` triples.
    pub fn with_spans(mut self, filename: &str, spans: &[(&str, f64, [i64; 4])]) -> Self {
        let raw = RawRecognition {
            rec_texts: spans.iter().map(|s| s.0.to_string()).collect(),
            rec_scores: spans.iter().map(|s| s.1).collect(),
            rec_boxes: spans.iter().map(|s| s.2).collect(),
        };
        self.scripts
            .insert(filename.to_string(), Script::Results(vec![raw]));
        self
    }

    pub fn with_results(mut self, filename: &str, results: Vec<RawRecognition>) -> Self {
        self.scripts
            .insert(filename.to_string(), Script::Results(results));
        self
    }

    pub fn failing(mut self, filename: &str, message: &str) -> Self {
        self.scripts
            .insert(filename.to_string(), Script::Fail(message.to_string()));
        self
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn predict(&self, image_path: &Path) -> Result<Vec<RawRecognition>, RecognitionError> {
        let name = file_name(image_path);
        match self.scripts.get(&name) {
            Some(Script::Results(results)) => Ok(results.clone()),
            Some(Script::Fail(message)) => Err(RecognitionError::Engine(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Renderer writing placeholder bytes instead of drawing.
#[derive(Default)]
pub struct FakeRenderer {
    failing: HashSet<String>,
    skip_img: bool,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, filename: &str) -> Self {
        self.failing.insert(filename.to_string());
        self
    }

    /// Never produce the `img` artifact, even in full mode.
    pub fn without_img(mut self) -> Self {
        self.skip_img = true;
        self
    }
}

impl Renderer for FakeRenderer {
    fn render(
        &self,
        source: &Path,
        spans: &[TextSpan],
        output_dir: &Path,
        mode: OutputMode,
    ) -> Result<RenderedArtifacts, RenderError> {
        let name = file_name(source);
        if self.failing.contains(&name) {
            return Err(RenderError::Encode(format!("cannot draw {}", name)));
        }

        let storage = ArtifactStorage::new(output_dir);
        let stem = file_stem(source);
        let mut written = RenderedArtifacts::new();

        let body = format!("{} spans", spans.len());
        written.insert(
            ArtifactKind::Pdf,
            storage.write(&stem, ArtifactKind::Pdf, body.as_bytes())?,
        );
        if mode.includes(ArtifactKind::Img) && !self.skip_img {
            written.insert(
                ArtifactKind::Img,
                storage.write(&stem, ArtifactKind::Img, body.as_bytes())?,
            );
        }
        Ok(written)
    }
}
