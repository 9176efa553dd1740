//! Text-recognition engine abstraction.
//!
//! The orchestrator only sees [`RecognitionEngine`]; the production backend
//! is [`tesseract::TesseractEngine`] and tests substitute scripted engines.

pub mod tesseract;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::TextSpan;

pub use tesseract::TesseractEngine;

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Failed to read image '{path}': {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialize recognition engine: {0}")]
    Init(String),

    #[error("Recognition failed: {0}")]
    Engine(String),

    #[error(
        "Malformed recognition result: {texts} texts, {scores} scores, {boxes} boxes"
    )]
    MalformedResult {
        texts: usize,
        scores: usize,
        boxes: usize,
    },
}

/// One result object from the engine: three parallel sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecognition {
    pub rec_texts: Vec<String>,
    pub rec_scores: Vec<f64>,
    pub rec_boxes: Vec<[i64; 4]>,
}

impl RawRecognition {
    pub fn is_well_formed(&self) -> bool {
        self.rec_texts.len() == self.rec_scores.len()
            && self.rec_texts.len() == self.rec_boxes.len()
    }
}

pub trait RecognitionEngine {
    /// Recognizes text in the image at `image_path`.
    fn predict(&self, image_path: &Path) -> Result<Vec<RawRecognition>, RecognitionError>;
}

impl<E: RecognitionEngine + ?Sized> RecognitionEngine for Box<E> {
    fn predict(&self, image_path: &Path) -> Result<Vec<RawRecognition>, RecognitionError> {
        (**self).predict(image_path)
    }
}

/// Flattens engine output into spans, zipping each result positionally.
///
/// A result whose three sequences differ in length is rejected rather than
/// truncated to the shortest.
pub fn flatten(results: Vec<RawRecognition>) -> Result<Vec<TextSpan>, RecognitionError> {
    let mut spans = Vec::new();
    for result in results {
        if !result.is_well_formed() {
            return Err(RecognitionError::MalformedResult {
                texts: result.rec_texts.len(),
                scores: result.rec_scores.len(),
                boxes: result.rec_boxes.len(),
            });
        }
        spans.extend(
            result
                .rec_texts
                .into_iter()
                .zip(result.rec_scores)
                .zip(result.rec_boxes)
                .map(|((text, confidence), bbox)| TextSpan {
                    text,
                    confidence,
                    bbox,
                }),
        );
    }
    Ok(spans)
}
