//! Structured export document written beside the rendered artifacts.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::model::TextSpan;

/// Three index-aligned arrays describing every recognized span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredExport {
    pub rec_texts: Vec<String>,
    pub rec_scores: Vec<f64>,
    pub rec_boxes: Vec<[i64; 4]>,
}

impl StructuredExport {
    pub fn from_spans(spans: &[TextSpan]) -> Self {
        Self {
            rec_texts: spans.iter().map(|s| s.text.clone()).collect(),
            rec_scores: spans.iter().map(|s| s.confidence).collect(),
            rec_boxes: spans.iter().map(|s| s.bbox).collect(),
        }
    }

    /// Pretty-printed UTF-8 JSON; non-ASCII text is kept verbatim.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
