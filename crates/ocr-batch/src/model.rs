//! Domain enums shared by the store, the renderer and the orchestrator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a registered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Pending,
    Processed,
    Failed,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }

    /// `processed` and `failed` are terminal; there is no retry.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown image status '{}'", other)),
        }
    }
}

/// Kind of derived output file tied to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Pdf,
    Img,
    Json,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Pdf, Self::Img, Self::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Img => "img",
            Self::Json => "json",
        }
    }

    /// File extension used when the artifact is written to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Img => "jpg",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "img" => Ok(Self::Img),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown artifact kind '{}'", other)),
        }
    }
}

/// Output-artifact inclusion policy.
///
/// Minimal keeps only the rendered PDF; full additionally keeps the
/// rasterized overlay and the structured export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Minimal,
    #[default]
    Full,
}

impl OutputMode {
    pub fn includes(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Pdf => true,
            ArtifactKind::Img | ArtifactKind::Json => matches!(self, Self::Full),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimal => f.write_str("minimal"),
            Self::Full => f.write_str("full"),
        }
    }
}

/// One recognized text region in image pixel space.
///
/// `bbox` is `(x1, y1, x2, y2)`. `confidence` is nominally in `[0, 1]` but
/// is not range-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub confidence: f64,
    pub bbox: [i64; 4],
}

impl TextSpan {
    pub fn new(text: impl Into<String>, confidence: f64, bbox: [i64; 4]) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }

    pub fn width(&self) -> i64 {
        self.bbox[2].saturating_sub(self.bbox[0]).max(0)
    }

    pub fn height(&self) -> i64 {
        self.bbox[3].saturating_sub(self.bbox[1]).max(0)
    }
}
