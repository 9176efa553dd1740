//! Rendering engine abstraction.
//!
//! A [`Renderer`] turns a source image plus its recognized spans into the
//! artifact files of the requested [`OutputMode`]. The production renderer
//! is [`OverlayRenderer`].

pub mod overlay;
pub mod pdf;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::StorageError;
use crate::model::{ArtifactKind, OutputMode, TextSpan};

pub use overlay::{OverlayRenderer, OverlayStyle};

/// Artifact kind → absolute path of the file actually written.
pub type RenderedArtifacts = BTreeMap<ArtifactKind, PathBuf>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to load image '{path}': {source}")]
    LoadImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image '{0}' has no pixels")]
    EmptyImage(PathBuf),

    #[error("Failed to encode overlay: {0}")]
    Encode(String),

    #[error("Failed to build PDF: {0}")]
    Pdf(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub trait Renderer {
    /// Writes the artifacts for `source` into `output_dir`.
    ///
    /// Always writes a `pdf`; in full mode also an `img`. The structured
    /// export is not the renderer's concern.
    fn render(
        &self,
        source: &Path,
        spans: &[TextSpan],
        output_dir: &Path,
        mode: OutputMode,
    ) -> Result<RenderedArtifacts, RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(
        &self,
        source: &Path,
        spans: &[TextSpan],
        output_dir: &Path,
        mode: OutputMode,
    ) -> Result<RenderedArtifacts, RenderError> {
        (**self).render(source, spans, output_dir, mode)
    }
}
