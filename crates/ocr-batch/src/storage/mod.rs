//! Output folder handling for derived artifacts.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::model::ArtifactKind;

/// Writes artifacts of one project into its output folder.
///
/// Artifact names are `{stem}_ocr.{ext}`; a rerun overwrites the previous
/// file of the same name.
pub struct ArtifactStorage {
    output_directory: PathBuf,
}

impl ArtifactStorage {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Path the artifact of `kind` for a source with file stem `stem` uses.
    pub fn artifact_path(&self, stem: &str, kind: ArtifactKind) -> PathBuf {
        self.output_directory
            .join(format!("{}_ocr.{}", stem, kind.extension()))
    }

    /// Writes `content` as the `kind` artifact of `stem` and returns its
    /// absolute path.
    pub fn write(
        &self,
        stem: &str,
        kind: ArtifactKind,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        self.ensure_directory()?;
        let path = self.artifact_path(stem, kind);
        write_replacing(&path, content)?;
        std::path::absolute(&path).map_err(|e| StorageError::ResolvePath { path, source: e })
    }

    pub fn ensure_directory(&self) -> Result<(), StorageError> {
        if !self.output_directory.exists() {
            std::fs::create_dir_all(&self.output_directory).map_err(|e| {
                StorageError::CreateDirectory {
                    path: self.output_directory.clone(),
                    source: e,
                }
            })?;
        }
        Ok(())
    }
}

/// Writes to a sibling temp file, then renames over `path`.
///
/// Readers never observe a half-written artifact.
fn write_replacing(path: &Path, content: &[u8]) -> Result<(), StorageError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let write_err = |e: std::io::Error| StorageError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = std::fs::File::create(&tmp_path).map_err(write_err)?;
    file.write_all(content).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        write_err(e)
    })
}

/// File stem of `path`, with invalid UTF-8 replaced by U+FFFD, falling back
/// to `"image"` when the path has no file name.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// File name of `path` as stored in the catalog, with invalid UTF-8 replaced
/// by U+FFFD.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
