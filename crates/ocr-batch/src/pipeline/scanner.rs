use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::error::PipelineError;

/// Extensions accepted as input images, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Lists the candidate images directly inside a project folder.
pub struct ImageScanner {
    input_directory: PathBuf,
}

impl ImageScanner {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
        }
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    /// Returns regular files with a supported extension, sorted by file
    /// name. Subdirectories are not descended into.
    pub fn scan(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let mut images = Vec::new();

        for entry in WalkDir::new(&self.input_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(PipelineError::Scan {
                        path: self.input_directory.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if is_supported_image(path) {
                debug!("Found image: {}", path.display());
                images.push(path.to_path_buf());
            }
        }

        info!(
            "Scanned {} images in {}",
            images.len(),
            self.input_directory.display()
        );
        Ok(images)
    }
}
