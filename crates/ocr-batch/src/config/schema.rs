use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file; `None` uses the per-user default location.
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Tessdata directory. `OCR_BATCH_TESSDATA` takes precedence.
    #[serde(default)]
    pub data_path: Option<String>,
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            data_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub font_path: Option<String>,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    #[serde(default = "default_bbox_thickness")]
    pub bbox_thickness: i32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_font_scale() -> f32 {
    16.0
}

fn default_bbox_thickness() -> i32 {
    1
}

fn default_jpeg_quality() -> u8 {
    90
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_scale: default_font_scale(),
            bbox_thickness: default_bbox_thickness(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}
