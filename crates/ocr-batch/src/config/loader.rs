use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.ocr.languages.is_empty() {
        return Err(ConfigError::Validation {
            message: "ocr.languages must list at least one language".to_string(),
        });
    }

    if let Some(lang) = config.ocr.languages.iter().find(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: format!("Invalid OCR language code: '{}'", lang),
        });
    }

    let scale = config.render.font_scale;
    if scale.is_nan() || scale <= 0.0 {
        return Err(ConfigError::Validation {
            message: format!(
                "render.font_scale must be positive, got {}",
                config.render.font_scale
            ),
        });
    }

    if config.render.bbox_thickness < 1 {
        return Err(ConfigError::Validation {
            message: format!(
                "render.bbox_thickness must be at least 1, got {}",
                config.render.bbox_thickness
            ),
        });
    }

    if !(1..=100).contains(&config.render.jpeg_quality) {
        return Err(ConfigError::Validation {
            message: format!(
                "render.jpeg_quality must be within 1..=100, got {}",
                config.render.jpeg_quality
            ),
        });
    }

    Ok(())
}
