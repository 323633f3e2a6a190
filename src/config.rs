//! Application settings, read once at start-up from `asclepius.json` in the
//! app config directory. Every field has a default so a missing file or a
//! partial file is fine.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "asclepius.json";

/// Memory layout of the input tensor expected by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    #[default]
    Nhwc,
    Nchw,
}

/// Transform applied to the raw model output before ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreActivation {
    /// The model already outputs probabilities.
    #[default]
    Identity,
    Softmax,
    Sigmoid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Model file inside the bundled `models/` resource directory.
    pub model_name: String,
    /// Label sidecar (`{"id2label": {"0": "...", ...}}`) next to the model.
    pub labels_name: String,
    pub score_threshold: f32,
    pub max_results: usize,
    pub num_threads: usize,
    /// Side of the square input the image is resampled to.
    pub input_size: u32,
    pub layout: TensorLayout,
    pub activation: ScoreActivation,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_name: "cancer_classification.onnx".to_string(),
            labels_name: "cancer_classification.json".to_string(),
            score_threshold: 0.1,
            max_results: 3,
            num_threads: 4,
            input_size: 224,
            layout: TensorLayout::Nhwc,
            activation: ScoreActivation::Identity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    /// Aspect ratio as (x, y); the crop region is forced to it.
    pub aspect_ratio: (u32, u32),
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality of the cropped output, 1..=100.
    pub quality: u8,
    pub output_name: String,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            aspect_ratio: (1, 1),
            max_width: 1000,
            max_height: 1000,
            quality: 90,
            output_name: "cropped_img.jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub crop: CropOptions,
}

impl AppConfig {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            AppError::config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let c = &self.classifier;
        if !(0.0..=1.0).contains(&c.score_threshold) {
            return Err(AppError::config(format!(
                "score_threshold must be within 0..=1, got {}",
                c.score_threshold
            )));
        }
        if c.max_results == 0 {
            return Err(AppError::config("max_results must be at least 1"));
        }
        if c.num_threads == 0 {
            return Err(AppError::config("num_threads must be at least 1"));
        }
        if c.input_size == 0 {
            return Err(AppError::config("input_size must be at least 1"));
        }

        let crop = &self.crop;
        if crop.aspect_ratio.0 == 0 || crop.aspect_ratio.1 == 0 {
            return Err(AppError::config("aspect_ratio components must be non-zero"));
        }
        if crop.max_width == 0 || crop.max_height == 0 {
            return Err(AppError::config("crop bounds must be non-zero"));
        }
        if crop.quality == 0 || crop.quality > 100 {
            return Err(AppError::config(format!(
                "crop quality must be within 1..=100, got {}",
                crop.quality
            )));
        }
        if crop.output_name.trim().is_empty() {
            return Err(AppError::config("crop output_name must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.classifier.score_threshold, 0.1);
        assert_eq!(config.classifier.max_results, 3);
        assert_eq!(config.classifier.num_threads, 4);
        assert_eq!(config.classifier.input_size, 224);
        assert_eq!(config.crop.aspect_ratio, (1, 1));
        assert_eq!(config.crop.max_width, 1000);
        assert_eq!(config.crop.quality, 90);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"classifier": {"max_results": 1, "layout": "nchw", "activation": "softmax"}}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.classifier.max_results, 1);
        assert_eq!(config.classifier.layout, TensorLayout::Nchw);
        assert_eq!(config.classifier.activation, ScoreActivation::Softmax);
        assert_eq!(config.classifier.score_threshold, 0.1);
        assert_eq!(config.crop, CropOptions::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"classifier": {"score_threshold": 1.5}}"#).unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Config);

        std::fs::write(&path, r#"{"crop": {"quality": 0}}"#).unwrap();
        assert!(AppConfig::load(&path).is_err());

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(AppConfig::load(&path).unwrap_err().kind, ErrorKind::Config);
    }
}
