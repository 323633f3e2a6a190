use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque locator for image bytes: a filesystem path or a `file://` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(locator: impl Into<String>) -> Self {
        ImageRef(locator.into())
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageRef(path.into().to_string_lossy().to_string())
    }

    /// Local path the reference points at. `file:` URIs are decoded; any
    /// other string is taken as a path.
    pub fn to_path(&self) -> PathBuf {
        if self.0.starts_with("file:") {
            if let Some(path) = tauri::Url::parse(&self.0)
                .ok()
                .and_then(|url| url.to_file_path().ok())
            {
                return path;
            }
        }
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NoImage,
    ImageSelected,
    Classifying,
    ResultShown,
    Failed,
}

/// What the analysis screen hands to the result screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResultHandoff {
    pub label: Option<String>,
    pub score: Option<f32>,
    pub image: Option<ImageRef>,
}

/// Saved state, restored after the process is suspended and brought back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionSnapshot {
    pub current_image: Option<ImageRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub current_image: Option<ImageRef>,
}

/// Pixel rectangle chosen in the crop UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
