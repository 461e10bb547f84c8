use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use moodlens_core::shared::config::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MIN_FACE_SIZE, DEFAULT_MIN_NEIGHBORS,
    DEFAULT_SCALE_FACTOR, DEFAULT_TARGET_FPS,
};
use moodlens_core::shared::constants::APP_DIR_NAME;

/// Persisted user preferences. Command-line flags override these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_fps: u32,
    pub confidence: f32,
    pub min_neighbors: u32,
    pub scale_factor: f64,
    pub min_face_size: (u32, u32),
    pub camera_index: u32,
    pub weights_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub emotion_model_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            confidence: DEFAULT_CONFIDENCE_THRESHOLD,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            camera_index: 0,
            weights_dir: None,
            output_dir: None,
            font: None,
            emotion_model_url: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Defaults when the file is missing; a malformed file is logged and
    /// ignored.
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> io::Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}
