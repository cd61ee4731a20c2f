//! Viewer settings loadable from a JSON file. All sub-structs use
//! `#[serde(default)]` so a partial file only overrides what it names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ViewerOptions {
    pub window: WindowOptions,
    pub camera: CameraOptions,
    pub controls: ControlOptions,
    /// Directory holding the furniture models.
    pub assets_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlOptions {
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "room-viewer".to_string(),
        }
    }
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            damping: crate::orbit::ORBIT_DAMPING,
            min_distance: crate::orbit::MIN_DISTANCE,
            max_distance: crate::orbit::MAX_DISTANCE,
        }
    }
}

impl ViewerOptions {
    /// Loads options from a JSON file, filling missing fields from the
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read options file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse options file {}", path.display()))
    }
}
