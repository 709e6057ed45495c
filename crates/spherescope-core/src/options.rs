//! Configuration options for spherescope.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Global configuration options for spherescope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Title of the viewer window.
    pub window_title: String,

    /// Initial window size in physical pixels.
    pub window_size: (u32, u32),

    /// Whether to recompute scene extents when structures change.
    pub auto_compute_scene_extents: bool,

    /// Background color.
    pub background_color: Vec3,

    /// Color given to newly registered sphere meshes.
    pub default_mesh_color: Vec3,

    /// Name of the material used to shade sphere meshes.
    pub material: String,

    /// Segment count of the sphere and cone templates.
    pub template_segments: u32,

    /// Maximum frames per second (0 = unlimited).
    pub max_fps: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            window_title: "spherescope".to_string(),
            window_size: (1280, 720),
            auto_compute_scene_extents: true,
            background_color: Vec3::new(1.0, 1.0, 1.0),
            default_mesh_color: Vec3::new(0.78, 0.58, 0.42),
            material: "clay".to_string(),
            template_segments: 64,
            max_fps: 60,
        }
    }
}

impl Options {
    /// Loads options from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes options to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default() {
        let options = Options::default();
        assert_eq!(options.template_segments, 64);
        assert!(options.auto_compute_scene_extents);
        assert_eq!(options.window_size, (1280, 720));
        assert_eq!(options.material, "clay");
    }

    #[test]
    fn test_options_partial_json() {
        let options: Options = serde_json::from_str(r#"{"max_fps": 30}"#).unwrap();
        assert_eq!(options.max_fps, 30);
        assert_eq!(options.template_segments, 64);
    }

    #[test]
    fn test_options_save_load() {
        let path = std::env::temp_dir().join("spherescope_options_test.json");
        let options = Options {
            background_color: Vec3::new(0.1, 0.2, 0.3),
            ..Options::default()
        };
        options.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, options);
        let _ = std::fs::remove_file(&path);
    }
}
