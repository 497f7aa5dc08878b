//! Viewer configuration (window, camera, scene density, post-processing).
//! Loaded from starscape.ron at startup.

use renderer::{BloomSettings, Fog, RendererSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scene::SceneSettings;

pub const CONFIG_FILE: &str = "starscape.ron";

/// Bloom tunables as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomConfig {
    #[serde(default = "default_bloom_strength")]
    pub strength: f32,
    #[serde(default = "default_bloom_radius")]
    pub radius: f32,
    #[serde(default = "default_bloom_threshold")]
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            strength: default_bloom_strength(),
            radius: default_bloom_radius(),
            threshold: default_bloom_threshold(),
        }
    }
}

/// Persistent viewer settings. Loaded from `starscape.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_title")]
    pub title: String,
    /// Enable vsync (recommended to avoid tearing).
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Stars in each of the three shells.
    #[serde(default = "default_stars_per_shell")]
    pub stars_per_shell: usize,
    /// Fixed generation seed; a fresh scene every launch when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub bloom: BloomConfig,
    /// Tone mapping exposure.
    #[serde(default = "default_exposure")]
    pub exposure: f32,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_title() -> String {
    "Starscape".to_string()
}
fn default_true() -> bool {
    true
}
fn default_fov() -> f32 {
    75.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    2000.0
}
fn default_stars_per_shell() -> usize {
    procgen::DEFAULT_STARS_PER_SHELL
}
fn default_bloom_strength() -> f32 {
    0.8
}
fn default_bloom_radius() -> f32 {
    0.4
}
fn default_bloom_threshold() -> f32 {
    0.85
}
fn default_exposure() -> f32 {
    0.5
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            title: default_title(),
            vsync: default_true(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            stars_per_shell: default_stars_per_shell(),
            seed: None,
            bloom: BloomConfig::default(),
            exposure: default_exposure(),
        }
    }
}

impl ViewConfig {
    /// Load config from `starscape.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `starscape.ron`. Logs on error.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            vsync: self.vsync,
            bloom: BloomSettings {
                strength: self.bloom.strength,
                radius: self.bloom.radius,
                threshold: self.bloom.threshold,
            },
            exposure: self.exposure,
            fog: Fog::default(),
        }
    }

    pub fn scene_settings(&self) -> SceneSettings {
        SceneSettings {
            stars_per_shell: self.stars_per_shell,
            seed: self.seed,
            fov_degrees: self.fov,
            near: self.near,
            far: self.far,
        }
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_struct_uses_defaults() {
        let c: ViewConfig = ron::from_str("()").unwrap();
        assert_eq!(c, ViewConfig::default());
        assert_eq!(c.stars_per_shell, 5000);
        assert_eq!(c.bloom.threshold, 0.85);
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let c: ViewConfig = ron::from_str("(stars_per_shell: 100, seed: Some(7), bloom: (strength: 1.5))").unwrap();
        assert_eq!(c.stars_per_shell, 100);
        assert_eq!(c.seed, Some(7));
        assert_eq!(c.bloom.strength, 1.5);
        assert_eq!(c.bloom.radius, 0.4);
        assert_eq!(c.fov, 75.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("starscape-config-does-not-exist.ron");
        assert_eq!(ViewConfig::load_from(&path), ViewConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let path = std::env::temp_dir().join(format!("starscape-config-{}.ron", std::process::id()));
        let config = ViewConfig {
            seed: Some(42),
            exposure: 0.7,
            ..Default::default()
        };
        config.save_to(&path);
        let loaded = ViewConfig::load_from(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn settings_carry_config_values() {
        let c = ViewConfig {
            vsync: false,
            fov: 60.0,
            ..Default::default()
        };
        assert!(!c.renderer_settings().vsync);
        assert_eq!(c.renderer_settings().exposure, 0.5);
        assert_eq!(c.scene_settings().fov_degrees, 60.0);
    }
}
