//! Configuration structs with sensible defaults and RON persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "globe-viewer";
const CONFIG_FILE: &str = "config.ron";

/// Highest accepted `globe.detail`. Detail 256 is about 1.3M triangles.
pub const MAX_GLOBE_DETAIL: u32 = 256;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera and orbit-control settings.
    pub camera: CameraConfig,
    /// Celestial body settings.
    pub globe: GlobeConfig,
    /// Starfield backdrop settings.
    pub starfield: StarfieldConfig,
    /// Texture asset locations.
    pub assets: AssetConfig,
    /// UI control bindings.
    pub controls: ControlConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera configuration. Fixed for the lifetime of the viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Initial distance from the globe center.
    pub distance: f32,
    /// Orbit damping factor in (0, 1]; 1.0 stops instantly.
    pub damping: f32,
    /// Radians of orbit per pixel of mouse drag.
    pub rotate_speed: f32,
    /// Fraction of the current distance moved per scroll line.
    pub zoom_speed: f32,
    /// Closest allowed orbit distance.
    pub min_distance: f32,
    /// Farthest allowed orbit distance.
    pub max_distance: f32,
}

/// Celestial body configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobeConfig {
    /// Sphere radius in world units.
    pub radius: f32,
    /// Icosahedron subdivision detail.
    pub detail: u32,
    /// Axial tilt of the layer group around Z, in radians.
    pub tilt: f32,
    /// Per-frame rotation applied to every layer, in radians.
    pub animation_rate: f32,
}

/// Starfield configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Number of stars generated at startup.
    pub count: u32,
    /// Seed for the deterministic star placement.
    pub seed: u64,
}

/// Texture asset configuration. File names are resolved against `texture_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the texture images.
    pub texture_dir: PathBuf,
    /// Surface color map.
    pub surface_map: String,
    /// Surface specular map.
    pub specular_map: String,
    /// Surface bump map.
    pub bump_map: String,
    /// Night lights map.
    pub lights_map: String,
    /// Cloud color map.
    pub cloud_map: String,
    /// Cloud alpha map.
    pub cloud_alpha_map: String,
}

/// UI control bindings: control id (e.g. `clouds-btn`) to key name (e.g. `Digit3`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlConfig {
    /// The binding table.
    pub bindings: BTreeMap<String, String>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log frame statistics every this many frames (0 disables).
    pub stats_interval: u64,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Globe Viewer".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 3.0,
            damping: 0.03,
            rotate_speed: 0.008,
            zoom_speed: 0.05,
            min_distance: 1.2,
            max_distance: 20.0,
        }
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            detail: 12,
            tilt: 0.0,
            animation_rate: 0.0,
        }
    }
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 10_000,
            seed: 42,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("textures"),
            surface_map: "00_earthmap1k.jpg".to_string(),
            bump_map: "01_earthbump1k.jpg".to_string(),
            specular_map: "02_earthspec1k.jpg".to_string(),
            lights_map: "03_earthlights1k.jpg".to_string(),
            cloud_map: "04_earthcloudmap.jpg".to_string(),
            cloud_alpha_map: "05_earthcloudmaptrans.jpg".to_string(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        let bindings = [
            ("texture-btn", "Digit1"),
            ("lights-btn", "Digit2"),
            ("clouds-btn", "Digit3"),
            ("glow-btn", "Digit4"),
        ]
        .into_iter()
        .map(|(id, key)| (id.to_string(), key.to_string()))
        .collect();
        Self { bindings }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 600,
        }
    }
}

impl AssetConfig {
    /// Resolve a file name from this config against the texture directory.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.texture_dir.join(file_name)
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// The platform configuration directory for the viewer.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(APP_NAME))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Reject values the scene cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.globe.radius > 0.0 && self.globe.radius.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "globe.radius",
                reason: format!("must be positive, got {}", self.globe.radius),
            });
        }
        if self.globe.detail > MAX_GLOBE_DETAIL {
            return Err(ConfigError::Invalid {
                field: "globe.detail",
                reason: format!("must be at most {MAX_GLOBE_DETAIL}, got {}", self.globe.detail),
            });
        }
        if !(self.globe.animation_rate >= 0.0 && self.globe.animation_rate.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "globe.animation_rate",
                reason: format!("must not be negative, got {}", self.globe.animation_rate),
            });
        }
        let camera = &self.camera;
        for (field, value) in [
            ("camera.fov_degrees", camera.fov_degrees),
            ("camera.near", camera.near),
            ("camera.far", camera.far),
            ("camera.distance", camera.distance),
            ("camera.damping", camera.damping),
            ("camera.rotate_speed", camera.rotate_speed),
            ("camera.zoom_speed", camera.zoom_speed),
            ("camera.min_distance", camera.min_distance),
            ("camera.max_distance", camera.max_distance),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_degrees",
                reason: format!("must be in (0, 180), got {}", camera.fov_degrees),
            });
        }
        if !(self.camera.damping > 0.0 && self.camera.damping <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "camera.damping",
                reason: format!("must be in (0, 1], got {}", self.camera.damping),
            });
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(ConfigError::Invalid {
                field: "camera.near",
                reason: format!(
                    "need 0 < near < far, got near={} far={}",
                    self.camera.near, self.camera.far
                ),
            });
        }
        if !(camera.min_distance > 0.0 && camera.min_distance <= camera.max_distance) {
            return Err(ConfigError::Invalid {
                field: "camera.min_distance",
                reason: format!(
                    "need 0 < min_distance <= max_distance, got min={} max={}",
                    camera.min_distance, camera.max_distance
                ),
            });
        }
        Ok(())
    }
}
