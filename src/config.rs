//! Demo configuration with sensible defaults and RON loading.
//!
//! Every struct is `#[serde(default)]`, so a config file only needs the
//! fields it wants to change:
//!
//! ```
//! use jovian::Config;
//!
//! let config = Config::from_ron_str("(planet: (omega: 0.01))").unwrap();
//! assert_eq!(config.planet.omega, 0.01);
//! assert_eq!(config.camera.fov_degrees, 75.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the optional config file the demo looks for in the working directory.
pub const CONFIG_FILE_NAME: &str = "jovian.ron";

/// Top-level demo configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// The planet body and its spin.
    pub planet: PlanetConfig,
    /// The translucent shell around the planet.
    pub atmosphere: AtmosphereConfig,
    /// The fixed viewing camera.
    pub camera: CameraConfig,
    /// The spotlight standing in for the sun.
    pub light: LightConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title.
    pub title: String,
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Pace frames to the display refresh (PresentMode::Fifo).
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Jupiter".to_string(),
            width: 800,
            height: 600,
            vsync: true,
        }
    }
}

/// Planet body configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// Sphere radius in world units.
    pub radius: f32,
    /// Longitudinal sphere segments.
    pub width_segments: u32,
    /// Latitudinal sphere segments.
    pub height_segments: u32,
    /// Axial tilt in radians about world X, Y and Z (applied in that order).
    pub tilt: [f64; 3],
    /// Spin per rendered frame, in radians.
    pub omega: f64,
    /// One-time rotation applied before the first frame, in radians.
    pub initial_phase: Option<f64>,
    /// Surface texture image. `None` renders the bare material.
    pub texture: Option<String>,
    /// Base color as `0xRRGGBB`.
    pub color: u32,
    /// Emissive color as `0xRRGGBB`.
    pub emissive: u32,
    pub emissive_intensity: f32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 32,
            tilt: [-0.3, 0.9, 0.3],
            omega: 0.002,
            // Just before the great red spot comes into view
            initial_phase: Some(9.0 * std::f64::consts::PI / 8.0),
            texture: Some("assets/jupiter2_4k.jpg".to_string()),
            color: 0xffffff,
            emissive: 0xad2301,
            emissive_intensity: 0.12,
        }
    }
}

/// Atmosphere shell configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtmosphereConfig {
    pub enabled: bool,
    /// Shell radius relative to the planet radius.
    pub scale: f32,
    /// Segments used both around and from pole to pole.
    pub segments: u32,
    pub color: u32,
    pub emissive: u32,
    pub emissive_intensity: f32,
    /// Alpha of the shell (0.0 - 1.0).
    pub opacity: f32,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.03,
            segments: 32,
            color: 0xffffff,
            emissive: 0xff3807,
            emissive_intensity: 0.95,
            opacity: 0.1,
        }
    }
}

/// Perspective camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Point the camera looks at.
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 5.0,
            position: [0.0, 0.0, 2.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Spotlight configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    pub color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Half-angle of the cone in radians.
    pub angle: f32,
    /// Fraction of the cone (0.0 - 1.0) over which the light fades out.
    pub penumbra: f32,
    /// Flat light added everywhere, so the night side is not pure black.
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 1.0,
            position: [-4.0, 3.0, 5.0],
            target: [0.0, 0.0, 0.0],
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            ambient: 0.0,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Draw a wireframe cone showing the spotlight.
    pub light_helper: bool,
    /// Log filter override (e.g., "debug", "jovian=trace").
    pub log_level: String,
}

impl Config {
    /// Parse a config from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(ConfigError::Parse)
    }

    /// Serialize this config as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::Serialize)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_ron_str(&text)
    }

    /// Load a config file, falling back to defaults if it does not exist.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write this config to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_ron_string()?;
        std::fs::write(path, text).map_err(ConfigError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let text = config.to_ron_string().unwrap();
        assert!(text.contains("planet"));
        assert!(text.contains("omega"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.planet.tilt = [0.1, 0.2, 0.3];
        config.debug.light_helper = true;
        let text = config.to_ron_string().unwrap();
        assert_eq!(Config::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_defaults_match_the_demo() {
        let config = Config::default();
        assert_eq!(config.planet.tilt, [-0.3, 0.9, 0.3]);
        assert_eq!(config.planet.omega, 0.002);
        assert_eq!(
            config.planet.initial_phase,
            Some(9.0 * std::f64::consts::PI / 8.0)
        );
        assert_eq!(config.atmosphere.scale, 1.03);
        assert_eq!(config.camera.position, [0.0, 0.0, 2.0]);
        assert_eq!(config.light.position, [-4.0, 3.0, 5.0]);
        assert!(!config.debug.light_helper);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let config = Config::from_ron_str("(window: (title: \"Io\"))").unwrap();
        assert_eq!(config.window.title, "Io");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.planet, PlanetConfig::default());
    }

    #[test]
    fn test_disable_initial_phase_and_texture() {
        let config =
            Config::from_ron_str("(planet: (initial_phase: None, texture: None))").unwrap();
        assert_eq!(config.planet.initial_phase, None);
        assert_eq!(config.planet.texture, None);
    }

    #[test]
    fn test_extra_field_ignored() {
        let config = Config::from_ron_str("(planet: (moons: 95), shininess: 3)").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result = Config::from_ron_str("(planet: (omega: \"fast\"))");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.planet.omega = 0.004;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.ron");
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
        assert!(matches!(Config::load(&path), Err(ConfigError::Read(_))));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "(planet: (").unwrap();
        assert!(matches!(
            Config::load_or_default(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
