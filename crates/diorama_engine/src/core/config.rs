//! # Viewer Configuration
//!
//! Settings for a walkthrough session, grouped by subsystem and loadable from
//! TOML or RON through the [`Config`] trait.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging, debug features, frame pacing
//! - **Camera Config**: start pose, movement tuning, collision sphere, projection

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
pub use crate::config::{Config, ConfigError, ConfigFormat};

/// # Engine Configuration
///
/// Core behavior shared by every viewer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
    /// Target FPS for frame pacing, `None` for unlimited
    pub target_fps: Option<u32>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
            target_fps: None,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(format!("Unknown log level: {}", self.log_level));
        }
        if self.target_fps == Some(0) {
            return Err("Target FPS must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Camera Configuration
///
/// Start pose and tuning of the fly camera. Distances are in scene units
/// (inches for the bundled scenes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Start position
    pub position: Vec3,
    /// Start heading about world up, degrees
    pub yaw_degrees: f32,
    /// Start pitch, degrees, clamped to +-90
    pub pitch_degrees: f32,
    /// Movement speed, units per second
    pub fly_speed: f32,
    /// Radians of rotation per pixel of mouse motion
    pub look_speed: f32,
    /// Exponent per wheel notch applied to the fly speed
    pub speed_adjust: f32,
    /// Radius of the collision sphere, 0 to fly through everything
    pub collision_radius: f32,
    /// Vertical field of view, degrees
    pub fov_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 128.0),
            yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            fly_speed: 70.0,
            look_speed: 0.007,
            speed_adjust: 0.2,
            collision_radius: 12.0,
            fov_degrees: 60.0,
            near: 5.0,
            far: 10_000.0,
        }
    }
}

impl CameraConfig {
    /// Set the start position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set the collision radius
    pub fn with_collision_radius(mut self, radius: f32) -> Self {
        self.collision_radius = radius;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fly_speed > 0.0) {
            return Err("Fly speed must be positive".to_string());
        }
        if self.collision_radius < 0.0 {
            return Err("Collision radius cannot be negative".to_string());
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(format!("Field of view out of range: {}", self.fov_degrees));
        }
        if !(self.near > 0.0) {
            return Err("Near plane must be in front of the camera".to_string());
        }
        if self.far <= self.near {
            return Err("Far plane must lie beyond the near plane".to_string());
        }
        Ok(())
    }
}

/// # Complete Viewer Configuration
///
/// Top-level configuration of the walkthrough application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Camera configuration
    pub camera: CameraConfig,
}

impl ViewerConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate().map_err(ConfigError::Invalid)?;
        self.camera.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("diorama_{}_{}", std::process::id(), name))
    }

    fn custom() -> ViewerConfig {
        ViewerConfig {
            engine: EngineConfig::new().with_log_level("debug").with_target_fps(30),
            camera: CameraConfig::default()
                .with_position(Vec3::new(10.0, -20.0, 64.0))
                .with_collision_radius(6.0),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("viewer.toml");
        let config = custom();
        config.save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_ron_round_trip() {
        let path = temp_path("viewer.ron");
        let config = custom();
        config.save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ViewerConfig::from_str_as(
            "[camera]\nfly_speed = 35.0\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(config.camera.fly_speed, 35.0);
        assert_eq!(config.camera.near, 5.0);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ViewerConfig::default().save_to_file(temp_path("viewer.json")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ViewerConfig::default();
        config.camera.far = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ViewerConfig::default();
        config.engine.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.camera.collision_radius = -1.0;
        assert!(config.validate().is_err());
    }
}
