//! Scene configuration loading and validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Clear colour as 0xRRGGBB
    #[serde(default = "default_background")]
    pub background_color: u32,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub particles: ParticleConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background_color: default_background(),
            camera: CameraConfig::default(),
            model: ModelConfig::default(),
            particles: ParticleConfig::default(),
            environment: EnvironmentConfig::default(),
        }
    }
}

fn default_background() -> u32 {
    0x0a0a0a
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
    /// Upper polar limit, measured from the +Y axis
    #[serde(default = "default_max_polar")]
    pub max_polar_degrees: f32,
    #[serde(default = "default_damping")]
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            max_polar_degrees: default_max_polar(),
            damping: default_damping(),
        }
    }
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_min_distance() -> f32 {
    3.0
}

fn default_max_distance() -> f32 {
    10.0
}

fn default_max_polar() -> f32 {
    120.0
}

fn default_damping() -> f32 {
    0.05
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Asset path or URL of the glTF/GLB model
    #[serde(default = "default_model_url")]
    pub url: String,
    #[serde(default = "default_model_scale")]
    pub scale: f32,
    #[serde(default = "default_model_y_offset")]
    pub y_offset: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            scale: default_model_scale(),
            y_offset: default_model_y_offset(),
        }
    }
}

fn default_model_url() -> String {
    "assets/samurai.glb".to_string()
}

fn default_model_scale() -> f32 {
    1.5
}

fn default_model_y_offset() -> f32 {
    -1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    #[serde(default = "default_particle_count")]
    pub count: usize,
    /// Fixed sampling seed; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: default_particle_count(),
            seed: None,
        }
    }
}

fn default_particle_count() -> usize {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Disabled maps are never requested
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cube faces in +X, -X, +Y, -Y, +Z, -Z order
    #[serde(default = "default_faces")]
    pub faces: [String; 6],
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            faces: default_faces(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_faces() -> [String; 6] {
    ["px", "nx", "py", "ny", "pz", "nz"].map(|face| format!("assets/envmap/{face}.jpg"))
}

impl SceneConfig {
    /// Reject values that would produce a degenerate camera or scene
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::invalid(
                "camera.fov_degrees",
                format!("must be within (0, 180), got {}", camera.fov_degrees),
            ));
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::invalid(
                "camera.near",
                format!("must satisfy 0 < near < far, got near={} far={}", camera.near, camera.far),
            ));
        }
        if !(camera.min_distance > 0.0 && camera.min_distance <= camera.max_distance) {
            return Err(ConfigError::invalid(
                "camera.min_distance",
                format!(
                    "must satisfy 0 < min <= max, got min={} max={}",
                    camera.min_distance, camera.max_distance
                ),
            ));
        }
        if !(camera.max_polar_degrees > 0.0 && camera.max_polar_degrees <= 180.0) {
            return Err(ConfigError::invalid(
                "camera.max_polar_degrees",
                format!("must be within (0, 180], got {}", camera.max_polar_degrees),
            ));
        }
        if !(camera.damping > 0.0 && camera.damping <= 1.0) {
            return Err(ConfigError::invalid(
                "camera.damping",
                format!("must be within (0, 1], got {}", camera.damping),
            ));
        }
        if !(self.model.scale > 0.0) {
            return Err(ConfigError::invalid(
                "model.scale",
                format!("must be positive, got {}", self.model.scale),
            ));
        }
        if self.model.url.trim().is_empty() {
            return Err(ConfigError::invalid("model.url", "must not be empty"));
        }
        if self.background_color > 0xff_ffff {
            return Err(ConfigError::invalid(
                "background_color",
                format!("must be a 0xRRGGBB value, got {:#x}", self.background_color),
            ));
        }
        Ok(())
    }
}

/// Load configuration from file, falling back to defaults when absent
pub fn load_config(path: &Path) -> Result<SceneConfig, ConfigError> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: SceneConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        config
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        SceneConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&SceneConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_scene_surface() {
        let config = SceneConfig::default();
        assert_eq!(config.background_color, 0x0a0a0a);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.camera.far, 1000.0);
        assert_eq!(config.camera.min_distance, 3.0);
        assert_eq!(config.camera.max_distance, 10.0);
        assert_eq!(config.model.scale, 1.5);
        assert_eq!(config.model.y_offset, -1.0);
        assert_eq!(config.particles.count, 100);
        let env = config.environment;
        assert!(env.enabled);
        assert_eq!(env.faces[0], "assets/envmap/px.jpg");
        assert_eq!(env.faces[5], "assets/envmap/nz.jpg");
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: SceneConfig = toml::from_str(
            r#"
            background_color = 0x101010

            [model]
            url = "models/statue.glb"

            [particles]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.background_color, 0x101010);
        assert_eq!(config.model.url, "models/statue.glb");
        assert_eq!(config.model.scale, 1.5);
        assert_eq!(config.particles.count, 100);
        assert_eq!(config.particles.seed, Some(7));
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_saved_default_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vitrine.toml");
        save_default_config(&path).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[camera]\nmin_distance = 12.0\nmax_distance = 4.0\n").unwrap();

        match load_config(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "camera.min_distance"),
            other => panic!("expected invalid config, got {:?}", other),
        }

        let mut config = SceneConfig::default();
        config.camera.near = 2000.0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.camera.damping = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[camera\nfov_degrees = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
    }
}
