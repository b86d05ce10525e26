/// Viewer configuration stored as RON
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::canvas::Color;
use crate::error::{ConfigError, MathError};
use crate::lighting::{Lighting, RenderingModes};
use crate::math::Vec3;
use crate::projection::Camera;
use crate::render::RenderParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
    pub ambient_color: [f32; 3],
    pub diffuse_color: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.2,
            diffuse_intensity: 0.8,
            ambient_color: [1.0, 1.0, 1.0],
            diffuse_color: [1.0, 1.0, 1.0],
        }
    }
}

/// Startup settings of the viewer. Every field is optional in the file.
///
/// ```ron
/// (
///     camera: (position: (3.0, 2.0, 6.0), fov_degrees: 45.0),
///     modes: (wireframe: true),
///     background: (0.0, 0.0, 0.0),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub modes: RenderingModes,
    pub base_color: [f32; 3],
    pub wire_color: [f32; 3],
    pub background: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            modes: RenderingModes::default(),
            base_color: [0.83, 0.83, 0.83],
            wire_color: [0.0, 0.0, 0.0],
            background: [0.1, 0.1, 0.12],
        }
    }
}

impl ViewerConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_ron_str(&std::fs::read_to_string(path)?)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Camera for a viewport with the given aspect ratio
    pub fn camera(&self, aspect: f32) -> Camera {
        let c = &self.camera;
        Camera::new(
            Vec3::from(c.position),
            Vec3::from(c.target),
            c.fov_degrees.to_radians(),
            aspect,
            c.near,
            c.far,
        )
    }

    /// Light mounted on `camera`
    pub fn lighting(&self, camera: &Camera) -> Result<Lighting, MathError> {
        let l = &self.lighting;
        Lighting::with_colors(
            camera,
            Color::from_array(l.ambient_color),
            Color::from_array(l.diffuse_color),
            l.ambient_intensity,
            l.diffuse_intensity,
        )
    }

    /// Frame parameters without texture, lighting or helper cameras
    pub fn render_params(&self) -> RenderParams<'static> {
        RenderParams {
            modes: self.modes,
            base_color: Color::from_array(self.base_color),
            wire_color: Color::from_array(self.wire_color),
            background: Color::from_array(self.background),
            ..RenderParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = ViewerConfig::from_ron_str("()").unwrap();
        assert_eq!(config, ViewerConfig::default());
        let camera = config.camera(2.0);
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 5.0));
        assert!((camera.fov() - std::f32::consts::FRAC_PI_3).abs() < 1e-6);
        assert_eq!(camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_partial_override() {
        let config = ViewerConfig::from_ron_str(
            "(camera: (position: (3.0, 2.0, 6.0)), modes: (wireframe: true), background: (0.0, 0.0, 0.0))",
        )
        .unwrap();
        assert_eq!(config.camera.position, [3.0, 2.0, 6.0]);
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert!(config.modes.wireframe);
        assert!(!config.modes.lighting);

        let params = config.render_params();
        assert_eq!(params.background, Color::BLACK);
        assert!(params.modes.wireframe);
        assert!(params.texture.is_none());
    }

    #[test]
    fn test_lighting_from_config() {
        let mut config = ViewerConfig::default();
        config.lighting.ambient_intensity = 0.5;
        let camera = config.camera(1.0);
        let lighting = config.lighting(&camera).unwrap();
        assert_eq!(lighting.ambient_intensity(), 0.5);
        assert!((lighting.direction() - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ViewerConfig::from_ron_str("(camera: oops)"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let mut config = ViewerConfig::default();
        config.modes.texture = true;
        config.camera.far = 250.0;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        config.save(&path).unwrap();
        assert_eq!(ViewerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(lighting: (diffuse_intensity: 0.4))").unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.lighting.diffuse_intensity, 0.4);
        assert!(matches!(
            ViewerConfig::load("/no/such/viewer.ron"),
            Err(ConfigError::Io(_))
        ));
    }
}
