/// Single camera-mounted directional light and the rendering mode switches
use serde::{Deserialize, Serialize};

use crate::canvas::Color;
use crate::error::MathError;
use crate::math::{Vec3, VectorExt};
use crate::projection::Camera;

/// Which optional stages of the pipeline are active.
///
/// The flags are independent. Wireframe is drawn on top of the fill, never
/// instead of it; texture and lighting switch the fill to the shaded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingModes {
    pub wireframe: bool,
    pub texture: bool,
    pub lighting: bool,
}

impl RenderingModes {
    pub fn new(wireframe: bool, texture: bool, lighting: bool) -> Self {
        Self {
            wireframe,
            texture,
            lighting,
        }
    }

    /// Whether the fill needs the shaded path (texture or lighting)
    pub fn shaded_fill(&self) -> bool {
        self.texture || self.lighting
    }
}

/// Lambertian light placed at the camera.
///
/// Intensities are clamped to `[0, 1]` on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    direction: Vec3,
    ambient_color: Color,
    diffuse_color: Color,
    ambient_intensity: f32,
    diffuse_intensity: f32,
}

impl Lighting {
    pub fn new(camera: &Camera, ambient_intensity: f32, diffuse_intensity: f32) -> Result<Self, MathError> {
        Self::with_colors(camera, Color::WHITE, Color::WHITE, ambient_intensity, diffuse_intensity)
    }

    pub fn with_colors(
        camera: &Camera,
        ambient_color: Color,
        diffuse_color: Color,
        ambient_intensity: f32,
        diffuse_intensity: f32,
    ) -> Result<Self, MathError> {
        Ok(Self {
            direction: (camera.target() - camera.position()).checked_normalize()?,
            ambient_color,
            diffuse_color,
            ambient_intensity: ambient_intensity.clamp(0.0, 1.0),
            diffuse_intensity: diffuse_intensity.clamp(0.0, 1.0),
        })
    }

    /// Follow the camera after it moved
    pub fn update(&mut self, camera: &Camera) -> Result<(), MathError> {
        self.direction = (camera.target() - camera.position()).checked_normalize()?;
        Ok(())
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_intensity
    }

    pub fn diffuse_intensity(&self) -> f32 {
        self.diffuse_intensity
    }

    /// Lambert term `max(0, n . l)` for a surface point lit from `light_position`.
    ///
    /// A point sitting on the light is lit along the light's own direction;
    /// a zero normal gets no diffuse light.
    pub fn intensity(&self, normal: &Vec3, position: &Vec3, light_position: &Vec3) -> f32 {
        let Ok(n) = normal.checked_normalize() else {
            return 0.0;
        };
        let l = (light_position - position)
            .checked_normalize()
            .unwrap_or(-self.direction);
        n.dot(&l).clamp(0.0, 1.0)
    }

    /// Ambient plus diffuse contribution applied to `base`, clamped per channel
    pub fn shade(&self, base: Color, intensity: f32) -> Color {
        let ambient = base
            .modulate(self.ambient_color)
            .scale(self.ambient_intensity);
        let diffuse = base
            .modulate(self.diffuse_color)
            .scale(self.diffuse_intensity * intensity);
        ambient.add(diffuse).clamped()
    }
}
