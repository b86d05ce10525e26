/// Camera and projection utilities
use std::f32::consts::PI;

use crate::error::MathError;
use crate::math::{Mat4, Vec3, VectorExt};
use crate::transform::Transform;

const MIN_POLAR_ANGLE: f32 = 0.01;
const MAX_POLAR_ANGLE: f32 = PI - 0.01;
pub const MIN_DISTANCE: f32 = 0.5;
pub const MAX_DISTANCE: f32 = 2000.0;
const DEFAULT_DISTANCE: f32 = 10.0;

/// Perspective camera orbiting a target point.
///
/// Alongside the Cartesian position the camera keeps spherical coordinates
/// (distance, azimuth, polar angle) relative to the target, which drive the
/// orbit and zoom controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    distance: f32,
    azimuth: f32,
    polar: f32,
}

impl Camera {
    /// `fov` is the vertical field of view in radians
    pub fn new(position: Vec3, target: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position,
            target,
            fov,
            aspect: sanitize_aspect(aspect),
            near,
            far: if far > near { far } else { near + 1.0 },
            distance: DEFAULT_DISTANCE,
            azimuth: 0.0,
            polar: PI / 4.0,
        };
        camera.update_spherical();
        camera
    }

    /// Default camera five units out on +Z, sized for a `width` x `height` canvas
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self::new(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::zeros(),
            PI / 3.0, // 60 degrees
            width as f32 / height.max(1) as f32,
            0.1,
            100.0,
        )
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_spherical();
    }

    /// Move the target, keeping the current orbit around it
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.update_position();
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    /// Free translation of the eye; the orbit is re-derived from the new offset
    pub fn move_position(&mut self, delta: Vec3) {
        self.position += delta;
        self.update_spherical();
    }

    /// Free translation of the look-at point
    pub fn move_target(&mut self, delta: Vec3) {
        self.target += delta;
        self.update_spherical();
    }

    /// Orbit around the target by the given angle deltas (radians)
    pub fn rotate(&mut self, delta_azimuth: f32, delta_polar: f32) {
        self.azimuth += delta_azimuth;
        self.polar = (self.polar + delta_polar).clamp(MIN_POLAR_ANGLE, MAX_POLAR_ANGLE);
        self.update_position();
    }

    /// Slide eye and target together along the camera's right/up axes
    pub fn pan(&mut self, dx: f32, dy: f32) -> Result<(), MathError> {
        let (_, right, up) = self.basis()?;
        let offset = right * dx + up * dy;
        self.target += offset;
        self.position += offset;
        Ok(())
    }

    /// Change the distance to the target, clamped to the allowed range
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.update_position();
    }

    /// Unit forward, right and up vectors; right = forward x world up
    pub fn basis(&self) -> Result<(Vec3, Vec3, Vec3), MathError> {
        let forward = (self.target - self.position).checked_normalize()?;
        let right = forward.cross(&Vec3::y()).checked_normalize()?;
        let up = right.cross(&forward).checked_normalize()?;
        Ok((forward, right, up))
    }

    /// Re-derive the orbit from the Cartesian eye, then snap the eye back onto
    /// the clamped orbit so polar and distance always stay in range.
    fn update_spherical(&mut self) {
        let offset = self.position - self.target;
        let distance = offset.norm();
        if !distance.is_finite() || distance < 1e-6 {
            // Eye on the target: back off along the current orbit angles
            self.distance = DEFAULT_DISTANCE;
        } else {
            self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
            self.polar = (offset.y / distance)
                .clamp(-1.0, 1.0)
                .acos()
                .clamp(MIN_POLAR_ANGLE, MAX_POLAR_ANGLE);
            self.azimuth = offset.x.atan2(offset.z);
        }
        self.update_position();
    }

    fn update_position(&mut self) {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        let offset = Vec3::new(
            self.distance * sin_polar * sin_azimuth,
            self.distance * cos_polar,
            self.distance * sin_polar * cos_azimuth,
        );
        self.position = self.target + offset;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Mat4 {
        Transform::look_at(&self.position, &self.target)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Transform::perspective(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::for_viewport(800, 600)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 1e-6 {
        aspect
    } else {
        1.0
    }
}
