/// 3D transformation matrices and per-mesh transform state
use nalgebra::Point3;

use crate::math::{Mat4, Vec3};

/// Translation, rotation (radians, per axis) and scale of a mesh.
///
/// The model matrix is recomputed on every mutation, so `model_matrix()` is
/// always in sync with the three components.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    translation: Vec3,
    rotation: Vec3,
    scale: Vec3,
    model: Mat4,
}

impl TransformState {
    pub fn new(translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            model: Transform::model_matrix(&translation, &rotation, &scale),
        }
    }

    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::repeat(1.0))
    }

    fn update(&mut self) {
        self.model = Transform::model_matrix(&self.translation, &self.rotation, &self.scale);
    }

    pub fn model_matrix(&self) -> &Mat4 {
        &self.model
    }

    /// Rotation and scale only, for transforming normals
    pub fn normal_matrix(&self) -> Mat4 {
        Transform::model_matrix(&Vec3::zeros(), &self.rotation, &self.scale)
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.update();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.update();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.update();
    }

    /// Add `delta` to the translation
    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
        self.update();
    }

    /// Add `delta` (radians) to the rotation
    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation += delta;
        self.update();
    }

    /// Multiply the scale component-wise by `factor`
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale.component_mul_assign(&factor);
        self.update();
    }

    pub fn translate_x(&mut self, delta: f32) {
        self.translate(Vec3::new(delta, 0.0, 0.0));
    }

    pub fn translate_y(&mut self, delta: f32) {
        self.translate(Vec3::new(0.0, delta, 0.0));
    }

    pub fn translate_z(&mut self, delta: f32) {
        self.translate(Vec3::new(0.0, 0.0, delta));
    }

    pub fn rotate_x(&mut self, delta: f32) {
        self.rotate(Vec3::new(delta, 0.0, 0.0));
    }

    pub fn rotate_y(&mut self, delta: f32) {
        self.rotate(Vec3::new(0.0, delta, 0.0));
    }

    pub fn rotate_z(&mut self, delta: f32) {
        self.rotate(Vec3::new(0.0, 0.0, delta));
    }

    pub fn scale_x(&mut self, factor: f32) {
        self.scale_by(Vec3::new(factor, 1.0, 1.0));
    }

    pub fn scale_y(&mut self, factor: f32) {
        self.scale_by(Vec3::new(1.0, factor, 1.0));
    }

    pub fn scale_z(&mut self, factor: f32) {
        self.scale_by(Vec3::new(1.0, 1.0, factor));
    }

    /// Back to T = 0, R = 0, S = 1
    pub fn reset(&mut self) {
        *self = Self::identity();
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::identity()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    pub fn rotation_x(angle: f32) -> Mat4 {
        Mat4::new_rotation(Vec3::new(angle, 0.0, 0.0))
    }

    pub fn rotation_y(angle: f32) -> Mat4 {
        Mat4::new_rotation(Vec3::new(0.0, angle, 0.0))
    }

    pub fn rotation_z(angle: f32) -> Mat4 {
        Mat4::new_rotation(Vec3::new(0.0, 0.0, angle))
    }

    /// Create a rotation matrix from per-axis angles
    pub fn rotation_matrix(rotation: &Vec3) -> Mat4 {
        // Apply rotations in order: Z, Y, X
        Self::rotation_z(rotation.z) * Self::rotation_y(rotation.y) * Self::rotation_x(rotation.x)
    }

    /// Create a translation matrix
    pub fn translation_matrix(translation: &Vec3) -> Mat4 {
        Mat4::new_translation(translation)
    }

    /// Create a scale matrix
    pub fn scale_matrix(scale: &Vec3) -> Mat4 {
        Mat4::new_nonuniform_scaling(scale)
    }

    /// `T * Rz * Ry * Rx * S`: scale and rotate about the object's own origin,
    /// then move it into place
    pub fn model_matrix(translation: &Vec3, rotation: &Vec3, scale: &Vec3) -> Mat4 {
        Self::translation_matrix(translation)
            * Self::rotation_matrix(rotation)
            * Self::scale_matrix(scale)
    }

    /// Right-handed look-at view matrix with world +Y as up
    pub fn look_at(eye: &Vec3, target: &Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(*eye), &Point3::from(*target), &Vec3::y())
    }

    /// Right-handed perspective projection.
    ///
    /// View-space z in `[-near, -far]` maps to NDC z in `[-1, 1]` and clip w is
    /// the distance in front of the eye, matching `look_at`.
    #[rustfmt::skip]
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov * 0.5).tan();
        let range = near - far;
        Mat4::new(
            f / aspect, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (far + near) / range, 2.0 * far * near / range,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(model: &Mat4, view: &Mat4, projection: &Mat4) -> Mat4 {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{transform_affine, Vec4};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transform_state() {
        let mut state = TransformState::identity();
        assert_eq!(state.translation(), Vec3::zeros());
        assert_eq!(state.scale(), Vec3::repeat(1.0));

        state.rotate(Vec3::new(0.1, 0.2, 0.3));
        assert!((state.rotation() - Vec3::new(0.1, 0.2, 0.3)).norm() < 1e-6);

        state.scale_x(2.0);
        state.scale_by(Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(state.scale(), Vec3::new(2.0, 3.0, 1.0));

        state.translate_z(-4.0);
        let expected = Transform::model_matrix(
            &Vec3::new(0.0, 0.0, -4.0),
            &Vec3::new(0.1, 0.2, 0.3),
            &Vec3::new(2.0, 3.0, 1.0),
        );
        assert!((state.model_matrix() - expected).norm() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut state = TransformState::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::repeat(4.0),
        );
        state.reset();
        assert!((state.model_matrix() - Mat4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(&Vec3::zeros());
        assert!((matrix - Mat4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_translation_only_model_is_additive() {
        let t = Vec3::new(3.0, -1.0, 0.5);
        let model = Transform::model_matrix(&t, &Vec3::zeros(), &Vec3::repeat(1.0));
        for v in [Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0), Vec3::new(-7.0, 0.25, 9.0)] {
            assert_eq!(transform_affine(&model, &v), v + t);
        }
    }

    #[test]
    fn test_model_matrix_order() {
        // Scale first, then rotate 90 degrees about Z, then translate
        let model = Transform::model_matrix(
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, FRAC_PI_2),
            &Vec3::new(2.0, 1.0, 1.0),
        );
        let p = transform_affine(&model, &Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(10.0, 2.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_rotation_z_then_y_then_x() {
        let r = Vec3::new(FRAC_PI_2, FRAC_PI_2, 0.0);
        let m = Transform::rotation_matrix(&r);
        // Rx takes +Y to +Z, then Ry takes +Z to +X
        let p = transform_affine(&m, &Vec3::y());
        assert!((p - Vec3::x()).norm() < 1e-5);
    }

    #[test]
    fn test_normal_matrix_ignores_translation() {
        let state = TransformState::new(
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::zeros(),
            Vec3::repeat(1.0),
        );
        let n = transform_affine(&state.normal_matrix(), &Vec3::z());
        assert_eq!(n, Vec3::z());
    }

    #[test]
    fn test_look_at_maps_eye_to_origin() {
        let eye = Vec3::new(3.0, 2.0, 7.0);
        let view = Transform::look_at(&eye, &Vec3::zeros());
        assert!(transform_affine(&view, &eye).norm() < 1e-5);

        let inverse = view.try_inverse().unwrap();
        let p = Vec3::new(-1.0, 4.0, 0.5);
        let back = transform_affine(&inverse, &transform_affine(&view, &p));
        assert!((back - p).norm() < 1e-4);
    }

    #[test]
    fn test_look_at_target_is_on_negative_z() {
        let view = Transform::look_at(&Vec3::new(0.0, 0.0, 5.0), &Vec3::zeros());
        let t = transform_affine(&view, &Vec3::zeros());
        assert!((t - Vec3::new(0.0, 0.0, -5.0)).norm() < 1e-5);
    }

    #[test]
    fn test_perspective_maps_near_and_far() {
        let (near, far) = (0.5, 50.0);
        let proj = Transform::perspective(1.0, 1.5, near, far);
        let at_near = proj * Vec4::new(0.0, 0.0, -near, 1.0);
        let at_far = proj * Vec4::new(0.0, 0.0, -far, 1.0);
        assert!((at_near.z / at_near.w + 1.0).abs() < 1e-4);
        assert!((at_far.z / at_far.w - 1.0).abs() < 1e-4);
        assert!((at_near.w - near).abs() < 1e-6);
    }

    #[test]
    fn test_perspective_matches_nalgebra() {
        let ours = Transform::perspective(0.9, 4.0 / 3.0, 0.1, 100.0);
        let theirs = Mat4::new_perspective(4.0 / 3.0, 0.9, 0.1, 100.0);
        assert!((ours - theirs).norm() < 1e-4);
    }
}
