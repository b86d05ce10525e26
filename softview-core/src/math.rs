/// Fixed-size vector and matrix types used throughout the pipeline
use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

use crate::error::MathError;

pub type Vec2 = Vector2<f32>;
pub type Vec3 = Vector3<f32>;
pub type Vec4 = Vector4<f32>;
pub type Mat3 = Matrix3<f32>;
pub type Mat4 = Matrix4<f32>;

/// Magnitude below which division and normalization are rejected
pub const EPSILON: f32 = 1e-7;

/// Fallible vector operations.
///
/// nalgebra's own `normalize` and `/` silently produce NaN on a zero vector or
/// divisor; a single NaN vertex poisons every pixel it touches, so the pipeline
/// goes through these instead.
pub trait VectorExt: Sized {
    /// Unit vector in the same direction, or `MathError::ZeroLength`
    fn checked_normalize(&self) -> Result<Self, MathError>;

    /// Component-wise division by `scalar`, or `MathError::NearZeroDivisor`
    fn checked_div(&self, scalar: f32) -> Result<Self, MathError>;

    /// Components as a plain array
    fn to_array(&self) -> Vec<f32>;
}

macro_rules! impl_vector_ext {
    ($($ty:ty),*) => {
        $(
            impl VectorExt for $ty {
                fn checked_normalize(&self) -> Result<Self, MathError> {
                    let len = self.norm();
                    if len < EPSILON {
                        return Err(MathError::ZeroLength);
                    }
                    Ok(self.unscale(len))
                }

                fn checked_div(&self, scalar: f32) -> Result<Self, MathError> {
                    if scalar.abs() < EPSILON {
                        return Err(MathError::NearZeroDivisor(scalar));
                    }
                    Ok(self.unscale(scalar))
                }

                fn to_array(&self) -> Vec<f32> {
                    self.iter().copied().collect()
                }
            }
        )*
    };
}

impl_vector_ext!(Vec2, Vec3, Vec4);

/// Multiply a point (w = 1) by `m` and drop w without dividing.
///
/// Only valid for affine matrices, where the bottom row is `0 0 0 1`.
pub fn transform_affine(m: &Mat4, v: &Vec3) -> Vec3 {
    (m * v.push(1.0)).xyz()
}

/// Multiply a direction (w = 0) by `m`
pub fn transform_direction(m: &Mat4, v: &Vec3) -> Vec3 {
    (m * v.push(0.0)).xyz()
}
