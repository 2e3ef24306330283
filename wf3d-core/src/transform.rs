//! Affine transformation matrices and the composite model-matrix builder
use crate::math::{Matrix4, Vector3};

/// Create a scale matrix
pub fn scale(sx: f32, sy: f32, sz: f32) -> Matrix4 {
    Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

/// Rotation about the X axis (radians, right-handed)
pub fn rotate_x(angle: f32) -> Matrix4 {
    Matrix4::new_rotation(Vector3::x() * angle)
}

/// Rotation about the Y axis (radians, right-handed)
pub fn rotate_y(angle: f32) -> Matrix4 {
    Matrix4::new_rotation(Vector3::y() * angle)
}

/// Rotation about the Z axis (radians, right-handed)
pub fn rotate_z(angle: f32) -> Matrix4 {
    Matrix4::new_rotation(Vector3::z() * angle)
}

/// Create a translation matrix
pub fn translate(tx: f32, ty: f32, tz: f32) -> Matrix4 {
    Matrix4::new_translation(&Vector3::new(tx, ty, tz))
}

/// Left-fold multiplication in argument order: `combine(&[a, b, c]) == a * b * c`.
///
/// An empty slice yields the identity.
pub fn combine(matrices: &[Matrix4]) -> Matrix4 {
    matrices
        .iter()
        .fold(Matrix4::identity(), |acc, m| acc * m)
}

/// Create a model-view-projection matrix
pub fn mvp_matrix(model: &Matrix4, view: &Matrix4, projection: &Matrix4) -> Matrix4 {
    projection * view * model
}

/// Translation, rotation (degrees) and scale components of a model matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub translation: Vector3,
    pub rotation_degrees: Vector3,
    pub scale: Vector3,
}

impl ModelTransform {
    pub fn new(translation: Vector3, rotation_degrees: Vector3, scale: Vector3) -> Self {
        Self {
            translation,
            rotation_degrees,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros(), Vector3::repeat(1.0))
    }

    pub fn translation(tx: f32, ty: f32, tz: f32) -> Self {
        Self {
            translation: Vector3::new(tx, ty, tz),
            ..Self::identity()
        }
    }

    pub fn rotation_degrees(rx: f32, ry: f32, rz: f32) -> Self {
        Self {
            rotation_degrees: Vector3::new(rx, ry, rz),
            ..Self::identity()
        }
    }

    pub fn uniform_scale(factor: f32) -> Self {
        Self {
            scale: Vector3::repeat(factor),
            ..Self::identity()
        }
    }

    /// `translate * rotate_z * rotate_y * rotate_x * scale`, angles converted to radians.
    pub fn to_matrix(&self) -> Matrix4 {
        model_matrix(self.translation, self.rotation_degrees, self.scale)
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Composite model matrix in the fixed order
/// `translate * rotate_z * rotate_y * rotate_x * scale`.
pub fn model_matrix(translation: Vector3, rotation_degrees: Vector3, scale_factors: Vector3) -> Matrix4 {
    let radians = rotation_degrees.map(f32::to_radians);
    combine(&[
        translate(translation.x, translation.y, translation.z),
        rotate_z(radians.z),
        rotate_y(radians.y),
        rotate_x(radians.x),
        scale(scale_factors.x, scale_factors.y, scale_factors.z),
    ])
}
