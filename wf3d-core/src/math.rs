//! Vector and matrix primitives for the geometry pipeline.
//!
//! The storage types are nalgebra's `f32` vectors and matrices. The traits in
//! this module add the behaviour the pipeline relies on that nalgebra does not
//! provide verbatim: epsilon equality, zero-safe normalization, bounds-checked
//! entry access and determinant-guarded inversion.
//!
//! All matrices follow the column-vector convention: `m * v` transforms `v`,
//! translation lives in the last column, and entries are addressed as
//! `(row, col)`.

use crate::error::{IndexError, SingularMatrixError};

pub type Vector2 = nalgebra::Vector2<f32>;
pub type Vector3 = nalgebra::Vector3<f32>;
pub type Vector4 = nalgebra::Vector4<f32>;
pub type Point3 = nalgebra::Point3<f32>;
pub type Matrix3 = nalgebra::Matrix3<f32>;
pub type Matrix4 = nalgebra::Matrix4<f32>;

/// Tolerance for approximate equality, inversion and the perspective divide.
pub const EPSILON: f32 = 1e-7;

/// Component-wise comparison with [`EPSILON`] tolerance.
pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

macro_rules! impl_approx_eq {
    ($($ty:ty),*) => {
        $(
            impl ApproxEq for $ty {
                fn approx_eq(&self, other: &Self) -> bool {
                    self.iter()
                        .zip(other.iter())
                        .all(|(a, b)| (a - b).abs() < EPSILON)
                }
            }
        )*
    };
}

impl_approx_eq!(Vector2, Vector3, Vector4, Matrix3, Matrix4);

/// Vector operations with explicit handling of the zero cases.
pub trait VectorExt: Sized {
    /// Unit vector in the same direction, or the zero vector when the length is zero.
    fn normalized_or_zero(&self) -> Self;

    /// Divides every component by `scalar`; `None` when `scalar` is zero.
    fn try_div(&self, scalar: f32) -> Option<Self>;
}

macro_rules! impl_vector_ext {
    ($($ty:ty),*) => {
        $(
            impl VectorExt for $ty {
                fn normalized_or_zero(&self) -> Self {
                    self.try_normalize(0.0).unwrap_or_else(<$ty>::zeros)
                }

                fn try_div(&self, scalar: f32) -> Option<Self> {
                    if scalar == 0.0 {
                        None
                    } else {
                        Some(self / scalar)
                    }
                }
            }
        )*
    };
}

impl_vector_ext!(Vector2, Vector3, Vector4);

/// Bounds-checked `(row, col)` access for square matrices.
pub trait MatrixEntries {
    const DIM: usize;

    fn entry(&self, row: usize, col: usize) -> Result<f32, IndexError>;
    fn set_entry(&mut self, row: usize, col: usize, value: f32) -> Result<(), IndexError>;
}

macro_rules! impl_matrix_entries {
    ($($ty:ty => $dim:expr),*) => {
        $(
            impl MatrixEntries for $ty {
                const DIM: usize = $dim;

                fn entry(&self, row: usize, col: usize) -> Result<f32, IndexError> {
                    self.get((row, col))
                        .copied()
                        .ok_or(IndexError::MatrixEntry { row, col, dim: Self::DIM })
                }

                fn set_entry(&mut self, row: usize, col: usize, value: f32) -> Result<(), IndexError> {
                    let slot = self
                        .get_mut((row, col))
                        .ok_or(IndexError::MatrixEntry { row, col, dim: Self::DIM })?;
                    *slot = value;
                    Ok(())
                }
            }
        )*
    };
}

impl_matrix_entries!(Matrix3 => 3, Matrix4 => 4);

/// Homogeneous-space helpers for 4×4 transforms.
pub trait Matrix4Ext {
    /// Inverse via the determinant; fails when `|det| < EPSILON`.
    fn inverted(&self) -> Result<Matrix4, SingularMatrixError>;

    /// Transforms `point` as `(x, y, z, 1)` and divides by `w`.
    ///
    /// When `|w| <= EPSILON` the undivided `xyz` is returned instead.
    fn transform_homogeneous(&self, point: &Vector3) -> Vector3;

    /// True when every entry is within `1e-6` of the identity.
    fn is_identity_matrix(&self) -> bool;
}

impl Matrix4Ext for Matrix4 {
    fn inverted(&self) -> Result<Matrix4, SingularMatrixError> {
        let determinant = self.determinant();
        if determinant.abs() < EPSILON {
            return Err(SingularMatrixError { determinant });
        }
        self.try_inverse().ok_or(SingularMatrixError { determinant })
    }

    fn transform_homogeneous(&self, point: &Vector3) -> Vector3 {
        let clip = self * to_homogeneous_point(point);
        perspective_divide(&clip)
    }

    fn is_identity_matrix(&self) -> bool {
        self.iter()
            .zip(Matrix4::identity().iter())
            .all(|(a, b)| (a - b).abs() < 1e-6)
    }
}

/// Lifts a position into homogeneous coordinates with `w = 1`.
pub fn to_homogeneous_point(point: &Vector3) -> Vector4 {
    Vector4::new(point.x, point.y, point.z, 1.0)
}

/// Divides `xyz` by `w`, falling back to the raw `xyz` when `w` is near zero.
pub fn perspective_divide(clip: &Vector4) -> Vector3 {
    if clip.w.abs() > EPSILON {
        clip.xyz() / clip.w
    } else {
        clip.xyz()
    }
}
