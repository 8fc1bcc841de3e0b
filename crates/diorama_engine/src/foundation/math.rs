//! Math utilities and types
//!
//! Provides the vector and matrix aliases used across the engine plus the
//! matrix-backed [`Transform`] that every scene node carries.
//!
//! Scene space follows the Blender convention: +X is right, +Y is forward and
//! +Z is up.

use serde::{Deserialize, Serialize};
use std::ops::{Mul, MulAssign};

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Named world axes (Blender convention)
pub mod axis {
    use super::Vec3;

    /// +X
    pub fn right() -> Vec3 {
        Vec3::new(1.0, 0.0, 0.0)
    }

    /// -X
    pub fn left() -> Vec3 {
        Vec3::new(-1.0, 0.0, 0.0)
    }

    /// +Y
    pub fn forward() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    /// -Y
    pub fn back() -> Vec3 {
        Vec3::new(0.0, -1.0, 0.0)
    }

    /// +Z
    pub fn up() -> Vec3 {
        Vec3::new(0.0, 0.0, 1.0)
    }

    /// -Z
    pub fn down() -> Vec3 {
        Vec3::new(0.0, 0.0, -1.0)
    }
}

/// General affine transform stored as a 4x4 matrix
///
/// Composition follows matrix order: `a * b` applies `b` first, then `a`.
/// Transforms placed in a scene must stay invertible; a singular transform
/// (for example a zero scale) makes ray queries against that subtree
/// meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::identity(),
        }
    }

    /// Wrap an existing matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Pure translation
    pub fn translate(offset: Vec3) -> Self {
        Self::from_matrix(Mat4::new_translation(&offset))
    }

    /// Rotation of `angle` radians around `axis` (need not be unit length)
    pub fn rotate(angle: f32, axis: Vec3) -> Self {
        Self::from_matrix(Mat4::from_axis_angle(&Unit::new_normalize(axis), angle))
    }

    /// Per-axis scale
    pub fn scale(factors: Vec3) -> Self {
        Self::from_matrix(Mat4::new_nonuniform_scaling(&factors))
    }

    /// The underlying matrix
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Upper-left 3x3 linear part (rotation, scale and shear)
    pub fn linear(&self) -> Mat3 {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Checked inverse, `None` when the matrix is singular
    pub fn try_inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(Self::from_matrix)
    }

    /// Inverse transform
    ///
    /// The result is undefined (filled with NaN) for a singular matrix.
    /// Use [`Transform::try_inverse`] when the input is not trusted.
    pub fn inverse(&self) -> Self {
        self.try_inverse()
            .unwrap_or_else(|| Self::from_matrix(Mat4::from_element(f32::NAN)))
    }

    /// Matrix that maps surface normals through this transform
    ///
    /// Transpose of the inverse of the linear part; `None` if singular.
    pub fn normal_matrix(&self) -> Option<Mat3> {
        self.linear().try_inverse().map(|inv| inv.transpose())
    }

    /// Determinant of the linear part; negative for mirrored transforms
    pub fn determinant(&self) -> f32 {
        self.linear().determinant()
    }

    /// Apply the full affine transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point(&Point3::from(point)).coords
    }

    /// Apply only the linear part to a direction
    ///
    /// The result is not renormalized; scaled transforms change its length.
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.matrix.transform_vector(&vector)
    }

    /// Translation column
    pub fn position(&self) -> Vec3 {
        self.column(3)
    }

    /// Local +X axis (not normalized)
    pub fn right(&self) -> Vec3 {
        self.column(0)
    }

    /// Local -X axis (not normalized)
    pub fn left(&self) -> Vec3 {
        -self.column(0)
    }

    /// Local +Y axis (not normalized)
    pub fn forward(&self) -> Vec3 {
        self.column(1)
    }

    /// Local -Y axis (not normalized)
    pub fn back(&self) -> Vec3 {
        -self.column(1)
    }

    /// Local +Z axis (not normalized)
    pub fn up(&self) -> Vec3 {
        self.column(2)
    }

    /// Local -Z axis (not normalized)
    pub fn down(&self) -> Vec3 {
        -self.column(2)
    }

    fn column(&self, index: usize) -> Vec3 {
        Vec3::new(
            self.matrix[(0, index)],
            self.matrix[(1, index)],
            self.matrix[(2, index)],
        )
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform::from_matrix(self.matrix * rhs.matrix)
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, rhs: &Transform) -> Transform {
        Transform::from_matrix(self.matrix * rhs.matrix)
    }
}

impl MulAssign for Transform {
    fn mul_assign(&mut self, rhs: Transform) {
        self.matrix *= rhs.matrix;
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }
}

/// Extension trait for Mat4 with projection helpers
pub trait Mat4Ext {
    /// OpenGL-style perspective projection (vertical fov in radians)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Maps scene axes (Z up, Y forward) onto GL eye axes (Y up, -Z forward)
    fn blender_axis_remap() -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn blender_axis_remap() -> Mat4 {
        Mat4::new(
            1.0, 0.0,  0.0, 0.0,
            0.0, 0.0,  1.0, 0.0,
            0.0, -1.0, 0.0, 0.0,
            0.0, 0.0,  0.0, 1.0,
        )
    }
}
