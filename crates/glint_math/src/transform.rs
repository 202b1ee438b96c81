// Inverse transform accumulation for instancing.
//
// Instanced textures and geometry never store a forward matrix. Each
// transform call builds the inverse of that single operation and
// post-multiplies it onto the accumulated inverse, which yields the
// inverse of the whole chain applied in call order.

use glam::DVec4;
use thiserror::Error;

use crate::{Mat4, Result, Vec3};

/// Determinants smaller than this reject a shear as non-invertible.
const SHEAR_EPSILON: f64 = 1.0e-10;

/// Errors raised by degenerate transforms and frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Shear matrix is not invertible (determinant {determinant})")]
    DegenerateShear { determinant: f64 },

    #[error("Scale factor on {axis} axis is zero")]
    ZeroScale { axis: char },

    #[error("Cannot build an orthonormal frame: {0}")]
    DegenerateFrame(&'static str),
}

/// Extension trait for Mat4 with helpers glam does not provide.
pub trait Mat4Ext {
    /// Build a matrix from row-major entries.
    fn from_rows(rows: [[f64; 4]; 4]) -> Self;

    /// Transform a surface normal by the transpose of this matrix.
    ///
    /// Called on an inverse matrix this maps object space normals to world
    /// space. The result is not normalized.
    fn transform_normal(&self, normal: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        // glam stores columns, so the row arrays land transposed
        Mat4::from_cols_array_2d(&rows).transpose()
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let n = self.transpose() * DVec4::new(normal.x, normal.y, normal.z, 0.0);
        Vec3::new(n.x, n.y, n.z)
    }
}

/// Off-diagonal coefficients of a shear.
///
/// `x_by_y` is the amount added to x per unit of y, and so on:
///
/// ```text
/// x' = x          + x_by_y * y + x_by_z * z
/// y' = y_by_x * x + y          + y_by_z * z
/// z' = z_by_x * x + z_by_y * y + z
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Shear {
    pub x_by_y: f64,
    pub x_by_z: f64,
    pub y_by_x: f64,
    pub y_by_z: f64,
    pub z_by_x: f64,
    pub z_by_y: f64,
}

impl Shear {
    /// The forward shear matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rows([
            [1.0, self.x_by_y, self.x_by_z, 0.0],
            [self.y_by_x, 1.0, self.y_by_z, 0.0],
            [self.z_by_x, self.z_by_y, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Determinant of the upper 3x3 block.
    pub fn determinant(&self) -> f64 {
        let (a, b) = (self.x_by_y, self.x_by_z);
        let (c, d) = (self.y_by_x, self.y_by_z);
        let (e, f) = (self.z_by_x, self.z_by_y);
        1.0 - d * f - a * c - b * e + a * d * e + b * c * f
    }

    /// Closed form inverse: adjugate divided by the determinant.
    pub fn inverse(&self) -> Result<Mat4> {
        let det = self.determinant();
        if det.abs() < SHEAR_EPSILON {
            return Err(TransformError::DegenerateShear { determinant: det });
        }

        let (a, b) = (self.x_by_y, self.x_by_z);
        let (c, d) = (self.y_by_x, self.y_by_z);
        let (e, f) = (self.z_by_x, self.z_by_y);
        let inv_det = 1.0 / det;

        Ok(Mat4::from_rows([
            [
                (1.0 - d * f) * inv_det,
                (b * f - a) * inv_det,
                (a * d - b) * inv_det,
                0.0,
            ],
            [
                (d * e - c) * inv_det,
                (1.0 - b * e) * inv_det,
                (b * c - d) * inv_det,
                0.0,
            ],
            [
                (c * f - e) * inv_det,
                (a * e - f) * inv_det,
                (1.0 - a * c) * inv_det,
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }
}

/// Accumulated inverse of a sequence of affine transforms.
///
/// Starts at the identity. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseTransform {
    inv: Mat4,
}

impl Default for InverseTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl InverseTransform {
    /// Identity transform.
    pub fn new() -> Self {
        Self {
            inv: Mat4::IDENTITY,
        }
    }

    /// The accumulated inverse matrix.
    pub fn matrix(&self) -> Mat4 {
        self.inv
    }

    fn post_multiply(&mut self, inverse_op: Mat4) -> &mut Self {
        self.inv *= inverse_op;
        self
    }

    /// Non-uniform scale.
    pub fn scale(&mut self, s: Vec3) -> Result<&mut Self> {
        for (axis, value) in [('x', s.x), ('y', s.y), ('z', s.z)] {
            if value == 0.0 {
                return Err(TransformError::ZeroScale { axis });
            }
        }
        Ok(self.post_multiply(Mat4::from_diagonal(DVec4::new(
            1.0 / s.x,
            1.0 / s.y,
            1.0 / s.z,
            1.0,
        ))))
    }

    /// Uniform scale.
    pub fn uniform_scale(&mut self, s: f64) -> Result<&mut Self> {
        self.scale(Vec3::splat(s))
    }

    /// Translation.
    pub fn translate(&mut self, t: Vec3) -> &mut Self {
        self.post_multiply(Mat4::from_rows([
            [1.0, 0.0, 0.0, -t.x],
            [0.0, 1.0, 0.0, -t.y],
            [0.0, 0.0, 1.0, -t.z],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Rotation about the x axis.
    pub fn rotate_x(&mut self, degrees: f64) -> &mut Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.post_multiply(Mat4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cos, sin, 0.0],
            [0.0, -sin, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Rotation about the y axis.
    pub fn rotate_y(&mut self, degrees: f64) -> &mut Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.post_multiply(Mat4::from_rows([
            [cos, 0.0, -sin, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [sin, 0.0, cos, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Rotation about the z axis.
    pub fn rotate_z(&mut self, degrees: f64) -> &mut Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.post_multiply(Mat4::from_rows([
            [cos, sin, 0.0, 0.0],
            [-sin, cos, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Shear. Fails if the shear cannot be inverted.
    pub fn shear(&mut self, shear: Shear) -> Result<&mut Self> {
        let inverse = shear.inverse()?;
        Ok(self.post_multiply(inverse))
    }

    /// Pull a world space point back into local space.
    #[inline]
    pub fn apply_to_point(&self, p: Vec3) -> Vec3 {
        self.inv.transform_point3(p)
    }

    /// Pull a world space direction back into local space (no translation).
    #[inline]
    pub fn apply_to_direction(&self, d: Vec3) -> Vec3 {
        self.inv.transform_vector3(d)
    }

    /// Push a local space normal out to world space, normalized.
    #[inline]
    pub fn normal_to_world(&self, n: Vec3) -> Vec3 {
        self.inv.transform_normal(n).normalize()
    }
}
