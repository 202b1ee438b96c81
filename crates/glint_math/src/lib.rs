//! Glint math types.
//!
//! Double precision aliases over `glam`, plus the small amount of
//! ray tracing geometry shared by every crate in the workspace: rays,
//! parameter intervals, inverse transform accumulation and orthonormal
//! frames.

// Re-export glam for convenience
pub use glam;

/// 2D point or vector (sample coordinates, disk samples).
pub type Vec2 = glam::DVec2;
/// 3D point, direction or normal.
pub type Vec3 = glam::DVec3;
/// Homogeneous 4-vector.
pub type Vec4 = glam::DVec4;
/// 4x4 affine matrix.
pub type Mat4 = glam::DMat4;

mod interval;
mod onb;
mod ray;
mod transform;

pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use transform::{InverseTransform, Mat4Ext, Shear, TransformError};

/// Result alias for fallible math constructors.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_aliases_are_double_precision() {
        let v = Vec3::splat(1.0 / 3.0);
        assert_eq!(v.x, 1.0_f64 / 3.0);
    }
}
