//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, Ray};
use glint_math::Vec3;
use thiserror::Error;

/// Errors raised when a primitive is built from degenerate parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Radius must be positive, got {radius}")]
    NonPositiveRadius { radius: f64 },

    #[error("Surface normal must be non-zero")]
    ZeroNormal,

    #[error("Rectangle edges must be non-zero and perpendicular")]
    DegenerateRectangle,
}

/// Smallest ray parameter accepted as a hit.
///
/// Keeps shadow and secondary rays from re-hitting the surface they
/// start on.
pub const HIT_EPSILON: f64 = 1.0e-3;

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Unit surface normal at the intersection
    pub normal: Vec3,
    /// Intersection point in the object's own space
    pub local_hit_point: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t > HIT_EPSILON`, if any.
    fn hit<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>>;

    /// Nearest intersection parameter, without shading data.
    fn shadow_hit(&self, ray: &Ray) -> Option<f64>;

    /// Whether this object blocks light for shadow rays.
    fn casts_shadows(&self) -> bool {
        true
    }
}
