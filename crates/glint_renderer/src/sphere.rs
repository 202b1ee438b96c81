//! Sphere primitive for ray tracing.

use std::sync::Arc;

use crate::{
    hittable::{GeometryError, HitRecord, Hittable, HIT_EPSILON},
    Material, Ray,
};
use glint_math::Vec3;

/// A sphere primitive.
#[derive(Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
    shadows: bool,
}

impl Sphere {
    /// Create a new sphere. The radius must be positive.
    pub fn new(
        center: Vec3,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Result<Self, GeometryError> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius { radius });
        }
        Ok(Self {
            center,
            radius,
            material,
            shadows: true,
        })
    }

    /// Enable or disable shadow casting.
    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Nearest root above `HIT_EPSILON`.
    fn nearest_root(&self, ray: &Ray) -> Option<f64> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let b = 2.0 * oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let e = discriminant.sqrt();
        let denom = 2.0 * a;

        [(-b - e) / denom, (-b + e) / denom]
            .into_iter()
            .find(|&t| t > HIT_EPSILON)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let t = self.nearest_root(ray)?;
        let local_hit_point = ray.at(t);

        Some(HitRecord {
            t,
            normal: (local_hit_point - self.center) / self.radius,
            local_hit_point,
            material: self.material.as_ref(),
        })
    }

    fn shadow_hit(&self, ray: &Ray) -> Option<f64> {
        self.nearest_root(ray)
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }
}
