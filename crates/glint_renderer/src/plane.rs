//! Infinite plane primitive.

use std::sync::Arc;

use crate::{
    hittable::{GeometryError, HitRecord, Hittable, HIT_EPSILON},
    Material, Ray,
};
use glint_math::Vec3;

/// A plane through `point` with unit normal `normal`.
#[derive(Clone)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    material: Arc<dyn Material>,
    shadows: bool,
}

impl Plane {
    /// Create a new plane. The normal is normalized and must be non-zero.
    pub fn new(
        point: Vec3,
        normal: Vec3,
        material: Arc<dyn Material>,
    ) -> Result<Self, GeometryError> {
        let normal = normal.try_normalize().ok_or(GeometryError::ZeroNormal)?;
        Ok(Self {
            point,
            normal,
            material,
            shadows: true,
        })
    }

    /// Enable or disable shadow casting.
    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let denom = ray.direction().dot(self.normal);
        if denom == 0.0 {
            return None;
        }
        let t = (self.point - ray.origin()).dot(self.normal) / denom;
        (t > HIT_EPSILON).then_some(t)
    }
}

impl Hittable for Plane {
    fn hit<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray)?;
        Some(HitRecord {
            t,
            normal: self.normal,
            local_hit_point: ray.at(t),
            material: self.material.as_ref(),
        })
    }

    fn shadow_hit(&self, ray: &Ray) -> Option<f64> {
        self.intersect(ray)
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Matte};

    fn ground() -> Plane {
        Plane::new(
            Vec3::ZERO,
            Vec3::new(0.0, 2.0, 0.0),
            Arc::new(Matte::new(0.1, 0.9, Color::ONE)),
        )
        .unwrap()
    }

    #[test]
    fn test_plane_hit() {
        let ray = Ray::new(Vec3::new(1.0, 4.0, 2.0), -Vec3::Y);
        let plane = ground();
        let rec = plane.hit(&ray).unwrap();

        assert!((rec.t - 4.0).abs() < 1e-12);
        assert_eq!(rec.normal, Vec3::Y);
        assert!((rec.local_hit_point - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-12);
    }

    #[test]
    fn test_parallel_and_behind_miss() {
        let plane = ground();

        assert!(plane.hit(&Ray::new(Vec3::Y, Vec3::X)).is_none());
        assert!(plane.hit(&Ray::new(Vec3::Y, Vec3::Y)).is_none());
        assert!(plane.shadow_hit(&Ray::new(Vec3::Y, Vec3::Y)).is_none());
    }

    #[test]
    fn test_zero_normal_rejected() {
        let material = Arc::new(Matte::new(0.1, 0.9, Color::ONE));
        assert_eq!(
            Plane::new(Vec3::ZERO, Vec3::ZERO, material).err(),
            Some(GeometryError::ZeroNormal)
        );
    }
}
