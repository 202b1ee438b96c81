//! Flat disk primitive, usable as an area light emitter.

use std::sync::Arc;

use crate::{
    area_light::LightSurface,
    hittable::{GeometryError, HitRecord, Hittable, HIT_EPSILON},
    light::normal_frame,
    sampler::concentric_disk,
    Material, Ray,
};
use glint_math::{Onb, Vec2, Vec3};

/// A disk of `radius` around `center`, facing `normal`.
#[derive(Clone)]
pub struct Disk {
    center: Vec3,
    radius: f64,
    frame: Onb,
    material: Arc<dyn Material>,
    shadows: bool,
}

impl Disk {
    pub fn new(
        center: Vec3,
        normal: Vec3,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Result<Self, GeometryError> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(GeometryError::NonPositiveRadius { radius });
        }
        let frame = normal_frame(normal).map_err(|_| GeometryError::ZeroNormal)?;
        Ok(Self {
            center,
            radius,
            frame,
            material,
            shadows: true,
        })
    }

    /// Enable or disable shadow casting.
    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn normal(&self) -> Vec3 {
        self.frame.w
    }

    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let normal = self.frame.w;
        let denom = ray.direction().dot(normal);
        if denom == 0.0 {
            return None;
        }
        let t = (self.center - ray.origin()).dot(normal) / denom;
        if t <= HIT_EPSILON {
            return None;
        }
        let inside = ray.at(t).distance_squared(self.center) < self.radius * self.radius;
        inside.then_some(t)
    }
}

impl Hittable for Disk {
    fn hit<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray)?;
        Some(HitRecord {
            t,
            normal: self.frame.w,
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

impl LightSurface for Disk {
    fn sample_point(&self, sample: Vec2) -> Vec3 {
        let p = concentric_disk(sample) * self.radius;
        self.center + self.frame.u * p.x + self.frame.v * p.y
    }

    fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.frame.w
    }

    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Matte};

    fn lamp() -> Disk {
        Disk::new(
            Vec3::new(0.0, 2.0, 0.0),
            -Vec3::Y,
            0.5,
            Arc::new(Matte::new(0.1, 0.9, Color::ONE)),
        )
        .unwrap()
    }

    #[test]
    fn test_disk_hit_within_radius() {
        let disk = lamp();

        let rec = disk.hit(&Ray::new(Vec3::new(0.3, 0.0, 0.3), Vec3::Y)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-12);
        assert_eq!(rec.normal, -Vec3::Y);
        assert!(disk.hit(&Ray::new(Vec3::new(0.4, 0.0, 0.4), Vec3::Y)).is_none());
    }

    #[test]
    fn test_samples_lie_on_the_disk() {
        let disk = lamp();
        for i in 0..10 {
            for j in 0..10 {
                let sample = Vec2::new(i as f64 / 10.0, j as f64 / 10.0);
                let p = disk.sample_point(sample);
                assert!((p.y - 2.0).abs() < 1e-12);
                assert!(p.distance(Vec3::new(0.0, 2.0, 0.0)) <= 0.5 + 1e-12);
            }
        }
        assert!((disk.area() - std::f64::consts::PI * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_disk_rejected() {
        let material: Arc<dyn Material> = Arc::new(Matte::new(0.1, 0.9, Color::ONE));

        assert_eq!(
            Disk::new(Vec3::ZERO, Vec3::Y, 0.0, material.clone()).err(),
            Some(GeometryError::NonPositiveRadius { radius: 0.0 })
        );
        assert_eq!(
            Disk::new(Vec3::ZERO, Vec3::ZERO, 1.0, material).err(),
            Some(GeometryError::ZeroNormal)
        );
    }
}
