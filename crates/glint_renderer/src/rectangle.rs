//! Rectangle primitive, usable as an area light emitter.

use std::sync::Arc;

use crate::{
    area_light::LightSurface,
    hittable::{GeometryError, HitRecord, Hittable, HIT_EPSILON},
    Material, Ray,
};
use glint_math::{Vec2, Vec3};

/// A rectangle with corner `p0` and perpendicular edges `a` and `b`.
///
/// The normal is `a × b`, normalized. Emitters shine on that side only.
#[derive(Clone)]
pub struct Rectangle {
    p0: Vec3,
    a: Vec3,
    b: Vec3,
    normal: Vec3,
    area: f64,
    material: Arc<dyn Material>,
    shadows: bool,
}

impl Rectangle {
    pub fn new(
        p0: Vec3,
        a: Vec3,
        b: Vec3,
        material: Arc<dyn Material>,
    ) -> Result<Self, GeometryError> {
        let cross = a.cross(b);
        let area = cross.length();
        let perpendicular = a.dot(b).abs() <= 1e-9 * a.length() * b.length();
        if area == 0.0 || !perpendicular {
            return Err(GeometryError::DegenerateRectangle);
        }
        Ok(Self {
            p0,
            a,
            b,
            normal: cross / area,
            area,
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
        self.normal
    }

    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let denom = ray.direction().dot(self.normal);
        if denom == 0.0 {
            return None;
        }
        let t = (self.p0 - ray.origin()).dot(self.normal) / denom;
        if t <= HIT_EPSILON {
            return None;
        }

        let d = ray.at(t) - self.p0;
        let along_a = d.dot(self.a);
        let along_b = d.dot(self.b);
        let inside = (0.0..=self.a.length_squared()).contains(&along_a)
            && (0.0..=self.b.length_squared()).contains(&along_b);
        inside.then_some(t)
    }
}

impl Hittable for Rectangle {
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

impl LightSurface for Rectangle {
    fn sample_point(&self, sample: Vec2) -> Vec3 {
        self.p0 + self.a * sample.x + self.b * sample.y
    }

    fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }

    fn area(&self) -> f64 {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Matte};

    fn floor_tile() -> Rectangle {
        Rectangle::new(
            Vec3::new(-1.0, 0.0, -2.0),
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(2.0, 0.0, 0.0),
            Arc::new(Matte::new(0.1, 0.9, Color::ONE)),
        )
        .unwrap()
    }

    #[test]
    fn test_rectangle_hit_inside_only() {
        let tile = floor_tile();
        assert_eq!(tile.normal(), Vec3::Y);
        assert_eq!(tile.area(), 8.0);

        let rec = tile.hit(&Ray::new(Vec3::new(0.5, 3.0, 1.5), -Vec3::Y)).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-12);
        assert_eq!(rec.normal, Vec3::Y);

        assert!(tile.hit(&Ray::new(Vec3::new(1.5, 3.0, 0.0), -Vec3::Y)).is_none());
        assert!(tile.shadow_hit(&Ray::new(Vec3::new(0.0, 3.0, 2.5), -Vec3::Y)).is_none());
    }

    #[test]
    fn test_samples_cover_the_rectangle() {
        let tile = floor_tile();

        assert_eq!(tile.sample_point(Vec2::ZERO), Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(tile.sample_point(Vec2::ONE), Vec3::new(1.0, 0.0, 2.0));
        let mid = tile.sample_point(Vec2::splat(0.5));
        assert_eq!(mid, Vec3::ZERO);
        assert_eq!(tile.normal_at(mid), Vec3::Y);
    }

    #[test]
    fn test_degenerate_edges_rejected() {
        let material: Arc<dyn Material> = Arc::new(Matte::new(0.1, 0.9, Color::ONE));
        let zero = Rectangle::new(Vec3::ZERO, Vec3::X, Vec3::ZERO, material.clone());
        let skewed = Rectangle::new(Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), material);

        assert_eq!(zero.err(), Some(GeometryError::DegenerateRectangle));
        assert_eq!(skewed.err(), Some(GeometryError::DegenerateRectangle));
    }
}
