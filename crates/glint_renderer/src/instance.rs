//! Transformed geometry via inverse ray transformation.
//!
//! Instead of transforming an object, an [`Instance`] pulls every ray into
//! the object's own space with the accumulated inverse transform, asks the
//! wrapped object for a hit, and pushes the normal back out with the
//! inverse transpose. The hit parameter `t` is the same in both spaces
//! because the local ray direction is left unnormalized.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray,
};
use glint_math::{InverseTransform, Shear, TransformError, Vec3};

/// A transformed reference to another object.
///
/// Many instances can share one object through the `Arc`. The local hit
/// point reported to textures stays in the wrapped object's space, so
/// textures move with the geometry.
#[derive(Clone)]
pub struct Instance {
    object: Arc<dyn Hittable>,
    transform: InverseTransform,
    material: Option<Arc<dyn Material>>,
    shadows: bool,
}

impl Instance {
    /// Untransformed instance of `object`.
    pub fn new(object: Arc<dyn Hittable>) -> Self {
        Self {
            object,
            transform: InverseTransform::new(),
            material: None,
            shadows: true,
        }
    }

    /// Shade every hit with `material` instead of the object's own.
    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// Enable or disable shadow casting.
    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn transform(&self) -> &InverseTransform {
        &self.transform
    }

    pub fn scale(&mut self, s: Vec3) -> Result<&mut Self, TransformError> {
        self.transform.scale(s)?;
        Ok(self)
    }

    pub fn uniform_scale(&mut self, s: f64) -> Result<&mut Self, TransformError> {
        self.transform.uniform_scale(s)?;
        Ok(self)
    }

    pub fn translate(&mut self, t: Vec3) -> &mut Self {
        self.transform.translate(t);
        self
    }

    pub fn rotate_x(&mut self, degrees: f64) -> &mut Self {
        self.transform.rotate_x(degrees);
        self
    }

    pub fn rotate_y(&mut self, degrees: f64) -> &mut Self {
        self.transform.rotate_y(degrees);
        self
    }

    pub fn rotate_z(&mut self, degrees: f64) -> &mut Self {
        self.transform.rotate_z(degrees);
        self
    }

    pub fn shear(&mut self, shear: Shear) -> Result<&mut Self, TransformError> {
        self.transform.shear(shear)?;
        Ok(self)
    }

    fn local_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.transform.apply_to_point(ray.origin()),
            self.transform.apply_to_direction(ray.direction()),
        )
    }
}

impl Hittable for Instance {
    fn hit<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let mut rec = self.object.hit(&self.local_ray(ray))?;
        rec.normal = self.transform.normal_to_world(rec.normal);
        if let Some(material) = &self.material {
            rec.material = material.as_ref();
        }
        Some(rec)
    }

    fn shadow_hit(&self, ray: &Ray) -> Option<f64> {
        self.object.shadow_hit(&self.local_ray(ray))
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Matte, Sphere};

    fn unit_sphere() -> Arc<dyn Hittable> {
        Arc::new(
            Sphere::new(
                Vec3::ZERO,
                1.0,
                Arc::new(Matte::new(0.25, 0.75, Color::splat(0.7))),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_identity_instance_matches_object() {
        let sphere = unit_sphere();
        let instance = Instance::new(sphere.clone());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let direct = sphere.hit(&ray).unwrap();
        let instanced = instance.hit(&ray).unwrap();
        assert!((direct.t - instanced.t).abs() < 1e-12);
        assert!((direct.normal - instanced.normal).length() < 1e-12);
    }

    #[test]
    fn test_translated_instance() {
        let mut instance = Instance::new(unit_sphere());
        instance.translate(Vec3::new(5.0, 0.0, 0.0));

        let ray = Ray::new(Vec3::new(5.0, 0.0, 5.0), -Vec3::Z);
        let rec = instance.hit(&ray).unwrap();

        assert!((rec.t - 4.0).abs() < 1e-12);
        // Local hit point stays in object space
        assert!((rec.local_hit_point - Vec3::Z).length() < 1e-12);
        assert!(instance.hit(&Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z)).is_none());
    }

    #[test]
    fn test_scaled_instance_keeps_world_t() {
        let mut instance = Instance::new(unit_sphere());
        instance.scale(Vec3::new(1.0, 3.0, 1.0)).unwrap();

        // Stretched to radius 3 along y
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y);
        let rec = instance.hit(&ray).unwrap();

        assert!((rec.t - 7.0).abs() < 1e-9);
        assert!((rec.normal - Vec3::Y).length() < 1e-9);
        assert_eq!(instance.shadow_hit(&ray).map(|t| (t - 7.0).abs() < 1e-9), Some(true));
    }

    #[test]
    fn test_material_override_and_shadow_flag() {
        let red: Arc<dyn Material> = Arc::new(Matte::new(0.0, 1.0, Color::X));
        let instance = Instance::new(unit_sphere())
            .with_material(red.clone())
            .with_shadows(false);

        let rec = instance.hit(&Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z)).unwrap();
        assert!(std::ptr::addr_eq(rec.material, red.as_ref()));
        assert!(!instance.casts_shadows());
    }
}
