//! The shading record passed from intersection to lighting and materials.

use glint_math::{Ray, Vec3};

use crate::{HitRecord, Material, World};

/// Everything shading code needs to know about one ray/surface hit.
///
/// Created on the stack by [`World::hit_objects`], filled in by the
/// tracer and dropped once the material has returned a color. It is
/// cheap to copy; texture instancing copies it to substitute a
/// transformed `local_hit_point`.
#[derive(Clone, Copy)]
pub struct ShadeRec<'w> {
    /// World the hit belongs to, for light lists and shadow queries
    pub world: &'w World,
    /// Material of the surface that was hit
    pub material: &'w dyn Material,
    /// World space hit point
    pub hit_point: Vec3,
    /// Object space hit point, used for texturing
    pub local_hit_point: Vec3,
    /// Unit surface normal in world space
    pub normal: Vec3,
    /// The ray that produced this hit
    pub ray: Ray,
    /// Ray parameter of the hit
    pub t: f64,
    /// Recursion depth of `ray`
    pub depth: u32,
}

impl<'w> ShadeRec<'w> {
    /// Shading record for `hit` along `ray`, at depth 0.
    pub fn new(world: &'w World, ray: &Ray, hit: HitRecord<'w>) -> Self {
        Self {
            world,
            material: hit.material,
            hit_point: ray.at(hit.t),
            local_hit_point: hit.local_hit_point,
            normal: hit.normal,
            ray: *ray,
            t: hit.t,
            depth: 0,
        }
    }
}

impl std::fmt::Debug for ShadeRec<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadeRec")
            .field("hit_point", &self.hit_point)
            .field("local_hit_point", &self.local_hit_point)
            .field("normal", &self.normal)
            .field("ray", &self.ray)
            .field("t", &self.t)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
