//! Ambient light attenuated by how much of the sky a point can see.

use std::sync::Arc;

use glint_math::Vec3;

use crate::{
    context::TraceContext, light::normal_frame, Color, HemisphereSampler, Light, Ray, Sampler,
    ShadeRec,
};

/// Ambient light with occlusion.
///
/// Each shading call casts one cosine-distributed ray into the hemisphere
/// around the normal. A blocked ray yields `color * ls * min_amount`, an
/// open one the full `color * ls`; averaging over pixel samples gives
/// soft contact shadowing.
#[derive(Debug, Clone)]
pub struct AmbientOccluder {
    ls: f64,
    color: Color,
    min_amount: f64,
    shadows: bool,
    sampler: Arc<HemisphereSampler>,
}

impl AmbientOccluder {
    /// Occluder drawing directions from `sampler`, which is mapped onto the
    /// cosine weighted hemisphere here.
    pub fn new(sampler: Sampler) -> Self {
        log::debug!(
            "Ambient occluder using {} samples x {} sets",
            sampler.num_samples(),
            sampler.num_sets()
        );
        Self {
            ls: 1.0,
            color: Color::ONE,
            min_amount: 0.25,
            shadows: true,
            sampler: Arc::new(sampler.map_samples_to_hemisphere(1.0)),
        }
    }

    pub fn with_radiance(mut self, ls: f64) -> Self {
        self.ls = ls;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Fraction of the radiance left at fully occluded points.
    pub fn with_min_amount(mut self, min_amount: f64) -> Self {
        self.min_amount = min_amount;
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn min_amount(&self) -> f64 {
        self.min_amount
    }

    fn sample_direction(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Option<Vec3> {
        match normal_frame(sr.normal) {
            Ok(frame) => Some(frame.local_to_world(ctx.sample_hemisphere(&self.sampler))),
            Err(err) => {
                log::warn!("No occlusion frame at {:?}: {}", sr.hit_point, err);
                None
            }
        }
    }
}

impl Light for AmbientOccluder {
    fn direction(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Vec3 {
        self.sample_direction(sr, ctx).unwrap_or(sr.normal)
    }

    fn radiance(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color {
        let full = self.color * self.ls;
        let Some(direction) = self.sample_direction(sr, ctx) else {
            return full;
        };

        let shadow_ray = Ray::new(sr.hit_point, direction);
        if self.shadows && self.in_shadow(&shadow_ray, sr) {
            full * self.min_amount
        } else {
            full
        }
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, shadow_ray: &Ray, sr: &ShadeRec) -> bool {
        sr.material.receives_shadows() && sr.world.shadow_hit(shadow_ray, f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::FRAME_JITTER;
    use crate::{HitRecord, Matte, Plane, World};

    fn radiance_at(world: &World, material: &Matte, occluder: &AmbientOccluder) -> Color {
        radiance_with_normal(world, material, occluder, Vec3::Y)
    }

    /// Radiance at the origin for a surface facing `normal`.
    fn radiance_with_normal(
        world: &World,
        material: &Matte,
        occluder: &AmbientOccluder,
        normal: Vec3,
    ) -> Color {
        let ray = Ray::new(normal, -normal);
        let hit = HitRecord {
            t: 1.0,
            normal,
            local_hit_point: Vec3::ZERO,
            material,
        };
        let sr = ShadeRec::new(world, &ray, hit);
        occluder.radiance(&sr, &mut TraceContext::new(3))
    }

    fn occluder() -> AmbientOccluder {
        AmbientOccluder::new(Sampler::multi_jittered(16).unwrap())
            .with_color(Color::new(1.0, 0.5, 1.0))
            .with_radiance(2.0)
    }

    #[test]
    fn test_open_sky_gives_full_radiance() {
        let world = World::new();
        let matte = Matte::new(1.0, 0.0, Color::ONE);

        assert_eq!(radiance_at(&world, &matte, &occluder()), Color::new(2.0, 1.0, 2.0));
    }

    #[test]
    fn test_covered_point_gives_min_amount() {
        let mut world = World::new();
        let lid = Arc::new(Matte::new(1.0, 0.0, Color::ONE));
        world.add_object(Plane::new(Vec3::new(0.0, 0.5, 0.0), -Vec3::Y, lid).unwrap());
        let matte = Matte::new(1.0, 0.0, Color::ONE);

        assert_eq!(radiance_at(&world, &matte, &occluder()), Color::new(0.5, 0.25, 0.5));
    }

    #[test]
    fn test_material_opts_out_of_occlusion() {
        let mut world = World::new();
        let lid = Arc::new(Matte::new(1.0, 0.0, Color::ONE));
        world.add_object(Plane::new(Vec3::new(0.0, 0.5, 0.0), -Vec3::Y, lid).unwrap());
        let matte = Matte::new(1.0, 0.0, Color::ONE).with_shadows(false);

        assert_eq!(radiance_at(&world, &matte, &occluder()), Color::new(2.0, 1.0, 2.0));
    }

    #[test]
    fn test_directions_stay_in_upper_hemisphere() {
        let world = World::new();
        let matte = Matte::new(1.0, 0.0, Color::ONE);
        let ray = Ray::new(Vec3::Y, -Vec3::Y);
        let hit = HitRecord {
            t: 1.0,
            normal: Vec3::Y,
            local_hit_point: Vec3::ZERO,
            material: &matte,
        };
        let sr = ShadeRec::new(&world, &ray, hit);
        let occluder = occluder();
        let mut ctx = TraceContext::new(11);

        for _ in 0..200 {
            let d = occluder.direction(&sr, &mut ctx);
            assert!(d.y >= -1e-12);
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normal_along_frame_helper_is_still_occluded() {
        let normal = FRAME_JITTER.normalize();
        let mut world = World::new();
        let lid = Arc::new(Matte::new(1.0, 0.0, Color::ONE));
        world.add_object(Plane::new(normal * 0.5, -normal, lid).unwrap());
        let matte = Matte::new(1.0, 0.0, Color::ONE);
        let occluder = occluder();

        for n in [normal, -normal] {
            assert!(normal_frame(n).is_ok());
        }
        assert_eq!(
            radiance_with_normal(&world, &matte, &occluder, normal),
            Color::new(0.5, 0.25, 0.5)
        );
    }

    #[test]
    fn test_zero_normal_falls_back_to_full_radiance() {
        let mut world = World::new();
        let lid = Arc::new(Matte::new(1.0, 0.0, Color::ONE));
        world.add_object(Plane::new(Vec3::new(0.0, 0.5, 0.0), -Vec3::Y, lid).unwrap());
        let matte = Matte::new(1.0, 0.0, Color::ONE);

        assert!(normal_frame(Vec3::ZERO).is_err());
        assert_eq!(
            radiance_with_normal(&world, &matte, &occluder(), Vec3::ZERO),
            Color::new(2.0, 1.0, 2.0)
        );
    }
}
