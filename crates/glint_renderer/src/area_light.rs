//! Lights that emit from the surface of an object.

use std::sync::Arc;

use glint_math::{Vec2, Vec3};

use crate::{
    context::TraceContext,
    hittable::{Hittable, HIT_EPSILON},
    Color, Emissive, Light, LightSample, Ray, Sampler, ShadeRec,
};

/// Geometry an [`AreaLight`] can emit from.
///
/// Points are drawn uniformly over the surface, so the sampling density
/// is `1 / area`.
pub trait LightSurface: Hittable {
    /// Point on the surface for a sample in [0, 1)².
    fn sample_point(&self, sample: Vec2) -> Vec3;

    /// Emitting side normal at a point on the surface.
    fn normal_at(&self, point: Vec3) -> Vec3;

    fn area(&self) -> f64;
}

/// Emissive surface lighting the scene.
///
/// Every call picks one point on the surface. The radiance returned for
/// it is `Le · G / pdf`, where `G = cos θ' / d²` and `θ'` is the angle
/// at the light. Averaging over pixel samples gives soft shadows whose
/// penumbra matches the emitter's shape.
///
/// Add a copy of the surface to the world with the same [`Emissive`] to
/// make the light visible. That copy normally has shadows off.
#[derive(Clone)]
pub struct AreaLight {
    surface: Arc<dyn LightSurface>,
    emissive: Emissive,
    shadows: bool,
    sampler: Arc<Sampler>,
}

impl AreaLight {
    pub fn new(surface: impl LightSurface + 'static, emissive: Emissive, sampler: Sampler) -> Self {
        log::debug!(
            "Area light over {:.3} units² using {} samples x {} sets",
            surface.area(),
            sampler.num_samples(),
            sampler.num_sets()
        );
        Self {
            surface: Arc::new(surface),
            emissive,
            shadows: false,
            sampler: Arc::new(sampler),
        }
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    fn draw(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> LightSample {
        let point = self
            .surface
            .sample_point(ctx.sample_unit_square(&self.sampler));
        let to_light = point - sr.hit_point;
        let Some(wi) = to_light.try_normalize() else {
            return LightSample {
                wi: Vec3::ZERO,
                radiance: Color::ZERO,
            };
        };

        let cos_light = -self.surface.normal_at(point).dot(wi);
        let radiance = if cos_light > 0.0 {
            self.emissive.radiance() * cos_light * self.surface.area() / to_light.length_squared()
        } else {
            Color::ZERO
        };
        LightSample { wi, radiance }
    }
}

impl Light for AreaLight {
    fn direction(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Vec3 {
        self.draw(sr, ctx).wi
    }

    fn radiance(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color {
        self.draw(sr, ctx).radiance
    }

    fn sample(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> LightSample {
        self.draw(sr, ctx)
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    /// Blocked by anything in front of the point where the ray meets the
    /// emitter.
    fn in_shadow(&self, shadow_ray: &Ray, sr: &ShadeRec) -> bool {
        match self.surface.shadow_hit(shadow_ray) {
            Some(distance) => sr.world.shadow_hit(shadow_ray, distance - HIT_EPSILON),
            None => false,
        }
    }
}
