//! Light sources.
//!
//! Point, directional and ambient lights are deterministic. The jittered
//! directional and environment lights here, and [`crate::AreaLight`],
//! draw one sample per call from a mapped sampler, so averaging over
//! pixel samples gives soft shadows.

use std::sync::Arc;

use glint_math::{Onb, TransformError, Vec3};

use crate::{
    context::TraceContext, Color, Emissive, HemisphereSampler, Ray, Sampler, ShadeRec,
    SphereSampler,
};

/// Off-axis helper vector for building a local frame around a normal.
pub(crate) const FRAME_JITTER: Vec3 = Vec3::new(0.0072, 1.0, 0.0034);

/// Helper vector for normals parallel to [`FRAME_JITTER`].
const FALLBACK_JITTER: Vec3 = Vec3::new(1.0, 0.0072, 0.0034);

/// Frame around `normal`, switching helper vectors when the first one is
/// parallel to it. Only a zero normal fails.
pub(crate) fn normal_frame(normal: Vec3) -> Result<Onb, TransformError> {
    Onb::from_normal(normal, FRAME_JITTER).or_else(|_| Onb::from_normal(normal, FALLBACK_JITTER))
}

/// One draw of a light at a shading point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// Unit direction from the hit point towards the light
    pub wi: Vec3,
    /// Incident radiance along `wi`, divided by the sampling density
    pub radiance: Color,
}

/// A source of incident light at a shading point.
///
/// `direction` and `radiance` may draw samples from `ctx`, each call on
/// its own. Shading asks for [`Light::sample`], which pairs a direction
/// with the radiance arriving along it.
pub trait Light: Send + Sync {
    /// Unit direction from the hit point towards the light.
    fn direction(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Vec3;

    /// Incident radiance at the hit point.
    fn radiance(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color;

    /// Direction and radiance from a single draw.
    fn sample(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> LightSample {
        let wi = self.direction(sr, ctx);
        LightSample {
            wi,
            radiance: self.radiance(sr, ctx),
        }
    }

    /// Whether this light is blocked by geometry.
    fn casts_shadows(&self) -> bool {
        false
    }

    /// Whether `shadow_ray`, leaving the hit point towards the light, is blocked.
    fn in_shadow(&self, _shadow_ray: &Ray, _sr: &ShadeRec) -> bool {
        false
    }
}

/// Constant light arriving from everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Ambient {
    ls: f64,
    color: Color,
}

impl Ambient {
    pub fn new(ls: f64, color: Color) -> Self {
        Self { ls, color }
    }
}

impl Default for Ambient {
    fn default() -> Self {
        Self::new(1.0, Color::ONE)
    }
}

impl Light for Ambient {
    fn direction(&self, _sr: &ShadeRec, _ctx: &mut TraceContext) -> Vec3 {
        Vec3::ZERO
    }

    fn radiance(&self, _sr: &ShadeRec, _ctx: &mut TraceContext) -> Color {
        self.ls * self.color
    }
}

/// Light emitted from a single point.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    location: Vec3,
    ls: f64,
    color: Color,
    shadows: bool,
    falloff: f64,
}

impl PointLight {
    /// White point light without distance attenuation.
    pub fn new(location: Vec3, ls: f64) -> Self {
        Self {
            location,
            ls,
            color: Color::ONE,
            shadows: false,
            falloff: 0.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    /// Divide radiance by `distance^power`. Zero disables attenuation.
    pub fn with_falloff(mut self, power: f64) -> Self {
        self.falloff = power;
        self
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }
}

impl Light for PointLight {
    fn direction(&self, sr: &ShadeRec, _ctx: &mut TraceContext) -> Vec3 {
        (self.location - sr.hit_point).normalize_or_zero()
    }

    fn radiance(&self, sr: &ShadeRec, _ctx: &mut TraceContext) -> Color {
        let l = self.ls * self.color;
        if self.falloff == 0.0 {
            return l;
        }
        let distance = self.location.distance(sr.hit_point);
        if distance == 0.0 {
            return l;
        }
        l / distance.powf(self.falloff)
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, shadow_ray: &Ray, sr: &ShadeRec) -> bool {
        let distance = self.location.distance(shadow_ray.origin());
        sr.world.shadow_hit(shadow_ray, distance)
    }
}

/// Parallel light from a fixed direction, as from a distant source.
#[derive(Debug, Clone, Copy)]
pub struct Directional {
    direction: Vec3,
    ls: f64,
    color: Color,
    shadows: bool,
}

impl Directional {
    /// `direction` points from the surface towards the light.
    pub fn new(direction: Vec3, ls: f64) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            ls,
            color: Color::ONE,
            shadows: false,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }
}

impl Light for Directional {
    fn direction(&self, _sr: &ShadeRec, _ctx: &mut TraceContext) -> Vec3 {
        self.direction
    }

    fn radiance(&self, _sr: &ShadeRec, _ctx: &mut TraceContext) -> Color {
        self.ls * self.color
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, shadow_ray: &Ray, sr: &ShadeRec) -> bool {
        sr.world.shadow_hit(shadow_ray, f64::INFINITY)
    }
}

/// Directional light whose direction wobbles inside a cone, as from a
/// distant source with a visible disc.
///
/// Each call offsets the base direction by a point on the sphere of
/// radius `jitter`.
#[derive(Debug, Clone)]
pub struct JitteredDirectional {
    direction: Vec3,
    jitter: f64,
    ls: f64,
    color: Color,
    shadows: bool,
    sampler: Arc<SphereSampler>,
}

impl JitteredDirectional {
    /// `direction` points from the surface towards the light. `sampler` is
    /// mapped onto the sphere here.
    pub fn new(direction: Vec3, jitter: f64, ls: f64, sampler: Sampler) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            jitter: jitter.abs(),
            ls,
            color: Color::ONE,
            shadows: false,
            sampler: Arc::new(sampler.map_samples_to_sphere()),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }
}

impl Light for JitteredDirectional {
    fn direction(&self, _sr: &ShadeRec, ctx: &mut TraceContext) -> Vec3 {
        let offset = ctx.sample_sphere(&self.sampler) * self.jitter;
        (self.direction + offset)
            .try_normalize()
            .unwrap_or(self.direction)
    }

    fn radiance(&self, _sr: &ShadeRec, _ctx: &mut TraceContext) -> Color {
        self.ls * self.color
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, shadow_ray: &Ray, sr: &ShadeRec) -> bool {
        sr.world.shadow_hit(shadow_ray, f64::INFINITY)
    }
}

/// Light from an emissive sky surrounding the whole scene.
///
/// Directions are drawn cosine weighted around the normal, so the
/// returned radiance is `Le / pdf` with `pdf = cos θ / π`.
#[derive(Debug, Clone)]
pub struct EnvironmentLight {
    emissive: Emissive,
    shadows: bool,
    sampler: Arc<HemisphereSampler>,
}

impl EnvironmentLight {
    /// Sky of `emissive`, sampled with `sampler` mapped onto the cosine
    /// weighted hemisphere here.
    pub fn new(emissive: Emissive, sampler: Sampler) -> Self {
        Self {
            emissive,
            shadows: false,
            sampler: Arc::new(sampler.map_samples_to_hemisphere(1.0)),
        }
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    fn weighted(&self, sr: &ShadeRec, wi: Vec3) -> Color {
        let cos_theta = sr.normal.dot(wi);
        if cos_theta <= 0.0 {
            return Color::ZERO;
        }
        self.emissive.radiance() * std::f64::consts::PI / cos_theta
    }
}

impl Light for EnvironmentLight {
    fn direction(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Vec3 {
        match normal_frame(sr.normal) {
            Ok(frame) => frame.local_to_world(ctx.sample_hemisphere(&self.sampler)),
            Err(err) => {
                log::warn!("No environment frame at {:?}: {}", sr.hit_point, err);
                sr.normal
            }
        }
    }

    fn radiance(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color {
        let wi = self.direction(sr, ctx);
        self.weighted(sr, wi)
    }

    fn sample(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> LightSample {
        let wi = self.direction(sr, ctx);
        LightSample {
            wi,
            radiance: self.weighted(sr, wi),
        }
    }

    fn casts_shadows(&self) -> bool {
        self.shadows
    }

    fn in_shadow(&self, shadow_ray: &Ray, sr: &ShadeRec) -> bool {
        sr.world.shadow_hit(shadow_ray, f64::INFINITY)
    }
}
