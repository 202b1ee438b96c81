//! Materials: how a surface turns incident light into a color.
//!
//! Every material except [`Emissive`] shades with the same direct
//! lighting loop: the ambient term, then one shadow-tested contribution
//! per light in the world. Reflective and transparent materials add
//! secondary rays traced back through the world at `depth + 1`.

use std::sync::Arc;

use glint_math::{Ray, Vec3};

use crate::{
    brdf::{Brdf, GlossySpecular, Lambertian, PerfectSpecular, PerfectTransmitter, SvLambertian},
    context::TraceContext,
    LightSample, ShadeRec, Texture,
};

/// Color type alias (linear RGB, unbounded)
pub type Color = Vec3;

/// Trait for surface materials.
pub trait Material: Send + Sync {
    /// Radiance leaving the surface towards `sr.ray`'s origin.
    fn shade(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color;

    /// Whether lights test this surface for shadows.
    fn receives_shadows(&self) -> bool {
        true
    }
}

/// Ambient plus shadow-tested direct lighting from every world light.
fn direct_lighting(
    sr: &ShadeRec,
    ctx: &mut TraceContext,
    ambient: &dyn Brdf,
    diffuse: &dyn Brdf,
    specular: Option<&GlossySpecular>,
    receives_shadows: bool,
) -> Color {
    let wo = -sr.ray.direction();
    let mut l = ambient.rho(sr, wo) * sr.world.ambient().radiance(sr, ctx);

    for light in sr.world.lights() {
        let LightSample { wi, radiance } = light.sample(sr, ctx);
        let n_dot_wi = sr.normal.dot(wi);
        if n_dot_wi <= 0.0 {
            continue;
        }

        if receives_shadows && light.casts_shadows() {
            let shadow_ray = Ray::new(sr.hit_point, wi);
            if light.in_shadow(&shadow_ray, sr) {
                continue;
            }
        }

        let mut f = diffuse.f(sr, wo, wi);
        if let Some(specular) = specular {
            f += specular.f(sr, wo, wi);
        }
        l += f * radiance * n_dot_wi;
    }

    l
}

/// Diffuse material with a constant color.
#[derive(Debug, Clone, Copy)]
pub struct Matte {
    ambient: Lambertian,
    diffuse: Lambertian,
    shadows: bool,
}

impl Matte {
    /// Create a matte material.
    ///
    /// - `ka`: ambient reflection coefficient
    /// - `kd`: diffuse reflection coefficient
    /// - `cd`: diffuse color
    pub fn new(ka: f64, kd: f64, cd: Color) -> Self {
        Self {
            ambient: Lambertian::new(ka, cd),
            diffuse: Lambertian::new(kd, cd),
            shadows: true,
        }
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }
}

impl Material for Matte {
    fn shade(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color {
        direct_lighting(sr, ctx, &self.ambient, &self.diffuse, None, self.shadows)
    }

    fn receives_shadows(&self) -> bool {
        self.shadows
    }
}

/// Diffuse material whose color comes from a texture.
#[derive(Clone)]
pub struct SvMatte {
    ambient: SvLambertian,
    diffuse: SvLambertian,
    shadows: bool,
}

impl SvMatte {
    pub fn new(ka: f64, kd: f64, texture: Arc<dyn Texture>) -> Self {
        Self {
            ambient: SvLambertian::new(ka, texture.clone()),
            diffuse: SvLambertian::new(kd, texture),
            shadows: true,
        }
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }
}

impl Material for SvMatte {
    fn shade(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color {
        direct_lighting(sr, ctx, &self.ambient, &self.diffuse, None, self.shadows)
    }

    fn receives_shadows(&self) -> bool {
        self.shadows
    }
}

/// Diffuse plus a glossy highlight.
#[derive(Debug, Clone, Copy)]
pub struct Phong {
    ambient: Lambertian,
    diffuse: Lambertian,
    specular: GlossySpecular,
    shadows: bool,
}

impl Phong {
    /// Create a Phong material with a white highlight.
    ///
    /// - `ks`: specular coefficient
    /// - `exp`: highlight exponent, larger is tighter
    pub fn new(ka: f64, kd: f64, ks: f64, cd: Color, exp: f64) -> Self {
        Self {
            ambient: Lambertian::new(ka, cd),
            diffuse: Lambertian::new(kd, cd),
            specular: GlossySpecular::new(ks, Color::ONE, exp),
            shadows: true,
        }
    }

    /// Tint the highlight.
    pub fn with_specular_color(mut self, cs: Color) -> Self {
        self.specular.cs = cs;
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }
}

impl Material for Phong {
    fn shade(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color {
        direct_lighting(
            sr,
            ctx,
            &self.ambient,
            &self.diffuse,
            Some(&self.specular),
            self.shadows,
        )
    }

    fn receives_shadows(&self) -> bool {
        self.shadows
    }
}

/// Phong surface with a perfect mirror reflection on top.
#[derive(Debug, Clone, Copy)]
pub struct Reflective {
    base: Phong,
    reflective: PerfectSpecular,
}

impl Reflective {
    pub fn new(base: Phong, reflective: PerfectSpecular) -> Self {
        Self { base, reflective }
    }
}

impl Material for Reflective {
    fn shade(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color {
        let mut l = self.base.shade(sr, ctx);

        let wo = -sr.ray.direction();
        let (fr, wi) = self.reflective.sample_f(sr, wo);
        let reflected = Ray::new(sr.hit_point, wi);
        l += fr * sr.world.trace_ray_at_depth(&reflected, sr.depth + 1, ctx) * sr.normal.dot(wi);

        l
    }

    fn receives_shadows(&self) -> bool {
        self.base.shadows
    }
}

/// Glass-like surface: Phong highlight, mirror reflection and refraction.
///
/// Rays travelling inside the surface can be tinted by a filter color
/// raised to the distance travelled, which needs a tracer that reports
/// hit distances (see [`Whitted`](crate::Whitted)).
#[derive(Debug, Clone, Copy)]
pub struct Transparent {
    base: Phong,
    reflective: PerfectSpecular,
    transmitter: PerfectTransmitter,
    filter: Option<Color>,
}

impl Transparent {
    pub fn new(base: Phong, reflective: PerfectSpecular, transmitter: PerfectTransmitter) -> Self {
        Self {
            base,
            reflective,
            transmitter,
            filter: None,
        }
    }

    /// Attenuate light travelling inside by `filter^distance` per channel.
    pub fn with_filter(mut self, filter: Color) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Trace a secondary ray, applying the filter when it runs inside.
    fn trace(&self, sr: &ShadeRec, ray: &Ray, ctx: &mut TraceContext) -> Color {
        let depth = sr.depth + 1;
        let inside = sr.normal.dot(ray.direction()) < 0.0;
        match self.filter {
            Some(filter) if inside => {
                let (color, distance) = sr.world.trace_ray_with_distance(ray, depth, ctx);
                match distance {
                    Some(t) => color * Color::new(filter.x.powf(t), filter.y.powf(t), filter.z.powf(t)),
                    None => color,
                }
            }
            _ => sr.world.trace_ray_at_depth(ray, depth, ctx),
        }
    }
}

impl Material for Transparent {
    fn shade(&self, sr: &ShadeRec, ctx: &mut TraceContext) -> Color {
        let mut l = self.base.shade(sr, ctx);

        let wo = -sr.ray.direction();
        let (fr, wi) = self.reflective.sample_f(sr, wo);
        let reflected = Ray::new(sr.hit_point, wi);

        if self.transmitter.tir(sr) {
            // All energy goes to the reflected ray
            l += self.trace(sr, &reflected, ctx);
        } else {
            let (ft, wt) = self.transmitter.sample_f(sr, wo);
            let transmitted = Ray::new(sr.hit_point, wt);

            l += fr * self.trace(sr, &reflected, ctx) * sr.normal.dot(wi).abs();
            l += ft * self.trace(sr, &transmitted, ctx) * sr.normal.dot(wt).abs();
        }

        l
    }

    fn receives_shadows(&self) -> bool {
        self.base.shadows
    }
}

/// Self-luminous surface, visible from the front only.
#[derive(Debug, Clone, Copy)]
pub struct Emissive {
    ls: f64,
    ce: Color,
}

impl Emissive {
    pub fn new(ls: f64, ce: Color) -> Self {
        Self { ls, ce }
    }

    pub fn radiance(&self) -> Color {
        self.ls * self.ce
    }
}

impl Material for Emissive {
    fn shade(&self, sr: &ShadeRec, _ctx: &mut TraceContext) -> Color {
        if -sr.normal.dot(sr.ray.direction()) > 0.0 {
            self.radiance()
        } else {
            Color::ZERO
        }
    }

    fn receives_shadows(&self) -> bool {
        false
    }
}
