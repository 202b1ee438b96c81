//! Bidirectional reflectance distribution functions.
//!
//! A BRDF answers how much light arriving along `wi` leaves along `wo`.
//! Materials are built from one or more of these. `wo` and `wi` both
//! point away from the surface.

use std::f64::consts::FRAC_1_PI;
use std::sync::Arc;

use glint_math::Vec3;

use crate::{Color, ShadeRec, Texture};

/// Reflectance model evaluated by materials during direct lighting.
pub trait Brdf: Send + Sync {
    /// Reflected radiance factor for light arriving along `wi`.
    fn f(&self, _sr: &ShadeRec, _wo: Vec3, _wi: Vec3) -> Color {
        Color::ZERO
    }

    /// Bihemispherical reflectance, used for the ambient term.
    fn rho(&self, _sr: &ShadeRec, _wo: Vec3) -> Color {
        Color::ZERO
    }
}

/// Ideal diffuse reflection with a constant color.
#[derive(Debug, Clone, Copy)]
pub struct Lambertian {
    pub kd: f64,
    pub cd: Color,
}

impl Lambertian {
    pub fn new(kd: f64, cd: Color) -> Self {
        Self { kd, cd }
    }
}

impl Brdf for Lambertian {
    fn f(&self, _sr: &ShadeRec, _wo: Vec3, _wi: Vec3) -> Color {
        self.kd * self.cd * FRAC_1_PI
    }

    fn rho(&self, _sr: &ShadeRec, _wo: Vec3) -> Color {
        self.kd * self.cd
    }
}

/// Ideal diffuse reflection whose color comes from a texture.
#[derive(Clone)]
pub struct SvLambertian {
    pub kd: f64,
    pub cd: Arc<dyn Texture>,
}

impl SvLambertian {
    pub fn new(kd: f64, cd: Arc<dyn Texture>) -> Self {
        Self { kd, cd }
    }
}

impl Brdf for SvLambertian {
    fn f(&self, sr: &ShadeRec, _wo: Vec3, _wi: Vec3) -> Color {
        self.kd * self.cd.color(sr) * FRAC_1_PI
    }

    fn rho(&self, sr: &ShadeRec, _wo: Vec3) -> Color {
        self.kd * self.cd.color(sr)
    }
}

/// Phong specular lobe around the mirror direction.
#[derive(Debug, Clone, Copy)]
pub struct GlossySpecular {
    pub ks: f64,
    pub cs: Color,
    pub exp: f64,
}

impl GlossySpecular {
    pub fn new(ks: f64, cs: Color, exp: f64) -> Self {
        Self { ks, cs, exp }
    }
}

impl Brdf for GlossySpecular {
    fn f(&self, sr: &ShadeRec, wo: Vec3, wi: Vec3) -> Color {
        let r = reflect(wi, sr.normal);
        let r_dot_wo = r.dot(wo);
        if r_dot_wo > 0.0 {
            self.ks * self.cs * r_dot_wo.powf(self.exp)
        } else {
            Color::ZERO
        }
    }
}

/// Perfect mirror reflection. Only usable through [`PerfectSpecular::sample_f`].
#[derive(Debug, Clone, Copy)]
pub struct PerfectSpecular {
    pub kr: f64,
    pub cr: Color,
}

impl PerfectSpecular {
    pub fn new(kr: f64, cr: Color) -> Self {
        Self { kr, cr }
    }

    /// Mirror direction of `wo` and the factor to weight its radiance by.
    ///
    /// The factor already divides out the cosine the caller multiplies
    /// back in.
    pub fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> (Color, Vec3) {
        let wi = reflect(wo, sr.normal);
        let cos = sr.normal.dot(wi).abs();
        if cos == 0.0 {
            return (Color::ZERO, wi);
        }
        (self.kr * self.cr / cos, wi)
    }
}

impl Brdf for PerfectSpecular {}

/// Perfect specular transmission through a dielectric boundary.
#[derive(Debug, Clone, Copy)]
pub struct PerfectTransmitter {
    pub kt: f64,
    pub ior: f64,
}

impl PerfectTransmitter {
    pub fn new(kt: f64, ior: f64) -> Self {
        Self { kt, ior }
    }

    /// Relative index and cosine as seen from the side `wo` is on.
    fn orient(&self, sr: &ShadeRec, wo: Vec3) -> (Vec3, f64, f64) {
        let cos_i = sr.normal.dot(wo);
        if cos_i < 0.0 {
            (-sr.normal, -cos_i, 1.0 / self.ior)
        } else {
            (sr.normal, cos_i, self.ior)
        }
    }

    /// Whether the incoming ray of `sr` is totally internally reflected.
    pub fn tir(&self, sr: &ShadeRec) -> bool {
        let (_, cos_i, eta) = self.orient(sr, -sr.ray.direction());
        1.0 - (1.0 - cos_i * cos_i) / (eta * eta) < 0.0
    }

    /// Transmitted direction and weight. Call only when [`tir`](Self::tir) is false.
    pub fn sample_f(&self, sr: &ShadeRec, wo: Vec3) -> (Color, Vec3) {
        let (n, cos_i, eta) = self.orient(sr, wo);
        let cos_t = (1.0 - (1.0 - cos_i * cos_i) / (eta * eta)).max(0.0).sqrt();
        let wt = refract(wo, n, cos_i, cos_t, eta);

        let cos = sr.normal.dot(wt).abs();
        if cos == 0.0 {
            return (Color::ZERO, wt);
        }
        (self.kt / (eta * eta) * Color::ONE / cos, wt)
    }
}

impl Brdf for PerfectTransmitter {}

/// Mirror `v` about `n`; both point away from the surface.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    -v + 2.0 * n.dot(v) * n
}

#[inline]
fn refract(wo: Vec3, n: Vec3, cos_i: f64, cos_t: f64, eta: f64) -> Vec3 {
    -wo / eta - (cos_t - cos_i / eta) * n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstantColor, HitRecord, Matte, World};
    use glint_math::Ray;

    fn with_sr(ray: Ray, normal: Vec3, check: impl FnOnce(&ShadeRec)) {
        let world = World::new();
        let material = Matte::new(0.0, 1.0, Color::ONE);
        let hit = HitRecord {
            t: 1.0,
            normal,
            local_hit_point: ray.at(1.0),
            material: &material,
        };
        check(&ShadeRec::new(&world, &ray, hit));
    }

    fn head_on() -> Ray {
        Ray::new(Vec3::Z, -Vec3::Z)
    }

    #[test]
    fn test_lambertian() {
        let brdf = Lambertian::new(0.5, Color::new(1.0, 0.5, 0.0));
        with_sr(head_on(), Vec3::Z, |sr| {
            let f = brdf.f(sr, Vec3::Z, Vec3::Z);
            assert!((f - Color::new(0.5, 0.25, 0.0) / std::f64::consts::PI).length() < 1e-12);
            assert_eq!(brdf.rho(sr, Vec3::Z), Color::new(0.5, 0.25, 0.0));
        });
    }

    #[test]
    fn test_sv_lambertian_reads_texture() {
        let brdf = SvLambertian::new(0.8, Arc::new(ConstantColor::new(Color::splat(0.5))));
        with_sr(head_on(), Vec3::Z, |sr| {
            assert!((brdf.rho(sr, Vec3::Z) - Color::splat(0.4)).length() < 1e-12);
        });
    }

    #[test]
    fn test_glossy_peaks_at_mirror_direction() {
        let brdf = GlossySpecular::new(1.0, Color::ONE, 20.0);
        let wi = Vec3::new(1.0, 0.0, 1.0).normalize();
        let mirror = Vec3::new(-1.0, 0.0, 1.0).normalize();
        with_sr(head_on(), Vec3::Z, |sr| {
            assert!((brdf.f(sr, mirror, wi) - Color::ONE).length() < 1e-9);
            assert!(brdf.f(sr, Vec3::Z, wi).x < 1e-3);
            assert_eq!(brdf.f(sr, -mirror, wi), Color::ZERO);
        });
    }

    #[test]
    fn test_perfect_specular_reflects() {
        let brdf = PerfectSpecular::new(0.75, Color::ONE);
        let wo = Vec3::new(1.0, 0.0, 1.0).normalize();
        with_sr(head_on(), Vec3::Z, |sr| {
            let (fr, wi) = brdf.sample_f(sr, wo);
            assert!((wi - Vec3::new(-1.0, 0.0, 1.0).normalize()).length() < 1e-12);
            // Weight times cosine gives back kr
            assert!((fr * sr.normal.dot(wi) - Color::splat(0.75)).length() < 1e-12);
        });
    }

    #[test]
    fn test_transmitter_head_on_goes_straight() {
        let brdf = PerfectTransmitter::new(1.0, 1.5);
        with_sr(head_on(), Vec3::Z, |sr| {
            assert!(!brdf.tir(sr));
            let (ft, wt) = brdf.sample_f(sr, Vec3::Z);
            assert!((wt + Vec3::Z).length() < 1e-12);
            assert!((ft - Color::splat(1.0 / 2.25)).length() < 1e-12);
        });
    }

    #[test]
    fn test_transmitter_tir_from_inside() {
        let brdf = PerfectTransmitter::new(1.0, 1.5);
        // Leaving the dense medium at a grazing angle
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.2).normalize());
        with_sr(ray, Vec3::Z, |sr| assert!(brdf.tir(sr)));

        let steep = Ray::new(Vec3::ZERO, Vec3::new(0.1, 0.0, 1.0).normalize());
        with_sr(steep, Vec3::Z, |sr| assert!(!brdf.tir(sr)));
    }
}
