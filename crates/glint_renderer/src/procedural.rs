//! Procedural solid textures.
//!
//! All of these are evaluated at `sr.local_hit_point` and need no UV
//! coordinates. Wrap them in a [`TextureInstance`](crate::TextureInstance)
//! to move, scale or rotate the pattern.

use std::f64::consts::TAU;

use glint_math::Interval;

use crate::{Color, LatticeNoise, ShadeRec, Texture};

/// Offset that keeps checker boundaries off axis-aligned surfaces.
const CHECKER_EPSILON: f64 = -0.000187453738;

/// Alternating cubes of two colors.
#[derive(Debug, Clone, Copy)]
pub struct Checker3D {
    size: f64,
    color1: Color,
    color2: Color,
}

impl Checker3D {
    pub fn new(size: f64, color1: Color, color2: Color) -> Self {
        Self {
            size,
            color1,
            color2,
        }
    }
}

impl Texture for Checker3D {
    fn color(&self, sr: &ShadeRec) -> Color {
        let p = (sr.local_hit_point + CHECKER_EPSILON) / self.size;
        let parity = [p.x, p.y, p.z]
            .iter()
            .fold(0, |parity, c| parity ^ (c.floor() as i64 & 1));
        if parity == 0 {
            self.color1
        } else {
            self.color2
        }
    }
}

/// Checkers wrapped around the generic cylinder (axis y, y in [-1, 1]),
/// with optional grout lines between cells.
#[derive(Debug, Clone, Copy)]
pub struct CylinderChecker {
    num_horizontal: u32,
    num_vertical: u32,
    horizontal_line_width: f64,
    vertical_line_width: f64,
    color1: Color,
    color2: Color,
    line_color: Color,
}

impl CylinderChecker {
    /// Checkers of `color1` and `color2`, no lines.
    pub fn new(num_horizontal: u32, num_vertical: u32, color1: Color, color2: Color) -> Self {
        Self {
            num_horizontal: num_horizontal.max(1),
            num_vertical: num_vertical.max(1),
            horizontal_line_width: 0.0,
            vertical_line_width: 0.0,
            color1,
            color2,
            line_color: Color::ZERO,
        }
    }

    /// Line widths as a fraction of a cell, for both directions.
    pub fn with_lines(mut self, width: f64, line_color: Color) -> Self {
        self.horizontal_line_width = width;
        self.vertical_line_width = width;
        self.line_color = line_color;
        self
    }

    pub fn with_line_widths(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_line_width = horizontal;
        self.vertical_line_width = vertical;
        self
    }
}

impl Default for CylinderChecker {
    fn default() -> Self {
        Self::new(20, 10, Color::ONE, Color::splat(0.5))
    }
}

impl Texture for CylinderChecker {
    fn color(&self, sr: &ShadeRec) -> Color {
        let p = sr.local_hit_point;

        // Height mapped from [-1, 1] to [0, 1]
        let theta = p.y / 2.0 + 0.5;
        let mut phi = p.x.atan2(p.z);
        if phi < 0.0 {
            phi += TAU;
        }

        let phi_size = TAU / self.num_horizontal as f64;
        let theta_size = 1.0 / self.num_vertical as f64;

        let iphi = (phi / phi_size).floor();
        let itheta = (theta / theta_size).floor();
        let fphi = phi / phi_size - iphi;
        let ftheta = theta / theta_size - itheta;

        let phi_line = 0.5 * self.vertical_line_width;
        let theta_line = 0.5 * self.horizontal_line_width;
        let in_line = fphi < phi_line
            || fphi > 1.0 - phi_line
            || ftheta < theta_line
            || ftheta > 1.0 - theta_line;

        if in_line {
            self.line_color
        } else if (iphi as i64 + itheta as i64).rem_euclid(2) == 0 {
            self.color2
        } else {
            self.color1
        }
    }
}

/// Color scaled by normalized fBm remapped into `range`.
#[derive(Debug, Clone)]
pub struct FbmTexture {
    noise: LatticeNoise,
    color: Color,
    range: Interval,
}

impl FbmTexture {
    pub fn new(noise: LatticeNoise, color: Color, range: Interval) -> Self {
        Self {
            noise,
            color,
            range,
        }
    }
}

impl Texture for FbmTexture {
    fn color(&self, sr: &ShadeRec) -> Color {
        self.color * self.range.lerp(self.noise.value_fbm(sr.local_hit_point))
    }
}

/// fBm multiplied by `expansion` and wrapped back into [0, 1), giving
/// banded, marble-like veins.
#[derive(Debug, Clone)]
pub struct WrappedFbmTexture {
    noise: LatticeNoise,
    color: Color,
    range: Interval,
    expansion: f64,
}

impl WrappedFbmTexture {
    pub fn new(noise: LatticeNoise, color: Color, range: Interval, expansion: f64) -> Self {
        Self {
            noise,
            color,
            range,
            expansion,
        }
    }
}

impl Texture for WrappedFbmTexture {
    fn color(&self, sr: &ShadeRec) -> Color {
        let v = self.expansion * self.noise.value_fbm(sr.local_hit_point);
        self.color * self.range.lerp(v - v.floor())
    }
}

/// Color scaled by normalized turbulence remapped into `range`.
#[derive(Debug, Clone)]
pub struct TurbulenceTexture {
    noise: LatticeNoise,
    color: Color,
    range: Interval,
}

impl TurbulenceTexture {
    pub fn new(noise: LatticeNoise, color: Color, range: Interval) -> Self {
        Self {
            noise,
            color,
            range,
        }
    }
}

impl Texture for TurbulenceTexture {
    fn color(&self, sr: &ShadeRec) -> Color {
        self.color * self.range.lerp(self.noise.value_turbulence(sr.local_hit_point))
    }
}
