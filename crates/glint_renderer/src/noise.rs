//! Lattice noise: hashed value/vector tables, interpolation and fractal sums.
//!
//! Values and unit vectors live at integer lattice points. A lattice
//! point `(ix, iy, iz)` is hashed into the tables with the fixed
//! permutation table as `PERM(ix + PERM(iy + PERM(iz)))`, where
//! `PERM(x) = PERMUTATION_TABLE[x & 255]`. The hash and the table must
//! stay bit-exact for procedural textures to reproduce.

use std::ops::{Add, Mul, Sub};
use std::sync::{Arc, OnceLock};

use glint_math::{Interval, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::sampler::SamplePattern;

/// Number of entries in every noise table.
pub const TABLE_SIZE: usize = 256;
const TABLE_MASK: i64 = TABLE_SIZE as i64 - 1;

/// Seed for the shared value and vector tables.
pub const NOISE_SEED: u64 = 253;

#[rustfmt::skip]
const PERMUTATION_TABLE: [u8; TABLE_SIZE] = [
    225, 155, 210, 108, 175, 199, 221, 144, 203, 116, 70, 213, 69, 158, 33, 252,
    5, 82, 173, 133, 222, 139, 174, 27, 9, 71, 90, 246, 75, 130, 91, 191,
    169, 138, 2, 151, 194, 235, 81, 7, 25, 113, 228, 159, 205, 253, 134, 142,
    248, 65, 224, 217, 22, 121, 229, 63, 89, 103, 96, 104, 156, 17, 201, 129,
    36, 8, 165, 110, 237, 117, 231, 56, 132, 211, 152, 20, 181, 111, 239, 218,
    170, 163, 51, 172, 157, 47, 80, 212, 176, 250, 87, 49, 99, 242, 136, 189,
    162, 115, 44, 43, 124, 94, 150, 16, 141, 247, 32, 10, 198, 223, 255, 72,
    53, 131, 84, 57, 220, 197, 58, 50, 208, 11, 241, 28, 3, 192, 62, 202,
    18, 215, 153, 24, 76, 41, 15, 179, 39, 46, 55, 6, 128, 167, 23, 188,
    106, 34, 187, 140, 164, 73, 112, 182, 244, 195, 227, 13, 35, 77, 196, 185,
    26, 200, 226, 119, 31, 123, 168, 125, 249, 68, 183, 230, 177, 135, 160, 180,
    12, 1, 243, 148, 102, 166, 38, 238, 251, 37, 240, 126, 64, 74, 161, 40,
    184, 149, 171, 178, 101, 66, 29, 59, 146, 61, 254, 107, 42, 86, 154, 4,
    236, 232, 120, 21, 233, 209, 45, 98, 193, 114, 78, 19, 206, 14, 118, 127,
    48, 79, 147, 85, 30, 207, 219, 54, 88, 234, 190, 122, 95, 67, 143, 109,
    137, 214, 145, 93, 92, 100, 245, 0, 216, 186, 60, 83, 105, 97, 204, 52,];

#[inline]
fn perm(x: i64) -> i64 {
    PERMUTATION_TABLE[(x & TABLE_MASK) as usize] as i64
}

/// Table index for an integer lattice point.
#[inline]
fn lattice_index(ix: i64, iy: i64, iz: i64) -> usize {
    perm(ix + perm(iy + perm(iz))) as usize
}

/// Scalar and unit vector tables, immutable once built.
#[derive(Debug)]
struct NoiseTables {
    values: [f64; TABLE_SIZE],
    vectors: [Vec3; TABLE_SIZE],
}

impl NoiseTables {
    fn build(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut values = [0.0; TABLE_SIZE];
        for value in values.iter_mut() {
            *value = 1.0 - 2.0 * rng.gen::<f64>();
        }

        // Vector directions come from a single multi-jittered set mapped
        // uniformly onto the sphere, so they cover it evenly.
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = SamplePattern::MultiJittered.generate(TABLE_SIZE, 1, &mut rng);
        let mut vectors = [Vec3::ZERO; TABLE_SIZE];
        for (vector, p) in vectors.iter_mut().zip(points) {
            let z = 1.0 - 2.0 * p.x;
            let r = (1.0 - z * z).max(0.0).sqrt();
            let phi = std::f64::consts::TAU * p.y;
            *vector = Vec3::new(r * phi.cos(), r * phi.sin(), z).normalize();
        }

        log::debug!("Built lattice noise tables (seed {seed})");
        Self { values, vectors }
    }

    /// Tables for [`NOISE_SEED`], built once per process.
    fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<NoiseTables>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(NoiseTables::build(NOISE_SEED)))
            .clone()
    }
}

/// How values between lattice points are reconstructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Trilinear interpolation of the 8 surrounding lattice values.
    #[default]
    Linear,
    /// Catmull-Rom spline through the 64 surrounding lattice values.
    Cubic,
}

#[inline]
fn lerp<T>(f: f64, a: T, b: T) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T>,
{
    a + (b - a) * f
}

/// Catmull-Rom segment between `knots[1]` and `knots[2]`.
#[inline]
fn four_knot_spline<T>(x: f64, knots: [T; 4]) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T>,
{
    let [k0, k1, k2, k3] = knots;
    let c3 = k0 * -0.5 + k1 * 1.5 - k2 * 1.5 + k3 * 0.5;
    let c2 = k0 - k1 * 2.5 + k2 * 2.0 - k3 * 0.5;
    let c1 = (k2 - k0) * 0.5;
    let c0 = k1;
    ((c3 * x + c2) * x + c1) * x + c0
}

/// Lattice cell of `p` and the fractional position inside it.
///
/// Cell coordinates are reduced modulo the table size, which leaves the
/// hash unchanged and keeps the neighbour offsets from overflowing.
#[inline]
fn cell(p: Vec3) -> ([i64; 3], Vec3) {
    let floor = p.floor();
    (
        [
            floor.x as i64 & TABLE_MASK,
            floor.y as i64 & TABLE_MASK,
            floor.z as i64 & TABLE_MASK,
        ],
        p - floor,
    )
}

fn trilinear<T>(p: Vec3, lookup: impl Fn(usize) -> T) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T>,
{
    let ([ix, iy, iz], f) = cell(p);
    let d = |i: i64, j: i64, k: i64| lookup(lattice_index(ix + i, iy + j, iz + k));

    let x0 = lerp(f.x, d(0, 0, 0), d(1, 0, 0));
    let x1 = lerp(f.x, d(0, 1, 0), d(1, 1, 0));
    let x2 = lerp(f.x, d(0, 0, 1), d(1, 0, 1));
    let x3 = lerp(f.x, d(0, 1, 1), d(1, 1, 1));
    let y0 = lerp(f.y, x0, x1);
    let y1 = lerp(f.y, x2, x3);
    lerp(f.z, y0, y1)
}

fn tricubic<T>(p: Vec3, lookup: impl Fn(usize) -> T) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T>,
{
    let ([ix, iy, iz], f) = cell(p);
    let knots = |k: i64| {
        let row = |j: i64| {
            let x = [-1, 0, 1, 2].map(|i| lookup(lattice_index(ix + i, iy + j, iz + k)));
            four_knot_spline(f.x, x)
        };
        four_knot_spline(f.y, [-1, 0, 1, 2].map(row))
    };
    four_knot_spline(f.z, [-1, 0, 1, 2].map(knots))
}

/// Lattice noise with fractal summation.
///
/// `value_noise` lies in [-1, 1]. The fractal functions sum
/// `num_octaves` octaves, multiplying frequency by `lacunarity` and
/// amplitude by `gain` each time, starting from frequency and amplitude 1.
#[derive(Debug, Clone)]
pub struct LatticeNoise {
    interpolation: Interpolation,
    num_octaves: u32,
    lacunarity: f64,
    gain: f64,
    fbm_bounds: Interval,
    tables: Arc<NoiseTables>,
}

impl LatticeNoise {
    /// One octave, lacunarity 2, gain 0.5.
    pub fn new(interpolation: Interpolation) -> Self {
        let mut noise = Self {
            interpolation,
            num_octaves: 1,
            lacunarity: 2.0,
            gain: 0.5,
            fbm_bounds: Interval::new(-1.0, 1.0),
            tables: NoiseTables::shared(),
        };
        noise.compute_fbm_bounds();
        noise
    }

    pub fn linear() -> Self {
        Self::new(Interpolation::Linear)
    }

    pub fn cubic() -> Self {
        Self::new(Interpolation::Cubic)
    }

    /// Rebuild the tables from a different seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.tables = if seed == NOISE_SEED {
            NoiseTables::shared()
        } else {
            Arc::new(NoiseTables::build(seed))
        };
        self
    }

    /// Number of octaves; values below 1 are raised to 1.
    pub fn with_octaves(mut self, num_octaves: u32) -> Self {
        self.num_octaves = num_octaves.max(1);
        self.compute_fbm_bounds();
        self
    }

    pub fn with_lacunarity(mut self, lacunarity: f64) -> Self {
        self.lacunarity = lacunarity;
        self
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self.compute_fbm_bounds();
        self
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn num_octaves(&self) -> u32 {
        self.num_octaves
    }

    pub fn lacunarity(&self) -> f64 {
        self.lacunarity
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Analytic range of the raw fBm sum.
    pub fn fbm_bounds(&self) -> Interval {
        self.fbm_bounds
    }

    /// Octave j has amplitude gain^j for j in 0..num_octaves, so the sum of
    /// absolute amplitudes is the geometric series (1 - g^n) / (1 - g)
    /// with g = |gain|.
    fn compute_fbm_bounds(&mut self) {
        let g = self.gain.abs();
        let max = if g == 1.0 {
            self.num_octaves as f64
        } else {
            (1.0 - g.powi(self.num_octaves as i32)) / (1.0 - g)
        };
        self.fbm_bounds = Interval::new(-max, max);
    }

    /// Scalar noise in [-1, 1].
    pub fn value_noise(&self, p: Vec3) -> f64 {
        let values = &self.tables.values;
        match self.interpolation {
            Interpolation::Linear => trilinear(p, |i| values[i]),
            Interpolation::Cubic => tricubic(p, |i| values[i]).clamp(-1.0, 1.0),
        }
    }

    /// Vector noise interpolated from the unit vector table.
    pub fn vector_noise(&self, p: Vec3) -> Vec3 {
        let vectors = &self.tables.vectors;
        match self.interpolation {
            Interpolation::Linear => trilinear(p, |i| vectors[i]),
            Interpolation::Cubic => tricubic(p, |i| vectors[i]),
        }
    }

    fn octaves(&self, lacunarity: f64, gain: f64) -> impl Iterator<Item = (f64, f64)> {
        (0..self.num_octaves).scan((1.0, 1.0), move |state, _| {
            let current = *state;
            state.0 *= gain;
            state.1 *= lacunarity;
            Some(current)
        })
    }

    /// Fractional Brownian motion normalized into [0, 1].
    pub fn value_fbm(&self, p: Vec3) -> f64 {
        let sum: f64 = self
            .octaves(self.lacunarity, self.gain)
            .map(|(amplitude, frequency)| amplitude * self.value_noise(p * frequency))
            .sum();
        self.fbm_bounds.normalize(sum)
    }

    /// Sum of absolute octaves normalized into [0, 1].
    pub fn value_turbulence(&self, p: Vec3) -> f64 {
        let sum: f64 = self
            .octaves(self.lacunarity, self.gain)
            .map(|(amplitude, frequency)| amplitude * self.value_noise(p * frequency).abs())
            .sum();
        Interval::new(0.0, self.fbm_bounds.max).normalize(sum)
    }

    /// fBm with the classic lacunarity 2 and gain 0.5, normalized into [0, 1].
    pub fn value_fractal_sum(&self, p: Vec3) -> f64 {
        let sum: f64 = self
            .octaves(2.0, 0.5)
            .map(|(amplitude, frequency)| amplitude * self.value_noise(p * frequency))
            .sum();
        let max = 2.0 * (1.0 - 0.5_f64.powi(self.num_octaves as i32));
        Interval::new(-max, max).normalize(sum)
    }

    /// Unnormalized vector fBm.
    pub fn vector_fbm(&self, p: Vec3) -> Vec3 {
        self.octaves(self.lacunarity, self.gain)
            .map(|(amplitude, frequency)| self.vector_noise(p * frequency) * amplitude)
            .sum()
    }

    /// Unnormalized vector fractal sum with lacunarity 2 and gain 0.5.
    pub fn vector_fractal_sum(&self, p: Vec3) -> Vec3 {
        self.octaves(2.0, 0.5)
            .map(|(amplitude, frequency)| self.vector_noise(p * frequency) * amplitude)
            .sum()
    }
}

impl Default for LatticeNoise {
    fn default() -> Self {
        Self::linear()
    }
}
