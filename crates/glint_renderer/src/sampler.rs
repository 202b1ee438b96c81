//! Stratified sample sets for anti-aliasing, lens, shadow and occlusion sampling.
//!
//! A [`Sampler`] generates `num_sets` independent pattern sets of
//! `num_samples` points in [0, 1)² once and is then shared read-only
//! between render threads. Mapping it onto the unit disk, hemisphere or
//! sphere consumes it and yields a [`DiskSampler`], [`HemisphereSampler`]
//! or [`SphereSampler`], so a draw from a domain that was never mapped
//! does not type check. Drawing samples needs a rotating index and a
//! random set choice; that state lives in a per-worker [`SampleCursor`]
//! owned by [`crate::TraceContext`].

use std::f64::consts::{FRAC_PI_4, TAU};
use std::sync::atomic::{AtomicU64, Ordering};

use glint_math::{Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of pattern sets generated by default.
pub const DEFAULT_NUM_SETS: usize = 83;

/// Seed used when the caller does not pick one.
const DEFAULT_SEED: u64 = 0x5EED;

static NEXT_SAMPLER_ID: AtomicU64 = AtomicU64::new(0);

/// Errors raised when a sampler is configured with impossible sizes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    #[error("Sampler needs at least one sample per set")]
    NoSamples,

    #[error("Sampler needs at least one set")]
    NoSets,

    #[error("{pattern:?} sampling needs a perfect square sample count, got {num_samples}")]
    NotSquare {
        pattern: SamplePattern,
        num_samples: usize,
    },
}

/// How the points of each set are distributed over the unit square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplePattern {
    /// Cell centers of an n x n grid.
    Regular,
    /// Independent uniform points.
    PureRandom,
    /// One random point per cell of an n x n grid.
    Jittered,
    /// One point per row and column, rows and columns shuffled.
    NRooks,
    /// Jittered and n-rooks at the same time.
    #[default]
    MultiJittered,
    /// Hammersley low-discrepancy points (identical in every set).
    Hammersley,
}

impl SamplePattern {
    fn needs_square(self) -> bool {
        matches!(
            self,
            SamplePattern::Regular | SamplePattern::Jittered | SamplePattern::MultiJittered
        )
    }

    /// Generate `num_sets` sets of `num_samples` points, concatenated.
    ///
    /// Grid based patterns expect `num_samples` to be a perfect square;
    /// [`Sampler::with_sets`] validates that before calling this.
    pub fn generate<R: Rng + ?Sized>(
        self,
        num_samples: usize,
        num_sets: usize,
        rng: &mut R,
    ) -> Vec<Vec2> {
        let mut samples = Vec::with_capacity(num_samples * num_sets);
        for _ in 0..num_sets {
            match self {
                SamplePattern::Regular => regular_set(num_samples, &mut samples),
                SamplePattern::PureRandom => {
                    samples.extend((0..num_samples).map(|_| Vec2::new(rng.gen(), rng.gen())))
                }
                SamplePattern::Jittered => jittered_set(num_samples, rng, &mut samples),
                SamplePattern::NRooks => n_rooks_set(num_samples, rng, &mut samples),
                SamplePattern::MultiJittered => multi_jittered_set(num_samples, rng, &mut samples),
                SamplePattern::Hammersley => hammersley_set(num_samples, &mut samples),
            }
        }
        samples
    }
}

fn grid_size(num_samples: usize) -> usize {
    (num_samples as f64).sqrt().round() as usize
}

fn regular_set(num_samples: usize, out: &mut Vec<Vec2>) {
    let n = grid_size(num_samples);
    for j in 0..n {
        for k in 0..n {
            out.push(Vec2::new(
                (k as f64 + 0.5) / n as f64,
                (j as f64 + 0.5) / n as f64,
            ));
        }
    }
}

fn jittered_set<R: Rng + ?Sized>(num_samples: usize, rng: &mut R, out: &mut Vec<Vec2>) {
    let n = grid_size(num_samples);
    for j in 0..n {
        for k in 0..n {
            out.push(Vec2::new(
                (k as f64 + rng.gen::<f64>()) / n as f64,
                (j as f64 + rng.gen::<f64>()) / n as f64,
            ));
        }
    }
}

fn n_rooks_set<R: Rng + ?Sized>(num_samples: usize, rng: &mut R, out: &mut Vec<Vec2>) {
    let n = num_samples as f64;
    let mut xs: Vec<f64> = (0..num_samples)
        .map(|j| (j as f64 + rng.gen::<f64>()) / n)
        .collect();
    let mut ys: Vec<f64> = (0..num_samples)
        .map(|j| (j as f64 + rng.gen::<f64>()) / n)
        .collect();
    xs.shuffle(rng);
    ys.shuffle(rng);
    out.extend(xs.into_iter().zip(ys).map(|(x, y)| Vec2::new(x, y)));
}

/// Chiu, Shirley and Wang multi-jittered set: a canonical arrangement
/// that is jittered in both the coarse n x n grid and the fine n² grid,
/// followed by column-wise x shuffles and row-wise y shuffles.
fn multi_jittered_set<R: Rng + ?Sized>(num_samples: usize, rng: &mut R, out: &mut Vec<Vec2>) {
    let n = grid_size(num_samples);
    let subcell_width = 1.0 / num_samples as f64;
    let base = out.len();

    for i in 0..n {
        for j in 0..n {
            out.push(Vec2::new(
                (i * n + j) as f64 * subcell_width + rng.gen_range(0.0..subcell_width),
                (j * n + i) as f64 * subcell_width + rng.gen_range(0.0..subcell_width),
            ));
        }
    }

    for i in 0..n {
        for j in 0..n {
            let k = rng.gen_range(j..n);
            let a = base + i * n + j;
            let b = base + i * n + k;
            let x = out[a].x;
            out[a].x = out[b].x;
            out[b].x = x;
        }
    }

    for i in 0..n {
        for j in 0..n {
            let k = rng.gen_range(j..n);
            let a = base + j * n + i;
            let b = base + k * n + i;
            let y = out[a].y;
            out[a].y = out[b].y;
            out[b].y = y;
        }
    }
}

fn radical_inverse_base2(mut j: usize) -> f64 {
    let mut x = 0.0;
    let mut f = 0.5;
    while j > 0 {
        x += f * (j & 1) as f64;
        j >>= 1;
        f *= 0.5;
    }
    x
}

fn hammersley_set(num_samples: usize, out: &mut Vec<Vec2>) {
    for j in 0..num_samples {
        out.push(Vec2::new(
            j as f64 / num_samples as f64,
            radical_inverse_base2(j),
        ));
    }
}

/// Shirley's concentric map from [0, 1)² onto the unit disk.
pub(crate) fn concentric_disk(p: Vec2) -> Vec2 {
    let sx = 2.0 * p.x - 1.0;
    let sy = 2.0 * p.y - 1.0;

    let (r, phi) = if sx > -sy {
        if sx > sy {
            (sx, sy / sx)
        } else {
            (sy, 2.0 - sx / sy)
        }
    } else if sx < sy {
        (-sx, 4.0 + sy / sx)
    } else if sy != 0.0 {
        (-sy, 6.0 - sx / sy)
    } else {
        (-sy, 0.0)
    };

    let phi = phi * FRAC_PI_4;
    Vec2::new(r * phi.cos(), r * phi.sin())
}

/// Cosine-power map from [0, 1)² onto the unit hemisphere around +z.
fn hemisphere_point(p: Vec2, exponent: f64) -> Vec3 {
    let phi = TAU * p.x;
    let cos_theta = (1.0 - p.y).powf(1.0 / (exponent + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Uniform map from [0, 1)² onto the unit sphere.
fn sphere_point(p: Vec2) -> Vec3 {
    let z = 1.0 - 2.0 * p.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = TAU * p.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Per-worker draw state for one sampler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCursor {
    count: usize,
    jump: usize,
}

/// Generated sample sets over the unit square.
#[derive(Debug, Clone)]
pub struct Sampler {
    id: u64,
    pattern: SamplePattern,
    num_samples: usize,
    num_sets: usize,
    samples: Vec<Vec2>,
    shuffled_indices: Vec<usize>,
}

impl Sampler {
    /// Sampler with [`DEFAULT_NUM_SETS`] sets and a fixed seed.
    pub fn new(pattern: SamplePattern, num_samples: usize) -> Result<Self, SamplerError> {
        Self::with_sets(pattern, num_samples, DEFAULT_NUM_SETS, DEFAULT_SEED)
    }

    /// Multi-jittered sampler with default sets, the usual choice.
    pub fn multi_jittered(num_samples: usize) -> Result<Self, SamplerError> {
        Self::new(SamplePattern::MultiJittered, num_samples)
    }

    /// Fully specified sampler. Generation is deterministic in `seed`.
    pub fn with_sets(
        pattern: SamplePattern,
        num_samples: usize,
        num_sets: usize,
        seed: u64,
    ) -> Result<Self, SamplerError> {
        if num_samples == 0 {
            return Err(SamplerError::NoSamples);
        }
        if num_sets == 0 {
            return Err(SamplerError::NoSets);
        }
        if pattern.needs_square() {
            let n = grid_size(num_samples);
            if n * n != num_samples {
                return Err(SamplerError::NotSquare {
                    pattern,
                    num_samples,
                });
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let samples = pattern.generate(num_samples, num_sets, &mut rng);

        let mut shuffled_indices = Vec::with_capacity(num_samples * num_sets);
        let mut indices: Vec<usize> = (0..num_samples).collect();
        for _ in 0..num_sets {
            indices.shuffle(&mut rng);
            shuffled_indices.extend_from_slice(&indices);
        }

        log::debug!(
            "Generated {:?} sampler: {} sets x {} samples",
            pattern,
            num_sets,
            num_samples
        );

        Ok(Self {
            id: NEXT_SAMPLER_ID.fetch_add(1, Ordering::Relaxed),
            pattern,
            num_samples,
            num_sets,
            samples,
            shuffled_indices,
        })
    }

    /// Identity used to key per-worker cursors.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn pattern(&self) -> SamplePattern {
        self.pattern
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// The generated sets, each exactly `num_samples` long.
    pub fn sets(&self) -> impl Iterator<Item = &[Vec2]> {
        self.samples.chunks(self.num_samples)
    }

    /// Map onto the unit disk with Shirley's concentric map.
    pub fn map_samples_to_unit_disk(self) -> DiskSampler {
        let points = self.samples.iter().map(|&p| concentric_disk(p)).collect();
        DiskSampler { base: self, points }
    }

    /// Map onto the hemisphere around +z with density proportional to cos^e θ.
    pub fn map_samples_to_hemisphere(self, exponent: f64) -> HemisphereSampler {
        let points = self
            .samples
            .iter()
            .map(|&p| hemisphere_point(p, exponent))
            .collect();
        HemisphereSampler {
            base: self,
            exponent,
            points,
        }
    }

    /// Map uniformly onto the unit sphere.
    pub fn map_samples_to_sphere(self) -> SphereSampler {
        let points = self.samples.iter().map(|&p| sphere_point(p)).collect();
        SphereSampler { base: self, points }
    }

    /// Advance `cursor` and return the flat index of the next sample.
    ///
    /// Each time the rotating count wraps, a new set is picked at random so
    /// neighbouring pixels do not reuse one set in lockstep.
    pub(crate) fn next_index<R: Rng + ?Sized>(&self, cursor: &mut SampleCursor, rng: &mut R) -> usize {
        if cursor.count % self.num_samples == 0 {
            cursor.jump = rng.gen_range(0..self.num_sets) * self.num_samples;
        }
        let index =
            cursor.jump + self.shuffled_indices[cursor.jump + cursor.count % self.num_samples];
        cursor.count = cursor.count.wrapping_add(1);
        index
    }

    /// Advance `cursor` through the first set only, in generation order.
    pub(crate) fn next_one_set_index(&self, cursor: &mut SampleCursor) -> usize {
        let index = cursor.count % self.num_samples;
        cursor.count = cursor.count.wrapping_add(1);
        index
    }

    pub(crate) fn square_sample(&self, index: usize) -> Vec2 {
        self.samples[index]
    }
}

/// A [`Sampler`] mapped onto the unit disk.
#[derive(Debug, Clone)]
pub struct DiskSampler {
    base: Sampler,
    points: Vec<Vec2>,
}

impl DiskSampler {
    /// The unit square sets this was mapped from. Draws share its cursor.
    pub fn base(&self) -> &Sampler {
        &self.base
    }

    /// Mapped points, set by set.
    pub fn samples(&self) -> &[Vec2] {
        &self.points
    }

    pub(crate) fn sample(&self, index: usize) -> Vec2 {
        self.points[index]
    }
}

/// A [`Sampler`] mapped onto the cosine-power hemisphere around +z.
///
/// Only mapped samplers can be drawn from as directions:
///
/// ```compile_fail
/// use glint_renderer::{Sampler, TraceContext};
///
/// let sampler = Sampler::multi_jittered(4).unwrap();
/// TraceContext::default().sample_hemisphere(&sampler);
/// ```
#[derive(Debug, Clone)]
pub struct HemisphereSampler {
    base: Sampler,
    exponent: f64,
    points: Vec<Vec3>,
}

impl HemisphereSampler {
    /// The unit square sets this was mapped from. Draws share its cursor.
    pub fn base(&self) -> &Sampler {
        &self.base
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Mapped directions, set by set.
    pub fn samples(&self) -> &[Vec3] {
        &self.points
    }

    pub(crate) fn sample(&self, index: usize) -> Vec3 {
        self.points[index]
    }
}

/// A [`Sampler`] mapped uniformly onto the unit sphere.
#[derive(Debug, Clone)]
pub struct SphereSampler {
    base: Sampler,
    points: Vec<Vec3>,
}

impl SphereSampler {
    /// The unit square sets this was mapped from. Draws share its cursor.
    pub fn base(&self) -> &Sampler {
        &self.base
    }

    /// Mapped directions, set by set.
    pub fn samples(&self) -> &[Vec3] {
        &self.points
    }

    pub(crate) fn sample(&self, index: usize) -> Vec3 {
        self.points[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PATTERNS: [SamplePattern; 6] = [
        SamplePattern::Regular,
        SamplePattern::PureRandom,
        SamplePattern::Jittered,
        SamplePattern::NRooks,
        SamplePattern::MultiJittered,
        SamplePattern::Hammersley,
    ];

    #[test]
    fn test_every_set_has_exactly_num_samples() {
        for pattern in ALL_PATTERNS {
            let sampler = Sampler::with_sets(pattern, 16, 7, 1).unwrap();
            assert_eq!(sampler.sets().count(), 7);
            for set in sampler.sets() {
                assert_eq!(set.len(), 16, "{pattern:?}");
                for p in set {
                    assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
                }
            }
        }
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert_eq!(
            Sampler::multi_jittered(0).unwrap_err(),
            SamplerError::NoSamples
        );
        assert_eq!(
            Sampler::with_sets(SamplePattern::Jittered, 4, 0, 0).unwrap_err(),
            SamplerError::NoSets
        );
        assert!(matches!(
            Sampler::multi_jittered(10),
            Err(SamplerError::NotSquare { num_samples: 10, .. })
        ));
        // Patterns without a grid accept any count
        assert!(Sampler::new(SamplePattern::NRooks, 10).is_ok());
        assert!(Sampler::new(SamplePattern::Hammersley, 10).is_ok());
    }

    #[test]
    fn test_multi_jittered_is_stratified() {
        let n = 5;
        let sampler = Sampler::with_sets(SamplePattern::MultiJittered, n * n, 3, 9).unwrap();

        for set in sampler.sets() {
            // One point per coarse cell
            let mut coarse = vec![0; n * n];
            // One point per fine column and per fine row (n-rooks)
            let mut columns = vec![0; n * n];
            let mut rows = vec![0; n * n];
            for p in set {
                let cx = (p.x * n as f64) as usize;
                let cy = (p.y * n as f64) as usize;
                coarse[cy * n + cx] += 1;
                columns[(p.x * (n * n) as f64) as usize] += 1;
                rows[(p.y * (n * n) as f64) as usize] += 1;
            }
            assert!(coarse.iter().all(|&c| c == 1));
            assert!(columns.iter().all(|&c| c == 1));
            assert!(rows.iter().all(|&c| c == 1));
        }
    }

    #[test]
    fn test_generation_is_deterministic_per_seed() {
        let a = Sampler::with_sets(SamplePattern::MultiJittered, 16, 4, 42).unwrap();
        let b = Sampler::with_sets(SamplePattern::MultiJittered, 16, 4, 42).unwrap();
        let c = Sampler::with_sets(SamplePattern::MultiJittered, 16, 4, 43).unwrap();

        assert!(a.sets().eq(b.sets()));
        assert!(!a.sets().eq(c.sets()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_disk_samples_inside_unit_disk() {
        let sampler = Sampler::multi_jittered(64).unwrap().map_samples_to_unit_disk();

        assert_eq!(sampler.samples().len(), 64 * DEFAULT_NUM_SETS);
        assert!(sampler.samples().iter().all(|p| p.length() <= 1.0 + 1e-12));
        assert_eq!(concentric_disk(Vec2::splat(0.5)), Vec2::ZERO);
    }

    #[test]
    fn test_hemisphere_samples_on_upper_hemisphere() {
        for exponent in [0.0, 1.0, 100.0] {
            let sampler = Sampler::multi_jittered(100)
                .unwrap()
                .map_samples_to_hemisphere(exponent);
            assert_eq!(sampler.exponent(), exponent);

            for d in sampler.samples() {
                assert!(d.z >= 0.0);
                assert!((d.length() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_cosine_hemisphere_mean_height() {
        // E[cos θ] under a cosine-weighted density is 2/3
        let sampler = Sampler::with_sets(SamplePattern::MultiJittered, 256, 1, 3)
            .unwrap()
            .map_samples_to_hemisphere(1.0);

        let mean: f64 = sampler.samples().iter().map(|d| d.z).sum::<f64>() / 256.0;
        assert!((mean - 2.0 / 3.0).abs() < 0.01, "mean = {mean}");
    }

    #[test]
    fn test_sphere_samples_unit_length() {
        let sampler = Sampler::new(SamplePattern::Jittered, 25)
            .unwrap()
            .map_samples_to_sphere();

        assert_eq!(sampler.samples().len(), 25 * DEFAULT_NUM_SETS);
        assert!(sampler
            .samples()
            .iter()
            .all(|d| (d.length() - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_mapping_keeps_identity_and_sets() {
        let sampler = Sampler::with_sets(SamplePattern::NRooks, 10, 3, 5).unwrap();
        let id = sampler.id();
        let square: Vec<Vec2> = sampler.sets().flatten().copied().collect();

        let disk = sampler.clone().map_samples_to_unit_disk();
        let sphere = sampler.map_samples_to_sphere();
        assert_eq!(disk.base().id(), id);
        assert_eq!(sphere.base().id(), id);

        // Each mapped point comes from the square point at the same index
        for (i, p) in square.iter().enumerate() {
            assert_eq!(disk.samples()[i], concentric_disk(*p));
            assert_eq!(sphere.samples()[i], sphere_point(*p));
        }
    }

    #[test]
    fn test_cursor_walks_whole_set_before_switching() {
        let sampler = Sampler::with_sets(SamplePattern::MultiJittered, 9, 5, 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut cursor = SampleCursor::default();

        for _ in 0..4 {
            let indices: Vec<usize> = (0..9)
                .map(|_| sampler.next_index(&mut cursor, &mut rng))
                .collect();
            let set = indices[0] / 9;
            assert!(indices.iter().all(|&i| i / 9 == set));

            // Every sample of the set is used exactly once per pass
            let mut seen: Vec<usize> = indices.iter().map(|i| i % 9).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..9).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_one_set_cursor_wraps() {
        let sampler = Sampler::with_sets(SamplePattern::Hammersley, 4, 2, 0).unwrap();
        let mut cursor = SampleCursor::default();

        let indices: Vec<usize> = (0..6)
            .map(|_| sampler.next_one_set_index(&mut cursor))
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn test_pattern_config_names() {
        let json = serde_json::to_string(&SamplePattern::MultiJittered).unwrap();
        assert_eq!(json, "\"multi_jittered\"");
        let pattern: SamplePattern = serde_json::from_str("\"n_rooks\"").unwrap();
        assert_eq!(pattern, SamplePattern::NRooks);
    }
}
