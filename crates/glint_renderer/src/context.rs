//! Per-worker mutable state for tracing.

use std::collections::HashMap;

use glint_math::{Vec2, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::sampler::{DiskSampler, HemisphereSampler, SampleCursor, Sampler, SphereSampler};

/// Mutable state owned by exactly one render worker.
///
/// Samplers, noise tables and the world are shared read-only across
/// threads; the rotating sample index, the active set of every sampler
/// and the random source all live here instead. Create one context per
/// thread (or per bucket) and pass it down through every trace and
/// shading call.
#[derive(Debug, Clone)]
pub struct TraceContext {
    rng: ChaCha8Rng,
    cursors: HashMap<u64, SampleCursor>,
}

impl TraceContext {
    /// Context with a deterministic random source.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            cursors: HashMap::new(),
        }
    }

    /// Random source for this worker.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    fn next_index(&mut self, sampler: &Sampler) -> usize {
        let cursor = self.cursors.entry(sampler.id()).or_default();
        sampler.next_index(cursor, &mut self.rng)
    }

    /// Next point in [0, 1)² from a randomly chosen set.
    pub fn sample_unit_square(&mut self, sampler: &Sampler) -> Vec2 {
        let index = self.next_index(sampler);
        sampler.square_sample(index)
    }

    /// Next point from the first set only, in generation order.
    pub fn sample_one_set(&mut self, sampler: &Sampler) -> Vec2 {
        let cursor = self.cursors.entry(sampler.id()).or_default();
        let index = sampler.next_one_set_index(cursor);
        sampler.square_sample(index)
    }

    /// Next point on the unit disk.
    pub fn sample_unit_disk(&mut self, sampler: &DiskSampler) -> Vec2 {
        let index = self.next_index(sampler.base());
        sampler.sample(index)
    }

    /// Next direction on the hemisphere around +z.
    pub fn sample_hemisphere(&mut self, sampler: &HemisphereSampler) -> Vec3 {
        let index = self.next_index(sampler.base());
        sampler.sample(index)
    }

    /// Next direction on the unit sphere.
    pub fn sample_sphere(&mut self, sampler: &SphereSampler) -> Vec3 {
        let index = self.next_index(sampler.base());
        sampler.sample(index)
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SamplePattern;

    #[test]
    fn test_same_seed_same_draws() {
        let sampler = Sampler::multi_jittered(16).unwrap();
        let mut a = TraceContext::new(7);
        let mut b = TraceContext::new(7);

        for _ in 0..100 {
            assert_eq!(a.sample_unit_square(&sampler), b.sample_unit_square(&sampler));
        }
    }

    #[test]
    fn test_contexts_do_not_share_cursors() {
        let sampler = Sampler::with_sets(SamplePattern::Hammersley, 4, 1, 0).unwrap();
        let mut a = TraceContext::new(1);
        let mut b = TraceContext::new(2);

        a.sample_one_set(&sampler);
        a.sample_one_set(&sampler);
        // b starts from the beginning regardless of what a consumed
        assert_eq!(b.sample_one_set(&sampler), sampler.sets().next().unwrap()[0]);
        assert_eq!(a.sample_one_set(&sampler), sampler.sets().next().unwrap()[2]);
    }

    #[test]
    fn test_cursors_are_per_sampler() {
        let first = Sampler::with_sets(SamplePattern::Hammersley, 4, 1, 0).unwrap();
        let second = Sampler::with_sets(SamplePattern::Hammersley, 4, 1, 0).unwrap();
        let mut ctx = TraceContext::default();

        ctx.sample_one_set(&first);
        ctx.sample_one_set(&first);
        assert_eq!(ctx.sample_one_set(&second), second.sets().next().unwrap()[0]);
    }

    #[test]
    fn test_mapped_draws_follow_the_square_cursor() {
        let square = Sampler::with_sets(SamplePattern::MultiJittered, 4, 3, 8).unwrap();
        let hemisphere = square.clone().map_samples_to_hemisphere(1.0);
        let mut a = TraceContext::new(3);
        let mut b = TraceContext::new(3);

        for _ in 0..40 {
            let p = a.sample_unit_square(&square);
            let d = b.sample_hemisphere(&hemisphere);
            let i = square.sets().flatten().position(|q| *q == p).unwrap();
            assert_eq!(d, hemisphere.samples()[i]);
            assert!(d.z >= 0.0);
        }
    }

    #[test]
    fn test_disk_and_sphere_draws_stay_in_domain() {
        let disk = Sampler::multi_jittered(9).unwrap().map_samples_to_unit_disk();
        let sphere = Sampler::multi_jittered(9).unwrap().map_samples_to_sphere();
        let mut ctx = TraceContext::new(12);

        for _ in 0..200 {
            assert!(ctx.sample_unit_disk(&disk).length() <= 1.0 + 1e-12);
            assert!((ctx.sample_sphere(&sphere).length() - 1.0).abs() < 1e-9);
        }
    }
}
