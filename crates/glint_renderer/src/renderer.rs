//! Image rendering.
//!
//! Implements the outer loop of the ray tracer:
//! - Anti-aliasing through a shared view-plane sampler
//! - Parallel rendering of buckets with rayon
//! - Gamma correction for display

use std::time::Instant;

use glint_math::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::{
    context::TraceContext, Camera, CameraError, Color, GeometryError, SamplePattern, Sampler,
    SamplerError, World, DEFAULT_NUM_SETS,
};

/// Errors raised while setting up or running a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Sampler error: {0}")]
    Sampler(#[from] SamplerError),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Image must have a non-zero size, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

/// Render configuration.
///
/// Missing fields take their defaults when deserialized, so a driver can
/// load a partial JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Size of one pixel on the view plane
    pub pixel_size: f64,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: usize,
    /// Distribution of the anti-aliasing samples
    pub sample_pattern: SamplePattern,
    /// Number of sample sets the view-plane sampler cycles through
    pub sample_sets: usize,
    /// Seed for sample generation and per-bucket random sources
    pub seed: u64,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            pixel_size: 1.0,
            samples_per_pixel: 16,
            sample_pattern: SamplePattern::MultiJittered,
            sample_sets: DEFAULT_NUM_SETS,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_pixel_size(mut self, pixel_size: f64) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    pub fn with_samples(mut self, samples_per_pixel: usize) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self
    }

    pub fn with_pattern(mut self, pattern: SamplePattern) -> Self {
        self.sample_pattern = pattern;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// The view-plane sampler described by this configuration.
    pub fn sampler(&self) -> Result<Sampler, SamplerError> {
        Sampler::with_sets(
            self.sample_pattern,
            self.samples_per_pixel,
            self.sample_sets,
            self.seed,
        )
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let channel = |c: f64| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [channel(color.x), channel(color.y), channel(color.z), 255]
}

/// Render a single pixel with multi-sampling.
///
/// `(x, y)` counts from the top-left corner of the image; the view plane
/// has +y up, so rows are flipped before building the sample point.
pub fn render_pixel(
    world: &World,
    camera: &dyn Camera,
    sampler: &Sampler,
    config: &RenderConfig,
    x: u32,
    y: u32,
    ctx: &mut TraceContext,
) -> Color {
    let row = config.height.saturating_sub(1).saturating_sub(y) as f64;
    let half = Vec2::new(config.width as f64, config.height as f64) * 0.5;
    let base = Vec2::new(x as f64, row) - half;

    let mut pixel_color = Color::ZERO;
    for _ in 0..sampler.num_samples() {
        let sp = ctx.sample_unit_square(sampler);
        let pixel_point = (base + sp) * config.pixel_size;
        let ray = camera.ray(pixel_point, ctx);
        pixel_color += world.trace_ray(&ray, ctx);
    }

    // Average the samples
    pixel_color / sampler.num_samples() as f64
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let i = i as u32;
            self.set(bucket.x + i % bucket.width, bucket.y + i / bucket.width, *color);
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgba(*c)).collect()
    }
}

/// Seed for one bucket's random source, mixed splitmix64 style so
/// neighboring buckets get unrelated streams.
fn bucket_seed(seed: u64, index: usize) -> u64 {
    let mut z = seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Render the entire scene to an image buffer.
///
/// Buckets render in parallel, each with its own [`TraceContext`] seeded
/// from the configuration seed and the bucket index, so the image does
/// not depend on thread scheduling.
pub fn render(
    world: &World,
    camera: &dyn Camera,
    config: &RenderConfig,
) -> crate::Result<ImageBuffer> {
    if config.width == 0 || config.height == 0 {
        return Err(RenderError::EmptyImage {
            width: config.width,
            height: config.height,
        });
    }

    let sampler = config.sampler()?;
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);

    log::info!(
        "Rendering {}x{} at {} samples per pixel: {} objects, {} lights, {} buckets",
        config.width,
        config.height,
        sampler.num_samples(),
        world.objects().len(),
        world.lights().len(),
        buckets.len()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut ctx = TraceContext::new(bucket_seed(config.seed, bucket.index));
            let pixels = render_bucket(bucket, world, camera, &sampler, config, &mut ctx);
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}
