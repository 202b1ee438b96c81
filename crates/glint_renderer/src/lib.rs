//! Glint Renderer - CPU Whitted-style ray tracing
//!
//! A recursive ray tracer with stochastic sampling and procedural
//! textures:
//! - Nearest-hit world queries with deterministic tie-breaking
//! - Depth-bounded recursive tracers (`RayCast`, `Whitted`)
//! - Multi-jittered (and friends) sample sets mapped to disk, hemisphere and sphere
//! - Lattice noise with fBm, turbulence and fractal sums
//! - Texture and geometry instancing through accumulated inverse transforms
//! - Ambient occlusion, and soft shadows from jittered, environment and area lights
//!
//! Everything shared between render threads is immutable once built.
//! Per-thread state (sampler cursors, random source) lives in
//! [`TraceContext`], one per worker.

mod ambient_occluder;
mod area_light;
mod brdf;
mod bucket;
mod camera;
mod context;
mod disk;
mod hittable;
mod instance;
mod light;
mod material;
mod noise;
mod plane;
mod procedural;
mod rectangle;
mod renderer;
mod sampler;
mod shade_rec;
mod sphere;
mod texture;
mod texture_instance;
mod tracer;
mod world;

pub use ambient_occluder::AmbientOccluder;
pub use area_light::{AreaLight, LightSurface};
pub use brdf::{Brdf, GlossySpecular, Lambertian, PerfectSpecular, PerfectTransmitter, SvLambertian};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, CameraError, Pinhole, ThinLens};
pub use context::TraceContext;
pub use disk::Disk;
pub use hittable::{GeometryError, HitRecord, Hittable};
pub use instance::Instance;
pub use light::{
    Ambient, Directional, EnvironmentLight, JitteredDirectional, Light, LightSample, PointLight,
};
pub use material::{Color, Emissive, Material, Matte, Phong, Reflective, SvMatte, Transparent};
pub use noise::{Interpolation, LatticeNoise, NOISE_SEED, TABLE_SIZE};
pub use plane::Plane;
pub use procedural::{Checker3D, CylinderChecker, FbmTexture, TurbulenceTexture, WrappedFbmTexture};
pub use rectangle::Rectangle;
pub use renderer::{color_to_rgba, render, render_pixel, ImageBuffer, RenderConfig, RenderError};
pub use sampler::{
    DiskSampler, HemisphereSampler, SamplePattern, Sampler, SamplerError, SphereSampler,
    DEFAULT_NUM_SETS,
};
pub use shade_rec::ShadeRec;
pub use sphere::Sphere;
pub use texture::{ConstantColor, Texture};
pub use texture_instance::TextureInstance;
pub use tracer::{RayCast, Tracer, Whitted};
pub use world::{World, DEFAULT_MAX_DEPTH};

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Re-export the math types from glint_math
pub use glint_math::{Interval, InverseTransform, Mat4, Onb, Ray, Shear, TransformError, Vec2, Vec3};
