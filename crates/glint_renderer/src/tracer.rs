//! Tracers turn a ray into a color.

use crate::{context::TraceContext, Color, Ray, World};

/// Integrator driving shading and recursion.
pub trait Tracer: Send + Sync {
    /// Radiance arriving along `ray`, spawned at recursion level `depth`.
    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32, ctx: &mut TraceContext) -> Color;

    /// Radiance and, when the tracer tracks it, the hit distance along `ray`.
    fn trace_ray_with_distance(
        &self,
        world: &World,
        ray: &Ray,
        depth: u32,
        ctx: &mut TraceContext,
    ) -> (Color, Option<f64>) {
        (self.trace_ray(world, ray, depth, ctx), None)
    }
}

/// Shade the nearest hit, or return the background on a miss.
fn shade_nearest(
    world: &World,
    ray: &Ray,
    depth: u32,
    ctx: &mut TraceContext,
) -> (Color, Option<f64>) {
    if depth > world.max_depth() {
        return (Color::ZERO, None);
    }

    match world.hit_objects(ray) {
        Some(mut sr) => {
            sr.depth = depth;
            (sr.material.shade(&sr, ctx), Some(sr.t))
        }
        None => (world.background(), None),
    }
}

/// Plain ray casting. Materials may still recurse through the world.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayCast;

impl Tracer for RayCast {
    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32, ctx: &mut TraceContext) -> Color {
        shade_nearest(world, ray, depth, ctx).0
    }
}

/// Whitted-style recursive tracer that also reports hit distances, for
/// materials that attenuate light over the path length.
#[derive(Debug, Clone, Copy, Default)]
pub struct Whitted;

impl Tracer for Whitted {
    fn trace_ray(&self, world: &World, ray: &Ray, depth: u32, ctx: &mut TraceContext) -> Color {
        shade_nearest(world, ray, depth, ctx).0
    }

    fn trace_ray_with_distance(
        &self,
        world: &World,
        ray: &Ray,
        depth: u32,
        ctx: &mut TraceContext,
    ) -> (Color, Option<f64>) {
        shade_nearest(world, ray, depth, ctx)
    }
}
