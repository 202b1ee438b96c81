//! The scene: objects, lights, background and the tracer that ties them together.

use crate::{
    context::TraceContext, light::Ambient, tracer::RayCast, Color, HitRecord, Hittable, Light,
    Ray, ShadeRec, Tracer,
};

/// Hits closer together than this count as a tie, won by the object
/// added first.
const TIE_EPSILON: f64 = 1.0e-9;

/// Recursion limit used until [`World::set_max_depth`] is called.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Everything a ray can interact with.
///
/// Built once, then shared read-only by every render worker.
pub struct World {
    background: Color,
    objects: Vec<Box<dyn Hittable>>,
    lights: Vec<Box<dyn Light>>,
    ambient: Box<dyn Light>,
    tracer: Box<dyn Tracer>,
    max_depth: u32,
}

impl World {
    /// Empty world: black background, white ambient light, ray casting.
    pub fn new() -> Self {
        Self {
            background: Color::ZERO,
            objects: Vec::new(),
            lights: Vec::new(),
            ambient: Box::new(Ambient::default()),
            tracer: Box::new(RayCast),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn add_object(&mut self, object: impl Hittable + 'static) {
        self.objects.push(Box::new(object));
    }

    pub fn add_light(&mut self, light: impl Light + 'static) {
        self.lights.push(Box::new(light));
    }

    /// Replace the ambient light, e.g. with an [`AmbientOccluder`](crate::AmbientOccluder).
    pub fn set_ambient(&mut self, ambient: impl Light + 'static) {
        self.ambient = Box::new(ambient);
    }

    pub fn set_tracer(&mut self, tracer: impl Tracer + 'static) {
        self.tracer = Box::new(tracer);
    }

    /// Deepest recursion level still traced; deeper rays return black.
    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn objects(&self) -> &[Box<dyn Hittable>] {
        &self.objects
    }

    pub fn lights(&self) -> &[Box<dyn Light>] {
        &self.lights
    }

    pub fn ambient(&self) -> &dyn Light {
        self.ambient.as_ref()
    }

    pub fn tracer(&self) -> &dyn Tracer {
        self.tracer.as_ref()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Nearest hit along `ray` over all objects.
    ///
    /// Returns a shading record at depth 0; the tracer sets the depth.
    pub fn hit_objects(&self, ray: &Ray) -> Option<ShadeRec<'_>> {
        let mut nearest: Option<HitRecord> = None;

        for object in &self.objects {
            if let Some(hit) = object.hit(ray) {
                match nearest {
                    Some(best) if hit.t >= best.t - TIE_EPSILON => {}
                    _ => nearest = Some(hit),
                }
            }
        }

        nearest.map(|hit| ShadeRec::new(self, ray, hit))
    }

    /// Whether any shadow casting object blocks `ray` before `max_t`.
    pub fn shadow_hit(&self, ray: &Ray, max_t: f64) -> bool {
        self.objects
            .iter()
            .filter(|object| object.casts_shadows())
            .any(|object| matches!(object.shadow_hit(ray), Some(t) if t < max_t))
    }

    /// Radiance arriving along a primary ray.
    pub fn trace_ray(&self, ray: &Ray, ctx: &mut TraceContext) -> Color {
        self.trace_ray_at_depth(ray, 0, ctx)
    }

    /// Radiance arriving along a ray spawned at recursion level `depth`.
    pub fn trace_ray_at_depth(&self, ray: &Ray, depth: u32, ctx: &mut TraceContext) -> Color {
        self.tracer.trace_ray(self, ray, depth, ctx)
    }

    /// Like [`trace_ray_at_depth`](Self::trace_ray_at_depth), also
    /// returning the hit distance when the tracer reports one.
    pub fn trace_ray_with_distance(
        &self,
        ray: &Ray,
        depth: u32,
        ctx: &mut TraceContext,
    ) -> (Color, Option<f64>) {
        self.tracer.trace_ray_with_distance(self, ray, depth, ctx)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
