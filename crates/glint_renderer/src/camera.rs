//! Cameras for primary ray generation.
//!
//! Cameras receive a point on the view plane, in pixel-size units
//! relative to the image center, and return the primary ray through it.
//! Anti-aliasing jitter is applied by the renderer before the camera is
//! called.

use std::sync::Arc;

use glint_math::{Onb, TransformError, Vec2, Vec3};
use thiserror::Error;

use crate::{context::TraceContext, DiskSampler, Ray, Sampler};

/// Errors raised while setting up a camera.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Invalid camera frame: {0}")]
    Frame(#[from] TransformError),

    #[error("Camera {name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

/// Anything that turns view plane points into rays.
pub trait Camera: Send + Sync {
    /// Primary ray through `pixel_point` on the view plane.
    fn ray(&self, pixel_point: Vec2, ctx: &mut TraceContext) -> Ray;
}

fn positive(name: &'static str, value: f64) -> Result<f64, CameraError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(CameraError::NonPositive { name, value })
    }
}

/// Ideal pinhole camera.
#[derive(Debug, Clone, Copy)]
pub struct Pinhole {
    eye: Vec3,
    frame: Onb,
    view_distance: f64,
    zoom: f64,
}

impl Pinhole {
    /// Camera at `eye` looking at `look_at`, with the view plane
    /// `view_distance` in front of the eye.
    pub fn new(eye: Vec3, look_at: Vec3, up: Vec3, view_distance: f64) -> Result<Self, CameraError> {
        Ok(Self {
            eye,
            frame: Onb::look_at(eye, look_at, up)?,
            view_distance: positive("view distance", view_distance)?,
            zoom: 1.0,
        })
    }

    /// Magnify the image by `zoom`.
    pub fn with_zoom(mut self, zoom: f64) -> Result<Self, CameraError> {
        self.zoom = positive("zoom", zoom)?;
        Ok(self)
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn frame(&self) -> &Onb {
        &self.frame
    }
}

impl Camera for Pinhole {
    fn ray(&self, pixel_point: Vec2, _ctx: &mut TraceContext) -> Ray {
        let p = pixel_point / self.zoom;
        let direction = self.frame.u * p.x + self.frame.v * p.y - self.frame.w * self.view_distance;
        Ray::new(self.eye, direction.normalize())
    }
}

/// Thin lens camera with depth of field.
///
/// Points on the plane `focal_distance` in front of the lens are in focus;
/// blur grows with `lens_radius`.
#[derive(Debug, Clone)]
pub struct ThinLens {
    eye: Vec3,
    frame: Onb,
    view_distance: f64,
    focal_distance: f64,
    lens_radius: f64,
    zoom: f64,
    sampler: Arc<DiskSampler>,
}

impl ThinLens {
    /// Thin lens camera drawing lens positions from `sampler`, which is
    /// mapped onto the unit disk here. The view plane starts at the focal
    /// plane.
    pub fn new(
        eye: Vec3,
        look_at: Vec3,
        up: Vec3,
        lens_radius: f64,
        focal_distance: f64,
        sampler: Sampler,
    ) -> Result<Self, CameraError> {
        if lens_radius < 0.0 {
            return Err(CameraError::NonPositive {
                name: "lens radius",
                value: lens_radius,
            });
        }
        let focal_distance = positive("focal distance", focal_distance)?;

        Ok(Self {
            eye,
            frame: Onb::look_at(eye, look_at, up)?,
            view_distance: focal_distance,
            focal_distance,
            lens_radius,
            zoom: 1.0,
            sampler: Arc::new(sampler.map_samples_to_unit_disk()),
        })
    }

    pub fn with_view_distance(mut self, view_distance: f64) -> Result<Self, CameraError> {
        self.view_distance = positive("view distance", view_distance)?;
        Ok(self)
    }

    pub fn with_zoom(mut self, zoom: f64) -> Result<Self, CameraError> {
        self.zoom = positive("zoom", zoom)?;
        Ok(self)
    }

    pub fn focal_distance(&self) -> f64 {
        self.focal_distance
    }

    /// Direction from lens point `lens` through view plane point `p`.
    fn direction(&self, p: Vec2, lens: Vec2) -> Vec3 {
        let focal = p * (self.focal_distance / self.view_distance);
        let d = self.frame.u * (focal.x - lens.x) + self.frame.v * (focal.y - lens.y)
            - self.frame.w * self.focal_distance;
        d.normalize()
    }
}

impl Camera for ThinLens {
    fn ray(&self, pixel_point: Vec2, ctx: &mut TraceContext) -> Ray {
        let lens = ctx.sample_unit_disk(&self.sampler) * self.lens_radius;
        let origin = self.eye + self.frame.u * lens.x + self.frame.v * lens.y;
        Ray::new(origin, self.direction(pixel_point / self.zoom, lens))
    }
}
