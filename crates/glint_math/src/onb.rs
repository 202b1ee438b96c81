use crate::{Result, TransformError, Vec3};

/// Squared sine of the angle below which a normal counts as parallel to
/// the jitter vector.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Orthonormal frame `(u, v, w)`.
///
/// Built fresh wherever it is needed (per shading point, per camera) and
/// never cached across calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Onb {
    /// Frame around a surface normal.
    ///
    /// `w = normal`, `v = normalize(w × jitter)`, `u = v × w`. Fails when
    /// the normal is zero or parallel to `jitter`.
    pub fn from_normal(normal: Vec3, jitter: Vec3) -> Result<Self> {
        let w = normal
            .try_normalize()
            .ok_or(TransformError::DegenerateFrame("zero-length normal"))?;
        let cross = w.cross(jitter);
        if cross.length_squared() <= PARALLEL_EPSILON * jitter.length_squared() {
            return Err(TransformError::DegenerateFrame("normal parallel to jitter vector"));
        }
        let v = cross.normalize();
        let u = v.cross(w);
        Ok(Self { u, v, w })
    }

    /// Camera frame looking from `eye` towards `look_at`.
    ///
    /// `w` points back at the viewer, `u` to the right and `v` up.
    pub fn look_at(eye: Vec3, look_at: Vec3, up: Vec3) -> Result<Self> {
        let w = (eye - look_at)
            .try_normalize()
            .ok_or(TransformError::DegenerateFrame("eye and look-at coincide"))?;
        let u = up
            .cross(w)
            .try_normalize()
            .ok_or(TransformError::DegenerateFrame("view direction parallel to up"))?;
        let v = w.cross(u);
        Ok(Self { u, v, w })
    }

    /// Express local frame coordinates in world space.
    #[inline]
    pub fn local_to_world(&self, a: Vec3) -> Vec3 {
        self.u * a.x + self.v * a.y + self.w * a.z
    }
}
