//! Transformed textures.

use std::sync::Arc;

use glint_math::{InverseTransform, Shear, TransformError, Vec3};

use crate::{Color, ShadeRec, Texture};

/// A texture placed with its own affine transform.
///
/// Transform calls describe how the pattern moves in the object's space
/// and accumulate in call order. Only the inverse is kept: lookups pull
/// the local hit point back through it before asking the inner texture.
#[derive(Clone)]
pub struct TextureInstance {
    texture: Arc<dyn Texture>,
    transform: InverseTransform,
}

impl TextureInstance {
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self {
            texture,
            transform: InverseTransform::new(),
        }
    }

    pub fn transform(&self) -> &InverseTransform {
        &self.transform
    }

    pub fn scale(&mut self, s: Vec3) -> Result<&mut Self, TransformError> {
        self.transform.scale(s)?;
        Ok(self)
    }

    pub fn uniform_scale(&mut self, s: f64) -> Result<&mut Self, TransformError> {
        self.transform.uniform_scale(s)?;
        Ok(self)
    }

    pub fn translate(&mut self, t: Vec3) -> &mut Self {
        self.transform.translate(t);
        self
    }

    pub fn rotate_x(&mut self, degrees: f64) -> &mut Self {
        self.transform.rotate_x(degrees);
        self
    }

    pub fn rotate_y(&mut self, degrees: f64) -> &mut Self {
        self.transform.rotate_y(degrees);
        self
    }

    pub fn rotate_z(&mut self, degrees: f64) -> &mut Self {
        self.transform.rotate_z(degrees);
        self
    }

    pub fn shear(&mut self, shear: Shear) -> Result<&mut Self, TransformError> {
        self.transform.shear(shear)?;
        Ok(self)
    }
}

impl Texture for TextureInstance {
    fn color(&self, sr: &ShadeRec) -> Color {
        let mut local = *sr;
        local.local_hit_point = self.transform.apply_to_point(sr.local_hit_point);
        self.texture.color(&local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Checker3D, FbmTexture, HitRecord, LatticeNoise, Matte, World};
    use glint_math::{Interval, Ray};

    fn color_at(texture: &dyn Texture, local: Vec3) -> Color {
        let world = World::new();
        let material = Matte::new(0.0, 1.0, Color::ONE);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let hit = HitRecord {
            t: 1.0,
            normal: Vec3::Z,
            local_hit_point: local,
            material: &material,
        };
        texture.color(&ShadeRec::new(&world, &ray, hit))
    }

    #[test]
    fn test_scaled_instance_samples_shrunk_point() {
        let fbm: Arc<dyn Texture> = Arc::new(FbmTexture::new(
            LatticeNoise::cubic().with_octaves(3),
            Color::ONE,
            Interval::new(0.0, 1.0),
        ));
        let mut instance = TextureInstance::new(fbm.clone());
        instance.uniform_scale(2.0).unwrap();

        for i in 0..50 {
            let p = Vec3::new(i as f64 * 0.41, 1.3 - i as f64 * 0.07, i as f64 * 0.13);
            let a = color_at(&instance, p);
            let b = color_at(fbm.as_ref(), p / 2.0);
            assert!((a - b).length() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_translated_checker_moves_with_offset() {
        let checker: Arc<dyn Texture> = Arc::new(Checker3D::new(1.0, Color::ONE, Color::ZERO));
        let mut instance = TextureInstance::new(checker);
        instance.translate(Vec3::new(1.0, 0.0, 0.0));

        // The cell that was at the origin now starts at x = 1
        assert_eq!(color_at(&instance, Vec3::new(1.5, 0.5, 0.5)), Color::ONE);
        assert_eq!(color_at(&instance, Vec3::new(0.5, 0.5, 0.5)), Color::ZERO);
    }

    #[test]
    fn test_degenerate_operations_are_rejected() {
        let mut instance = TextureInstance::new(Arc::new(crate::ConstantColor::new(Color::ONE)));

        assert!(instance.scale(Vec3::new(1.0, 0.0, 1.0)).is_err());
        let flat = Shear {
            x_by_y: 1.0,
            y_by_x: 1.0,
            ..Default::default()
        };
        assert!(instance.shear(flat).is_err());
        // Failed calls leave the transform untouched
        assert_eq!(instance.transform().matrix(), glint_math::Mat4::IDENTITY);
    }
}
