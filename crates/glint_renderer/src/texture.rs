//! Texture trait and the constant texture.

use crate::{Color, ShadeRec};

/// A color that varies over a surface.
///
/// Textures read `sr.local_hit_point` (object space), never the world
/// hit point, so instanced geometry carries its texture along.
pub trait Texture: Send + Sync {
    /// Color at the shading point.
    fn color(&self, sr: &ShadeRec) -> Color;
}

/// The same color everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantColor {
    color: Color,
}

impl ConstantColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for ConstantColor {
    fn color(&self, _sr: &ShadeRec) -> Color {
        self.color
    }
}
