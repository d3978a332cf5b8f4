//! Surface materials for mesh draws.
//!
//! A [`Material`] is a small value passed along with every draw. It picks a
//! shading model and carries the colors, opacity and optional texture map
//! that the mesh shader needs.
//!
//! ```
//! use jovian::{Color, Material};
//!
//! let shell = Material::phong()
//!     .emissive(Color::from_hex(0xff3807), 0.95)
//!     .opacity(0.1);
//! assert!(shell.transparent);
//! ```

use crate::color::Color;
use crate::handles::TextureId;

/// How a surface responds to the scene light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Shading {
    /// Unlit; the base color is the output color.
    Basic,
    /// Diffuse only.
    #[default]
    Lambert,
    /// Diffuse plus a specular highlight.
    Phong,
}

impl Shading {
    fn code(self) -> f32 {
        match self {
            Shading::Basic => 0.0,
            Shading::Lambert => 1.0,
            Shading::Phong => 2.0,
        }
    }
}

/// Surface description for a single draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub shading: Shading,
    /// Multiplied with the texture map, if any.
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    /// Alpha of the surface (0.0 - 1.0).
    pub opacity: f32,
    /// Drawn after opaque meshes with alpha blending and no depth writes.
    pub transparent: bool,
    pub map: Option<TextureId>,
    /// Phong highlight color.
    pub specular: Color,
    /// Phong highlight exponent.
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shading: Shading::Lambert,
            color: Color::WHITE,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            opacity: 1.0,
            transparent: false,
            map: None,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
        }
    }
}

impl Material {
    /// Unlit material of a flat color.
    pub fn basic(color: Color) -> Self {
        Self {
            shading: Shading::Basic,
            color,
            ..Default::default()
        }
    }

    pub fn lambert() -> Self {
        Self::default()
    }

    pub fn phong() -> Self {
        Self {
            shading: Shading::Phong,
            ..Default::default()
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn emissive(mut self, color: Color, intensity: f32) -> Self {
        self.emissive = color;
        self.emissive_intensity = intensity;
        self
    }

    /// Sets the opacity; anything below 1.0 also marks the material transparent.
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.transparent || self.opacity < 1.0;
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn map(mut self, texture: Option<TextureId>) -> Self {
        self.map = texture;
        self
    }

    pub fn shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub(crate) fn uniforms(&self) -> MaterialUniforms {
        let alpha = if self.transparent { self.opacity } else { 1.0 };
        MaterialUniforms {
            color: [self.color.r, self.color.g, self.color.b, alpha],
            emissive: [
                self.emissive.r * self.emissive_intensity,
                self.emissive.g * self.emissive_intensity,
                self.emissive.b * self.emissive_intensity,
                0.0,
            ],
            specular: [
                self.specular.r,
                self.specular.g,
                self.specular.b,
                self.shininess,
            ],
            params: [self.shading.code(), 0.0, 0.0, 0.0],
        }
    }
}

/// Material block of the per-draw uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    /// Base color, alpha is the final opacity.
    pub color: [f32; 4],
    /// Emissive color premultiplied by its intensity.
    pub emissive: [f32; 4],
    /// Specular color and shininess.
    pub specular: [f32; 4],
    /// x: shading model (0 basic, 1 lambert, 2 phong).
    pub params: [f32; 4],
}
