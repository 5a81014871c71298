//! Surface materials.

use effigy_core::Color;

use crate::resources::{ResourceContext, ResourceKind, Ticket};

/// How a mesh surface is shaded.
///
/// Lighting follows a simple Phong split: a constant ambient term plus a
/// diffuse term scaled by the light direction. Flat materials skip lighting
/// and show their base color as-is.
#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub color: Color,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Whether this is a flat (unlit) material.
    pub is_flat: bool,
    /// Ambient light factor (0.0 - 1.0).
    pub ambient: f32,
    /// Diffuse reflection factor (0.0 - 1.0).
    pub diffuse: f32,
    _ticket: Ticket,
}

impl Material {
    /// An opaque lit material.
    pub fn standard(ctx: &ResourceContext, name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            opacity: 1.0,
            is_flat: false,
            ambient: 0.35,
            diffuse: 0.65,
            _ticket: ctx.acquire(ResourceKind::Material),
        }
    }

    /// A translucent, unlit material for contact shadows.
    pub fn shadow(ctx: &ResourceContext) -> Self {
        Self {
            name: "shadow".to_owned(),
            color: Color::BLACK,
            opacity: 0.35,
            is_flat: true,
            ambient: 1.0,
            diffuse: 0.0,
            _ticket: ctx.acquire(ResourceKind::Material),
        }
    }

    /// Shaded color for a surface whose normal makes `cos_angle` with the
    /// light; alpha carries the opacity.
    pub fn shade(&self, cos_angle: f32) -> Color {
        let base = self.color.to_vec3();
        let factor = if self.is_flat {
            1.0
        } else {
            self.ambient + self.diffuse * cos_angle.clamp(0.0, 1.0)
        };
        Color::from_vec3(base * factor).with_alpha(self.opacity)
    }
}
