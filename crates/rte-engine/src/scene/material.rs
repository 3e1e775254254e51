use glam::Vec4;

use crate::shader::ShaderKind;

/// Index of a texture owned by a [`super::Scene`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureHandle(pub(crate) usize);

/// Surface description of an actor. Each variant carries only what its
/// shader reads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Material {
    /// Lit, optionally textured. Untextured surfaces sample plain white.
    Default {
        color: Vec4,
        texture: Option<TextureHandle>,
    },
    /// Unlit flat color.
    Emissive { color: Vec4 },
    /// Like `Default`, lit per vertex instead of per fragment.
    Gouraud {
        color: Vec4,
        texture: Option<TextureHandle>,
    },
    /// Lit flat color.
    Solid { color: Vec4 },
    /// Lit and blended over the opaque scene; `color.w` is the opacity.
    Transparent {
        color: Vec4,
        texture: Option<TextureHandle>,
    },
}

impl Default for Material {
    fn default() -> Self {
        Material::Default {
            color: Vec4::ONE,
            texture: None,
        }
    }
}

impl Material {
    pub fn shader(&self) -> ShaderKind {
        match self {
            Material::Default { .. } => ShaderKind::MeshDefault,
            Material::Emissive { .. } => ShaderKind::MeshEmissive,
            Material::Gouraud { .. } => ShaderKind::MeshGouraud,
            Material::Solid { .. } => ShaderKind::MeshSolid,
            Material::Transparent { .. } => ShaderKind::MeshTransparent,
        }
    }

    pub fn color(&self) -> Vec4 {
        match *self {
            Material::Default { color, .. }
            | Material::Emissive { color }
            | Material::Gouraud { color, .. }
            | Material::Solid { color }
            | Material::Transparent { color, .. } => color,
        }
    }

    /// Whether the shader samples an albedo texture.
    pub fn is_textured(&self) -> bool {
        matches!(
            self,
            Material::Default { .. } | Material::Gouraud { .. } | Material::Transparent { .. }
        )
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        match *self {
            Material::Default { texture, .. }
            | Material::Gouraud { texture, .. }
            | Material::Transparent { texture, .. } => texture,
            Material::Emissive { .. } | Material::Solid { .. } => None,
        }
    }

    /// Drawn after opaque actors, back to front, without depth writes.
    pub fn is_transparent(&self) -> bool {
        matches!(self, Material::Transparent { .. })
    }

    /// Whether the shader reads the scene lights.
    pub fn is_lit(&self) -> bool {
        !matches!(self, Material::Emissive { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transparent_materials_blend_late() {
        let color = Vec4::new(1.0, 1.0, 1.0, 0.5);
        let glass = Material::Transparent {
            color,
            texture: Some(TextureHandle(2)),
        };
        assert!(glass.is_transparent());
        assert_eq!(glass.texture(), Some(TextureHandle(2)));
        assert_eq!(glass.shader(), ShaderKind::MeshTransparent);

        let gouraud = Material::Gouraud {
            color,
            texture: None,
        };
        assert!(!gouraud.is_transparent());
        assert!(gouraud.is_textured() && gouraud.is_lit());
        assert!(!Material::Emissive { color }.is_lit());
        assert!(!Material::Solid { color }.is_textured());
    }
}
