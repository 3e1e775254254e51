use std::collections::HashMap;

use crate::error::{RenderError, Result};
use crate::gpu::GpuApi;

use super::{ShaderProgram, sources};

/// Material shader programs known to the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    /// Textured, lit.
    MeshDefault,
    /// Unlit flat color.
    MeshEmissive,
    /// Textured, lit per vertex.
    MeshGouraud,
    /// Untextured, lit.
    MeshSolid,
    /// Textured, lit, alpha blended.
    MeshTransparent,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 5] = [
        ShaderKind::MeshDefault,
        ShaderKind::MeshEmissive,
        ShaderKind::MeshGouraud,
        ShaderKind::MeshSolid,
        ShaderKind::MeshTransparent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::MeshDefault => "mesh_default",
            ShaderKind::MeshEmissive => "mesh_emissive",
            ShaderKind::MeshGouraud => "mesh_gouraud",
            ShaderKind::MeshSolid => "mesh_solid",
            ShaderKind::MeshTransparent => "mesh_transparent",
        }
    }
}

/// Sources for one registry entry.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub kind: ShaderKind,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// The source bundled with the engine for `kind`.
    pub fn builtin(kind: ShaderKind) -> Self {
        let lit = |stage: &str| format!("{}\n{stage}", sources::LIGHTING);
        let (vertex, fragment) = match kind {
            ShaderKind::MeshDefault => {
                (sources::MESH_VERTEX.to_string(), lit(sources::MESH_DEFAULT))
            }
            ShaderKind::MeshEmissive => {
                (sources::MESH_VERTEX.to_string(), sources::MESH_EMISSIVE.to_string())
            }
            ShaderKind::MeshGouraud => {
                (lit(sources::MESH_GOURAUD_VERTEX), sources::MESH_GOURAUD.to_string())
            }
            ShaderKind::MeshSolid => (sources::MESH_VERTEX.to_string(), lit(sources::MESH_SOLID)),
            ShaderKind::MeshTransparent => {
                (sources::MESH_VERTEX.to_string(), lit(sources::MESH_TRANSPARENT))
            }
        };
        Self {
            kind,
            vertex,
            fragment,
        }
    }
}

/// The engine's material programs, compiled once at startup and owned by the
/// renderer.
#[derive(Debug, Default)]
pub struct ShaderRegistry {
    programs: HashMap<ShaderKind, ShaderProgram>,
}

impl ShaderRegistry {
    /// Compiles every built-in program.
    pub fn new(gpu: &mut dyn GpuApi) -> Result<Self> {
        Self::build(gpu, ShaderKind::ALL.map(ShaderSource::builtin))
    }

    /// Compiles every source before reporting: on failure the error is
    /// [`RenderError::Shaders`] listing each broken program, and the programs
    /// that did build are released.
    pub fn build(
        gpu: &mut dyn GpuApi,
        sources: impl IntoIterator<Item = ShaderSource>,
    ) -> Result<Self> {
        let mut registry = Self::default();
        let mut errors = Vec::new();

        for src in sources {
            match ShaderProgram::compile(gpu, src.kind.name(), &src.vertex, &src.fragment) {
                Ok(program) => {
                    if let Some(mut old) = registry.programs.insert(src.kind, program) {
                        old.release(gpu);
                    }
                }
                Err(e) => {
                    log::error!("{e}");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            log::info!("compiled {} shader program(s)", registry.programs.len());
            Ok(registry)
        } else {
            registry.release(gpu);
            Err(RenderError::Shaders(errors))
        }
    }

    pub fn get(&self, kind: ShaderKind) -> Option<&ShaderProgram> {
        self.programs.get(&kind)
    }

    /// Like [`ShaderRegistry::get`], as an error for `?` callers.
    pub fn program(&self, kind: ShaderKind) -> Result<&ShaderProgram> {
        self.get(kind).ok_or(RenderError::MissingShader(kind.name()))
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        for (_, mut program) in self.programs.drain() {
            program.release(gpu);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::HeadlessApi;

    #[test]
    fn builtin_programs_compile_and_release() {
        let mut gpu = HeadlessApi::new(8, 8);
        let mut registry = ShaderRegistry::new(&mut gpu).unwrap();
        assert_eq!(registry.len(), ShaderKind::ALL.len());

        registry.release(&mut gpu);
        assert!(registry.is_empty());
        assert_eq!(gpu.live_programs(), 0);
        assert_eq!(gpu.live_shaders(), 0);
    }

    #[test]
    fn mesh_programs_share_attribute_locations() {
        // A mesh resolves its attributes once and is drawn with any material.
        let mut gpu = HeadlessApi::new(8, 8);
        let mut registry = ShaderRegistry::new(&mut gpu).unwrap();
        let reference = registry.program(ShaderKind::MeshDefault).unwrap();

        for kind in ShaderKind::ALL {
            let program = registry.program(kind).unwrap();
            for name in ["coord", "normal", "tex_coord"] {
                assert_eq!(
                    program.attribute_location(name).unwrap(),
                    reference.attribute_location(name).unwrap(),
                    "{} `{name}`",
                    kind.name()
                );
            }
        }

        registry.release(&mut gpu);
    }

    #[test]
    fn gouraud_lights_in_its_vertex_stage() {
        let mut gpu = HeadlessApi::new(8, 8);
        let mut registry = ShaderRegistry::new(&mut gpu).unwrap();
        let gouraud = registry.program(ShaderKind::MeshGouraud).unwrap();

        assert!(gouraud.uniform_location("light_positions").is_ok());
        assert!(gouraud.uniform_location("albedo").is_ok());
        assert_eq!(
            gouraud.uniform_location("light_colors").unwrap(),
            registry
                .program(ShaderKind::MeshDefault)
                .unwrap()
                .uniform_location("light_colors")
                .unwrap()
        );

        registry.release(&mut gpu);
    }
}
