//! Shader programs: WGSL reflection, name-based binding and the material
//! program registry.

mod program;
pub mod reflect;
mod registry;

pub use program::{ShaderProgram, Uniform, UniformBinding, UniformSource};
pub use registry::{ShaderKind, ShaderRegistry, ShaderSource};

/// WGSL sources bundled with the engine.
pub mod sources {
    /// Vertex stage shared by every mesh material.
    pub const MESH_VERTEX: &str = include_str!("shaders/mesh.wgsl");
    /// Point-light helper prepended to lit fragment stages.
    pub const LIGHTING: &str = include_str!("shaders/lighting.wgsl");
    pub const MESH_DEFAULT: &str = include_str!("shaders/mesh_default.wgsl");
    pub const MESH_EMISSIVE: &str = include_str!("shaders/mesh_emissive.wgsl");
    pub const MESH_SOLID: &str = include_str!("shaders/mesh_solid.wgsl");
    pub const MESH_TRANSPARENT: &str = include_str!("shaders/mesh_transparent.wgsl");
    /// Vertex stage of the Gouraud material; lights per vertex.
    pub const MESH_GOURAUD_VERTEX: &str = include_str!("shaders/mesh_gouraud_vertex.wgsl");
    pub const MESH_GOURAUD: &str = include_str!("shaders/mesh_gouraud.wgsl");
    /// Both stages of the post-process composite.
    pub const POST: &str = include_str!("shaders/post.wgsl");
}
