use std::path::PathBuf;

use thiserror::Error;

use crate::gpu::{ShaderStage, UniformType};
use crate::mesh::FaceVertexRef;

/// Convenience alias used across the engine.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;

/// Errors surfaced by mesh ingestion, shader binding and GPU resource management.
///
/// Nothing is retried internally; the caller decides whether to abort or skip
/// the failing asset.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("asset not found: {}", path.display())]
    AssetNotFound { path: PathBuf },

    #[error("failed to read asset {}", path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("mesh parse error at line {line}: {message}")]
    MeshParse { line: usize, message: String },

    #[error("mesh `{name}` has no faces")]
    EmptyMesh { name: String },

    #[error("failed to decode texture {}", path.display())]
    TextureDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The face vertex does not carry position + normal + texcoord.
    #[error("unsupported vertex format for face vertex {reference:?}: position, normal and texcoord are required")]
    UnsupportedVertexFormat { reference: FaceVertexRef },

    #[error("{array} index {index} out of range (length {len})")]
    IndexOutOfRange {
        array: &'static str,
        index: u32,
        len: usize,
    },

    #[error("failed to compile {stage} stage of shader `{name}`:\n{log}")]
    ShaderCompile {
        name: String,
        stage: ShaderStage,
        log: String,
    },

    #[error("failed to link shader program `{name}`:\n{log}")]
    ShaderLink { name: String, log: String },

    /// Every shader that failed while building a registry.
    #[error("{} shader program(s) failed to build:\n{}", .0.len(), join_errors(.0))]
    Shaders(Vec<RenderError>),

    #[error("{kind} `{name}` not found in shader program `{program}`")]
    NameNotFound {
        kind: &'static str,
        name: String,
        program: String,
    },

    #[error("shader program `{0}` is not registered")]
    MissingShader(&'static str),

    #[error("uniform `{name}` is declared as {expected}, got a {found} value")]
    UniformTypeMismatch {
        name: String,
        expected: UniformType,
        found: &'static str,
    },

    #[error("GPU resource creation failed: {0}")]
    ResourceCreation(String),

    /// The backend reported an error between two checkpoints.
    #[error("GPU state error at {checkpoint}: {message}")]
    GpuState { checkpoint: String, message: String },
}

fn join_errors(errors: &[RenderError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_range_display() {
        let err = RenderError::IndexOutOfRange {
            array: "normal",
            index: 7,
            len: 3,
        };
        assert_eq!(err.to_string(), "normal index 7 out of range (length 3)");
    }

    #[test]
    fn aggregated_shader_errors_list_every_failure() {
        let err = RenderError::Shaders(vec![
            RenderError::ShaderLink {
                name: "a".into(),
                log: "bad".into(),
            },
            RenderError::ShaderLink {
                name: "b".into(),
                log: "worse".into(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 shader program(s) failed to build"));
        assert!(text.contains("`a`"));
        assert!(text.contains("`b`"));
    }
}
