use crate::error::Result;

use super::{FaceVertexRef, RawGeometryArrays, Vertex, deduplicate, pack};

/// GPU-ready mesh geometry: unique vertices plus one index per face corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Deduplicates `refs` and packs the survivors against `arrays`.
    pub fn build(arrays: &RawGeometryArrays, refs: &[FaceVertexRef]) -> Result<Self> {
        let indexed = deduplicate(refs);
        let vertices = pack(&indexed.unique, arrays)?;

        log::debug!(
            "mesh data: {} face vertices -> {} unique",
            refs.len(),
            vertices.len()
        );

        Ok(Self {
            vertices,
            indices: indexed.indices,
        })
    }

    /// Vertex data as one flat interleaved float buffer.
    pub fn floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
