use bytemuck::Pod;

use crate::error::Result;
use crate::gpu::{BufferId, BufferKind, DrawCall, DrawMode, GpuApi, VertexAttribPointer};

use super::Attribute;

#[derive(Debug, Copy, Clone)]
struct Buffers {
    vertex: BufferId,
    index: Option<BufferId>,
}

/// A vertex buffer, an optional index buffer and the attributes that slice it.
///
/// Lifecycle: create → add attributes → draw (any number of times) →
/// [`GpuArrayObject::release`]. Release is explicit because it needs the GPU;
/// dropping an unreleased object only logs the leak.
///
/// Attribute layouts are trusted: nothing checks them against the uploaded
/// data.
#[derive(Debug)]
pub struct GpuArrayObject {
    buffers: Option<Buffers>,
    attributes: Vec<Attribute>,
    pointers: Vec<VertexAttribPointer>,
    mode: DrawMode,
    count: u32,
}

impl GpuArrayObject {
    /// Uploads `vertices`; draws are non-indexed over every vertex.
    pub fn create<V: Pod>(gpu: &mut dyn GpuApi, vertices: &[V], mode: DrawMode) -> Result<Self> {
        let vertex = gpu.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(vertices))?;
        log::debug!("array object: vertex buffer {} ({} vertices)", vertex.raw(), vertices.len());
        Ok(Self::with_buffers(
            Buffers {
                vertex,
                index: None,
            },
            mode,
            vertices.len() as u32,
        ))
    }

    /// Uploads `vertices` and `indices`; draws are indexed.
    ///
    /// If the index upload fails the vertex buffer is deleted before the
    /// error is returned.
    pub fn create_indexed<V: Pod>(
        gpu: &mut dyn GpuApi,
        vertices: &[V],
        indices: &[u32],
        mode: DrawMode,
    ) -> Result<Self> {
        let vertex = gpu.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(vertices))?;
        let index = match gpu.create_buffer(BufferKind::Index, bytemuck::cast_slice(indices)) {
            Ok(id) => id,
            Err(e) => {
                gpu.delete_buffer(vertex);
                return Err(e);
            }
        };
        log::debug!(
            "array object: vertex buffer {} + index buffer {} ({} vertices, {} indices)",
            vertex.raw(),
            index.raw(),
            vertices.len(),
            indices.len()
        );
        Ok(Self::with_buffers(
            Buffers {
                vertex,
                index: Some(index),
            },
            mode,
            indices.len() as u32,
        ))
    }

    fn with_buffers(buffers: Buffers, mode: DrawMode, count: u32) -> Self {
        Self {
            buffers: Some(buffers),
            attributes: Vec::new(),
            pointers: Vec::new(),
            mode,
            count,
        }
    }

    /// Attributes are declared before the first draw.
    ///
    /// # Panics
    /// On a duplicate attribute name.
    pub fn add_attribute(&mut self, attribute: Attribute) {
        assert!(
            self.attribute(&attribute.name).is_none(),
            "duplicate attribute `{}`",
            attribute.name
        );
        self.pointers.push(attribute.pointer());
        self.attributes.push(attribute);
    }

    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        for a in attributes {
            self.add_attribute(a);
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Elements per draw: index count when indexed, vertex count otherwise.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_indexed(&self) -> bool {
        self.buffers.is_some_and(|b| b.index.is_some())
    }

    pub fn is_released(&self) -> bool {
        self.buffers.is_none()
    }

    pub fn vertex_buffer(&self) -> Option<BufferId> {
        self.buffers.map(|b| b.vertex)
    }

    pub fn index_buffer(&self) -> Option<BufferId> {
        self.buffers.and_then(|b| b.index)
    }

    /// Submits one draw with the currently bound program.
    pub fn draw(&self, gpu: &mut dyn GpuApi) {
        let Some(buffers) = self.buffers else {
            log::warn!("draw of a released array object ignored");
            return;
        };
        gpu.draw(&DrawCall {
            vertex_buffer: buffers.vertex,
            index_buffer: buffers.index,
            attributes: &self.pointers,
            mode: self.mode,
            count: self.count,
        });
    }

    /// Deletes the GPU buffers. Later calls do nothing.
    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        let Some(buffers) = self.buffers.take() else {
            return;
        };
        gpu.delete_buffer(buffers.vertex);
        if let Some(index) = buffers.index {
            gpu.delete_buffer(index);
        }
        log::trace!("array object: released vertex buffer {}", buffers.vertex.raw());
    }
}

impl Drop for GpuArrayObject {
    fn drop(&mut self) {
        if let Some(b) = self.buffers {
            log::warn!(
                "GpuArrayObject dropped without release; leaking vertex buffer {}",
                b.vertex.raw()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::HeadlessApi;

    const TRI: [[f32; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

    #[test]
    fn non_indexed_draw_uses_vertex_count() {
        let mut gpu = HeadlessApi::new(4, 4);
        let mut ao = GpuArrayObject::create(&mut gpu, &TRI, DrawMode::Triangles)
            .unwrap()
            .with_attributes([Attribute::new("position", 0, 2, 2, 0)]);

        assert!(!ao.is_indexed());
        assert_eq!(ao.count(), 3);
        ao.release(&mut gpu);
        assert_eq!(gpu.live_buffers(), 0);
    }

    #[test]
    #[should_panic(expected = "duplicate attribute `position`")]
    fn duplicate_name_panics() {
        let mut gpu = HeadlessApi::new(4, 4);
        let mut ao = GpuArrayObject::create(&mut gpu, &TRI, DrawMode::Triangles).unwrap();
        ao.add_attribute(Attribute::new("position", 0, 2, 2, 0));
        ao.add_attribute(Attribute::new("position", 1, 2, 2, 0));
    }

    #[test]
    fn failed_index_upload_deletes_vertex_buffer() {
        let mut gpu = HeadlessApi::new(4, 4);
        gpu.fail_buffers_after(1);
        let err = GpuArrayObject::create_indexed(&mut gpu, &TRI, &[0, 1, 2], DrawMode::Triangles);
        assert!(err.is_err());
        assert_eq!(gpu.live_buffers(), 0);
        assert_eq!(gpu.invalid_deletes(), 0);
    }
}
