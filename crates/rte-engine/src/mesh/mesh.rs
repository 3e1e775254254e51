use crate::assets::Assets;
use crate::error::{RenderError, Result};
use crate::gpu::{DrawMode, GpuApi};
use crate::render::{Attribute, GpuArrayObject};
use crate::shader::ShaderProgram;

use super::{MeshData, Vertex, obj};

/// Uploaded mesh geometry with attributes resolved against a program.
///
/// Every mesh vertex stage declares the same inputs, so locations resolved
/// against any mesh program are valid for all.
#[derive(Debug)]
pub struct Mesh {
    name: String,
    array: GpuArrayObject,
}

impl Mesh {
    /// Reads `models/<name>` and uploads it.
    pub fn load(
        gpu: &mut dyn GpuApi,
        assets: &Assets,
        name: &str,
        program: &ShaderProgram,
    ) -> Result<Self> {
        let text = assets.read_model(name)?;
        let obj = obj::parse(&text)?;
        let data = MeshData::build(&obj.arrays, &obj.faces)?;
        Self::from_data(gpu, name, &data, program)
    }

    pub fn from_data(
        gpu: &mut dyn GpuApi,
        name: &str,
        data: &MeshData,
        program: &ShaderProgram,
    ) -> Result<Self> {
        if data.is_empty() {
            return Err(RenderError::EmptyMesh {
                name: name.to_string(),
            });
        }

        // Resolve names first so a bad program leaves nothing to clean up.
        let attributes = [
            ("coord", 3, Vertex::POSITION_OFFSET),
            ("normal", 3, Vertex::NORMAL_OFFSET),
            ("tex_coord", 2, Vertex::TEX_COORD_OFFSET),
        ]
        .into_iter()
        .map(|(attr, components, offset)| -> Result<Attribute> {
            let location = program.attribute_location(attr)?;
            Ok(Attribute::new(attr, location, components, Vertex::COMPONENTS, offset))
        })
        .collect::<Result<Vec<_>>>()?;

        let array =
            GpuArrayObject::create_indexed(gpu, &data.vertices, &data.indices, DrawMode::Triangles)?
                .with_attributes(attributes);

        log::info!(
            "mesh `{name}`: {} vertices, {} triangles",
            data.vertices.len(),
            data.indices.len() / 3
        );

        Ok(Self {
            name: name.to_string(),
            array,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn array(&self) -> &GpuArrayObject {
        &self.array
    }

    /// Draws with whatever program is bound.
    pub fn draw(&self, gpu: &mut dyn GpuApi) {
        self.array.draw(gpu);
    }

    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        self.array.release(gpu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::HeadlessApi;
    use crate::shader::{ShaderKind, ShaderRegistry};

    #[test]
    fn faceless_obj_is_a_mesh_error() {
        let mut gpu = HeadlessApi::new(8, 8);
        let mut shaders = ShaderRegistry::new(&mut gpu).unwrap();
        let program = shaders.program(ShaderKind::MeshDefault).unwrap();

        let obj = obj::parse("v 0 0 0\nv 1 0 0\n").unwrap();
        let data = MeshData::build(&obj.arrays, &obj.faces).unwrap();
        let err = Mesh::from_data(&mut gpu, "points.obj", &data, program).unwrap_err();

        assert!(matches!(err, RenderError::EmptyMesh { ref name } if name == "points.obj"));
        assert_eq!(gpu.live_buffers(), 0);

        shaders.release(&mut gpu);
    }
}
