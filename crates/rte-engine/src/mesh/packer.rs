use bytemuck::{Pod, Zeroable};

use crate::error::{RenderError, Result};

use super::{FaceVertexRef, RawGeometryArrays};

/// Interleaved mesh vertex: position, normal, texcoord.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Record size in `f32` components.
    pub const COMPONENTS: u32 = 8;

    pub const POSITION_OFFSET: u32 = 0;
    pub const NORMAL_OFFSET: u32 = 3;
    pub const TEX_COORD_OFFSET: u32 = 6;
}

/// Resolves each unique reference against `arrays`.
///
/// Only position + normal + texcoord references are supported; missing
/// attributes are never synthesized.
pub fn pack(unique: &[FaceVertexRef], arrays: &RawGeometryArrays) -> Result<Vec<Vertex>> {
    unique.iter().map(|r| pack_one(r, arrays)).collect()
}

fn pack_one(r: &FaceVertexRef, arrays: &RawGeometryArrays) -> Result<Vertex> {
    let (Some(n), Some(t)) = (r.normal, r.tex_coord) else {
        return Err(RenderError::UnsupportedVertexFormat { reference: *r });
    };

    Ok(Vertex {
        position: *lookup(&arrays.positions, r.position, "position")?,
        normal: *lookup(&arrays.normals, n, "normal")?,
        tex_coord: *lookup(&arrays.tex_coords, t, "texcoord")?,
    })
}

fn lookup<'a, T>(array: &'a [T], index: u32, name: &'static str) -> Result<&'a T> {
    array
        .get(index as usize)
        .ok_or(RenderError::IndexOutOfRange {
            array: name,
            index,
            len: array.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrays() -> RawGeometryArrays {
        RawGeometryArrays {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]],
            tex_coords: vec![[0.25, 0.75]],
        }
    }

    #[test]
    fn concatenates_components() {
        let v = pack(&[FaceVertexRef::new(1, 0, 0)], &arrays()).unwrap();
        assert_eq!(
            bytemuck::cast_slice::<Vertex, f32>(&v),
            &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.25, 0.75]
        );
    }

    #[test]
    fn out_of_range_names_the_array() {
        let err = pack(&[FaceVertexRef::new(0, 4, 0)], &arrays()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::IndexOutOfRange {
                array: "normal",
                index: 4,
                len: 1
            }
        ));
    }

    #[test]
    fn missing_tex_coord_is_unsupported() {
        let r = FaceVertexRef {
            position: 0,
            normal: Some(0),
            tex_coord: None,
        };
        let err = pack(&[r], &arrays()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnsupportedVertexFormat { reference } if reference == r
        ));
    }

    #[test]
    fn record_is_eight_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), Vertex::COMPONENTS as usize * 4);
    }
}
