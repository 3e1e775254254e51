/// One corner of one polygon face: 0-based indices into [`RawGeometryArrays`].
///
/// Two references describe the same vertex only if all three indices match.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FaceVertexRef {
    pub position: u32,
    pub normal: Option<u32>,
    pub tex_coord: Option<u32>,
}

impl FaceVertexRef {
    /// A reference carrying all three components.
    #[inline]
    pub const fn new(position: u32, normal: u32, tex_coord: u32) -> Self {
        Self {
            position,
            normal: Some(normal),
            tex_coord: Some(tex_coord),
        }
    }
}

impl From<(u32, u32, u32)> for FaceVertexRef {
    #[inline]
    fn from((position, normal, tex_coord): (u32, u32, u32)) -> Self {
        Self::new(position, normal, tex_coord)
    }
}

/// Raw per-attribute arrays as read from a mesh file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeometryArrays {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
}
