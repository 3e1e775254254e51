use crate::gpu::VertexAttribPointer;

/// One named slice of an interleaved float vertex buffer.
///
/// `stride` and `offset` are in `f32` components, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub location: u32,
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
}

impl Attribute {
    /// # Panics
    /// If the slice does not fit in the stride (`offset + components > stride`)
    /// or `components` is zero.
    pub fn new(
        name: impl Into<String>,
        location: u32,
        components: u32,
        stride: u32,
        offset: u32,
    ) -> Self {
        let name = name.into();
        assert!(
            components > 0 && offset + components <= stride,
            "attribute `{name}`: {components} components at offset {offset} do not fit stride {stride}"
        );
        Self {
            name,
            location,
            components,
            stride,
            offset,
        }
    }

    /// The components of vertex `index` in `vertices`, sliced the way the GPU
    /// reads them.
    ///
    /// # Panics
    /// If `vertices` is too short to hold vertex `index`.
    pub fn read<'a>(&self, vertices: &'a [f32], index: usize) -> &'a [f32] {
        let start = index * self.stride as usize + self.offset as usize;
        &vertices[start..start + self.components as usize]
    }

    pub fn pointer(&self) -> VertexAttribPointer {
        const F32: u32 = std::mem::size_of::<f32>() as u32;
        VertexAttribPointer {
            location: self.location,
            components: self.components,
            stride: self.stride * F32,
            offset: self.offset * F32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_is_in_bytes() {
        let a = Attribute::new("normal", 1, 3, 8, 3);
        let p = a.pointer();
        assert_eq!((p.stride, p.offset), (32, 12));
    }

    #[test]
    #[should_panic(expected = "do not fit stride")]
    fn overflowing_slice_panics() {
        Attribute::new("uv", 2, 2, 8, 7);
    }
}
