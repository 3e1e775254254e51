use std::fmt;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw backend id (diagnostics only).
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

gpu_handle!(
    /// Vertex or index buffer.
    BufferId
);
gpu_handle!(
    /// One compiled shader stage.
    ShaderId
);
gpu_handle!(
    /// Linked vertex + fragment program.
    ProgramId
);
gpu_handle!(
    /// 2D RGBA texture.
    TextureId
);
gpu_handle!(
    /// Off-screen render target wrapping a color texture.
    FramebufferId
);

/// What a buffer is bound as.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Primitive assembly mode of a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}
