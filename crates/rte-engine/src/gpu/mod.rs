//! GPU abstraction.
//!
//! Every engine component talks to the GPU through [`GpuApi`]:
//! - [`WgpuApi`] drives a real device through `wgpu`
//! - [`HeadlessApi`] records commands in memory and exposes resource counts

mod api;
mod handles;
mod headless;
mod uniform;
mod wgpu_api;

pub use api::{DrawCall, GpuApi, VertexAttribPointer, ViewportRect, check_gpu};
pub use handles::{
    BufferId, BufferKind, DrawMode, FramebufferId, ProgramId, ShaderId, ShaderStage, TextureId,
};
pub use headless::{HeadlessApi, RecordedDraw};
pub use uniform::{UniformType, UniformValue};
pub use wgpu_api::WgpuApi;
