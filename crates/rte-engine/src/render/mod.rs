//! GPU resource wrappers and the per-frame renderer.
//!
//! Every wrapper owns its handles and gives them back through an explicit
//! `release(gpu)`; dropping an unreleased wrapper logs a leak.

mod array_object;
mod attribute;
mod frame_buffer;
mod postprocess;
mod renderer;
mod texture;

pub use array_object::GpuArrayObject;
pub use attribute::Attribute;
pub use frame_buffer::{FrameBuffer, FrameBufferState};
pub use postprocess::Postprocessor;
pub use renderer::Renderer;
pub use texture::Texture;
