//! wgpu device + surface bring-up.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for a window
//! - configuring the Surface (swapchain) and reconfiguring it on resize
//! - acquiring frames with a command encoder for [`crate::gpu::WgpuApi`]

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::GpuContext;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
