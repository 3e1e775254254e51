use winit::event::WindowEvent;

use crate::coords::Viewport;
use crate::error::Result;
use crate::gpu::GpuApi;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`crate::window::Runtime`].
///
/// GPU resources are created in `on_start` and must be released in `on_exit`;
/// the runtime drops the device right after. An error from any callback stops
/// the event loop.
pub trait App {
    /// Called once the window and GPU are ready.
    fn on_start(&mut self, gpu: &mut dyn GpuApi, viewport: Viewport) -> Result<()>;

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called after the surface was resized to a non-empty size.
    fn on_resize(&mut self, gpu: &mut dyn GpuApi, viewport: Viewport) -> Result<()> {
        let _ = (gpu, viewport);
        Ok(())
    }

    /// Called once per presented frame, between `begin_frame` and `end_frame`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl>;

    fn on_exit(&mut self, gpu: &mut dyn GpuApi);
}
