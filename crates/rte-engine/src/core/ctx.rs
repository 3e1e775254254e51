use crate::coords::Viewport;
use crate::gpu::GpuApi;
use crate::time::FrameTime;

/// Per-frame context passed to [`super::App::on_frame`].
///
/// `'a` is the duration of the callback; the frame is already open on `gpu`.
pub struct FrameCtx<'a> {
    pub gpu: &'a mut dyn GpuApi,
    pub time: FrameTime,
    /// Window size in physical pixels with the configured pixel size.
    pub viewport: Viewport,
}
