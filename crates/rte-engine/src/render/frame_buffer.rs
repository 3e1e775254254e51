use crate::error::{RenderError, Result};
use crate::gpu::{FramebufferId, GpuApi, TextureId};

use super::Texture;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameBufferState {
    Unbound,
    Bound,
}

/// Off-screen color target: a render texture plus the framebuffer wrapping it.
///
/// Fixed size; a new size means a new `FrameBuffer`.
#[derive(Debug)]
pub struct FrameBuffer {
    framebuffer: Option<FramebufferId>,
    color: Texture,
    state: FrameBufferState,
}

impl FrameBuffer {
    pub fn new(gpu: &mut dyn GpuApi, width: u32, height: u32) -> Result<Self> {
        let mut color = Texture::render_target(gpu, width, height)?;
        let Some(texture) = color.id() else {
            return Err(RenderError::ResourceCreation("render target has no texture".into()));
        };
        let framebuffer = match gpu.create_framebuffer(texture) {
            Ok(fb) => fb,
            Err(e) => {
                color.release(gpu);
                return Err(e);
            }
        };
        log::debug!("frame buffer {}: {width}x{height}", framebuffer.raw());
        Ok(Self {
            framebuffer: Some(framebuffer),
            color,
            state: FrameBufferState::Unbound,
        })
    }

    pub fn state(&self) -> FrameBufferState {
        self.state
    }

    pub fn size(&self) -> (u32, u32) {
        self.color.size()
    }

    /// The texture the target renders into; `None` once released.
    pub fn color_texture(&self) -> Option<TextureId> {
        self.color.id()
    }

    /// Redirects draw output to this target.
    pub fn bind(&mut self, gpu: &mut dyn GpuApi) {
        let Some(fb) = self.framebuffer else {
            log::warn!("bind of a released frame buffer ignored");
            return;
        };
        gpu.bind_framebuffer(Some(fb));
        self.state = FrameBufferState::Bound;
    }

    /// Restores the default target.
    pub fn unbind(&mut self, gpu: &mut dyn GpuApi) {
        gpu.bind_framebuffer(None);
        self.state = FrameBufferState::Unbound;
    }

    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        if let Some(fb) = self.framebuffer.take() {
            if self.state == FrameBufferState::Bound {
                gpu.bind_framebuffer(None);
                self.state = FrameBufferState::Unbound;
            }
            gpu.delete_framebuffer(fb);
        }
        self.color.release(gpu);
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        if let Some(fb) = self.framebuffer {
            log::warn!("frame buffer {} dropped without release", fb.raw());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::HeadlessApi;

    #[test]
    fn bind_unbind_transitions() {
        let mut gpu = HeadlessApi::new(8, 8);
        let mut fb = FrameBuffer::new(&mut gpu, 4, 4).unwrap();
        assert_eq!(fb.state(), FrameBufferState::Unbound);

        fb.bind(&mut gpu);
        assert_eq!(fb.state(), FrameBufferState::Bound);
        assert!(gpu.bound_framebuffer().is_some());

        fb.unbind(&mut gpu);
        assert_eq!(gpu.bound_framebuffer(), None);

        fb.release(&mut gpu);
        fb.release(&mut gpu);
        assert_eq!(gpu.live_framebuffers(), 0);
        assert_eq!(gpu.live_textures(), 0);
        assert_eq!(gpu.invalid_deletes(), 0);
    }

    #[test]
    fn zero_size_is_rejected_without_leaks() {
        let mut gpu = HeadlessApi::new(8, 8);
        assert!(FrameBuffer::new(&mut gpu, 0, 4).is_err());
        assert_eq!(gpu.live_textures(), 0);
    }
}
