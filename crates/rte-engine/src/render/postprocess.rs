use crate::coords::Viewport;
use crate::error::{RenderError, Result};
use crate::gpu::{DrawMode, GpuApi, ViewportRect};
use crate::shader::{ShaderProgram, Uniform, sources};

use super::{Attribute, FrameBuffer, GpuArrayObject};

/// Full-screen quad as a triangle strip: clip-space xy, then uv (v down).
const QUAD: [[f32; 4]; 4] = [
    [-1.0, -1.0, 0.0, 1.0],
    [1.0, -1.0, 1.0, 1.0],
    [-1.0, 1.0, 0.0, 0.0],
    [1.0, 1.0, 1.0, 0.0],
];

const TEXTURE_UNIT: u32 = 0;

/// Renders the scene into an off-screen target at `viewport / pixel_size`,
/// then stretches it over the window through a full-screen quad.
#[derive(Debug)]
pub struct Postprocessor {
    program: ShaderProgram,
    quad: GpuArrayObject,
    target: FrameBuffer,
    viewport: Viewport,
}

impl Postprocessor {
    pub fn new(gpu: &mut dyn GpuApi, viewport: Viewport) -> Result<Self> {
        let mut program = ShaderProgram::compile(gpu, "post", sources::POST, sources::POST)?;

        let quad = match Self::make_quad(gpu, &program) {
            Ok(q) => q,
            Err(e) => {
                program.release(gpu);
                return Err(e);
            }
        };

        let (width, height) = viewport.scaled_size();
        let target = match FrameBuffer::new(gpu, width, height) {
            Ok(t) => t,
            Err(e) => {
                let mut quad = quad;
                quad.release(gpu);
                program.release(gpu);
                return Err(e);
            }
        };

        let mut post = Self {
            program,
            quad,
            target,
            viewport,
        };
        if let Err(e) = post.rebind_target() {
            post.release(gpu);
            return Err(e);
        }
        Ok(post)
    }

    fn make_quad(gpu: &mut dyn GpuApi, program: &ShaderProgram) -> Result<GpuArrayObject> {
        let position = Attribute::new("position", program.attribute_location("position")?, 2, 4, 0);
        let tex_coords =
            Attribute::new("tex_coords", program.attribute_location("tex_coords")?, 2, 4, 2);
        Ok(GpuArrayObject::create(gpu, &QUAD, DrawMode::TriangleStrip)?
            .with_attributes([position, tex_coords]))
    }

    /// Points the `tex` uniform at the current target.
    fn rebind_target(&mut self) -> Result<()> {
        let texture = self.target.color_texture().ok_or_else(|| {
            RenderError::ResourceCreation("post-process target has no texture".into())
        })?;
        self.program.clear_uniforms();
        self.program
            .add_uniforms([Uniform::texture("tex", texture, TEXTURE_UNIT)])
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn target(&self) -> &FrameBuffer {
        &self.target
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// Replaces the target with one sized for `viewport`.
    ///
    /// The old target is released before the new one is created, so at most
    /// one exists at any time.
    pub fn resize(&mut self, gpu: &mut dyn GpuApi, viewport: Viewport) -> Result<()> {
        self.viewport = viewport;
        self.target.release(gpu);
        self.program.clear_uniforms();

        let (width, height) = viewport.scaled_size();
        self.target = FrameBuffer::new(gpu, width, height)?;
        self.rebind_target()?;

        log::debug!(
            "post-process target reallocated at {width}x{height} for {}x{}",
            viewport.width,
            viewport.height
        );
        Ok(())
    }

    /// Directs scene rendering into the off-screen target.
    pub fn bind(&mut self, gpu: &mut dyn GpuApi) {
        let (width, height) = self.target.size();
        gpu.set_viewport(ViewportRect::sized(width, height));
        self.target.bind(gpu);
    }

    pub fn unbind(&mut self, gpu: &mut dyn GpuApi) {
        self.target.unbind(gpu);
    }

    /// Composites the target onto the default framebuffer.
    pub fn draw_frame(&mut self, gpu: &mut dyn GpuApi) {
        gpu.set_depth_test(false);
        self.target.unbind(gpu);
        gpu.set_viewport(ViewportRect::sized(self.viewport.width, self.viewport.height));

        self.program.bind(gpu);
        self.program.bind_uniforms(gpu);
        self.quad.draw(gpu);
        self.program.unbind(gpu);
    }

    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        self.target.release(gpu);
        self.quad.release(gpu);
        self.program.release(gpu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{HeadlessApi, UniformValue};

    #[test]
    fn target_is_scaled_by_pixel_size() {
        let mut gpu = HeadlessApi::new(800, 600);
        let mut post = Postprocessor::new(&mut gpu, Viewport::new(800, 600, 4)).unwrap();
        assert_eq!(post.target().size(), (200, 150));

        post.bind(&mut gpu);
        assert_eq!(gpu.viewport(), ViewportRect::sized(200, 150));

        post.release(&mut gpu);
    }

    #[test]
    fn draw_frame_samples_target_on_default_framebuffer() {
        let mut gpu = HeadlessApi::new(64, 32);
        let mut post = Postprocessor::new(&mut gpu, Viewport::new(64, 32, 2)).unwrap();

        post.bind(&mut gpu);
        gpu.set_depth_test(true);
        post.draw_frame(&mut gpu);

        let draw = gpu.last_draw().unwrap();
        assert_eq!(draw.framebuffer, None);
        assert!(!draw.depth_test);
        assert_eq!(draw.viewport, ViewportRect::sized(64, 32));
        assert_eq!(draw.mode, DrawMode::TriangleStrip);
        assert_eq!(draw.count, 4);
        assert_eq!(draw.uniforms, vec![(0, UniformValue::TextureUnit(0))]);
        assert_eq!(draw.textures, vec![(0, post.target().color_texture().unwrap())]);
        assert_eq!(gpu.take_error(), None);

        post.release(&mut gpu);
    }
}
