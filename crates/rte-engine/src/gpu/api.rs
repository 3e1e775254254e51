use crate::error::Result;
use crate::shader::reflect::ProgramInterface;

use super::{
    BufferId, BufferKind, DrawMode, FramebufferId, ProgramId, ShaderId, ShaderStage, TextureId,
    UniformValue,
};

/// One vertex attribute as submitted to the GPU, in bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribPointer {
    pub location: u32,
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
}

/// A single draw submission.
#[derive(Debug, Clone)]
pub struct DrawCall<'a> {
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
    pub attributes: &'a [VertexAttribPointer],
    pub mode: DrawMode,
    /// Index count for indexed draws, vertex count otherwise.
    pub count: u32,
}

/// Pixel rectangle in the current render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    #[inline]
    pub const fn sized(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// GPU command surface used by every engine component.
///
/// Calls are synchronous submissions to a single rendering context. Creation
/// calls hand out handles that the caller owns and must delete exactly once;
/// state-changing calls never fail directly. Back-end errors are collected and
/// surfaced at checkpoints through [`GpuApi::take_error`].
pub trait GpuApi {
    // ── frames ────────────────────────────────────────────────────────────

    /// Starts a frame. `Ok(false)` means the frame should be skipped.
    fn begin_frame(&mut self) -> Result<bool>;

    /// Submits and presents the current frame.
    fn end_frame(&mut self);

    /// Resizes the default render target (physical pixels).
    fn resize(&mut self, width: u32, height: u32);

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> Result<BufferId>;
    fn delete_buffer(&mut self, buffer: BufferId);

    // ── shaders ───────────────────────────────────────────────────────────

    /// Compiles one stage. The error is the compiler log.
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String>;
    fn delete_shader(&mut self, shader: ShaderId);

    /// Links two compiled stages. The error is the linker log.
    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String>;
    fn delete_program(&mut self, program: ProgramId);

    /// Active attributes/uniforms of a linked program.
    fn program_interface(&self, program: ProgramId) -> Option<&ProgramInterface>;

    /// Makes `program` current for subsequent draws; `None` clears it.
    fn use_program(&mut self, program: Option<ProgramId>);

    /// Writes a uniform of the current program.
    fn set_uniform(&mut self, location: u32, value: &UniformValue);

    // ── textures / targets ────────────────────────────────────────────────

    /// Creates an RGBA8 texture; `pixels` is `width * height * 4` bytes or `None`
    /// for a render target.
    fn create_texture(&mut self, width: u32, height: u32, pixels: Option<&[u8]>)
    -> Result<TextureId>;
    fn delete_texture(&mut self, texture: TextureId);

    /// Attaches `texture` to `unit` for texture uniforms.
    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    fn create_framebuffer(&mut self, color: TextureId) -> Result<FramebufferId>;
    fn delete_framebuffer(&mut self, framebuffer: FramebufferId);

    /// Redirects output to `framebuffer`; `None` restores the default target.
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);

    // ── fixed-function state ──────────────────────────────────────────────

    fn set_viewport(&mut self, rect: ViewportRect);
    fn set_depth_test(&mut self, enabled: bool);
    /// Whether depth-tested draws also write depth. On by default.
    fn set_depth_write(&mut self, enabled: bool);
    fn clear(&mut self, color: [f32; 4]);

    // ── submission ────────────────────────────────────────────────────────

    fn draw(&mut self, call: &DrawCall<'_>);

    /// Returns and clears the oldest pending back-end error.
    fn take_error(&mut self) -> Option<String>;
}

/// Error checkpoint: escalates a pending back-end error as fatal.
pub fn check_gpu(gpu: &mut dyn GpuApi, checkpoint: &str) -> Result<()> {
    match gpu.take_error() {
        None => Ok(()),
        Some(message) => {
            log::error!("GPU state error at {checkpoint}: {message}");
            Err(crate::error::RenderError::GpuState {
                checkpoint: checkpoint.to_string(),
                message,
            })
        }
    }
}
