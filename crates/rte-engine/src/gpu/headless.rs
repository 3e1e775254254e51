//! Headless GPU backend.
//!
//! Performs no rendering. Every resource lives in host memory, every draw is
//! recorded, and resource counts are exposed so callers can verify lifetimes
//! without GPU hardware. Shaders still go through the WGSL front-end, so
//! compile and link diagnostics are real.

use std::collections::{HashMap, VecDeque};

use crate::error::{RenderError, Result};
use crate::shader::reflect::{self, ProgramInterface, StageInterface};

use super::{
    BufferId, BufferKind, DrawCall, DrawMode, FramebufferId, GpuApi, ProgramId, ShaderId,
    ShaderStage, TextureId, UniformValue, VertexAttribPointer, ViewportRect,
};

/// Snapshot of one draw submission.
#[derive(Debug, Clone)]
pub struct RecordedDraw {
    pub program: ProgramId,
    pub framebuffer: Option<FramebufferId>,
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
    pub attributes: Vec<VertexAttribPointer>,
    pub mode: DrawMode,
    pub count: u32,
    pub viewport: ViewportRect,
    pub depth_test: bool,
    pub depth_write: bool,
    /// Uniform state of the program at draw time, ordered by location.
    pub uniforms: Vec<(u32, UniformValue)>,
    /// Texture units at draw time, ordered by unit.
    pub textures: Vec<(u32, TextureId)>,
}

#[derive(Debug, Default)]
pub struct HeadlessApi {
    next_id: u32,
    size: (u32, u32),
    frame_open: bool,
    frames: u64,

    buffers: HashMap<u32, (BufferKind, Vec<u8>)>,
    shaders: HashMap<u32, StageInterface>,
    programs: HashMap<u32, ProgramInterface>,
    textures: HashMap<u32, (u32, u32)>,
    framebuffers: HashMap<u32, TextureId>,

    current_program: Option<ProgramId>,
    bound_framebuffer: Option<FramebufferId>,
    texture_units: HashMap<u32, TextureId>,
    uniforms: HashMap<(u32, u32), UniformValue>,
    uniform_writes: Vec<(u32, UniformValue)>,
    viewport: ViewportRect,
    depth_test: bool,
    depth_write: bool,

    draws: Vec<RecordedDraw>,
    clears: usize,
    errors: VecDeque<String>,
    invalid_deletes: usize,
    failing_buffers: Option<usize>,
}

impl HeadlessApi {
    /// Creates a backend whose default target is `width x height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            viewport: ViewportRect::sized(width, height),
            depth_write: true,
            ..Self::default()
        }
    }

    // ── inspection ────────────────────────────────────────────────────────

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }

    /// Deletes of handles that were never created or already deleted.
    pub fn invalid_deletes(&self) -> usize {
        self.invalid_deletes
    }

    pub fn buffer_data(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(|(_, data)| data.as_slice())
    }

    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture.0).copied()
    }

    pub fn framebuffer_texture(&self, framebuffer: FramebufferId) -> Option<TextureId> {
        self.framebuffers.get(&framebuffer.0).copied()
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    pub fn last_draw(&self) -> Option<&RecordedDraw> {
        self.draws.last()
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Every `set_uniform` call since the last [`HeadlessApi::take_uniform_writes`].
    pub fn take_uniform_writes(&mut self) -> Vec<(u32, UniformValue)> {
        std::mem::take(&mut self.uniform_writes)
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.bound_framebuffer
    }

    pub fn viewport(&self) -> ViewportRect {
        self.viewport
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    // ── fault injection ───────────────────────────────────────────────────

    /// Lets `successes` more buffers be created, then fails every creation.
    pub fn fail_buffers_after(&mut self, successes: usize) {
        self.failing_buffers = Some(successes);
    }

    /// Queues a back-end error as if the driver had reported one.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push_back(message.into());
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn report(&mut self, message: String) {
        log::warn!("HeadlessApi: {message}");
        self.errors.push_back(message);
    }

    fn forget<T>(map: &mut HashMap<u32, T>, id: u32, what: &str, invalid: &mut usize) -> bool {
        if map.remove(&id).is_some() {
            log::trace!("HeadlessApi: deleted {what} {id}");
            true
        } else {
            *invalid += 1;
            false
        }
    }
}

impl GpuApi for HeadlessApi {
    fn begin_frame(&mut self) -> Result<bool> {
        if self.frame_open {
            self.report("begin_frame called twice without end_frame".to_string());
        }
        self.frame_open = true;
        self.bound_framebuffer = None;
        self.viewport = ViewportRect::sized(self.size.0, self.size.1);
        Ok(true)
    }

    fn end_frame(&mut self) {
        if !self.frame_open {
            self.report("end_frame without begin_frame".to_string());
        }
        self.frame_open = false;
        self.frames += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> Result<BufferId> {
        if data.is_empty() {
            return Err(RenderError::ResourceCreation(format!("empty {kind:?} buffer")));
        }
        if let Some(left) = self.failing_buffers.as_mut() {
            if *left == 0 {
                return Err(RenderError::ResourceCreation(format!(
                    "{kind:?} buffer of {} bytes rejected",
                    data.len()
                )));
            }
            *left -= 1;
        }
        let id = self.alloc_id();
        self.buffers.insert(id, (kind, data.to_vec()));
        log::trace!("HeadlessApi: created {kind:?} buffer {id} ({} bytes)", data.len());
        Ok(BufferId(id))
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if !Self::forget(&mut self.buffers, buffer.0, "buffer", &mut self.invalid_deletes) {
            self.report(format!("delete of unknown buffer {}", buffer.0));
        }
    }

    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        let interface = reflect::compile_stage(source, stage)?;
        let id = self.alloc_id();
        self.shaders.insert(id, interface);
        Ok(ShaderId(id))
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if !Self::forget(&mut self.shaders, shader.0, "shader", &mut self.invalid_deletes) {
            self.report(format!("delete of unknown shader {}", shader.0));
        }
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Result<ProgramId, String> {
        let vs = self
            .shaders
            .get(&vertex.0)
            .ok_or_else(|| format!("unknown vertex shader {}", vertex.0))?;
        let fs = self
            .shaders
            .get(&fragment.0)
            .ok_or_else(|| format!("unknown fragment shader {}", fragment.0))?;
        let interface = reflect::link(vs, fs)?;
        let id = self.alloc_id();
        self.programs.insert(id, interface);
        Ok(ProgramId(id))
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.uniforms.retain(|(p, _), _| *p != program.0);
        if !Self::forget(&mut self.programs, program.0, "program", &mut self.invalid_deletes) {
            self.report(format!("delete of unknown program {}", program.0));
        }
    }

    fn program_interface(&self, program: ProgramId) -> Option<&ProgramInterface> {
        self.programs.get(&program.0)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        if let Some(p) = program {
            if !self.programs.contains_key(&p.0) {
                self.report(format!("use of unknown program {}", p.0));
                return;
            }
        }
        self.current_program = program;
    }

    fn set_uniform(&mut self, location: u32, value: &UniformValue) {
        self.uniform_writes.push((location, value.clone()));

        let Some(program) = self.current_program else {
            self.report(format!("uniform write to location {location} with no program in use"));
            return;
        };
        let declared = self
            .programs
            .get(&program.0)
            .and_then(|p| p.uniform_at(location))
            .map(|u| u.ty);
        match declared {
            None => self.report(format!(
                "program {} has no uniform at location {location}",
                program.0
            )),
            Some(ty) if !ty.accepts(value) => self.report(format!(
                "{} value written to {ty} uniform at location {location}",
                value.kind()
            )),
            Some(_) => {
                self.uniforms.insert((program.0, location), value.clone());
            }
        }
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    ) -> Result<TextureId> {
        if width == 0 || height == 0 {
            return Err(RenderError::ResourceCreation(format!(
                "texture size {width}x{height} is empty"
            )));
        }
        if let Some(p) = pixels {
            if p.len() != (width * height * 4) as usize {
                return Err(RenderError::ResourceCreation(format!(
                    "texture data is {} bytes, expected {}",
                    p.len(),
                    width * height * 4
                )));
            }
        }
        let id = self.alloc_id();
        self.textures.insert(id, (width, height));
        Ok(TextureId(id))
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.texture_units.retain(|_, t| *t != texture);
        if !Self::forget(&mut self.textures, texture.0, "texture", &mut self.invalid_deletes) {
            self.report(format!("delete of unknown texture {}", texture.0));
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        if !self.textures.contains_key(&texture.0) {
            self.report(format!("bind of unknown texture {} to unit {unit}", texture.0));
            return;
        }
        self.texture_units.insert(unit, texture);
    }

    fn create_framebuffer(&mut self, color: TextureId) -> Result<FramebufferId> {
        if !self.textures.contains_key(&color.0) {
            return Err(RenderError::ResourceCreation(format!(
                "framebuffer color texture {} does not exist",
                color.0
            )));
        }
        let id = self.alloc_id();
        self.framebuffers.insert(id, color);
        Ok(FramebufferId(id))
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        if self.bound_framebuffer == Some(framebuffer) {
            self.bound_framebuffer = None;
        }
        if !Self::forget(
            &mut self.framebuffers,
            framebuffer.0,
            "framebuffer",
            &mut self.invalid_deletes,
        ) {
            self.report(format!("delete of unknown framebuffer {}", framebuffer.0));
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        if let Some(fb) = framebuffer {
            if !self.framebuffers.contains_key(&fb.0) {
                self.report(format!("bind of unknown framebuffer {}", fb.0));
                return;
            }
        }
        self.bound_framebuffer = framebuffer;
    }

    fn set_viewport(&mut self, rect: ViewportRect) {
        self.viewport = rect;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    fn clear(&mut self, _color: [f32; 4]) {
        self.clears += 1;
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        let Some(program) = self.current_program else {
            self.report("draw with no program in use".to_string());
            return;
        };
        if !self.buffers.contains_key(&call.vertex_buffer.0) {
            self.report(format!("draw from unknown vertex buffer {}", call.vertex_buffer.0));
            return;
        }
        if let Some(ib) = call.index_buffer {
            if !self.buffers.contains_key(&ib.0) {
                self.report(format!("draw from unknown index buffer {}", ib.0));
                return;
            }
        }

        let mut uniforms: Vec<_> = self
            .uniforms
            .iter()
            .filter(|((p, _), _)| *p == program.0)
            .map(|((_, loc), v)| (*loc, v.clone()))
            .collect();
        uniforms.sort_by_key(|(loc, _)| *loc);

        let mut textures: Vec<_> = self.texture_units.iter().map(|(u, t)| (*u, *t)).collect();
        textures.sort_by_key(|(u, _)| *u);

        self.draws.push(RecordedDraw {
            program,
            framebuffer: self.bound_framebuffer,
            vertex_buffer: call.vertex_buffer,
            index_buffer: call.index_buffer,
            attributes: call.attributes.to_vec(),
            mode: call.mode,
            count: call.count,
            viewport: self.viewport,
            depth_test: self.depth_test,
            depth_write: self.depth_write,
            uniforms,
            textures,
        });
    }

    fn take_error(&mut self) -> Option<String> {
        self.errors.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_delete_is_counted_not_fatal() {
        let mut gpu = HeadlessApi::new(4, 4);
        let b = gpu.create_buffer(BufferKind::Vertex, &[0; 16]).unwrap();
        gpu.delete_buffer(b);
        gpu.delete_buffer(b);
        assert_eq!(gpu.live_buffers(), 0);
        assert_eq!(gpu.invalid_deletes(), 1);
        assert!(gpu.take_error().is_some());
    }

    #[test]
    fn buffer_failure_injection() {
        let mut gpu = HeadlessApi::new(4, 4);
        gpu.fail_buffers_after(1);
        assert!(gpu.create_buffer(BufferKind::Vertex, &[1]).is_ok());
        assert!(gpu.create_buffer(BufferKind::Index, &[1]).is_err());
        assert_eq!(gpu.live_buffers(), 1);
    }

    #[test]
    fn framebuffer_requires_live_texture() {
        let mut gpu = HeadlessApi::new(4, 4);
        let t = gpu.create_texture(2, 2, None).unwrap();
        let fb = gpu.create_framebuffer(t).unwrap();
        gpu.bind_framebuffer(Some(fb));
        assert_eq!(gpu.bound_framebuffer(), Some(fb));

        gpu.delete_framebuffer(fb);
        assert_eq!(gpu.bound_framebuffer(), None);
        gpu.delete_texture(t);
        assert!(gpu.create_framebuffer(t).is_err());
    }

    #[test]
    fn draw_without_program_is_reported() {
        let mut gpu = HeadlessApi::new(4, 4);
        let b = gpu.create_buffer(BufferKind::Vertex, &[0; 12]).unwrap();
        gpu.draw(&DrawCall {
            vertex_buffer: b,
            index_buffer: None,
            attributes: &[],
            mode: DrawMode::Triangles,
            count: 3,
        });
        assert!(gpu.draws().is_empty());
        assert!(gpu.take_error().unwrap().contains("no program"));
    }
}
