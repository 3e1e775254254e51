//! `GpuApi` over wgpu.
//!
//! Immediate-mode calls are recorded into the frame's command encoder. Each
//! draw becomes one render pass (load/store) on the current target; pipelines
//! are built on first use per (program, vertex layout, mode, target format,
//! depth state) and cached. Uniform values are written into per-draw uniform
//! buffers and bound at `@group(0)` together with textures and the default
//! sampler.

use std::collections::{HashMap, VecDeque};

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::device::{GpuContext, GpuFrame, SurfaceErrorAction};
use crate::error::{RenderError, Result};
use crate::shader::reflect::{self, ProgramInterface, StageInterface};

use super::{
    BufferId, BufferKind, DrawCall, DrawMode, FramebufferId, GpuApi, ProgramId, ShaderId,
    ShaderStage, TextureId, UniformType, UniformValue, VertexAttribPointer, ViewportRect,
};

struct CompiledStage {
    module: wgpu::ShaderModule,
    interface: StageInterface,
}

struct LinkedProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    interface: ProgramInterface,
}

struct GpuTexture {
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    size: (u32, u32),
    render_target: bool,
}

struct Framebuffer {
    color: TextureId,
    depth: wgpu::TextureView,
}

/// Resolved draw destination.
struct Target {
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
    format: wgpu::TextureFormat,
    size: (u32, u32),
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    program: u32,
    attributes: Vec<VertexAttribPointer>,
    mode: DrawMode,
    indexed: bool,
    format: wgpu::TextureFormat,
    depth_test: bool,
    depth_write: bool,
}

enum BoundResource {
    Buffer(wgpu::Buffer),
    View(wgpu::TextureView),
    Sampler,
}

/// Production backend bound to one window surface.
pub struct WgpuApi<'w> {
    ctx: GpuContext<'w>,
    frame: Option<GpuFrame>,
    surface_depth: wgpu::TextureView,
    sampler: wgpu::Sampler,
    next_id: u32,

    buffers: HashMap<u32, wgpu::Buffer>,
    shaders: HashMap<u32, CompiledStage>,
    programs: HashMap<u32, LinkedProgram>,
    textures: HashMap<u32, GpuTexture>,
    framebuffers: HashMap<u32, Framebuffer>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    uniforms: HashMap<(u32, u32), UniformValue>,
    texture_units: HashMap<u32, TextureId>,
    current_program: Option<ProgramId>,
    bound_framebuffer: Option<FramebufferId>,
    viewport: Option<ViewportRect>,
    depth_test: bool,
    depth_write: bool,
    errors: VecDeque<String>,
}

impl<'w> WgpuApi<'w> {
    pub fn new(ctx: GpuContext<'w>) -> Self {
        let size = ctx.size();
        let surface_depth = create_depth_view(&ctx, size.width, size.height);

        // Nearest + clamp keeps the pixelated post-process crisp.
        let sampler = ctx.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("rte default sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            ctx,
            frame: None,
            surface_depth,
            sampler,
            next_id: 0,
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            pipelines: HashMap::new(),
            uniforms: HashMap::new(),
            texture_units: HashMap::new(),
            current_program: None,
            bound_framebuffer: None,
            viewport: None,
            depth_test: false,
            depth_write: true,
            errors: VecDeque::new(),
        }
    }

    pub fn context(&self) -> &GpuContext<'w> {
        &self.ctx
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn report(&mut self, message: String) {
        log::warn!("WgpuApi: {message}");
        self.errors.push_back(message);
    }

    fn current_target(&self) -> std::result::Result<Target, String> {
        match self.bound_framebuffer {
            None => {
                let frame = self.frame.as_ref().ok_or("no frame in progress")?;
                let size = self.ctx.size();
                Ok(Target {
                    color: frame.view.clone(),
                    depth: self.surface_depth.clone(),
                    format: self.ctx.surface_format(),
                    size: (size.width, size.height),
                })
            }
            Some(fb) => {
                let framebuffer = self
                    .framebuffers
                    .get(&fb.0)
                    .ok_or_else(|| format!("framebuffer {} no longer exists", fb.0))?;
                let color = self
                    .textures
                    .get(&framebuffer.color.0)
                    .ok_or_else(|| format!("framebuffer {} lost its color texture", fb.0))?;
                Ok(Target {
                    color: color.view.clone(),
                    depth: framebuffer.depth.clone(),
                    format: color.format,
                    size: color.size,
                })
            }
        }
    }

    fn pipeline_for(
        &mut self,
        program: ProgramId,
        call: &DrawCall<'_>,
        format: wgpu::TextureFormat,
    ) -> std::result::Result<wgpu::RenderPipeline, String> {
        let key = PipelineKey {
            program: program.0,
            attributes: call.attributes.to_vec(),
            mode: call.mode,
            indexed: call.index_buffer.is_some(),
            format,
            depth_test: self.depth_test,
            depth_write: self.depth_write,
        };
        if let Some(p) = self.pipelines.get(&key) {
            return Ok(p.clone());
        }

        let linked = self
            .programs
            .get(&program.0)
            .ok_or_else(|| format!("program {} no longer exists", program.0))?;

        // One buffer slot per attribute so each keeps its own stride.
        let mut slots = Vec::with_capacity(call.attributes.len());
        for a in call.attributes {
            slots.push([wgpu::VertexAttribute {
                format: vertex_format(a.components).ok_or_else(|| {
                    format!(
                        "attribute at location {} has {} components",
                        a.location, a.components
                    )
                })?,
                offset: a.offset as u64,
                shader_location: a.location,
            }]);
        }
        let layouts: Vec<wgpu::VertexBufferLayout<'_>> = call
            .attributes
            .iter()
            .zip(&slots)
            .map(|(a, attrs)| wgpu::VertexBufferLayout {
                array_stride: a.stride as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let (topology, strip) = topology(call.mode);
        let strip_index_format = (strip && key.indexed).then_some(wgpu::IndexFormat::Uint32);

        let pipeline = self
            .ctx
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("rte program pipeline"),
                layout: None,
                vertex: wgpu::VertexState {
                    module: &linked.vertex,
                    entry_point: Some(linked.interface.vertex_entry.as_str()),
                    compilation_options: Default::default(),
                    buffers: &layouts,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &linked.fragment,
                    entry_point: Some(linked.interface.fragment_entry.as_str()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: self.ctx.depth_format(),
                    depth_write_enabled: self.depth_test && self.depth_write,
                    depth_compare: if self.depth_test {
                        wgpu::CompareFunction::Less
                    } else {
                        wgpu::CompareFunction::Always
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!("WgpuApi: built pipeline for program {} ({:?})", program.0, call.mode);
        self.pipelines.insert(key, pipeline.clone());
        Ok(pipeline)
    }

    fn bind_group_for(
        &self,
        program: ProgramId,
        pipeline: &wgpu::RenderPipeline,
    ) -> std::result::Result<Option<wgpu::BindGroup>, String> {
        let linked = self
            .programs
            .get(&program.0)
            .ok_or_else(|| format!("program {} no longer exists", program.0))?;

        let mut resources = Vec::new();
        for u in &linked.interface.uniforms {
            let value = self.uniforms.get(&(program.0, u.location));
            let resource = match u.ty {
                UniformType::Texture2d => {
                    let Some(UniformValue::TextureUnit(unit)) = value else {
                        return Err(format!("texture uniform `{}` has no unit assigned", u.name));
                    };
                    let texture = self
                        .texture_units
                        .get(unit)
                        .and_then(|t| self.textures.get(&t.0))
                        .ok_or_else(|| format!("texture unit {unit} for `{}` is empty", u.name))?;
                    BoundResource::View(texture.view.clone())
                }
                ty => {
                    let size = ty.buffer_size().unwrap_or(4) as usize;
                    let mut bytes = Vec::with_capacity(size);
                    if let Some(v) = value {
                        v.write_bytes(&mut bytes);
                    }
                    bytes.resize(size, 0);
                    BoundResource::Buffer(self.ctx.device().create_buffer_init(
                        &wgpu::util::BufferInitDescriptor {
                            label: Some("rte uniform"),
                            contents: &bytes,
                            usage: wgpu::BufferUsages::UNIFORM,
                        },
                    ))
                }
            };
            resources.push((u.location, resource));
        }
        for binding in &linked.interface.samplers {
            resources.push((*binding, BoundResource::Sampler));
        }

        if resources.is_empty() {
            return Ok(None);
        }

        let entries: Vec<wgpu::BindGroupEntry<'_>> = resources
            .iter()
            .map(|(binding, r)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: match r {
                    BoundResource::Buffer(b) => b.as_entire_binding(),
                    BoundResource::View(v) => wgpu::BindingResource::TextureView(v),
                    BoundResource::Sampler => wgpu::BindingResource::Sampler(&self.sampler),
                },
            })
            .collect();

        let layout = pipeline.get_bind_group_layout(0);
        Ok(Some(self.ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rte uniforms"),
            layout: &layout,
            entries: &entries,
        })))
    }
}

impl GpuApi for WgpuApi<'_> {
    fn begin_frame(&mut self) -> Result<bool> {
        if self.frame.is_some() {
            self.report("begin_frame called twice without end_frame".to_string());
            return Ok(true);
        }
        match self.ctx.begin_frame() {
            Ok(frame) => {
                self.frame = Some(frame);
                self.bound_framebuffer = None;
                self.viewport = None;
                Ok(true)
            }
            Err(err) => match self.ctx.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => Err(RenderError::GpuState {
                    checkpoint: "begin_frame".to_string(),
                    message: "surface out of memory".to_string(),
                }),
                SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(false),
            },
        }
    }

    fn end_frame(&mut self) {
        match self.frame.take() {
            Some(frame) => self.ctx.submit(frame),
            None => self.report("end_frame without begin_frame".to_string()),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(PhysicalSize::new(width, height)) {
            self.surface_depth = create_depth_view(&self.ctx, width, height);
        }
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> Result<BufferId> {
        if data.is_empty() {
            return Err(RenderError::ResourceCreation(format!("empty {kind:?} buffer")));
        }
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        let buffer = self
            .ctx
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("rte mesh buffer"),
                contents: data,
                usage,
            });
        let id = self.alloc_id();
        self.buffers.insert(id, buffer);
        log::trace!("WgpuApi: created {kind:?} buffer {id} ({} bytes)", data.len());
        Ok(BufferId(id))
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer.0).is_none() {
            self.report(format!("delete of unknown buffer {}", buffer.0));
        }
    }

    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId, String> {
        let interface = reflect::compile_stage(source, stage)?;
        let module = self
            .ctx
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(interface.entry_point.as_str()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let id = self.alloc_id();
        self.shaders.insert(id, CompiledStage { module, interface });
        Ok(ShaderId(id))
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if self.shaders.remove(&shader.0).is_none() {
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
        let interface = reflect::link(&vs.interface, &fs.interface)?;
        let linked = LinkedProgram {
            vertex: vs.module.clone(),
            fragment: fs.module.clone(),
            interface,
        };
        let id = self.alloc_id();
        self.programs.insert(id, linked);
        Ok(ProgramId(id))
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.uniforms.retain(|(p, _), _| *p != program.0);
        self.pipelines.retain(|k, _| k.program != program.0);
        if self.programs.remove(&program.0).is_none() {
            self.report(format!("delete of unknown program {}", program.0));
        }
    }

    fn program_interface(&self, program: ProgramId) -> Option<&ProgramInterface> {
        self.programs.get(&program.0).map(|p| &p.interface)
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
        let Some(program) = self.current_program else {
            self.report(format!("uniform write to location {location} with no program in use"));
            return;
        };
        let declared = self
            .programs
            .get(&program.0)
            .and_then(|p| p.interface.uniform_at(location))
            .map(|u| u.ty);
        match declared {
            Some(ty) if ty.accepts(value) => {
                self.uniforms.insert((program.0, location), value.clone());
            }
            Some(ty) => self.report(format!(
                "{} value written to {ty} uniform at location {location}",
                value.kind()
            )),
            None => self.report(format!(
                "program {} has no uniform at location {location}",
                program.0
            )),
        }
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    ) -> Result<TextureId> {
        let max = self.ctx.device().limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::ResourceCreation(format!(
                "texture size {width}x{height} outside 1..={max}"
            )));
        }

        let render_target = pixels.is_none();
        let (format, usage) = if render_target {
            (
                self.ctx.surface_format(),
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            )
        } else {
            (
                wgpu::TextureFormat::Rgba8UnormSrgb,
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            )
        };

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(if render_target { "rte render target" } else { "rte texture" }),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        if let Some(data) = pixels {
            if data.len() != (width * height * 4) as usize {
                return Err(RenderError::ResourceCreation(format!(
                    "texture data is {} bytes, expected {}",
                    data.len(),
                    width * height * 4
                )));
            }
            self.ctx.queue().write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width * 4),
                    rows_per_image: Some(height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = self.alloc_id();
        self.textures.insert(
            id,
            GpuTexture {
                view,
                format,
                size: (width, height),
                render_target,
            },
        );
        Ok(TextureId(id))
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.texture_units.retain(|_, t| *t != texture);
        if self.textures.remove(&texture.0).is_none() {
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
        let (width, height) = match self.textures.get(&color.0) {
            Some(t) if t.render_target => t.size,
            Some(_) => {
                return Err(RenderError::ResourceCreation(format!(
                    "texture {} is not a render target",
                    color.0
                )));
            }
            None => {
                return Err(RenderError::ResourceCreation(format!(
                    "framebuffer color texture {} does not exist",
                    color.0
                )));
            }
        };
        let depth = create_depth_view(&self.ctx, width, height);
        let id = self.alloc_id();
        self.framebuffers.insert(id, Framebuffer { color, depth });
        Ok(FramebufferId(id))
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        if self.bound_framebuffer == Some(framebuffer) {
            self.bound_framebuffer = None;
        }
        if self.framebuffers.remove(&framebuffer.0).is_none() {
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
        self.viewport = Some(rect);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    fn clear(&mut self, color: [f32; 4]) {
        let target = match self.current_target() {
            Ok(t) => t,
            Err(e) => return self.report(format!("clear: {e}")),
        };
        let Some(frame) = self.frame.as_mut() else { return };

        let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("rte clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: color[0] as f64,
                        g: color[1] as f64,
                        b: color[2] as f64,
                        a: color[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        let Some(program) = self.current_program else {
            return self.report("draw with no program in use".to_string());
        };
        let target = match self.current_target() {
            Ok(t) => t,
            Err(e) => return self.report(format!("draw: {e}")),
        };
        let pipeline = match self.pipeline_for(program, call, target.format) {
            Ok(p) => p,
            Err(e) => return self.report(format!("draw: {e}")),
        };
        let bind_group = match self.bind_group_for(program, &pipeline) {
            Ok(bg) => bg,
            Err(e) => return self.report(format!("draw: {e}")),
        };
        let Some(vertex) = self.buffers.get(&call.vertex_buffer.0).cloned() else {
            return self.report(format!("draw from unknown vertex buffer {}", call.vertex_buffer.0));
        };
        let index = match call.index_buffer {
            None => None,
            Some(id) => match self.buffers.get(&id.0) {
                Some(b) => Some(b.clone()),
                None => return self.report(format!("draw from unknown index buffer {}", id.0)),
            },
        };

        let vp = clamp_viewport(self.viewport, target.size);
        if vp.width == 0 || vp.height == 0 {
            return;
        }

        let Some(frame) = self.frame.as_mut() else { return };
        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("rte draw"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(
            vp.x as f32,
            vp.y as f32,
            vp.width as f32,
            vp.height as f32,
            0.0,
            1.0,
        );
        rpass.set_pipeline(&pipeline);
        if let Some(bg) = &bind_group {
            rpass.set_bind_group(0, bg, &[]);
        }
        for slot in 0..call.attributes.len() as u32 {
            rpass.set_vertex_buffer(slot, vertex.slice(..));
        }
        match &index {
            Some(ib) => {
                rpass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..call.count, 0, 0..1);
            }
            None => rpass.draw(0..call.count, 0..1),
        }
    }

    fn take_error(&mut self) -> Option<String> {
        self.errors.pop_front()
    }
}

fn create_depth_view(ctx: &GpuContext<'_>, width: u32, height: u32) -> wgpu::TextureView {
    let texture = ctx.device().create_texture(&wgpu::TextureDescriptor {
        label: Some("rte depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: ctx.depth_format(),
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn vertex_format(components: u32) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

/// Returns the topology and whether it is a strip.
fn topology(mode: DrawMode) -> (wgpu::PrimitiveTopology, bool) {
    match mode {
        DrawMode::Points => (wgpu::PrimitiveTopology::PointList, false),
        DrawMode::Lines => (wgpu::PrimitiveTopology::LineList, false),
        DrawMode::LineStrip => (wgpu::PrimitiveTopology::LineStrip, true),
        DrawMode::Triangles => (wgpu::PrimitiveTopology::TriangleList, false),
        DrawMode::TriangleStrip => (wgpu::PrimitiveTopology::TriangleStrip, true),
    }
}

/// wgpu rejects viewports outside the attachment.
fn clamp_viewport(rect: Option<ViewportRect>, size: (u32, u32)) -> ViewportRect {
    let Some(r) = rect else {
        return ViewportRect::sized(size.0, size.1);
    };
    let x = r.x.min(size.0);
    let y = r.y.min(size.1);
    ViewportRect {
        x,
        y,
        width: r.width.min(size.0 - x),
        height: r.height.min(size.1 - y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_is_clamped_to_target() {
        let vp = clamp_viewport(Some(ViewportRect::sized(1920, 1080)), (640, 360));
        assert_eq!(vp, ViewportRect::sized(640, 360));
        assert_eq!(clamp_viewport(None, (8, 4)), ViewportRect::sized(8, 4));
    }

    #[test]
    fn strip_modes_need_a_strip_index_format() {
        assert!(topology(DrawMode::TriangleStrip).1);
        assert!(!topology(DrawMode::Triangles).1);
        assert_eq!(vertex_format(5), None);
    }
}
