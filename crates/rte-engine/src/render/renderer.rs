use glam::Mat4;

use crate::coords::Viewport;
use crate::error::{RenderError, Result};
use crate::gpu::{GpuApi, UniformValue, check_gpu};
use crate::scene::{Actor, Scene, light_uniforms};
use crate::shader::{ShaderProgram, ShaderRegistry};

use super::{Postprocessor, Texture};

/// Unit the albedo texture of lit textured materials is bound to.
const ALBEDO_UNIT: u32 = 0;

/// Draws a [`Scene`] through the off-screen target and composites it.
///
/// Per frame:
/// 1. bind the post-process target, enable depth test, clear
/// 2. draw opaque actors, then transparent ones back to front with depth
///    writes off
/// 3. composite the target onto the window
/// 4. checkpoint GPU errors
#[derive(Debug)]
pub struct Renderer {
    shaders: ShaderRegistry,
    post: Postprocessor,
    white: Texture,
    viewport: Viewport,
    clear_color: [f32; 4],
}

impl Renderer {
    /// Builds every material program and the post-process chain.
    ///
    /// Shader failures from both are reported together as
    /// [`RenderError::Shaders`].
    pub fn new(gpu: &mut dyn GpuApi, viewport: Viewport, clear_color: [f32; 4]) -> Result<Self> {
        let shaders = ShaderRegistry::new(gpu);
        let post = Postprocessor::new(gpu, viewport);

        let (mut shaders, mut post) = match (shaders, post) {
            (Ok(shaders), Ok(post)) => (shaders, post),
            (Err(a), Err(b)) => return Err(merge_shader_errors(a, b)),
            (Ok(mut shaders), Err(e)) => {
                shaders.release(gpu);
                return Err(e);
            }
            (Err(e), Ok(mut post)) => {
                post.release(gpu);
                return Err(e);
            }
        };

        let white = match Texture::white(gpu) {
            Ok(t) => t,
            Err(e) => {
                post.release(gpu);
                shaders.release(gpu);
                return Err(e);
            }
        };

        log::info!(
            "renderer ready: {}x{} at pixel size {}",
            viewport.width,
            viewport.height,
            viewport.pixel_size()
        );

        Ok(Self {
            shaders,
            post,
            white,
            viewport,
            clear_color,
        })
    }

    pub fn shaders(&self) -> &ShaderRegistry {
        &self.shaders
    }

    pub fn postprocessor(&self) -> &Postprocessor {
        &self.post
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    /// Follows a window resize. Zero-sized windows (minimized) are ignored.
    pub fn resize(&mut self, gpu: &mut dyn GpuApi, width: u32, height: u32) -> Result<()> {
        let viewport = self.viewport.resized(width, height);
        if viewport.is_empty() {
            log::debug!("ignoring resize to {width}x{height}");
            return Ok(());
        }
        self.viewport = viewport;
        self.post.resize(gpu, viewport)
    }

    pub fn render(&mut self, gpu: &mut dyn GpuApi, scene: &Scene) -> Result<()> {
        self.post.bind(gpu);
        gpu.set_depth_test(true);
        gpu.clear(self.clear_color);

        self.draw_scene(gpu, scene)?;

        self.post.draw_frame(gpu);
        check_gpu(gpu, "frame")
    }

    fn draw_scene(&self, gpu: &mut dyn GpuApi, scene: &Scene) -> Result<()> {
        let (light_positions, light_colors) = light_uniforms(scene.lights());
        let frame = FrameUniforms {
            view_proj: scene.camera.view_proj(self.viewport.aspect()),
            light_positions,
            light_colors,
        };

        let (mut transparent, opaque): (Vec<&Actor>, Vec<&Actor>) = scene
            .actors()
            .iter()
            .partition(|actor| actor.material.is_transparent());

        for actor in opaque {
            self.draw_actor(gpu, scene, actor, &frame)?;
        }
        if transparent.is_empty() {
            return Ok(());
        }

        let eye = scene.camera.position;
        transparent.sort_by(|a, b| {
            let da = a.transform.position.distance_squared(eye);
            let db = b.transform.position.distance_squared(eye);
            db.total_cmp(&da)
        });

        gpu.set_depth_write(false);
        let result = transparent
            .into_iter()
            .try_for_each(|actor| self.draw_actor(gpu, scene, actor, &frame));
        gpu.set_depth_write(true);
        result
    }

    fn draw_actor(
        &self,
        gpu: &mut dyn GpuApi,
        scene: &Scene,
        actor: &Actor,
        frame: &FrameUniforms,
    ) -> Result<()> {
        let Some(mesh) = scene.mesh(actor.mesh) else {
            log::warn!("actor `{}` refers to a missing mesh; skipped", actor.name);
            return Ok(());
        };
        let program = self.shaders.program(actor.material.shader())?;

        program.bind(gpu);
        let result = self.set_material(gpu, program, scene, actor, frame);
        if result.is_ok() {
            mesh.draw(gpu);
        }
        program.unbind(gpu);
        result
    }

    fn set_material(
        &self,
        gpu: &mut dyn GpuApi,
        program: &ShaderProgram,
        scene: &Scene,
        actor: &Actor,
        frame: &FrameUniforms,
    ) -> Result<()> {
        let material = &actor.material;
        program.set_uniform(gpu, "model", actor.transform.matrix())?;
        program.set_uniform(gpu, "view_proj", frame.view_proj)?;
        program.set_uniform(gpu, "base_color", material.color())?;

        if material.is_lit() {
            let positions = UniformValue::Vec4Array(frame.light_positions.clone());
            program.set_uniform(gpu, "light_positions", positions)?;
            let colors = UniformValue::Vec4Array(frame.light_colors.clone());
            program.set_uniform(gpu, "light_colors", colors)?;
        }

        if material.is_textured() {
            let albedo = material
                .texture()
                .and_then(|handle| scene.texture(handle))
                .unwrap_or(&self.white);
            let id = albedo.id().ok_or_else(|| {
                let name = albedo.name();
                RenderError::ResourceCreation(format!("texture `{name}` was released"))
            })?;
            program.set_texture(gpu, "albedo", id, ALBEDO_UNIT)?;
        }
        Ok(())
    }

    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        self.post.release(gpu);
        self.shaders.release(gpu);
        self.white.release(gpu);
    }
}

/// Uniform values shared by every actor in a frame.
struct FrameUniforms {
    view_proj: Mat4,
    light_positions: Vec<[f32; 4]>,
    light_colors: Vec<[f32; 4]>,
}

/// Flattens two build failures into one [`RenderError::Shaders`].
fn merge_shader_errors(a: RenderError, b: RenderError) -> RenderError {
    let mut errors = Vec::new();
    for e in [a, b] {
        match e {
            RenderError::Shaders(inner) => errors.extend(inner),
            other => errors.push(other),
        }
    }
    RenderError::Shaders(errors)
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;
    use crate::gpu::{DrawMode, HeadlessApi, RecordedDraw, ViewportRect};
    use crate::mesh::{FaceVertexRef, Mesh, MeshData, RawGeometryArrays};
    use crate::scene::{Material, PointLight, Transform};
    use crate::shader::ShaderKind;

    fn triangle(gpu: &mut HeadlessApi, renderer: &Renderer) -> Mesh {
        let arrays = RawGeometryArrays {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]],
            tex_coords: vec![[0.0, 0.0]],
        };
        let refs = [0, 1, 2].map(|p| FaceVertexRef::new(p, 0, 0));
        let data = MeshData::build(&arrays, &refs).unwrap();
        let program = renderer.shaders().program(ShaderKind::MeshDefault).unwrap();
        Mesh::from_data(gpu, "tri", &data, program).unwrap()
    }

    #[test]
    fn frame_draws_actors_then_composites() {
        let mut gpu = HeadlessApi::new(320, 240);
        let mut renderer =
            Renderer::new(&mut gpu, Viewport::new(320, 240, 2), [0.0, 0.0, 0.0, 1.0]).unwrap();

        let mut scene = Scene::new("test");
        let mesh = triangle(&mut gpu, &renderer);
        let mesh = scene.add_mesh(mesh);
        scene.add_light(PointLight {
            position: Vec3::new(0.0, 2.0, 2.0),
            ..PointLight::default()
        });
        scene
            .add_actor(Actor::new("lit", mesh))
            .add_actor(Actor::new("lamp", mesh).with_material(Material::Emissive {
                color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            }));

        renderer.render(&mut gpu, &scene).unwrap();

        let draws = gpu.draws();
        assert_eq!(draws.len(), 3);
        let target = renderer.postprocessor().target();
        assert!(draws[..2].iter().all(|d| d.framebuffer.is_some() && d.depth_test));
        assert!(draws[..2].iter().all(|d| d.viewport == ViewportRect::sized(160, 120)));
        assert_eq!(draws[0].count, 3);
        assert_eq!(draws[0].mode, DrawMode::Triangles);
        assert_eq!(draws[2].framebuffer, None);
        assert_eq!(draws[2].textures, vec![(0, target.color_texture().unwrap())]);
        assert_eq!(gpu.clear_count(), 1);

        scene.release(&mut gpu);
        renderer.release(&mut gpu);
        assert_eq!(gpu.live_buffers(), 0);
        assert_eq!(gpu.live_textures(), 0);
        assert_eq!(gpu.live_programs(), 0);
    }

    #[test]
    fn transparent_actors_draw_last_back_to_front() {
        let mut gpu = HeadlessApi::new(64, 64);
        let mut renderer = Renderer::new(&mut gpu, Viewport::new(64, 64, 1), [0.0; 4]).unwrap();

        let mut scene = Scene::new("glass");
        let mesh = triangle(&mut gpu, &renderer);
        let mesh = scene.add_mesh(mesh);
        scene.camera.position = Vec3::new(0.0, 0.0, 10.0);

        let glass = |opacity: f32| Material::Transparent {
            color: Vec4::new(1.0, 1.0, 1.0, opacity),
            texture: None,
        };
        let at = |z: f32| Transform::from_position(Vec3::new(0.0, 0.0, z));
        scene
            .add_actor(Actor::new("near", mesh).with_material(glass(0.2)).with_transform(at(5.0)))
            .add_actor(Actor::new("far", mesh).with_material(glass(0.8)).with_transform(at(-5.0)))
            .add_actor(Actor::new("wall", mesh).with_material(Material::Gouraud {
                color: Vec4::ONE,
                texture: None,
            }));

        renderer.render(&mut gpu, &scene).unwrap();

        let shaders = renderer.shaders();
        let program_of = |kind| shaders.program(kind).unwrap().program_id().unwrap();
        let base_color = |draw: &RecordedDraw| {
            let location = shaders
                .program(ShaderKind::MeshTransparent)
                .unwrap()
                .uniform_location("base_color")
                .unwrap();
            draw.uniforms.iter().find(|(l, _)| *l == location).map(|(_, v)| v.clone())
        };

        let draws = gpu.draws();
        assert_eq!(draws.len(), 4);
        assert_eq!(draws[0].program, program_of(ShaderKind::MeshGouraud));
        assert!(draws[0].depth_write);
        assert_eq!(draws[0].textures.len(), 1);

        assert!(draws[1..3].iter().all(|d| d.program == program_of(ShaderKind::MeshTransparent)));
        assert!(draws[1..3].iter().all(|d| d.depth_test && !d.depth_write));
        assert_eq!(base_color(&draws[1]), Some(UniformValue::Vec4([1.0, 1.0, 1.0, 0.8])));
        assert_eq!(base_color(&draws[2]), Some(UniformValue::Vec4([1.0, 1.0, 1.0, 0.2])));

        // Depth writes are back on for the next frame.
        assert!(gpu.depth_write());

        scene.release(&mut gpu);
        renderer.release(&mut gpu);
    }

    #[test]
    fn zero_sized_resize_keeps_target() {
        let mut gpu = HeadlessApi::new(100, 100);
        let mut renderer = Renderer::new(&mut gpu, Viewport::new(100, 100, 1), [0.0; 4]).unwrap();

        renderer.resize(&mut gpu, 0, 0).unwrap();
        assert_eq!(renderer.viewport().width, 100);
        assert_eq!(renderer.postprocessor().target().size(), (100, 100));

        renderer.release(&mut gpu);
    }

    #[test]
    fn pending_backend_error_fails_the_frame() {
        let mut gpu = HeadlessApi::new(16, 16);
        let mut renderer = Renderer::new(&mut gpu, Viewport::new(16, 16, 1), [0.0; 4]).unwrap();
        let scene = Scene::new("empty");

        gpu.push_error("device lost");
        let err = renderer.render(&mut gpu, &scene).unwrap_err();
        assert!(matches!(
            err,
            RenderError::GpuState { ref checkpoint, .. } if checkpoint == "frame"
        ));

        renderer.release(&mut gpu);
    }
}
