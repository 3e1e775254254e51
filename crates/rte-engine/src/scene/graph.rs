use crate::gpu::GpuApi;
use crate::mesh::Mesh;
use crate::render::Texture;

use super::{Actor, Camera, MAX_LIGHTS, PointLight, TextureHandle};

/// Index of a mesh owned by a [`Scene`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshHandle(pub(crate) usize);

/// Everything drawn in one frame.
///
/// The scene owns its meshes and textures; actors refer to them by handle so
/// one mesh can be drawn many times. Draw order is actor insertion order.
#[derive(Debug, Default)]
pub struct Scene {
    name: String,
    meshes: Vec<Mesh>,
    textures: Vec<Texture>,
    actors: Vec<Actor>,
    lights: Vec<PointLight>,
    pub camera: Camera,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── resources ─────────────────────────────────────────────────────────

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle(self.meshes.len() - 1)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    pub fn find_mesh(&self, name: &str) -> Option<MeshHandle> {
        self.meshes.iter().position(|m| m.name() == name).map(MeshHandle)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.push(texture);
        TextureHandle(self.textures.len() - 1)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0)
    }

    pub fn find_texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.iter().position(|t| t.name() == name).map(TextureHandle)
    }

    // ── actors / lights ───────────────────────────────────────────────────

    pub fn add_actor(&mut self, actor: Actor) -> &mut Self {
        if self.actor(&actor.name).is_some() {
            log::warn!("scene `{}`: duplicate actor name `{}`", self.name, actor.name);
        }
        self.actors.push(actor);
        self
    }

    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.name == name)
    }

    pub fn actor_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.name == name)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> &mut [Actor] {
        &mut self.actors
    }

    /// Lights past [`MAX_LIGHTS`] are kept but not drawn.
    pub fn add_light(&mut self, light: PointLight) -> &mut Self {
        if self.lights.len() == MAX_LIGHTS {
            log::warn!(
                "scene `{}`: more than {MAX_LIGHTS} lights; extra lights are ignored",
                self.name
            );
        }
        self.lights.push(light);
        self
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Releases every mesh and texture.
    pub fn release(&mut self, gpu: &mut dyn GpuApi) {
        for mut mesh in self.meshes.drain(..) {
            mesh.release(gpu);
        }
        for mut texture in self.textures.drain(..) {
            texture.release(gpu);
        }
        self.actors.clear();
        log::debug!("scene `{}`: released", self.name);
    }
}
