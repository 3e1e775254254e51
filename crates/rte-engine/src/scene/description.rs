//! JSON scene description.
//!
//! ```json
//! {
//!   "name": "demo",
//!   "engine": { "pixel_size": 3 },
//!   "camera": { "position": [0, 1, 6] },
//!   "lights": [{ "position": [2, 3, 2], "color": [1, 0.9, 0.8], "intensity": 4 }],
//!   "actors": [{
//!     "name": "crate",
//!     "mesh": "cube.obj",
//!     "material": { "kind": "default", "texture": "crate.png" },
//!     "transform": { "position": [0, 0, 0], "rotation": [0, 0.5, 0] }
//!   }]
//! }
//! ```

use std::path::Path;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::assets::Assets;
use crate::config::EngineConfig;
use crate::error::{RenderError, Result};
use crate::gpu::{GpuApi, check_gpu};
use crate::mesh::Mesh;
use crate::render::Texture;
use crate::shader::{ShaderKind, ShaderRegistry};

use super::{Actor, Camera, Material, PointLight, Scene, TextureHandle, Transform};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub name: String,
    pub engine: EngineConfig,
    pub camera: Camera,
    pub lights: Vec<PointLight>,
    pub actors: Vec<ActorDescription>,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            engine: EngineConfig::default(),
            camera: Camera::default(),
            lights: Vec::new(),
            actors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDescription {
    pub name: String,
    /// File under `models/`.
    pub mesh: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub material: MaterialDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialDescription {
    Default {
        #[serde(default = "white")]
        color: [f32; 4],
        /// File under `textures/`.
        #[serde(default)]
        texture: Option<String>,
    },
    Emissive {
        #[serde(default = "white")]
        color: [f32; 4],
    },
    Gouraud {
        #[serde(default = "white")]
        color: [f32; 4],
        #[serde(default)]
        texture: Option<String>,
    },
    Solid {
        #[serde(default = "white")]
        color: [f32; 4],
    },
    Transparent {
        #[serde(default = "white")]
        color: [f32; 4],
        #[serde(default)]
        texture: Option<String>,
    },
}

fn white() -> [f32; 4] {
    [1.0; 4]
}

impl Default for MaterialDescription {
    fn default() -> Self {
        MaterialDescription::Default {
            color: white(),
            texture: None,
        }
    }
}

impl SceneDescription {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => RenderError::AssetNotFound {
                path: path.to_path_buf(),
            },
            _ => RenderError::AssetRead {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut desc: Self =
            serde_json::from_str(text).map_err(|e| RenderError::Config(e.to_string()))?;
        desc.engine = desc.engine.sanitized();
        Ok(desc)
    }

    /// Loads every referenced mesh and texture and builds the scene.
    ///
    /// Meshes and textures shared by several actors are loaded once. On any
    /// failure, everything loaded so far is released before the error returns.
    pub fn instantiate(
        &self,
        gpu: &mut dyn GpuApi,
        assets: &Assets,
        shaders: &ShaderRegistry,
    ) -> Result<Scene> {
        let mut scene = Scene::new(&self.name);
        scene.camera = self.camera;
        for light in &self.lights {
            scene.add_light(*light);
        }

        match self.populate(gpu, assets, shaders, &mut scene) {
            Ok(()) => {
                log::info!(
                    "scene `{}`: {} actor(s), {} light(s)",
                    self.name,
                    scene.actors().len(),
                    scene.lights().len()
                );
                Ok(scene)
            }
            Err(e) => {
                log::error!("scene `{}` failed to load: {e}", self.name);
                scene.release(gpu);
                Err(e)
            }
        }
    }

    fn populate(
        &self,
        gpu: &mut dyn GpuApi,
        assets: &Assets,
        shaders: &ShaderRegistry,
        scene: &mut Scene,
    ) -> Result<()> {
        // Every mesh vertex stage declares the same inputs; any program resolves them.
        let program = shaders.program(ShaderKind::MeshDefault)?;

        for desc in &self.actors {
            let mesh = match scene.find_mesh(&desc.mesh) {
                Some(handle) => handle,
                None => scene.add_mesh(Mesh::load(gpu, assets, &desc.mesh, program)?),
            };

            let material = match &desc.material {
                MaterialDescription::Default { color, texture } => Material::Default {
                    color: Vec4::from_array(*color),
                    texture: load_texture(gpu, assets, scene, texture.as_deref())?,
                },
                MaterialDescription::Emissive { color } => Material::Emissive {
                    color: Vec4::from_array(*color),
                },
                MaterialDescription::Gouraud { color, texture } => Material::Gouraud {
                    color: Vec4::from_array(*color),
                    texture: load_texture(gpu, assets, scene, texture.as_deref())?,
                },
                MaterialDescription::Solid { color } => Material::Solid {
                    color: Vec4::from_array(*color),
                },
                MaterialDescription::Transparent { color, texture } => Material::Transparent {
                    color: Vec4::from_array(*color),
                    texture: load_texture(gpu, assets, scene, texture.as_deref())?,
                },
            };

            scene.add_actor(
                Actor::new(&desc.name, mesh)
                    .with_transform(desc.transform)
                    .with_material(material),
            );
        }

        check_gpu(gpu, "scene load")
    }
}

/// Loads `name` once per scene.
fn load_texture(
    gpu: &mut dyn GpuApi,
    assets: &Assets,
    scene: &mut Scene,
    name: Option<&str>,
) -> Result<Option<TextureHandle>> {
    let Some(name) = name else { return Ok(None) };
    if let Some(handle) = scene.find_texture(name) {
        return Ok(Some(handle));
    }
    Ok(Some(scene.add_texture(Texture::load(gpu, assets, name)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_description_uses_defaults() {
        let desc = SceneDescription::from_json(
            r#"{ "actors": [{ "name": "a", "mesh": "cube.obj" }] }"#,
        )
        .unwrap();
        assert_eq!(desc.name, "main");
        assert_eq!(desc.engine, EngineConfig::default());
        assert_eq!(desc.actors[0].material, MaterialDescription::default());
        assert_eq!(desc.actors[0].transform, Transform::default());
    }

    #[test]
    fn material_kind_is_tagged() {
        let desc = SceneDescription::from_json(
            r#"{
                "engine": { "pixel_size": 2 },
                "actors": [
                    { "name": "lamp", "mesh": "m.obj", "material": { "kind": "emissive", "color": [1, 0, 0, 1] } },
                    { "name": "wall", "mesh": "m.obj", "material": { "kind": "solid" } },
                    { "name": "pane", "mesh": "m.obj", "material": { "kind": "transparent", "color": [1, 1, 1, 0.5] } },
                    { "name": "rock", "mesh": "m.obj", "material": { "kind": "gouraud", "texture": "rock.png" } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(desc.engine.pixel_size, 2);
        assert_eq!(
            desc.actors[0].material,
            MaterialDescription::Emissive {
                color: [1.0, 0.0, 0.0, 1.0]
            }
        );
        assert_eq!(desc.actors[1].material, MaterialDescription::Solid { color: white() });
        assert_eq!(
            desc.actors[2].material,
            MaterialDescription::Transparent {
                color: [1.0, 1.0, 1.0, 0.5],
                texture: None
            }
        );
        assert_eq!(
            desc.actors[3].material,
            MaterialDescription::Gouraud {
                color: white(),
                texture: Some("rock.png".to_string())
            }
        );
    }

    #[test]
    fn unknown_material_kind_is_rejected() {
        let err = SceneDescription::from_json(
            r#"{ "actors": [{ "name": "a", "mesh": "m.obj", "material": { "kind": "glass" } }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }
}
