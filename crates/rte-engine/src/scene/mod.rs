//! Scene graph: actors placing meshes with a transform and a material,
//! a camera, and point lights.
//!
//! A [`Scene`] owns its GPU resources; build one directly or from a JSON
//! [`SceneDescription`].

mod actor;
mod camera;
mod description;
mod graph;
mod light;
mod material;
mod transform;

pub use actor::Actor;
pub use camera::Camera;
pub use description::{ActorDescription, MaterialDescription, SceneDescription};
pub use graph::{MeshHandle, Scene};
pub use light::{MAX_LIGHTS, PointLight, light_uniforms};
pub use material::{Material, TextureHandle};
pub use transform::Transform;
