use super::{Material, MeshHandle, Transform};

/// A placed, materialed instance of a scene mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    pub mesh: MeshHandle,
    pub transform: Transform,
    pub material: Material,
}

impl Actor {
    pub fn new(name: impl Into<String>, mesh: MeshHandle) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: Transform::default(),
            material: Material::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }
}
