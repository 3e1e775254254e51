//! Mesh ingestion: face-vertex deduplication, vertex packing, OBJ reading and
//! upload.

mod data;
mod face;
mod indexer;
#[allow(clippy::module_inception)]
mod mesh;
pub mod obj;
mod packer;

pub use data::MeshData;
pub use face::{FaceVertexRef, RawGeometryArrays};
pub use indexer::{IndexedRefs, deduplicate};
pub use mesh::Mesh;
pub use packer::{Vertex, pack};
