//! RTE engine crate.
//!
//! Mesh ingestion (OBJ parsing, vertex deduplication, interleaved packing),
//! GPU resource wrappers with explicit release, shader programs with named
//! attribute and uniform resolution, and a post-process pass that renders the
//! scene at a reduced resolution. Everything GPU-facing goes through
//! [`gpu::GpuApi`], so the whole pipeline also runs headless.

pub mod assets;
pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod error;
pub mod gpu;
pub mod logging;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod shader;
pub mod time;
pub mod window;

pub use error::{RenderError, Result};
