//! Screen-space sizing shared by the renderer and the runtime.

mod viewport;

pub use viewport::Viewport;
