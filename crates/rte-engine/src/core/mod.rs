//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! applications such as the scene viewer, so the window and device stay
//! internal to the runtime.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
