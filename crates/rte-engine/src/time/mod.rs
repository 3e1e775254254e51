//! Frame timing for the render loop: one [`FrameClock`] per window, ticked
//! once per presented frame.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
