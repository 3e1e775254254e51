use std::time::{Duration, Instant};

/// Timing of one rendered frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Clamped seconds since the previous tick.
    pub dt: f32,

    /// Seconds since the clock started, sum of clamped deltas.
    pub elapsed: f32,

    pub frame_index: u64,
}

/// Produces [`FrameTime`] snapshots for the render loop.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// produce a huge step in scene animation.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: f32,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: 0.0,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts delta measurement, e.g. after the window was restored.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        self.advance(now.saturating_duration_since(self.last), now)
    }

    fn advance(&mut self, raw: Duration, now: Instant) -> FrameTime {
        let dt = raw.clamp(self.dt_min, self.dt_max).as_secs_f32();
        self.last = now;
        self.elapsed += dt;

        let ft = FrameTime {
            dt,
            elapsed: self.elapsed,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_stall_is_clamped() {
        let mut clock = FrameClock::new();
        let ft = clock.advance(Duration::from_secs(5), Instant::now());
        assert_eq!(ft.dt, 0.25);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn elapsed_accumulates_clamped_steps() {
        let mut clock = FrameClock::with_clamps(Duration::ZERO, Duration::from_millis(100));
        let now = Instant::now();
        clock.advance(Duration::from_millis(50), now);
        let ft = clock.advance(Duration::from_secs(1), now);
        assert!((ft.elapsed - 0.15).abs() < 1e-6);
        assert_eq!(ft.frame_index, 1);
    }
}
