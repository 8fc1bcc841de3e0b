//! Time management utilities

/// Millisecond tick clock producing per-frame delta times
///
/// Ticks are supplied by the caller ([`FrameClock::advance_to`]), which keeps
/// scripted walkthroughs deterministic.
pub struct FrameClock {
    prev_tick_ms: u64,
    delta_time: f32,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting at tick zero
    pub fn new() -> Self {
        Self {
            prev_tick_ms: 0,
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance to an absolute tick (milliseconds since start)
    ///
    /// Ticks earlier than the previous one yield a zero delta.
    pub fn advance_to(&mut self, tick_ms: u64) -> f32 {
        let elapsed = tick_ms.saturating_sub(self.prev_tick_ms);
        self.prev_tick_ms = self.prev_tick_ms.max(tick_ms);
        self.delta_time = elapsed as f32 / 1000.0;
        self.frame_count += 1;
        self.delta_time
    }

    /// Seconds since tick zero
    pub fn total_time(&self) -> f32 {
        self.prev_tick_ms as f32 / 1000.0
    }

    /// Number of ticks taken so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
