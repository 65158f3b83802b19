use crate::foundation::core::Fps;

/// Converts wall-clock deltas into whole playback ticks.
///
/// Fractional progress toward the next tick is carried between calls, so irregular refresh
/// intervals never drop or duplicate ticks over time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackClock {
    fps: Fps,
    carry_ms: f64,
}

impl PlaybackClock {
    /// Clock at `fps` with no partial tick.
    pub fn new(fps: Fps) -> Self {
        Self { fps, carry_ms: 0.0 }
    }

    /// Current rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Change rate without losing the partial tick already accumulated.
    pub fn set_fps(&mut self, fps: Fps) {
        self.fps = fps;
    }

    /// Milliseconds accumulated toward the next tick.
    pub fn carry_ms(&self) -> f64 {
        self.carry_ms
    }

    /// Drop the partial tick.
    pub fn reset(&mut self) {
        self.carry_ms = 0.0;
    }

    /// Feed `elapsed_ms` of wall time; returns how many whole ticks it completes.
    ///
    /// Negative or non-finite deltas are ignored.
    pub fn elapse(&mut self, elapsed_ms: f64) -> u64 {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return 0;
        }
        let tick_ms = self.fps.tick_ms();
        let total = self.carry_ms + elapsed_ms;
        let ticks = (total / tick_ms).floor();
        self.carry_ms = total - ticks * tick_ms;
        if self.carry_ms < 0.0 {
            self.carry_ms = 0.0;
        }
        ticks as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clock.rs"]
mod tests;
