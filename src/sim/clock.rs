//! Simulation clock with hit-stop
//!
//! One `tick` per display frame. While the freeze counter is positive the
//! mutation phase is skipped; rendering still runs.

use crate::consts::BG_TIMER_STEP;

/// What the driver should do this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run sampling, simulation and effects
    Run,
    /// Hit-stop: motion sampling and rendering only
    Frozen,
}

#[derive(Debug, Clone, Default)]
pub struct SimClock {
    freeze: u32,
    bg_timer: f32,
    elapsed_ms: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one display frame of `frame_ms` milliseconds
    pub fn tick(&mut self, frame_ms: f64) -> Step {
        self.elapsed_ms += frame_ms.max(0.0);
        if self.freeze > 0 {
            self.freeze -= 1;
            return Step::Frozen;
        }
        self.bg_timer += BG_TIMER_STEP;
        Step::Run
    }

    /// Request a hit-stop. A shorter request never cuts a longer one short.
    pub fn freeze_for(&mut self, ticks: u32) {
        self.freeze = self.freeze.max(ticks);
    }

    pub fn frozen_ticks(&self) -> u32 {
        self.freeze
    }

    /// Decorative animation timer, advanced only on unfrozen ticks
    pub fn bg_timer(&self) -> f32 {
        self.bg_timer
    }

    /// Wall-clock run time in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}
