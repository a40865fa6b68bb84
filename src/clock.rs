//! Wall clock abstraction
//!
//! Orchestration state machines pace themselves on wall-clock time so their
//! speed is independent of simulation speed. The controller samples the clock
//! once per frame and hands `now` down.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub trait WallClock {
    /// Seconds since the clock's epoch
    fn now_as_float(&self) -> f32;
}

/// Real time since construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl WallClock for SystemClock {
    fn now_as_float(&self) -> f32 {
        self.epoch.elapsed().as_secs_f32()
    }
}

/// Manually driven clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f32>>,
}

impl ManualClock {
    pub fn new(now: f32) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn set(&self, now: f32) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: f32) {
        self.now.set(self.now.get() + seconds);
    }
}

impl WallClock for ManualClock {
    fn now_as_float(&self) -> f32 {
        self.now.get()
    }
}

/// Fraction of `duration` elapsed between `start` and `now`
///
/// Not clamped: callers compare against 1.0 to detect completion.
#[inline]
pub fn progress(now: f32, start: f32, duration: f32) -> f32 {
    (now - start) / duration
}
