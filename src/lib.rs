//! Ship Sandbox - mass-spring ship destruction and buoyancy simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (points, springs, solver, gadgets, fishes, clouds)
//! - `controller`: Frame orchestration and wall-clock state machines
//! - `render`: Render upload boundary and GPU-ready instance types
//! - `notification`: HUD overlay state produced each frame
//! - `params`: Tunable physical constants

pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod notification;
pub mod params;
pub mod random;
pub mod render;
pub mod sim;

pub use controller::GameController;
pub use error::{Result, SandboxError};
pub use events::{GameEvent, GameEventDispatcher};
pub use params::{GameParameters, StormParameters};
pub use random::GameRandom;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz)
    pub const SIMULATION_STEP_TIME_DURATION: f32 = 0.02;
    /// Maximum simulation steps per rendered frame to prevent spiral of death
    pub const MAX_STEPS_PER_FRAME: u32 = 4;

    /// Half-width of the simulated world (meters)
    pub const HALF_MAX_WORLD_WIDTH: f32 = 2500.0;
    /// Half-height of the simulated world (meters)
    pub const HALF_MAX_WORLD_HEIGHT: f32 = 20000.0;
}

/// Cubic Hermite smoothstep of `x` between `edge0` and `edge1`
#[inline]
pub fn smooth_step(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Inverse of `smooth_step(0.0, 1.0, t)` for `y` in [0, 1]
///
/// Closed form of the cubic's inverse on the monotonic branch.
#[inline]
pub fn inverse_smooth_step(y: f32) -> f32 {
    let y = y.clamp(0.0, 1.0);
    0.5 - ((1.0 - 2.0 * y).asin() / 3.0).sin()
}

/// Clockwise angle of a vector from the +X axis, in (-π, π]
#[inline]
pub fn angle_cw(v: glam::Vec2) -> f32 {
    -v.y.atan2(v.x)
}

/// A periodic function sampled once into a lookup table
#[derive(Debug, Clone)]
pub struct PrecalculatedFunction {
    samples: Vec<f32>,
}

impl PrecalculatedFunction {
    /// Number of samples per period
    pub const SAMPLES: usize = 512;

    /// Sample `f` over one period [0, 2π)
    pub fn new(f: impl Fn(f32) -> f32) -> Self {
        let samples = (0..Self::SAMPLES)
            .map(|i| f(i as f32 / Self::SAMPLES as f32 * std::f32::consts::TAU))
            .collect();
        Self { samples }
    }

    /// Low-frequency sine: one oscillation every 2π of phase
    pub fn lo_freq_sin() -> Self {
        Self::new(f32::sin)
    }

    /// Value at the nearest sample, wrapping `x` into the period
    #[inline]
    pub fn nearest_periodic(&self, x: f32) -> f32 {
        let fraction = (x / std::f32::consts::TAU).rem_euclid(1.0);
        let index = (fraction * Self::SAMPLES as f32).round() as usize % Self::SAMPLES;
        self.samples[index]
    }
}
