//! Tsunami notification: screen tremor plus a warning line
//!
//! RumblingFadeIn (1s) -> Rumbling1 (4.5s, warning at the end) -> Rumbling2
//! (0.5s) -> RumblingFadeOut (2s). The tremor is a horizontal pixel offset;
//! whoever ends the state machine must call `finish` to release it.

use std::time::Duration;

use crate::clock::progress;
use crate::notification::NotificationLayer;
use crate::render::RenderContext;

const TREMOR_AMPLITUDE: f32 = 5.0;
const TREMOR_ANGULAR_VELOCITY: f32 = std::f32::consts::TAU * 6.0;
pub const WARNING_TEXT: &str = "TSUNAMI WARNING!";
const WARNING_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsunamiPhase {
    RumblingFadeIn,
    Rumbling1,
    Rumbling2,
    RumblingFadeOut,
}

impl TsunamiPhase {
    fn duration(self) -> f32 {
        match self {
            TsunamiPhase::RumblingFadeIn => 1.0,
            TsunamiPhase::Rumbling1 => 4.5,
            TsunamiPhase::Rumbling2 => 0.5,
            TsunamiPhase::RumblingFadeOut => 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TsunamiNotification {
    phase: TsunamiPhase,
    phase_start_time: f32,
}

impl TsunamiNotification {
    pub fn start(now: f32) -> Self {
        log::info!("Tsunami notification started");
        Self {
            phase: TsunamiPhase::RumblingFadeIn,
            phase_start_time: now,
        }
    }

    pub fn phase(&self) -> TsunamiPhase {
        self.phase
    }

    /// Returns false once the sequence is over
    pub fn update(&mut self, now: f32, render: &mut dyn RenderContext, notifications: &mut NotificationLayer) -> bool {
        let p = progress(now, self.phase_start_time, self.phase.duration());
        let tremor = TREMOR_AMPLITUDE * (TREMOR_ANGULAR_VELOCITY * now).sin();

        let amplitude = match self.phase {
            TsunamiPhase::RumblingFadeIn => p.min(1.0),
            TsunamiPhase::Rumbling1 | TsunamiPhase::Rumbling2 => 1.0,
            TsunamiPhase::RumblingFadeOut => (1.0 - p).max(0.0),
        };
        render.set_pixel_offset(amplitude * tremor, 0.0);

        if p < 1.0 {
            return true;
        }

        let next = match self.phase {
            TsunamiPhase::RumblingFadeIn => TsunamiPhase::Rumbling1,
            TsunamiPhase::Rumbling1 => {
                notifications.add_ephemeral_text_line(WARNING_TEXT, WARNING_LIFETIME);
                TsunamiPhase::Rumbling2
            }
            TsunamiPhase::Rumbling2 => TsunamiPhase::RumblingFadeOut,
            TsunamiPhase::RumblingFadeOut => return false,
        };
        log::debug!("Tsunami notification: {:?} -> {next:?}", self.phase);
        self.phase = next;
        self.phase_start_time = now;
        true
    }

    /// Release the screen tremor
    pub fn finish(self, render: &mut dyn RenderContext) {
        log::debug!("Tsunami notification finished in {:?}", self.phase);
        render.reset_pixel_offset();
    }
}
