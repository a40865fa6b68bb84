//! Day/night cycle driving the renderer's ambient light
//!
//! The cycle keeps no copy of the light intensity: each step inverts the
//! smoothstep daylight curve from the renderer's current value, advances the
//! implied time of day, and writes the result back. External changes to the
//! ambient light are picked up on the next step.

use crate::clock::progress;
use crate::render::RenderContext;
use crate::{inverse_smooth_step, smooth_step};

/// Only every n-th call does any work
const SKIP_COUNT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLightPhase {
    SunRising,
    SunSetting,
}

#[derive(Debug, Clone)]
pub struct DayLightCycle {
    phase: DayLightPhase,
    last_change_time: f32,
    skip_counter: u32,
}

impl DayLightCycle {
    pub fn new(now: f32) -> Self {
        Self {
            phase: DayLightPhase::SunSetting,
            last_change_time: now,
            skip_counter: 0,
        }
    }

    pub fn phase(&self) -> DayLightPhase {
        self.phase
    }

    pub fn update(&mut self, now: f32, cycle_duration_seconds: f32, render: &mut dyn RenderContext) {
        self.skip_counter += 1;
        if self.skip_counter < SKIP_COUNT {
            return;
        }
        self.skip_counter = 0;

        let mut time_of_day = inverse_smooth_step(render.ambient_light_intensity());
        // A full cycle is a rise plus a set
        let elapsed_fraction = progress(now, self.last_change_time, cycle_duration_seconds) * 2.0;

        match self.phase {
            DayLightPhase::SunRising => {
                time_of_day += elapsed_fraction;
                if time_of_day >= 1.0 {
                    time_of_day = 1.0;
                    self.phase = DayLightPhase::SunSetting;
                }
            }
            DayLightPhase::SunSetting => {
                time_of_day -= elapsed_fraction;
                if time_of_day <= 0.0 {
                    time_of_day = 0.0;
                    self.phase = DayLightPhase::SunRising;
                }
            }
        }

        render.set_ambient_light_intensity(smooth_step(0.0, 1.0, time_of_day));
        self.last_change_time = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderBuffers;

    #[test]
    fn test_runs_every_fourth_call() {
        let mut render = RenderBuffers::new();
        let mut cycle = DayLightCycle::new(0.0);
        for i in 1..SKIP_COUNT {
            cycle.update(i as f32, 100.0, &mut render);
            assert_eq!(render.ambient_light_intensity(), 1.0);
        }
        cycle.update(4.0, 100.0, &mut render);
        assert!(render.ambient_light_intensity() < 1.0);
    }

    #[test]
    fn test_rederives_from_external_intensity() {
        let duration = 100.0;
        let mut render = RenderBuffers::new();
        let mut cycle = DayLightCycle::new(0.0);
        for _ in 0..SKIP_COUNT {
            cycle.update(1.0, duration, &mut render);
        }

        // Someone else dims the light
        render.set_ambient_light_intensity(0.5);
        for _ in 0..SKIP_COUNT {
            cycle.update(2.0, duration, &mut render);
        }
        let expected = smooth_step(0.0, 1.0, inverse_smooth_step(0.5) - 2.0 / duration);
        assert!((render.ambient_light_intensity() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_turns_around_at_night() {
        let mut render = RenderBuffers::new();
        render.set_ambient_light_intensity(0.01);
        let mut cycle = DayLightCycle::new(0.0);
        for _ in 0..SKIP_COUNT {
            cycle.update(50.0, 100.0, &mut render);
        }
        assert_eq!(cycle.phase(), DayLightPhase::SunRising);
        assert_eq!(render.ambient_light_intensity(), 0.0);
    }
}
