//! Thanos snap: a destructive wave expanding left and right from a center X
//!
//! Any number of snaps (up to `MAX_THANOS_SNAPS`) run at once. The world is
//! silenced while at least one is active.

use crate::consts::{HALF_MAX_WORLD_WIDTH, SIMULATION_STEP_TIME_DURATION};
use crate::events::{GameEvent, GameEventDispatcher};
use crate::params::GameParameters;
use crate::sim::World;

/// m/s
pub const ADVANCING_WAVE_SPEED: f32 = 25.0;
/// Distance the wave front covers in one simulation step
pub const SLICE_WIDTH: f32 = ADVANCING_WAVE_SPEED * SIMULATION_STEP_TIME_DURATION;
/// Each front snaps the half of the step nearest its outer edge
const HALF_SLICE_WIDTH: f32 = SLICE_WIDTH / 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThanosSnap {
    pub center_x: f32,
    pub start_simulation_time: f32,
}

impl ThanosSnap {
    pub fn radius_at(&self, current_simulation_time: f32) -> f32 {
        (current_simulation_time - self.start_simulation_time) * ADVANCING_WAVE_SPEED
    }

    /// Left and right slices, each as `(left_x, right_x)`
    fn front_slices(&self, current_simulation_time: f32) -> [(f32, f32); 2] {
        let radius = self.radius_at(current_simulation_time);
        let left_outer_x = self.center_x - radius;
        let right_outer_x = self.center_x + radius;
        [
            (left_outer_x, left_outer_x + HALF_SLICE_WIDTH),
            (right_outer_x - HALF_SLICE_WIDTH, right_outer_x),
        ]
    }

    /// Snap the slices behind both wave fronts; returns false once both
    /// fronts have left the world
    fn update(&self, current_simulation_time: f32, world: &mut World) -> bool {
        let [(left_outer_x, left_inner_x), (right_inner_x, right_outer_x)] = self.front_slices(current_simulation_time);
        let mut has_applied_wave = false;

        if left_inner_x > -HALF_MAX_WORLD_WIDTH {
            world.apply_thanos_snap(self.center_x, left_outer_x, left_inner_x);
            has_applied_wave = true;
        }

        if right_inner_x < HALF_MAX_WORLD_WIDTH {
            world.apply_thanos_snap(self.center_x, right_inner_x, right_outer_x);
            has_applied_wave = true;
        }

        has_applied_wave
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThanosSnaps {
    snaps: Vec<ThanosSnap>,
}

impl ThanosSnaps {
    pub fn len(&self) -> usize {
        self.snaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snaps.is_empty()
    }

    pub fn snaps(&self) -> &[ThanosSnap] {
        &self.snaps
    }

    pub fn start(&mut self, center_x: f32, current_simulation_time: f32, world: &mut World, events: &mut GameEventDispatcher) {
        if self.snaps.is_empty() {
            events.on_silence_started();
            world.set_silence(1.0);
        } else if self.snaps.len() == GameParameters::MAX_THANOS_SNAPS {
            // Make room for the latest arrival
            self.snaps.remove(0);
        }

        log::info!("Thanos snap at x={center_x:.1}");
        events.dispatch(GameEvent::ThanosSnap {
            center: glam::Vec2::new(center_x, 0.0),
        });
        self.snaps.push(ThanosSnap {
            center_x,
            start_simulation_time: current_simulation_time,
        });
    }

    pub fn update(&mut self, current_simulation_time: f32, world: &mut World, events: &mut GameEventDispatcher) {
        if self.snaps.is_empty() {
            return;
        }
        self.snaps.retain(|snap| snap.update(current_simulation_time, world));
        if self.snaps.is_empty() {
            log::debug!("Last Thanos snap over, lifting silence");
            world.set_silence(0.0);
            events.on_silence_lifted();
        }
    }

    /// Drop all snaps without lifting silence events; used on world reset
    pub fn clear(&mut self) {
        self.snaps.clear();
    }
}
