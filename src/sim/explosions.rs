//! Explosions and the physics handler gadgets talk to
//!
//! Gadgets never touch points directly: they call `ShipPhysicsHandler`, which
//! queues the effect. The ship applies queued effects as static forces and
//! heat in the next frame.

use glam::Vec2;

use super::points::Points;
use super::types::{PlaneId, ShipId};
use crate::consts::SIMULATION_STEP_TIME_DURATION;
use crate::render::{ExplosionSprite, RenderContext};

/// Frames an explosion's blast front takes to expand to full radius
pub const EXPLOSION_STEPS: u32 = 10;
/// Blast force reaches this many times the blast radius
const FORCE_RADIUS_FACTOR: f32 = 4.0;
/// Velocity (m/s) imparted per unit of blast strength at the center
const BLAST_VELOCITY_FACTOR: f32 = 0.4;
const IMPLOSION_RADIUS: f32 = 60.0;
/// Acceleration (m/s^2) per unit of implosion strength at full sequence progress
const IMPLOSION_ACCELERATION_FACTOR: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ExplosionType {
    Deflagration = 0,
    AntiMatter = 1,
}

/// What a gadget asks for when it goes off
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    pub center: Vec2,
    pub plane_id: PlaneId,
    pub blast_radius: f32,
    pub blast_strength: f32,
    /// KJoules/sec
    pub blast_heat: f32,
    pub explosion_type: ExplosionType,
}

/// Effects gadgets inject into the ship's physics
pub trait ShipPhysicsHandler {
    fn start_explosion(&mut self, current_simulation_time: f32, blast: Blast);

    /// One step of an anti-matter implosion; `sequence_progress` runs 0..1
    fn do_anti_matter_bomb_implosion(&mut self, center: Vec2, sequence_progress: f32, strength: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    pub blast: Blast,
    pub start_time: f32,
    /// Frames elapsed
    pub step: u32,
}

impl Explosion {
    pub fn progress(&self) -> f32 {
        self.step as f32 / EXPLOSION_STEPS as f32
    }

    fn force_radius_at(&self, step: u32) -> f32 {
        self.blast.blast_radius * FORCE_RADIUS_FACTOR * step as f32 / EXPLOSION_STEPS as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Implosion {
    center: Vec2,
    sequence_progress: f32,
    strength: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Explosions {
    active: Vec<Explosion>,
    pending_implosions: Vec<Implosion>,
}

impl ShipPhysicsHandler for Explosions {
    fn start_explosion(&mut self, current_simulation_time: f32, blast: Blast) {
        log::debug!(
            "Explosion at ({:.1}, {:.1}) radius={:.1} strength={:.1}",
            blast.center.x,
            blast.center.y,
            blast.blast_radius,
            blast.blast_strength
        );
        self.active.push(Explosion {
            blast,
            start_time: current_simulation_time,
            step: 0,
        });
    }

    fn do_anti_matter_bomb_implosion(&mut self, center: Vec2, sequence_progress: f32, strength: f32) {
        self.pending_implosions.push(Implosion {
            center,
            sequence_progress,
            strength,
        });
    }
}

impl Explosions {
    pub fn active(&self) -> &[Explosion] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.pending_implosions.is_empty()
    }

    /// Add blast and implosion forces to the points' static forces
    ///
    /// Each blast front is an expanding ring: a point is pushed once, in the
    /// frame the ring sweeps over it.
    pub fn apply_forces(&mut self, points: &mut Points) {
        let n = points.ship_point_count();
        for explosion in &self.active {
            let inner = explosion.force_radius_at(explosion.step);
            let outer = explosion.force_radius_at(explosion.step + 1);
            let center = explosion.blast.center;
            for p in 0..n {
                let offset = points.position[p] - center;
                let distance = offset.length();
                if distance < inner || distance >= outer {
                    continue;
                }
                let delta_v = explosion.blast.blast_strength * BLAST_VELOCITY_FACTOR / (1.0 + distance);
                let direction = offset.normalize_or_zero();
                points.static_force[p] += direction * (points.mass[p] * delta_v / SIMULATION_STEP_TIME_DURATION);
            }
        }

        for implosion in self.pending_implosions.drain(..) {
            let acceleration =
                implosion.strength * IMPLOSION_ACCELERATION_FACTOR * (0.5 + implosion.sequence_progress);
            for p in 0..n {
                let offset = implosion.center - points.position[p];
                let distance = offset.length();
                if distance >= IMPLOSION_RADIUS {
                    continue;
                }
                let falloff = 1.0 - distance / IMPLOSION_RADIUS;
                points.static_force[p] += offset.normalize_or_zero() * (points.mass[p] * acceleration * falloff);
            }
        }
    }

    /// Inject blast heat into points within the blast radius
    pub fn apply_heat(&self, points: &mut Points, dt: f32) {
        for explosion in &self.active {
            let radius_sq = explosion.blast.blast_radius * explosion.blast.blast_radius;
            let joules = explosion.blast.blast_heat * 1000.0 * dt;
            for p in points.ship_points() {
                if points.position[p].distance_squared(explosion.blast.center) < radius_sq {
                    points.temperature[p] += joules / points.heat_capacity[p];
                }
            }
        }
    }

    /// Advance blast fronts and drop finished explosions
    pub fn update(&mut self) {
        for explosion in &mut self.active {
            explosion.step += 1;
        }
        self.active.retain(|e| e.step < EXPLOSION_STEPS);
    }

    pub fn upload(&self, ship_id: ShipId, render: &mut dyn RenderContext) {
        for explosion in &self.active {
            render.upload_explosion(
                ship_id,
                ExplosionSprite {
                    center: explosion.blast.center.to_array(),
                    plane_id: explosion.blast.plane_id as f32,
                    radius: explosion.blast.blast_radius,
                    progress: explosion.progress(),
                    kind: explosion.blast.explosion_type as u32,
                },
            );
        }
    }
}
