//! Point storage
//!
//! Structure-of-arrays buffers, one entry per point. Ship points occupy
//! `0..ship_point_count`; a fixed pool of `MAX_EPHEMERAL_PARTICLES` slots
//! for debris, sparkles and air bubbles follows them and is recycled.

use std::ops::Range;

use glam::Vec2;

use super::materials::StructuralMaterial;
use super::types::{ElementIndex, FixedSizeVec, PlaneId};
use super::world::OceanSurface;
use crate::params::GameParameters;
use crate::render::EphemeralParticleVertex;

/// Rise speed of air bubbles, m/s
const AIR_BUBBLE_RISE_SPEED: f32 = 3.0;
const AIR_BUBBLE_MAX_LIFETIME: f32 = 60.0;
const DEBRIS_WATER_DRAG: f32 = 0.5;
/// Decay per second per unit of contained water
const WATER_DECAY_RATE: f32 = 0.0001;

/// A spring as seen from one of its endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectedSpring {
    pub spring_index: ElementIndex,
    pub other_endpoint_index: ElementIndex,
    /// This point is the spring's endpoint A
    pub is_endpoint_a: bool,
}

pub type ConnectedSprings = FixedSizeVec<ConnectedSpring, { GameParameters::MAX_SPRINGS_PER_POINT }>;
pub type ConnectedTriangles = FixedSizeVec<ElementIndex, { GameParameters::MAX_TRIANGLES_PER_POINT }>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum EphemeralKind {
    #[default]
    None = 0,
    Debris = 1,
    Sparkle = 2,
    AirBubble = 3,
}

/// Per-slot state of the ephemeral pool
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralState {
    pub kind: EphemeralKind,
    pub start_time: f32,
    pub max_lifetime: f32,
    /// Air bubbles only
    pub vortex_amplitude: f32,
    pub vortex_period: f32,
    pub base_x: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Points {
    ship_point_count: usize,

    // Mechanics
    pub(crate) position: Vec<Vec2>,
    pub(crate) velocity: Vec<Vec2>,
    /// Forces that stay constant across the sub-steps of one frame
    pub(crate) static_force: Vec<Vec2>,
    pub(crate) material_mass: Vec<f32>,
    /// Material mass plus contained water
    pub(crate) mass: Vec<f32>,
    pub(crate) buoyancy_volume_fill: Vec<f32>,

    // Water
    pub(crate) water: Vec<f32>,
    pub(crate) cumulated_intaken_water: Vec<f32>,
    pub(crate) is_hull: Vec<bool>,
    pub(crate) is_leaking: Vec<bool>,

    // Heat
    pub(crate) temperature: Vec<f32>,
    pub(crate) heat_capacity: Vec<f32>,
    pub(crate) thermal_conductivity: Vec<f32>,

    pub(crate) decay: Vec<f32>,
    pub(crate) plane_id: Vec<PlaneId>,

    // Connectivity
    pub(crate) connected_springs: Vec<ConnectedSprings>,
    pub(crate) connected_triangles: Vec<ConnectedTriangles>,

    // Ephemeral pool, indexed from ship_point_count
    pub(crate) ephemeral: Vec<EphemeralState>,
    free_ephemeral_search_start: usize,
}

impl Points {
    pub fn with_capacity(ship_point_count: usize) -> Self {
        let total = ship_point_count + GameParameters::MAX_EPHEMERAL_PARTICLES;
        Self {
            position: Vec::with_capacity(total),
            velocity: Vec::with_capacity(total),
            static_force: Vec::with_capacity(total),
            material_mass: Vec::with_capacity(total),
            mass: Vec::with_capacity(total),
            buoyancy_volume_fill: Vec::with_capacity(total),
            water: Vec::with_capacity(total),
            cumulated_intaken_water: Vec::with_capacity(total),
            is_hull: Vec::with_capacity(total),
            is_leaking: Vec::with_capacity(total),
            temperature: Vec::with_capacity(total),
            heat_capacity: Vec::with_capacity(total),
            thermal_conductivity: Vec::with_capacity(total),
            decay: Vec::with_capacity(total),
            plane_id: Vec::with_capacity(total),
            connected_springs: Vec::with_capacity(total),
            connected_triangles: Vec::with_capacity(total),
            ..Default::default()
        }
    }

    fn push(&mut self, position: Vec2, material: &StructuralMaterial, plane_id: PlaneId) -> ElementIndex {
        let index = self.position.len() as ElementIndex;
        self.position.push(position);
        self.velocity.push(Vec2::ZERO);
        self.static_force.push(Vec2::ZERO);
        self.material_mass.push(material.mass);
        self.mass.push(material.mass);
        self.buoyancy_volume_fill.push(material.buoyancy_volume_fill);
        self.water.push(0.0);
        self.cumulated_intaken_water.push(0.0);
        self.is_hull.push(material.is_hull);
        self.is_leaking.push(!material.is_hull);
        self.temperature.push(GameParameters::INITIAL_TEMPERATURE);
        self.heat_capacity.push(material.heat_capacity());
        self.thermal_conductivity.push(material.thermal_conductivity);
        self.decay.push(1.0);
        self.plane_id.push(plane_id);
        self.connected_springs.push(ConnectedSprings::default());
        self.connected_triangles.push(ConnectedTriangles::default());
        index
    }

    /// Append a ship point; only valid before `seal`
    pub fn add(&mut self, position: Vec2, material: &StructuralMaterial, plane_id: PlaneId) -> ElementIndex {
        debug_assert!(self.ephemeral.is_empty(), "points already sealed");
        self.push(position, material, plane_id)
    }

    /// Freeze the ship point count and append the ephemeral pool
    pub fn seal(&mut self) {
        self.ship_point_count = self.position.len();
        let debris = StructuralMaterial::steel();
        for _ in 0..GameParameters::MAX_EPHEMERAL_PARTICLES {
            self.push(Vec2::ZERO, &debris, 0);
        }
        self.ephemeral = vec![EphemeralState::default(); GameParameters::MAX_EPHEMERAL_PARTICLES];
        self.free_ephemeral_search_start = 0;
    }

    pub fn ship_point_count(&self) -> usize {
        self.ship_point_count
    }

    /// Total buffer length, ephemeral slots included
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn ship_points(&self) -> Range<usize> {
        0..self.ship_point_count
    }

    pub fn is_ephemeral(&self, p: ElementIndex) -> bool {
        p as usize >= self.ship_point_count
    }

    pub fn position(&self, p: ElementIndex) -> Vec2 {
        self.position[p as usize]
    }

    pub fn set_position(&mut self, p: ElementIndex, position: Vec2) {
        self.position[p as usize] = position;
    }

    pub fn velocity(&self, p: ElementIndex) -> Vec2 {
        self.velocity[p as usize]
    }

    pub fn mass(&self, p: ElementIndex) -> f32 {
        self.mass[p as usize]
    }

    pub fn water(&self, p: ElementIndex) -> f32 {
        self.water[p as usize]
    }

    pub fn temperature(&self, p: ElementIndex) -> f32 {
        self.temperature[p as usize]
    }

    pub fn set_temperature(&mut self, p: ElementIndex, temperature: f32) {
        self.temperature[p as usize] = temperature;
    }

    pub fn decay(&self, p: ElementIndex) -> f32 {
        self.decay[p as usize]
    }

    pub fn is_leaking(&self, p: ElementIndex) -> bool {
        self.is_leaking[p as usize]
    }

    pub fn set_leaking(&mut self, p: ElementIndex) {
        self.is_leaking[p as usize] = true;
    }

    pub fn plane_id(&self, p: ElementIndex) -> PlaneId {
        self.plane_id[p as usize]
    }

    pub fn connected_springs(&self, p: ElementIndex) -> &ConnectedSprings {
        &self.connected_springs[p as usize]
    }

    pub fn connected_triangles(&self, p: ElementIndex) -> &ConnectedTriangles {
        &self.connected_triangles[p as usize]
    }

    pub(crate) fn connect_spring(&mut self, p: ElementIndex, spring: ConnectedSpring) -> bool {
        self.connected_springs[p as usize].push(spring)
    }

    pub(crate) fn disconnect_spring(&mut self, p: ElementIndex, spring_index: ElementIndex) {
        let removed = self.connected_springs[p as usize].remove_first(|c| c.spring_index == spring_index);
        debug_assert!(removed, "spring {spring_index} not connected to point {p}");
    }

    pub(crate) fn connect_triangle(&mut self, p: ElementIndex, triangle_index: ElementIndex) -> bool {
        self.connected_triangles[p as usize].push(triangle_index)
    }

    pub(crate) fn disconnect_triangle(&mut self, p: ElementIndex, triangle_index: ElementIndex) {
        self.connected_triangles[p as usize].remove_first(|&t| t == triangle_index);
    }

    /// Material mass plus the mass of contained water
    pub fn update_masses(&mut self, params: &GameParameters) {
        let water_mass = GameParameters::WATER_MASS * params.water_density_adjustment;
        for p in self.ship_points() {
            self.mass[p] =
                self.material_mass[p] + self.water[p].min(1.0) * water_mass * self.buoyancy_volume_fill[p];
        }
    }

    /// Corrosion: wet points slowly lose structural integrity
    pub fn update_decay(&mut self, dt: f32) {
        for p in self.ship_points() {
            if self.water[p] > 0.0 {
                self.decay[p] = (self.decay[p] - self.water[p].min(1.0) * WATER_DECAY_RATE * dt).max(0.0);
            }
        }
    }

    /// Nearest ship point within `radius`
    pub fn nearest_point_at(&self, position: Vec2, radius: f32) -> Option<ElementIndex> {
        let radius_sq = radius * radius;
        self.ship_points()
            .map(|p| (p, self.position[p].distance_squared(position)))
            .filter(|&(_, d)| d <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p as ElementIndex)
    }

    // === Ephemeral particles ===

    /// Claim a free ephemeral slot, evicting the oldest particle when the
    /// pool is full; returns the point index
    fn allocate_ephemeral(&mut self) -> ElementIndex {
        let n = self.ephemeral.len();
        debug_assert!(n > 0, "points not sealed");
        for k in 0..n {
            let i = (self.free_ephemeral_search_start + k) % n;
            if self.ephemeral[i].kind == EphemeralKind::None {
                self.free_ephemeral_search_start = (i + 1) % n;
                return (self.ship_point_count + i) as ElementIndex;
            }
        }

        let oldest = self
            .ephemeral
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.start_time.total_cmp(&b.1.start_time))
            .map(|(i, _)| i)
            .unwrap_or(0);
        log::trace!("Ephemeral pool full, evicting slot {oldest}");
        self.free_ephemeral_search_start = (oldest + 1) % n;
        (self.ship_point_count + oldest) as ElementIndex
    }

    fn spawn_ephemeral(
        &mut self,
        kind: EphemeralKind,
        position: Vec2,
        velocity: Vec2,
        plane_id: PlaneId,
        current_time: f32,
        max_lifetime: f32,
    ) -> ElementIndex {
        let p = self.allocate_ephemeral();
        let i = p as usize;
        self.position[i] = position;
        self.velocity[i] = velocity;
        self.plane_id[i] = plane_id;
        self.water[i] = 0.0;
        self.ephemeral[i - self.ship_point_count] = EphemeralState {
            kind,
            start_time: current_time,
            max_lifetime,
            base_x: position.x,
            ..Default::default()
        };
        p
    }

    pub fn create_ephemeral_debris(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        plane_id: PlaneId,
        current_time: f32,
        max_lifetime: f32,
    ) -> ElementIndex {
        self.spawn_ephemeral(EphemeralKind::Debris, position, velocity, plane_id, current_time, max_lifetime)
    }

    pub fn create_ephemeral_sparkle(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        plane_id: PlaneId,
        current_time: f32,
        max_lifetime: f32,
    ) -> ElementIndex {
        self.spawn_ephemeral(EphemeralKind::Sparkle, position, velocity, plane_id, current_time, max_lifetime)
    }

    pub fn create_ephemeral_air_bubble(
        &mut self,
        position: Vec2,
        vortex_amplitude: f32,
        vortex_period: f32,
        plane_id: PlaneId,
        current_time: f32,
    ) -> ElementIndex {
        let p = self.spawn_ephemeral(
            EphemeralKind::AirBubble,
            position,
            Vec2::new(0.0, AIR_BUBBLE_RISE_SPEED),
            plane_id,
            current_time,
            AIR_BUBBLE_MAX_LIFETIME,
        );
        let state = &mut self.ephemeral[p as usize - self.ship_point_count];
        state.vortex_amplitude = vortex_amplitude;
        state.vortex_period = vortex_period;
        p
    }

    pub fn ephemeral_kind(&self, p: ElementIndex) -> EphemeralKind {
        self.ephemeral[p as usize - self.ship_point_count].kind
    }

    /// Number of live ephemeral particles
    pub fn active_ephemeral_count(&self) -> usize {
        self.ephemeral.iter().filter(|e| e.kind != EphemeralKind::None).count()
    }

    /// Move and expire ephemeral particles; returns the number of air
    /// bubbles that reached the surface
    pub fn update_ephemeral_particles(&mut self, current_time: f32, dt: f32, ocean: &OceanSurface) -> u32 {
        let mut surfaced = 0;
        for i in 0..self.ephemeral.len() {
            let state = self.ephemeral[i];
            if state.kind == EphemeralKind::None {
                continue;
            }
            let p = self.ship_point_count + i;
            let elapsed = current_time - state.start_time;
            if elapsed >= state.max_lifetime {
                self.ephemeral[i].kind = EphemeralKind::None;
                continue;
            }

            match state.kind {
                EphemeralKind::Debris => {
                    self.velocity[p] += GameParameters::GRAVITY * dt;
                    if ocean.is_underwater(self.position[p]) {
                        self.velocity[p] *= 1.0 - DEBRIS_WATER_DRAG * dt;
                    }
                    self.position[p] += self.velocity[p] * dt;
                }
                EphemeralKind::Sparkle => {
                    if ocean.is_underwater(self.position[p]) {
                        // Quenched
                        self.ephemeral[i].kind = EphemeralKind::None;
                        continue;
                    }
                    self.velocity[p] += GameParameters::GRAVITY * dt;
                    self.position[p] += self.velocity[p] * dt;
                }
                EphemeralKind::AirBubble => {
                    let phase = std::f32::consts::TAU * elapsed / state.vortex_period;
                    self.position[p].y += AIR_BUBBLE_RISE_SPEED * dt;
                    self.position[p].x = state.base_x + state.vortex_amplitude * phase.sin();
                    if !ocean.is_underwater(self.position[p]) {
                        self.ephemeral[i].kind = EphemeralKind::None;
                        surfaced += 1;
                    }
                }
                EphemeralKind::None => {}
            }
        }
        surfaced
    }

    /// Render vertices of live ephemeral particles
    pub fn ephemeral_vertices(&self, current_time: f32) -> Vec<EphemeralParticleVertex> {
        self.ephemeral
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind != EphemeralKind::None)
            .map(|(i, e)| {
                let p = self.ship_point_count + i;
                EphemeralParticleVertex {
                    position: self.position[p].to_array(),
                    kind: e.kind as u32,
                    progress: ((current_time - e.start_time) / e.max_lifetime).clamp(0.0, 1.0),
                    plane_id: self.plane_id[p] as f32,
                }
            })
            .collect()
    }
}
