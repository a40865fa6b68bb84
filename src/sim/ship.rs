//! Ship: one destructible point/spring/triangle structure
//!
//! Per-frame pipeline (`Ship::update`):
//! 1. augmented masses (material + water)
//! 2. static forces: gravity, buoyancy, water drag, blast fronts
//! 3. spring relaxation sub-steps
//! 4. water intake, diffusion, air bubbles
//! 5. heat: blast heat, conduction, dissipation
//! 6. strain check and spring breaking
//! 7. gadgets
//! 8. ephemeral particles

use glam::Vec2;

use super::explosions::Explosions;
use super::gadgets::{GadgetUpdateContext, Gadgets};
use super::materials::StructuralMaterial;
use super::points::Points;
use super::solver::SpringRelaxationSolver;
use super::springs::Springs;
use super::triangles::Triangles;
use super::types::{ElementIndex, GadgetId, GadgetType, PlaneId, ShipId};
use super::world::OceanSurface;
use crate::consts::{HALF_MAX_WORLD_HEIGHT, HALF_MAX_WORLD_WIDTH, SIMULATION_STEP_TIME_DURATION};
use crate::error::{Result, SandboxError};
use crate::events::{GameEvent, GameEventDispatcher};
use crate::params::GameParameters;
use crate::random::GameRandom;
use crate::render::{PointAttributes, RenderContext};

/// Water volume a leaking point takes in per second
const WATER_INTAKE_RATE: f32 = 1.0;
/// Water volume a leaking point above the surface drains per second
const WATER_OUTFLOW_RATE: f32 = 0.5;
/// Extra water a flooded point holds per meter of depth
const WATER_PRESSURE_PER_METER: f32 = 0.1;
const WATER_DIFFUSION_RATE: f32 = 0.5;
/// Gadgets attach to the nearest spring within this distance
const GADGET_SEARCH_RADIUS: f32 = 2.0;
/// Velocity given to points peeled off by a Thanos snap
const THANOS_SNAP_KICK: Vec2 = Vec2::new(2.0, 6.0);

#[derive(Debug, Clone, PartialEq)]
pub struct PointDefinition {
    pub position: Vec2,
    /// Index into `ShipDefinition::materials`
    pub material: usize,
    pub plane_id: PlaneId,
}

/// In-memory ship description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipDefinition {
    pub materials: Vec<StructuralMaterial>,
    pub points: Vec<PointDefinition>,
    pub springs: Vec<(ElementIndex, ElementIndex)>,
    pub triangles: Vec<[ElementIndex; 3]>,
}

impl ShipDefinition {
    /// Rectangular lattice with 1m spacing: horizontal, vertical and both
    /// diagonal springs, two triangles per cell
    pub fn rectangle(origin: Vec2, columns: usize, rows: usize, material: StructuralMaterial) -> Self {
        let idx = |x: usize, y: usize| (y * columns + x) as ElementIndex;
        let mut def = ShipDefinition {
            materials: vec![material],
            ..Default::default()
        };
        for y in 0..rows {
            for x in 0..columns {
                def.points.push(PointDefinition {
                    position: origin + Vec2::new(x as f32, y as f32),
                    material: 0,
                    plane_id: 0,
                });
            }
        }
        for y in 0..rows {
            for x in 0..columns {
                if x + 1 < columns {
                    def.springs.push((idx(x, y), idx(x + 1, y)));
                }
                if y + 1 < rows {
                    def.springs.push((idx(x, y), idx(x, y + 1)));
                }
                if x + 1 < columns && y + 1 < rows {
                    def.springs.push((idx(x, y), idx(x + 1, y + 1)));
                    def.springs.push((idx(x + 1, y), idx(x, y + 1)));
                    def.triangles.push([idx(x, y), idx(x + 1, y), idx(x + 1, y + 1)]);
                    def.triangles.push([idx(x, y), idx(x + 1, y + 1), idx(x, y + 1)]);
                }
            }
        }
        def
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SandboxError::InvalidShipDefinition(msg));
        if self.points.is_empty() {
            return invalid("ship has no points".into());
        }
        let n = self.points.len() as ElementIndex;
        if let Some(p) = self.points.iter().find(|p| p.material >= self.materials.len()) {
            return invalid(format!("unknown material {}", p.material));
        }

        let mut degree = vec![0usize; self.points.len()];
        for &(a, b) in &self.springs {
            if a >= n || b >= n {
                return invalid(format!("spring ({a}, {b}) references a missing point"));
            }
            if a == b {
                return invalid(format!("spring ({a}, {b}) connects a point to itself"));
            }
            for p in [a, b] {
                degree[p as usize] += 1;
                if degree[p as usize] > GameParameters::MAX_SPRINGS_PER_POINT {
                    return invalid(format!("point {p} has more than {} springs", GameParameters::MAX_SPRINGS_PER_POINT));
                }
            }
        }

        let mut triangle_degree = vec![0usize; self.points.len()];
        for t in &self.triangles {
            if t.iter().any(|&p| p >= n) {
                return invalid(format!("triangle {t:?} references a missing point"));
            }
            for &p in t {
                triangle_degree[p as usize] += 1;
                if triangle_degree[p as usize] > GameParameters::MAX_TRIANGLES_PER_POINT {
                    return invalid(format!("point {p} has too many triangles"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Ship {
    id: ShipId,
    points: Points,
    springs: Springs,
    triangles: Triangles,
    gadgets: Gadgets,
    explosions: Explosions,
    solver: SpringRelaxationSolver,
    /// Jacobi scratch for water and heat exchange along springs
    exchange_buffer: Vec<f32>,
    current_simulation_time: f32,
}

impl Ship {
    pub fn new(id: ShipId, definition: &ShipDefinition) -> Result<Self> {
        definition.validate()?;

        let mut points = Points::with_capacity(definition.points.len());
        for p in &definition.points {
            points.add(p.position, &definition.materials[p.material], p.plane_id);
        }
        points.seal();

        let mut springs = Springs::with_capacity(definition.springs.len());
        for &(a, b) in &definition.springs {
            let material_a = &definition.materials[definition.points[a as usize].material];
            let material_b = &definition.materials[definition.points[b as usize].material];
            let material = if material_b.is_rope { material_b } else { material_a };
            springs.add(a, b, material, &mut points);
        }

        let mut triangles = Triangles::with_capacity(definition.triangles.len());
        for &[a, b, c] in &definition.triangles {
            triangles.add(a, b, c, &mut points);
        }

        log::info!(
            "Created ship {id}: {} points, {} springs, {} triangles",
            points.ship_point_count(),
            springs.len(),
            triangles.len()
        );

        Ok(Self {
            id,
            exchange_buffer: vec![0.0; points.ship_point_count()],
            points,
            springs,
            triangles,
            gadgets: Gadgets::new(id),
            explosions: Explosions::default(),
            solver: SpringRelaxationSolver::new(),
            current_simulation_time: 0.0,
        })
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn points(&self) -> &Points {
        &self.points
    }

    pub fn springs(&self) -> &Springs {
        &self.springs
    }

    pub fn triangles(&self) -> &Triangles {
        &self.triangles
    }

    pub fn gadgets(&self) -> &Gadgets {
        &self.gadgets
    }

    pub fn explosions(&self) -> &Explosions {
        &self.explosions
    }

    /// Mean position of ship points
    pub fn center_of_mass(&self) -> Vec2 {
        let n = self.points.ship_point_count();
        self.points.position[..n].iter().copied().sum::<Vec2>() / n as f32
    }

    /// Advance one simulation step
    pub fn update(
        &mut self,
        current_simulation_time: f32,
        params: &GameParameters,
        ocean: &OceanSurface,
        events: &mut GameEventDispatcher,
        rng: &mut GameRandom,
    ) {
        self.current_simulation_time = current_simulation_time;
        let dt = SIMULATION_STEP_TIME_DURATION;

        // Mechanics
        self.points.update_masses(params);
        self.apply_static_forces(params, ocean);
        self.explosions.apply_forces(&mut self.points);
        self.detach_blast_cores(params, ocean, events, rng);
        self.springs
            .update_coefficients(&self.points, params, params.mechanical_simulation_step_time_duration());
        self.solver.run(&mut self.points, &self.springs, params);
        self.clamp_to_world_bounds();

        // Water
        self.update_water_intake(params, ocean, events, rng);
        self.diffuse_water(dt, params);
        self.points.update_decay(dt);

        // Heat
        self.explosions.apply_heat(&mut self.points, dt);
        self.explosions.update();
        self.conduct_heat(dt, params);
        self.dissipate_heat(dt, params, ocean);

        // Strain
        self.check_strain(params, ocean, events, rng);
        self.triangles.destroy_collapsed(&mut self.points);

        // Gadgets read this frame's temperatures
        let mut ctx = GadgetUpdateContext {
            current_simulation_time,
            params,
            points: &self.points,
            springs: &self.springs,
            ocean,
            handler: &mut self.explosions,
            events,
        };
        self.gadgets.update(&mut ctx);

        let surfaced = self.points.update_ephemeral_particles(current_simulation_time, dt, ocean);
        if surfaced > 0 {
            events.dispatch(GameEvent::AirBubbleSurfaced { count: surfaced });
        }
    }

    fn apply_static_forces(&mut self, params: &GameParameters, ocean: &OceanSurface) {
        let buoyancy = GameParameters::WATER_MASS * params.water_density_adjustment * GameParameters::GRAVITY_MAGNITUDE;
        let drag = (GameParameters::WATER_DRAG_LINEAR_COEFFICIENT * params.water_drag_adjustment)
            .min(0.5 / SIMULATION_STEP_TIME_DURATION);
        for p in self.points.ship_points() {
            let mass = self.points.mass[p];
            let mut force = GameParameters::GRAVITY * mass;
            if ocean.is_underwater(self.points.position[p]) {
                let displaced = self.points.buoyancy_volume_fill[p] * (1.0 - self.points.water[p].min(1.0));
                force.y += buoyancy * displaced;
                force -= self.points.velocity[p] * (mass * drag);
            }
            self.points.static_force[p] = force;
        }
    }

    fn clamp_to_world_bounds(&mut self) {
        let min = Vec2::new(-HALF_MAX_WORLD_WIDTH, -HALF_MAX_WORLD_HEIGHT);
        let max = Vec2::new(HALF_MAX_WORLD_WIDTH, HALF_MAX_WORLD_HEIGHT);
        for p in self.points.ship_points() {
            self.points.position[p] = self.points.position[p].clamp(min, max);
        }
    }

    fn update_water_intake(
        &mut self,
        params: &GameParameters,
        ocean: &OceanSurface,
        events: &mut GameEventDispatcher,
        rng: &mut GameRandom,
    ) {
        let dt = SIMULATION_STEP_TIME_DURATION;
        let mut total_taken = 0.0;
        for p in self.points.ship_points() {
            if !self.points.is_leaking[p] {
                continue;
            }
            let position = self.points.position[p];
            if ocean.is_underwater(position) {
                let equilibrium = 1.0 + ocean.depth(position) * WATER_PRESSURE_PER_METER;
                let intake = (WATER_INTAKE_RATE * params.water_intake_adjustment * dt)
                    .min((equilibrium - self.points.water[p]).max(0.0));
                self.points.water[p] += intake;
                self.points.cumulated_intaken_water[p] += intake;
                total_taken += intake;

                if self.points.cumulated_intaken_water[p] > params.cumulated_intaken_water_threshold_for_air_bubbles {
                    self.points.cumulated_intaken_water[p] = 0.0;
                    if params.do_generate_air_bubbles {
                        let amplitude = rng.uniform(
                            GameParameters::MIN_AIR_BUBBLES_VORTEX_AMPLITUDE,
                            GameParameters::MAX_AIR_BUBBLES_VORTEX_AMPLITUDE,
                        );
                        let period = rng.uniform(
                            GameParameters::MIN_AIR_BUBBLES_VORTEX_PERIOD,
                            GameParameters::MAX_AIR_BUBBLES_VORTEX_PERIOD,
                        );
                        let plane_id = self.points.plane_id[p];
                        self.points.create_ephemeral_air_bubble(
                            position,
                            amplitude,
                            period,
                            plane_id,
                            self.current_simulation_time,
                        );
                    }
                }
            } else if self.points.water[p] > 0.0 {
                self.points.water[p] = (self.points.water[p] - WATER_OUTFLOW_RATE * dt).max(0.0);
            }
        }
        if total_taken > 0.0 {
            events.on_water_taken(total_taken);
        }
    }

    /// Water spreads along springs between leaking points
    fn diffuse_water(&mut self, dt: f32, params: &GameParameters) {
        let rate = WATER_DIFFUSION_RATE * params.water_diffusion_speed_adjustment * dt;
        let delta = &mut self.exchange_buffer;
        delta.iter_mut().for_each(|d| *d = 0.0);
        for s in 0..self.springs.len() {
            if self.springs.is_deleted[s] {
                continue;
            }
            let a = self.springs.endpoint_a[s] as usize;
            let b = self.springs.endpoint_b[s] as usize;
            if !self.points.is_leaking[a] || !self.points.is_leaking[b] {
                continue;
            }
            let flow = (self.points.water[a] - self.points.water[b]) * rate;
            delta[a] -= flow;
            delta[b] += flow;
        }
        for (water, d) in self.points.water.iter_mut().zip(delta.iter()) {
            *water = (*water + d).max(0.0);
        }
    }

    fn conduct_heat(&mut self, dt: f32, params: &GameParameters) {
        let delta = &mut self.exchange_buffer;
        delta.iter_mut().for_each(|d| *d = 0.0);
        for s in 0..self.springs.len() {
            if self.springs.is_deleted[s] {
                continue;
            }
            let a = self.springs.endpoint_a[s] as usize;
            let b = self.springs.endpoint_b[s] as usize;
            let conductivity = (self.points.thermal_conductivity[a] + self.points.thermal_conductivity[b]) / 2.0
                * params.thermal_conductivity_adjustment;
            let joules = (self.points.temperature[a] - self.points.temperature[b]) * conductivity * dt
                / self.springs.rest_length[s].max(f32::EPSILON);
            delta[a] -= joules / self.points.heat_capacity[a];
            delta[b] += joules / self.points.heat_capacity[b];
        }
        for (temperature, d) in self.points.temperature.iter_mut().zip(delta.iter()) {
            *temperature += d;
        }
    }

    fn dissipate_heat(&mut self, dt: f32, params: &GameParameters, ocean: &OceanSurface) {
        for p in self.points.ship_points() {
            let (ambient, coefficient) = if ocean.is_underwater(self.points.position[p]) {
                (params.water_temperature, GameParameters::WATER_CONVECTIVE_HEAT_TRANSFER_COEFFICIENT)
            } else {
                (params.air_temperature, GameParameters::AIR_CONVECTIVE_HEAT_TRANSFER_COEFFICIENT)
            };
            let factor = (coefficient * params.heat_dissipation_adjustment * dt / self.points.heat_capacity[p]).min(1.0);
            self.points.temperature[p] += (ambient - self.points.temperature[p]) * factor;
        }
    }

    fn check_strain(
        &mut self,
        params: &GameParameters,
        ocean: &OceanSurface,
        events: &mut GameEventDispatcher,
        rng: &mut GameRandom,
    ) {
        let mut broken = Vec::new();
        for s in 0..self.springs.len() as ElementIndex {
            if self.springs.is_deleted(s) {
                continue;
            }
            let i = s as usize;
            let length = self
                .points
                .position(self.springs.endpoint_a[i])
                .distance(self.points.position(self.springs.endpoint_b[i]));
            let rest = self.springs.rest_length[i];
            let strain = if rest > 0.0 { (length - rest).abs() / rest } else { 0.0 };
            let threshold = self.springs.break_strain(s, &self.points, params);
            self.springs.stress[i] = if threshold > 0.0 { strain / threshold } else { f32::INFINITY };
            if strain > threshold {
                broken.push(s);
            }
        }

        if broken.is_empty() {
            return;
        }
        log::debug!("Ship {}: {} springs broke", self.id, broken.len());

        let mut counts = [0u32; 2];
        for s in broken {
            let midpoint = self.springs.midpoint(s, &self.points);
            let is_underwater = ocean.is_underwater(midpoint);
            counts[is_underwater as usize] += 1;
            self.sever_spring(s);
            self.emit_break_particles(s, midpoint, is_underwater, params, rng);
            self.gadgets
                .on_neighborhood_disturbed(midpoint, GameParameters::BOMB_NEIGHBORHOOD_RADIUS);
        }
        events.on_break(false, counts[0]);
        events.on_break(true, counts[1]);
    }

    /// Sever a spring and everything that depends on it
    fn sever_spring(&mut self, s: ElementIndex) {
        let a = self.springs.endpoint_a(s);
        let b = self.springs.endpoint_b(s);
        self.gadgets.on_spring_destroyed(s);
        self.triangles.destroy_with_edge(a, b, &mut self.points);
        self.springs.destroy(s, &mut self.points);
        self.points.set_leaking(a);
        self.points.set_leaking(b);
    }

    fn emit_break_particles(
        &mut self,
        s: ElementIndex,
        position: Vec2,
        is_underwater: bool,
        params: &GameParameters,
        rng: &mut GameRandom,
    ) {
        let plane_id = self.points.plane_id(self.springs.endpoint_a(s));
        let t = self.current_simulation_time;

        if params.do_generate_debris {
            let count = rng.uniform_int(
                GameParameters::MIN_DEBRIS_PARTICLES_PER_EVENT,
                GameParameters::MAX_DEBRIS_PARTICLES_PER_EVENT,
            );
            for _ in 0..count {
                let velocity = random_direction(rng)
                    * rng.uniform(
                        GameParameters::MIN_DEBRIS_PARTICLES_VELOCITY,
                        GameParameters::MAX_DEBRIS_PARTICLES_VELOCITY,
                    );
                let lifetime = rng.uniform(
                    GameParameters::MIN_DEBRIS_PARTICLES_LIFETIME,
                    GameParameters::MAX_DEBRIS_PARTICLES_LIFETIME,
                );
                self.points.create_ephemeral_debris(position, velocity, plane_id, t, lifetime);
            }
        }

        if params.do_generate_sparkles && !is_underwater && !self.springs.is_rope(s) {
            let count = rng.uniform_int(
                GameParameters::MIN_SPARKLE_PARTICLES_PER_EVENT,
                GameParameters::MAX_SPARKLE_PARTICLES_PER_EVENT,
            );
            for _ in 0..count {
                let velocity = random_direction(rng)
                    * rng.uniform(
                        GameParameters::MIN_SPARKLE_PARTICLES_VELOCITY,
                        GameParameters::MAX_SPARKLE_PARTICLES_VELOCITY,
                    );
                let lifetime = rng.uniform(
                    GameParameters::MIN_SPARKLE_PARTICLES_LIFETIME,
                    GameParameters::MAX_SPARKLE_PARTICLES_LIFETIME,
                );
                self.points.create_ephemeral_sparkle(position, velocity, plane_id, t, lifetime);
            }
        }
    }

    // === Interactions ===

    /// Nearest live spring whose midpoint is within `radius`
    fn nearest_spring_at(&self, position: Vec2, radius: f32) -> Option<ElementIndex> {
        let radius_sq = radius * radius;
        (0..self.springs.len() as ElementIndex)
            .filter(|&s| !self.springs.is_deleted(s))
            .map(|s| (s, self.springs.midpoint(s, &self.points).distance_squared(position)))
            .filter(|&(_, d)| d <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s)
    }

    /// Attach a gadget to the nearest free spring
    pub fn place_gadget(
        &mut self,
        gadget_type: GadgetType,
        position: Vec2,
        params: &GameParameters,
        ocean: &OceanSurface,
        events: &mut GameEventDispatcher,
    ) -> Option<GadgetId> {
        let s = self.nearest_spring_at(position, GADGET_SEARCH_RADIUS)?;
        if self.gadgets.gadget_at_spring(s).is_some() {
            return None;
        }
        Some(
            self.gadgets
                .place(gadget_type, s, &self.points, &self.springs, params, ocean, events),
        )
    }

    /// Remove the idle gadget nearest to `position`, or place a new one
    /// when there is none; returns the placed gadget
    pub fn toggle_gadget_at(
        &mut self,
        gadget_type: GadgetType,
        position: Vec2,
        params: &GameParameters,
        ocean: &OceanSurface,
        events: &mut GameEventDispatcher,
    ) -> Option<GadgetId> {
        let radius_sq = GADGET_SEARCH_RADIUS * GADGET_SEARCH_RADIUS;
        let nearest = self
            .gadgets
            .iter()
            .map(|g| (g.id(), g.position().distance_squared(position)))
            .filter(|&(_, d)| d <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);

        match nearest {
            Some(id) => {
                self.gadgets.remove(id, ocean, events);
                None
            }
            None => self.place_gadget(gadget_type, position, params, ocean, events),
        }
    }

    pub fn detonate_rc_bombs(&mut self) -> usize {
        self.gadgets.detonate_rc_bombs()
    }

    pub fn detonate_anti_matter_bombs(&mut self) -> usize {
        self.gadgets.detonate_anti_matter_bombs()
    }

    /// Heat (or, with a negative flow, cool) points within `radius`
    ///
    /// `heat_flow` is in KJoules/sec and falls off linearly from the center.
    pub fn apply_heat_blaster_at(&mut self, position: Vec2, radius: f32, heat_flow: f32, dt: f32) -> usize {
        let mut affected = 0;
        for p in self.points.ship_points() {
            let distance = self.points.position[p].distance(position);
            if distance >= radius {
                continue;
            }
            let joules = heat_flow * 1000.0 * dt * (1.0 - distance / radius);
            let temperature = &mut self.points.temperature[p];
            *temperature = (*temperature + joules / self.points.heat_capacity[p]).max(0.0);
            affected += 1;
        }
        affected
    }

    /// Sever every spring of the points within `radius`; returns the
    /// number of points hit
    pub fn destroy_at(
        &mut self,
        position: Vec2,
        radius: f32,
        params: &GameParameters,
        ocean: &OceanSurface,
        events: &mut GameEventDispatcher,
        rng: &mut GameRandom,
    ) -> usize {
        let destroyed = self.detach_points_within(position, radius, params, ocean, rng);
        if destroyed > 0 {
            log::debug!("Ship {}: destroyed {destroyed} points", self.id);
            events.dispatch(GameEvent::Destroy {
                is_underwater: ocean.is_underwater(position),
                count: destroyed as u32,
            });
        }
        destroyed
    }

    /// Explosions in their first frame blow a hole of their blast radius
    fn detach_blast_cores(
        &mut self,
        params: &GameParameters,
        ocean: &OceanSurface,
        events: &mut GameEventDispatcher,
        rng: &mut GameRandom,
    ) {
        let cores: Vec<(Vec2, f32)> = self
            .explosions
            .active()
            .iter()
            .filter(|e| e.step == 0)
            .map(|e| (e.blast.center, e.blast.blast_radius))
            .collect();
        for (center, radius) in cores {
            let detached = self.detach_points_within(center, radius, params, ocean, rng);
            events.on_break(ocean.is_underwater(center), detached as u32);
        }
    }

    fn detach_points_within(
        &mut self,
        position: Vec2,
        radius: f32,
        params: &GameParameters,
        ocean: &OceanSurface,
        rng: &mut GameRandom,
    ) -> usize {
        let radius_sq = radius * radius;
        let hit: Vec<ElementIndex> = self
            .points
            .ship_points()
            .filter(|&p| self.points.position[p].distance_squared(position) < radius_sq)
            .map(|p| p as ElementIndex)
            .collect();

        let mut detached = 0;
        for p in hit {
            let connected: Vec<ElementIndex> = self.points.connected_springs(p).iter().map(|c| c.spring_index).collect();
            if connected.is_empty() {
                continue;
            }
            detached += 1;
            let point_position = self.points.position(p);
            let is_underwater = ocean.is_underwater(point_position);
            for s in connected {
                self.sever_spring(s);
                self.emit_break_particles(s, point_position, is_underwater, params, rng);
                self.gadgets
                    .on_neighborhood_disturbed(point_position, GameParameters::BOMB_NEIGHBORHOOD_RADIUS);
            }
        }
        detached
    }

    /// Peel off the points within the slice `[left_x, right_x]` of a Thanos
    /// wave centered at `center_x`; returns the number of points snapped
    pub fn apply_thanos_snap(&mut self, center_x: f32, left_x: f32, right_x: f32) -> usize {
        let mut snapped = 0;
        for p in self.points.ship_points() {
            let x = self.points.position[p].x;
            if x < left_x || x > right_x || self.points.connected_springs[p].is_empty() {
                continue;
            }
            let connected: Vec<ElementIndex> =
                self.points.connected_springs[p].iter().map(|c| c.spring_index).collect();
            for s in connected {
                self.sever_spring(s);
            }
            let side = if x < center_x { -1.0 } else { 1.0 };
            self.points.velocity[p] += Vec2::new(THANOS_SNAP_KICK.x * side, THANOS_SNAP_KICK.y);
            snapped += 1;
        }
        if snapped > 0 {
            log::trace!("Ship {}: Thanos snap [{left_x:.1}, {right_x:.1}] peeled {snapped} points", self.id);
        }
        snapped
    }

    /// Push render data; does not mutate the ship
    pub fn upload(&self, render: &mut dyn RenderContext) {
        let n = self.points.ship_point_count();
        render.upload_ship_start(self.id, n);

        let attributes: Vec<PointAttributes> = (0..n)
            .map(|p| PointAttributes {
                position: self.points.position[p].to_array(),
                water: self.points.water[p],
                temperature: self.points.temperature[p],
                decay: self.points.decay[p],
                plane_id: self.points.plane_id[p] as f32,
            })
            .collect();
        render.upload_points(self.id, &attributes);

        let (springs, ropes, stressed) = self.springs.render_elements();
        render.upload_springs(self.id, &springs);
        render.upload_ropes(self.id, &ropes);
        render.upload_stressed_springs(self.id, &stressed);
        render.upload_triangles(self.id, &self.triangles.render_elements());
        render.upload_ephemeral_particles(self.id, &self.points.ephemeral_vertices(self.current_simulation_time));
        self.gadgets.upload(render);
        self.explosions.upload(self.id, render);

        render.upload_ship_end(self.id);
    }
}

fn random_direction(rng: &mut GameRandom) -> Vec2 {
    Vec2::from_angle(rng.uniform(0.0, std::f32::consts::TAU))
}
