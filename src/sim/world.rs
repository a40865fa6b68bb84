//! World: ships, ocean, fishes and clouds

use glam::Vec2;

use super::clouds::{Clouds, wind_speed_magnitude};
use super::fishes::{FishSpeciesDatabase, Fishes};
use super::ship::{Ship, ShipDefinition};
use super::types::{GadgetId, GadgetType, ShipId, VisibleWorld};
use crate::consts::SIMULATION_STEP_TIME_DURATION;
use crate::error::Result;
use crate::events::GameEventDispatcher;
use crate::params::{GameParameters, StormParameters};
use crate::random::GameRandom;
use crate::render::RenderContext;

/// Flat sea surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OceanSurface {
    pub sea_level: f32,
}

impl OceanSurface {
    #[inline]
    pub fn is_underwater(&self, position: Vec2) -> bool {
        position.y < self.sea_level
    }

    /// Meters below the surface; zero above it
    #[inline]
    pub fn depth(&self, position: Vec2) -> f32 {
        (self.sea_level - position.y).max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct World {
    ships: Vec<Ship>,
    fishes: Fishes,
    clouds: Clouds,
    ocean: OceanSurface,
    /// 0.0: normal ambience, 1.0: fully silenced
    silence: f32,
}

impl World {
    pub fn new(fish_species: FishSpeciesDatabase, are_cloud_shadows_enabled: bool) -> Self {
        Self {
            ships: Vec::new(),
            fishes: Fishes::new(fish_species),
            clouds: Clouds::new(are_cloud_shadows_enabled),
            ocean: OceanSurface::default(),
            silence: 0.0,
        }
    }

    pub fn add_ship(&mut self, definition: &ShipDefinition) -> Result<ShipId> {
        let id = self.ships.len() as ShipId;
        self.ships.push(Ship::new(id, definition)?);
        Ok(id)
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id as usize)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(id as usize)
    }

    pub fn fishes(&self) -> &Fishes {
        &self.fishes
    }

    pub fn clouds(&self) -> &Clouds {
        &self.clouds
    }

    pub fn clouds_mut(&mut self) -> &mut Clouds {
        &mut self.clouds
    }

    pub fn ocean(&self) -> &OceanSurface {
        &self.ocean
    }

    pub fn is_underwater(&self, position: Vec2) -> bool {
        self.ocean.is_underwater(position)
    }

    pub fn silence(&self) -> f32 {
        self.silence
    }

    pub fn set_silence(&mut self, amount: f32) {
        self.silence = amount.clamp(0.0, 1.0);
    }

    /// Advance one simulation step: ships, then fishes and clouds
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        current_simulation_time: f32,
        params: &GameParameters,
        storm: &StormParameters,
        visible_world: &VisibleWorld,
        events: &mut GameEventDispatcher,
        rng: &mut GameRandom,
    ) {
        for ship in &mut self.ships {
            ship.update(current_simulation_time, params, &self.ocean, events, rng);
        }
        self.fishes.update(current_simulation_time, params, visible_world, rng);
        self.clouds.update(wind_speed_magnitude(params, storm), storm, params, rng);
    }

    pub fn upload(&self, render: &mut dyn RenderContext) {
        for ship in &self.ships {
            ship.upload(render);
        }
        self.fishes.upload(render);
        self.clouds.upload(render);
    }

    // === Interactions ===

    /// Place a gadget on the first ship with a free spring near `position`
    pub fn place_gadget(
        &mut self,
        gadget_type: GadgetType,
        position: Vec2,
        params: &GameParameters,
        events: &mut GameEventDispatcher,
    ) -> Option<GadgetId> {
        let ocean = self.ocean;
        self.ships
            .iter_mut()
            .find_map(|ship| ship.place_gadget(gadget_type, position, params, &ocean, events))
    }

    pub fn toggle_gadget_at(
        &mut self,
        gadget_type: GadgetType,
        position: Vec2,
        params: &GameParameters,
        events: &mut GameEventDispatcher,
    ) -> Option<GadgetId> {
        let ocean = self.ocean;
        let ship = self.ships.iter_mut().find(|ship| {
            ship.gadgets().iter().any(|g| g.position().distance(position) <= 2.0)
                || ship.points().nearest_point_at(position, 2.0).is_some()
        })?;
        ship.toggle_gadget_at(gadget_type, position, params, &ocean, events)
    }

    pub fn detonate_rc_bombs(&mut self) -> usize {
        self.ships.iter_mut().map(Ship::detonate_rc_bombs).sum()
    }

    pub fn detonate_anti_matter_bombs(&mut self) -> usize {
        self.ships.iter_mut().map(Ship::detonate_anti_matter_bombs).sum()
    }

    /// One simulation step of heat blaster at `position`
    pub fn apply_heat_blaster_at(&mut self, position: Vec2, radius: f32, heat_flow: f32) -> usize {
        self.ships
            .iter_mut()
            .map(|ship| ship.apply_heat_blaster_at(position, radius, heat_flow, SIMULATION_STEP_TIME_DURATION))
            .sum()
    }

    pub fn destroy_at(
        &mut self,
        position: Vec2,
        radius: f32,
        params: &GameParameters,
        events: &mut GameEventDispatcher,
        rng: &mut GameRandom,
    ) -> usize {
        let ocean = self.ocean;
        self.ships
            .iter_mut()
            .map(|ship| ship.destroy_at(position, radius, params, &ocean, events, rng))
            .sum()
    }

    pub fn apply_thanos_snap(&mut self, center_x: f32, left_x: f32, right_x: f32) -> usize {
        self.ships
            .iter_mut()
            .map(|ship| ship.apply_thanos_snap(center_x, left_x, right_x))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderBuffers;
    use crate::sim::materials::StructuralMaterial;

    fn world_with_raft() -> World {
        let mut world = World::new(FishSpeciesDatabase::built_in(), true);
        let def = ShipDefinition::rectangle(Vec2::new(-4.0, -1.0), 8, 3, StructuralMaterial::wood());
        world.add_ship(&def).unwrap();
        world
    }

    #[test]
    fn test_ocean_surface() {
        let ocean = OceanSurface::default();
        assert!(ocean.is_underwater(Vec2::new(0.0, -0.1)));
        assert!(!ocean.is_underwater(Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn test_silence_is_clamped() {
        let mut world = world_with_raft();
        world.set_silence(3.0);
        assert_eq!(world.silence(), 1.0);
        world.set_silence(0.0);
        assert_eq!(world.silence(), 0.0);
    }

    #[test]
    fn test_update_and_upload() {
        let mut world = world_with_raft();
        let params = GameParameters {
            number_of_fishes: 6,
            number_of_clouds: 4,
            ..Default::default()
        };
        let mut events = GameEventDispatcher::new();
        let mut rng = GameRandom::new(12);
        for frame in 0..10 {
            world.update(
                frame as f32 * SIMULATION_STEP_TIME_DURATION,
                &params,
                &StormParameters::default(),
                &VisibleWorld::default(),
                &mut events,
                &mut rng,
            );
        }
        let mut buffers = RenderBuffers::new();
        world.upload(&mut buffers);
        let snapshot = buffers.take_snapshot();
        assert_eq!(snapshot.total_points(), 24);
        assert_eq!(snapshot.fishes.len(), 6);
        assert_eq!(snapshot.clouds.len(), 4);
    }

    #[test]
    fn test_interactions_route_to_ships() {
        let mut world = world_with_raft();
        let params = GameParameters::default();
        let mut events = GameEventDispatcher::new();

        assert!(world.place_gadget(GadgetType::RcBomb, Vec2::new(0.5, 0.0), &params, &mut events).is_some());
        assert!(world.place_gadget(GadgetType::RcBomb, Vec2::new(500.0, 0.0), &params, &mut events).is_none());
        assert_eq!(world.detonate_rc_bombs(), 1);
        assert_eq!(world.detonate_anti_matter_bombs(), 0);

        assert!(world.apply_heat_blaster_at(Vec2::ZERO, 2.0, 1000.0) > 0);
        assert!(world.destroy_at(Vec2::new(-4.0, -1.0), 0.5, &params, &mut events, &mut GameRandom::new(1)) > 0);
        assert_eq!(world.apply_thanos_snap(0.0, 100.0, 101.0), 0);
    }
}
