//! Fishes: ambient agents cruising below the sea surface
//!
//! Each fish alternates between Cruising (straight line toward a target X,
//! with a small swim wobble) and Turning (a fixed-length window that
//! decelerates, reorients and accelerates toward a new target).

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::types::VisibleWorld;
use crate::consts::SIMULATION_STEP_TIME_DURATION;
use crate::error::{Result, SandboxError};
use crate::params::GameParameters;
use crate::random::GameRandom;
use crate::render::{FishInstance, RenderContext};

/// Distance in X from the target at which a fish starts turning
pub const TURNING_THRESHOLD: f32 = 7.0;
pub const TURNING_TIME_SECONDS: f32 = 2.5;
const BASAL_SPEED_TO_PROGRESS_PHASE_SPEED_FACTOR: f32 = 40.0 * SIMULATION_STEP_TIME_DURATION;
/// Fishes stay at least this deep
const MIN_DEPTH: f32 = 5.0;
const DEPTH_SPREAD: f32 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishSpecies {
    pub name: String,
    /// Meters per simulation step
    pub basal_speed: f32,
    /// Meters below the surface
    pub basal_depth: f32,
    /// Tail pivot, in texture space
    pub tail_x: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishSpeciesDatabase {
    species: Vec<FishSpecies>,
}

impl FishSpeciesDatabase {
    pub fn new(species: Vec<FishSpecies>) -> Result<Self> {
        if species.is_empty() {
            return Err(SandboxError::EmptySpeciesDatabase);
        }
        Ok(Self { species })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let db: Self = serde_json::from_str(json)?;
        Self::new(db.species)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let db = Self::from_json_str(&json)?;
        log::info!("Loaded {} fish species from {}", db.species.len(), path.display());
        Ok(db)
    }

    /// Species shipped with the sandbox
    pub fn built_in() -> Self {
        let species = |name: &str, basal_speed, basal_depth, tail_x| FishSpecies {
            name: name.to_string(),
            basal_speed,
            basal_depth,
            tail_x,
        };
        Self {
            species: vec![
                species("Clownfish", 0.04, 10.0, 0.72),
                species("Tuna", 0.09, 40.0, 0.8),
                species("Grouper", 0.03, 60.0, 0.75),
                species("Angelfish", 0.05, 20.0, 0.68),
            ],
        }
    }

    pub fn species(&self) -> &[FishSpecies] {
        &self.species
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FishState {
    Cruising,
    Turning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fish {
    species_index: usize,
    /// [0, 1), fixed for the fish's lifetime
    personality_seed: f32,
    state: FishState,
    current_position: Vec2,
    target_position: Vec2,
    /// Meters per simulation step
    current_velocity: Vec2,
    start_velocity: Vec2,
    target_velocity: Vec2,
    current_direction: Vec2,
    start_direction: Vec2,
    target_direction: Vec2,
    current_progress_phase: f32,
    /// Tail-flap amplitude
    current_progress: f32,
    turning_start_time: f32,
}

impl Fish {
    pub fn species_index(&self) -> usize {
        self.species_index
    }

    pub fn personality_seed(&self) -> f32 {
        self.personality_seed
    }

    pub fn state(&self) -> FishState {
        self.state
    }

    pub fn position(&self) -> Vec2 {
        self.current_position
    }

    pub fn target_position(&self) -> Vec2 {
        self.target_position
    }

    pub fn velocity(&self) -> Vec2 {
        self.current_velocity
    }

    pub fn direction(&self) -> Vec2 {
        self.current_direction
    }

    pub fn progress(&self) -> f32 {
        self.current_progress
    }

    fn advance_progress_phase(&mut self, species: &FishSpecies) {
        self.current_progress_phase += species.basal_speed * BASAL_SPEED_TO_PROGRESS_PHASE_SPEED_FACTOR;
    }

    fn update(&mut self, species: &FishSpecies, current_simulation_time: f32, visible_world: &VisibleWorld, rng: &mut GameRandom) {
        match self.state {
            FishState::Cruising => {
                if (self.current_position.x - self.target_position.x).abs() < TURNING_THRESHOLD {
                    self.state = FishState::Turning;
                    self.target_position = choose_target_position(species, visible_world, rng);
                    self.start_velocity = self.current_velocity;
                    self.target_velocity = calculate_velocity(
                        self.current_position,
                        self.target_position,
                        species,
                        self.personality_seed,
                    );
                    self.start_direction = self.current_direction;
                    self.target_direction = self.target_velocity.normalize_or_zero();
                    self.turning_start_time = current_simulation_time;
                } else {
                    let swim = (1.0 + (2.0 * self.current_progress_phase + std::f32::consts::FRAC_PI_2).sin()) / 100.0;
                    self.current_position += self.current_velocity + self.current_velocity.normalize_or_zero() * swim;
                    self.advance_progress_phase(species);
                }
            }

            FishState::Turning => {
                let elapsed = current_simulation_time - self.turning_start_time;
                if elapsed >= TURNING_TIME_SECONDS {
                    self.state = FishState::Cruising;
                    self.current_velocity = self.target_velocity;
                    self.current_direction = self.target_direction;
                } else {
                    //  |      velocity -> 0      |    velocity -> target    |
                    //  | dir.y -> 0 |                         | dir.y -> target |
                    //  |     |          dir.x -> target             |     |
                    let fraction = elapsed / TURNING_TIME_SECONDS;

                    self.current_velocity = if fraction <= 0.5 {
                        self.start_velocity * (1.0 - fraction / 0.5)
                    } else {
                        self.target_velocity * (1.0 / 0.5) * (fraction - 0.5)
                    };

                    if fraction <= 0.3 {
                        self.current_direction.y = self.start_direction.y * (1.0 - fraction / 0.3);
                    } else if fraction >= 0.7 {
                        self.current_direction.y = self.target_direction.y * (1.0 / 0.3) * (fraction - 0.7);
                    }

                    if (0.15..=0.85).contains(&fraction) {
                        self.current_direction.x = self.start_direction.x
                            + (self.target_direction.x - self.start_direction.x) / 0.7 * (fraction - 0.15);
                    }

                    self.current_position += self.current_velocity;
                    self.advance_progress_phase(species);
                }
            }
        }

        self.current_progress = self.current_progress_phase.sin();
    }

    fn to_instance(&self, species: &FishSpecies) -> FishInstance {
        let mut angle_cw = crate::angle_cw(self.current_direction);
        let mut horizontal_scale = self.current_direction.length();
        // Keep the sprite upright; mirror instead
        if angle_cw < -std::f32::consts::FRAC_PI_2 {
            angle_cw += std::f32::consts::PI;
            horizontal_scale = -horizontal_scale;
        } else if angle_cw > std::f32::consts::FRAC_PI_2 {
            angle_cw -= std::f32::consts::PI;
            horizontal_scale = -horizontal_scale;
        }
        FishInstance {
            position: self.current_position.to_array(),
            angle_cw,
            horizontal_scale,
            tail_x: species.tail_x,
            progress: self.current_progress,
            texture_frame: self.species_index as u32,
        }
    }
}

/// Random spot around the visible world's center, biased by the species' depth
fn choose_target_position(species: &FishSpecies, visible_world: &VisibleWorld, rng: &mut GameRandom) -> Vec2 {
    let x = rng.normal(visible_world.center.x, visible_world.width);
    let y = -MIN_DEPTH - rng.normal(species.basal_depth, DEPTH_SPREAD).abs();
    Vec2::new(x, y)
}

fn calculate_velocity(start: Vec2, end: Vec2, species: &FishSpecies, personality_seed: f32) -> Vec2 {
    (end - start).normalize_or_zero() * (species.basal_speed * (0.7 + personality_seed * 0.3))
}

#[derive(Debug, Clone)]
pub struct Fishes {
    database: FishSpeciesDatabase,
    fishes: Vec<Fish>,
}

impl Fishes {
    pub fn new(database: FishSpeciesDatabase) -> Self {
        Self {
            database,
            fishes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fishes.is_empty()
    }

    pub fn fishes(&self) -> &[Fish] {
        &self.fishes
    }

    pub fn database(&self) -> &FishSpeciesDatabase {
        &self.database
    }

    /// Truncate to `count`, or append newly spawned fishes up to it
    pub fn resize(&mut self, count: usize, visible_world: &VisibleWorld, rng: &mut GameRandom) {
        if self.fishes.len() > count {
            self.fishes.truncate(count);
            return;
        }
        let species_list = self.database.species();
        for _ in self.fishes.len()..count {
            let species_index = rng.choose(species_list.len());
            let species = &species_list[species_index];
            let initial_position = choose_target_position(species, visible_world, rng);
            let target_position = choose_target_position(species, visible_world, rng);
            let personality_seed = rng.normalized_uniform();
            let velocity = calculate_velocity(initial_position, target_position, species, personality_seed);
            let direction = velocity.normalize_or_zero();
            self.fishes.push(Fish {
                species_index,
                personality_seed,
                state: FishState::Cruising,
                current_position: initial_position,
                target_position,
                current_velocity: velocity,
                start_velocity: velocity,
                target_velocity: velocity,
                current_direction: direction,
                start_direction: direction,
                target_direction: direction,
                current_progress_phase: rng.uniform(0.0, std::f32::consts::TAU),
                current_progress: 0.0,
                turning_start_time: 0.0,
            });
        }
    }

    pub fn update(
        &mut self,
        current_simulation_time: f32,
        params: &GameParameters,
        visible_world: &VisibleWorld,
        rng: &mut GameRandom,
    ) {
        self.resize(params.number_of_fishes as usize, visible_world, rng);
        for fish in &mut self.fishes {
            let species = &self.database.species[fish.species_index];
            fish.update(species, current_simulation_time, visible_world, rng);
        }
    }

    pub fn upload(&self, render: &mut dyn RenderContext) {
        render.upload_fishes_start(self.fishes.len());
        for fish in &self.fishes {
            render.upload_fish(fish.to_instance(&self.database.species[fish.species_index]));
        }
        render.upload_fishes_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderBuffers;

    fn fishes() -> Fishes {
        Fishes::new(FishSpeciesDatabase::built_in())
    }

    #[test]
    fn test_resize_keeps_prefix() {
        let world = VisibleWorld::default();
        let mut rng = GameRandom::new(5);
        let mut f = fishes();
        f.resize(10, &world, &mut rng);
        assert_eq!(f.len(), 10);
        let before = f.fishes().to_vec();

        f.resize(5, &world, &mut rng);
        assert_eq!(f.fishes(), &before[..5]);

        f.resize(8, &world, &mut rng);
        assert_eq!(f.len(), 8);
        assert_eq!(&f.fishes()[..5], &before[..5]);
        for fish in &f.fishes()[5..] {
            assert_eq!(fish.state(), FishState::Cruising);
            assert!((0.0..1.0).contains(&fish.personality_seed()));
        }
    }

    #[test]
    fn test_fishes_stay_below_min_depth() {
        let world = VisibleWorld::default();
        let mut rng = GameRandom::new(11);
        let mut f = fishes();
        f.resize(200, &world, &mut rng);
        assert!(f.fishes().iter().all(|fish| fish.target_position().y <= -MIN_DEPTH));
    }

    #[test]
    fn test_turning_blend_boundaries() {
        let world = VisibleWorld::default();
        let mut rng = GameRandom::new(3);
        let species = FishSpeciesDatabase::built_in().species()[0].clone();
        let mut f = fishes();
        f.resize(1, &world, &mut rng);
        let mut fish = f.fishes()[0].clone();

        // Put the fish on its target so the next update turns
        fish.current_position.x = fish.target_position.x;
        let start_velocity = fish.velocity();
        fish.update(&species, 10.0, &world, &mut rng);
        assert_eq!(fish.state(), FishState::Turning);

        fish.update(&species, 10.0, &world, &mut rng);
        assert_eq!(fish.velocity(), start_velocity);

        fish.update(&species, 10.0 + TURNING_TIME_SECONDS * 0.5, &world, &mut rng);
        assert_eq!(fish.velocity(), Vec2::ZERO);

        let target_velocity = fish.target_velocity;
        let target_direction = fish.target_direction;
        fish.update(&species, 10.0 + TURNING_TIME_SECONDS, &world, &mut rng);
        assert_eq!(fish.state(), FishState::Cruising);
        assert_eq!(fish.velocity(), target_velocity);
        assert_eq!(fish.direction(), target_direction);
    }

    #[test]
    fn test_update_follows_configured_count() {
        let world = VisibleWorld::default();
        let mut rng = GameRandom::new(8);
        let mut params = GameParameters::default();
        let mut f = fishes();
        params.number_of_fishes = 12;
        f.update(0.0, &params, &world, &mut rng);
        assert_eq!(f.len(), 12);
        params.number_of_fishes = 0;
        f.update(0.02, &params, &world, &mut rng);
        assert!(f.is_empty());
    }

    #[test]
    fn test_upload_sprites_upright() {
        let world = VisibleWorld::default();
        let mut rng = GameRandom::new(21);
        let mut params = GameParameters::default();
        params.number_of_fishes = 30;
        let mut f = fishes();
        for frame in 0..50 {
            f.update(frame as f32 * SIMULATION_STEP_TIME_DURATION, &params, &world, &mut rng);
        }
        let mut buffers = RenderBuffers::new();
        f.upload(&mut buffers);
        let snapshot = buffers.take_snapshot();
        assert_eq!(snapshot.fishes.len(), 30);
        for fish in &snapshot.fishes {
            assert!(fish.angle_cw.abs() <= std::f32::consts::FRAC_PI_2 + 1e-5);
            assert!((-1.0..=1.0).contains(&fish.progress));
        }
    }

    #[test]
    fn test_species_database_json() {
        let json = r#"{ "species": [ { "name": "Cod", "basal_speed": 0.05, "basal_depth": 30.0, "tail_x": 0.7 } ] }"#;
        let db = FishSpeciesDatabase::from_json_str(json).unwrap();
        assert_eq!(db.species()[0].name, "Cod");

        assert!(matches!(
            FishSpeciesDatabase::from_json_str(r#"{ "species": [] }"#),
            Err(SandboxError::EmptySpeciesDatabase)
        ));
        assert!(FishSpeciesDatabase::new(Vec::new()).is_err());
    }
}
