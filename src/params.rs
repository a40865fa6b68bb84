//! Tunable physical constants
//!
//! A `GameParameters` value is an immutable-per-frame snapshot handed to every
//! subsystem's `update`. Adjustable fields have documented ranges; static
//! constants are associated consts. Persisted as JSON.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SIMULATION_STEP_TIME_DURATION;
use crate::error::{Result, SandboxError};

/// Parameters that affect the simulation (physics, world)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameParameters {
    // === Dynamics ===
    /// Multiplier on the basis number of solver sub-steps
    pub num_mechanical_dynamics_iterations_adjustment: f32,
    pub spring_stiffness_adjustment: f32,
    pub spring_damping_adjustment: f32,
    pub spring_strength_adjustment: f32,

    // === Water ===
    pub water_density_adjustment: f32,
    pub water_drag_adjustment: f32,
    pub water_intake_adjustment: f32,
    pub water_diffusion_speed_adjustment: f32,

    // === Ephemeral particles ===
    pub do_generate_debris: bool,
    pub do_generate_sparkles: bool,
    pub do_generate_air_bubbles: bool,
    pub cumulated_intaken_water_threshold_for_air_bubbles: f32,

    // === Wind ===
    /// Beaufort scale, km/h
    pub wind_speed_base: f32,

    // === Heat ===
    /// Kelvin
    pub air_temperature: f32,
    /// Kelvin
    pub water_temperature: f32,
    pub thermal_conductivity_adjustment: f32,
    pub heat_dissipation_adjustment: f32,
    /// KJoules/sec
    pub heat_blaster_heat_flow: f32,
    pub heat_blaster_radius: f32,

    // === Ambient ===
    pub number_of_clouds: u32,
    pub number_of_fishes: u32,
    /// Full day/night cycle, seconds of wall-clock time
    pub day_light_cycle_duration_seconds: f32,

    // === Interactions ===
    pub destroy_radius: f32,
    pub bomb_blast_radius: f32,
    pub bomb_blast_force_adjustment: f32,
    /// KJoules/sec
    pub bomb_blast_heat: f32,
    pub anti_matter_bomb_implosion_strength: f32,
    /// Seconds of simulation time before a timer bomb's fuse runs out
    pub timer_bomb_interval_seconds: f32,
    pub is_ultra_violent_mode: bool,
}

impl Default for GameParameters {
    fn default() -> Self {
        Self {
            num_mechanical_dynamics_iterations_adjustment: 1.0,
            spring_stiffness_adjustment: 1.0,
            spring_damping_adjustment: 1.0,
            spring_strength_adjustment: 1.0,

            water_density_adjustment: 1.0,
            water_drag_adjustment: 1.0,
            water_intake_adjustment: 1.0,
            water_diffusion_speed_adjustment: 1.0,

            do_generate_debris: true,
            do_generate_sparkles: true,
            do_generate_air_bubbles: true,
            cumulated_intaken_water_threshold_for_air_bubbles: 8.0,

            wind_speed_base: -20.0,

            air_temperature: 298.15,
            water_temperature: 288.15,
            thermal_conductivity_adjustment: 1.0,
            heat_dissipation_adjustment: 1.0,
            heat_blaster_heat_flow: 2000.0,
            heat_blaster_radius: 8.0,

            number_of_clouds: 50,
            number_of_fishes: 40,
            day_light_cycle_duration_seconds: 240.0,

            destroy_radius: 8.0,
            bomb_blast_radius: 1.5,
            bomb_blast_force_adjustment: 1.0,
            bomb_blast_heat: 400_000.0,
            anti_matter_bomb_implosion_strength: 3.0,
            timer_bomb_interval_seconds: 10.0,
            is_ultra_violent_mode: false,
        }
    }
}

impl GameParameters {
    // === Physical constants ===
    pub const GRAVITY: Vec2 = Vec2::new(0.0, -9.80);
    pub const GRAVITY_MAGNITUDE: f32 = 9.80;
    /// Kg per cubic meter
    pub const AIR_MASS: f32 = 1.2754;
    /// Kg per cubic meter
    pub const WATER_MASS: f32 = 1000.0;
    /// Kelvin (25C)
    pub const INITIAL_TEMPERATURE: f32 = 298.15;

    // === Dynamics ===
    /// Fraction of a spring displacement removed at each relaxation sub-step
    pub const SPRING_REDUCTION_FRACTION: f32 = 0.4;
    /// Empirical spring damping; 0.8 makes everything explode
    pub const SPRING_DAMPING_COEFFICIENT: f32 = 0.03;
    /// Per-frame velocity damping
    pub const GLOBAL_DAMP: f32 = 0.9996;
    pub const WATER_DRAG_LINEAR_COEFFICIENT: f32 = 0.020 * 5.0;
    const BASIS_NUM_MECHANICAL_DYNAMICS_ITERATIONS: f32 = 24.0;

    // === Heat ===
    pub const AIR_CONVECTIVE_HEAT_TRANSFER_COEFFICIENT: f32 = 100.45;
    pub const WATER_CONVECTIVE_HEAT_TRANSFER_COEFFICIENT: f32 = 2500.0;

    // === Gadgets ===
    /// Kelvin (100C)
    pub const BOMBS_TEMPERATURE_TRIGGER: f32 = 373.15;
    pub const BOMB_NEIGHBORHOOD_RADIUS: f32 = 3.5;

    // === Ephemeral particles ===
    pub const MIN_DEBRIS_PARTICLES_PER_EVENT: u32 = 4;
    pub const MAX_DEBRIS_PARTICLES_PER_EVENT: u32 = 9;
    pub const MIN_DEBRIS_PARTICLES_VELOCITY: f32 = 12.5;
    pub const MAX_DEBRIS_PARTICLES_VELOCITY: f32 = 20.0;
    pub const MIN_DEBRIS_PARTICLES_LIFETIME: f32 = 0.4;
    pub const MAX_DEBRIS_PARTICLES_LIFETIME: f32 = 0.9;
    pub const MIN_SPARKLE_PARTICLES_PER_EVENT: u32 = 4;
    pub const MAX_SPARKLE_PARTICLES_PER_EVENT: u32 = 10;
    pub const MIN_SPARKLE_PARTICLES_VELOCITY: f32 = 75.0;
    pub const MAX_SPARKLE_PARTICLES_VELOCITY: f32 = 150.0;
    pub const MIN_SPARKLE_PARTICLES_LIFETIME: f32 = 0.2;
    pub const MAX_SPARKLE_PARTICLES_LIFETIME: f32 = 0.5;
    pub const MIN_AIR_BUBBLES_VORTEX_AMPLITUDE: f32 = 0.05;
    pub const MAX_AIR_BUBBLES_VORTEX_AMPLITUDE: f32 = 2.0;
    pub const MIN_AIR_BUBBLES_VORTEX_PERIOD: f32 = 3.0;
    pub const MAX_AIR_BUBBLES_VORTEX_PERIOD: f32 = 7.5;

    // === Limits ===
    pub const MAX_EPHEMERAL_PARTICLES: usize = 4096;
    pub const MAX_BOMBS: usize = 64;
    pub const MAX_THANOS_SNAPS: usize = 8;
    /// 8 neighbours and 1 rope spring, when this is a rope endpoint
    pub const MAX_SPRINGS_PER_POINT: usize = 8 + 1;
    pub const MAX_TRIANGLES_PER_POINT: usize = 8;

    /// Solver sub-steps per simulation step
    pub fn num_mechanical_dynamics_iterations(&self) -> usize {
        let adjustment = self.num_mechanical_dynamics_iterations_adjustment.clamp(
            ranges::NUM_MECHANICAL_DYNAMICS_ITERATIONS_ADJUSTMENT.0,
            ranges::NUM_MECHANICAL_DYNAMICS_ITERATIONS_ADJUSTMENT.1,
        );
        ((Self::BASIS_NUM_MECHANICAL_DYNAMICS_ITERATIONS * adjustment) as usize).max(1)
    }

    /// Duration of one solver sub-step
    pub fn mechanical_simulation_step_time_duration(&self) -> f32 {
        SIMULATION_STEP_TIME_DURATION / self.num_mechanical_dynamics_iterations() as f32
    }

    /// Multiplier applied to blast radius and heat in ultra-violent mode
    pub fn ultra_violent_multiplier(&self) -> f32 {
        if self.is_ultra_violent_mode { 10.0 } else { 1.0 }
    }

    fn ranged_fields(&self) -> [(&'static str, f32, (f32, f32)); 22] {
        use ranges::*;
        [
            ("num_mechanical_dynamics_iterations_adjustment", self.num_mechanical_dynamics_iterations_adjustment, NUM_MECHANICAL_DYNAMICS_ITERATIONS_ADJUSTMENT),
            ("spring_stiffness_adjustment", self.spring_stiffness_adjustment, SPRING_STIFFNESS_ADJUSTMENT),
            ("spring_damping_adjustment", self.spring_damping_adjustment, SPRING_DAMPING_ADJUSTMENT),
            ("spring_strength_adjustment", self.spring_strength_adjustment, SPRING_STRENGTH_ADJUSTMENT),
            ("water_density_adjustment", self.water_density_adjustment, WATER_DENSITY_ADJUSTMENT),
            ("water_drag_adjustment", self.water_drag_adjustment, WATER_DRAG_ADJUSTMENT),
            ("water_intake_adjustment", self.water_intake_adjustment, WATER_INTAKE_ADJUSTMENT),
            ("water_diffusion_speed_adjustment", self.water_diffusion_speed_adjustment, WATER_DIFFUSION_SPEED_ADJUSTMENT),
            ("cumulated_intaken_water_threshold_for_air_bubbles", self.cumulated_intaken_water_threshold_for_air_bubbles, CUMULATED_INTAKEN_WATER_THRESHOLD_FOR_AIR_BUBBLES),
            ("wind_speed_base", self.wind_speed_base, WIND_SPEED_BASE),
            ("air_temperature", self.air_temperature, TEMPERATURE),
            ("water_temperature", self.water_temperature, TEMPERATURE),
            ("thermal_conductivity_adjustment", self.thermal_conductivity_adjustment, THERMAL_CONDUCTIVITY_ADJUSTMENT),
            ("heat_dissipation_adjustment", self.heat_dissipation_adjustment, HEAT_DISSIPATION_ADJUSTMENT),
            ("heat_blaster_heat_flow", self.heat_blaster_heat_flow, HEAT_BLASTER_HEAT_FLOW),
            ("heat_blaster_radius", self.heat_blaster_radius, HEAT_BLASTER_RADIUS),
            ("day_light_cycle_duration_seconds", self.day_light_cycle_duration_seconds, DAY_LIGHT_CYCLE_DURATION_SECONDS),
            ("destroy_radius", self.destroy_radius, DESTROY_RADIUS),
            ("bomb_blast_radius", self.bomb_blast_radius, BOMB_BLAST_RADIUS),
            ("bomb_blast_force_adjustment", self.bomb_blast_force_adjustment, BOMB_BLAST_FORCE_ADJUSTMENT),
            ("bomb_blast_heat", self.bomb_blast_heat, BOMB_BLAST_HEAT),
            ("anti_matter_bomb_implosion_strength", self.anti_matter_bomb_implosion_strength, ANTI_MATTER_BOMB_IMPLOSION_STRENGTH),
        ]
    }

    /// Check every adjustable field against its documented range
    pub fn validate(&self) -> Result<()> {
        for (name, value, (min, max)) in self.ranged_fields() {
            if !(min..=max).contains(&value) {
                return Err(SandboxError::ParameterOutOfRange { name, value, min, max });
            }
        }
        if self.number_of_clouds > ranges::MAX_NUMBER_OF_CLOUDS {
            return Err(SandboxError::ParameterOutOfRange {
                name: "number_of_clouds",
                value: self.number_of_clouds as f32,
                min: 0.0,
                max: ranges::MAX_NUMBER_OF_CLOUDS as f32,
            });
        }
        if self.number_of_fishes > ranges::MAX_NUMBER_OF_FISHES {
            return Err(SandboxError::ParameterOutOfRange {
                name: "number_of_fishes",
                value: self.number_of_fishes as f32,
                min: 0.0,
                max: ranges::MAX_NUMBER_OF_FISHES as f32,
            });
        }
        Ok(())
    }

    /// Copy with every adjustable field clamped into its range
    pub fn clamped(&self) -> Self {
        use ranges::*;
        let c = |v: f32, r: (f32, f32)| v.clamp(r.0, r.1);
        Self {
            num_mechanical_dynamics_iterations_adjustment: c(self.num_mechanical_dynamics_iterations_adjustment, NUM_MECHANICAL_DYNAMICS_ITERATIONS_ADJUSTMENT),
            spring_stiffness_adjustment: c(self.spring_stiffness_adjustment, SPRING_STIFFNESS_ADJUSTMENT),
            spring_damping_adjustment: c(self.spring_damping_adjustment, SPRING_DAMPING_ADJUSTMENT),
            spring_strength_adjustment: c(self.spring_strength_adjustment, SPRING_STRENGTH_ADJUSTMENT),
            water_density_adjustment: c(self.water_density_adjustment, WATER_DENSITY_ADJUSTMENT),
            water_drag_adjustment: c(self.water_drag_adjustment, WATER_DRAG_ADJUSTMENT),
            water_intake_adjustment: c(self.water_intake_adjustment, WATER_INTAKE_ADJUSTMENT),
            water_diffusion_speed_adjustment: c(self.water_diffusion_speed_adjustment, WATER_DIFFUSION_SPEED_ADJUSTMENT),
            cumulated_intaken_water_threshold_for_air_bubbles: c(self.cumulated_intaken_water_threshold_for_air_bubbles, CUMULATED_INTAKEN_WATER_THRESHOLD_FOR_AIR_BUBBLES),
            wind_speed_base: c(self.wind_speed_base, WIND_SPEED_BASE),
            air_temperature: c(self.air_temperature, TEMPERATURE),
            water_temperature: c(self.water_temperature, TEMPERATURE),
            thermal_conductivity_adjustment: c(self.thermal_conductivity_adjustment, THERMAL_CONDUCTIVITY_ADJUSTMENT),
            heat_dissipation_adjustment: c(self.heat_dissipation_adjustment, HEAT_DISSIPATION_ADJUSTMENT),
            heat_blaster_heat_flow: c(self.heat_blaster_heat_flow, HEAT_BLASTER_HEAT_FLOW),
            heat_blaster_radius: c(self.heat_blaster_radius, HEAT_BLASTER_RADIUS),
            number_of_clouds: self.number_of_clouds.min(MAX_NUMBER_OF_CLOUDS),
            number_of_fishes: self.number_of_fishes.min(MAX_NUMBER_OF_FISHES),
            day_light_cycle_duration_seconds: c(self.day_light_cycle_duration_seconds, DAY_LIGHT_CYCLE_DURATION_SECONDS),
            destroy_radius: c(self.destroy_radius, DESTROY_RADIUS),
            bomb_blast_radius: c(self.bomb_blast_radius, BOMB_BLAST_RADIUS),
            bomb_blast_force_adjustment: c(self.bomb_blast_force_adjustment, BOMB_BLAST_FORCE_ADJUSTMENT),
            bomb_blast_heat: c(self.bomb_blast_heat, BOMB_BLAST_HEAT),
            anti_matter_bomb_implosion_strength: c(self.anti_matter_bomb_implosion_strength, ANTI_MATTER_BOMB_IMPLOSION_STRENGTH),
            ..self.clone()
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load and validate a parameters file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let parameters = Self::from_json_str(&json)?;
        parameters.validate()?;
        log::info!("Loaded game parameters from {}", path.as_ref().display());
        Ok(parameters)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Game parameters saved to {}", path.as_ref().display());
        Ok(())
    }
}

/// Documented (min, max) ranges of adjustable parameters
pub mod ranges {
    pub const NUM_MECHANICAL_DYNAMICS_ITERATIONS_ADJUSTMENT: (f32, f32) = (0.5, 20.0);
    pub const SPRING_STIFFNESS_ADJUSTMENT: (f32, f32) = (0.001, 2.4);
    pub const SPRING_DAMPING_ADJUSTMENT: (f32, f32) = (0.001, 4.0);
    pub const SPRING_STRENGTH_ADJUSTMENT: (f32, f32) = (0.01, 50.0);
    pub const WATER_DENSITY_ADJUSTMENT: (f32, f32) = (0.0, 4.0);
    /// Upper bound keeps drag stable: 2 * m / (dt * C) at minimal mass
    pub const WATER_DRAG_ADJUSTMENT: (f32, f32) = (0.0, 1000.0);
    pub const WATER_INTAKE_ADJUSTMENT: (f32, f32) = (0.001, 10.0);
    pub const WATER_DIFFUSION_SPEED_ADJUSTMENT: (f32, f32) = (0.001, 2.0);
    pub const CUMULATED_INTAKEN_WATER_THRESHOLD_FOR_AIR_BUBBLES: (f32, f32) = (2.0, 128.0);
    pub const WIND_SPEED_BASE: (f32, f32) = (-100.0, 100.0);
    /// 0C to 1800C
    pub const TEMPERATURE: (f32, f32) = (273.15, 2073.15);
    pub const THERMAL_CONDUCTIVITY_ADJUSTMENT: (f32, f32) = (0.1, 100.0);
    pub const HEAT_DISSIPATION_ADJUSTMENT: (f32, f32) = (0.01, 20.0);
    pub const HEAT_BLASTER_HEAT_FLOW: (f32, f32) = (200.0, 100_000.0);
    pub const HEAT_BLASTER_RADIUS: (f32, f32) = (1.0, 100.0);
    pub const DAY_LIGHT_CYCLE_DURATION_SECONDS: (f32, f32) = (10.0, 7200.0);
    pub const DESTROY_RADIUS: (f32, f32) = (5.0, 100.0);
    pub const BOMB_BLAST_RADIUS: (f32, f32) = (0.1, 20.0);
    pub const BOMB_BLAST_FORCE_ADJUSTMENT: (f32, f32) = (0.1, 100.0);
    pub const BOMB_BLAST_HEAT: (f32, f32) = (0.0, 10_000_000.0);
    pub const ANTI_MATTER_BOMB_IMPLOSION_STRENGTH: (f32, f32) = (0.1, 10.0);
    pub const MAX_NUMBER_OF_CLOUDS: u32 = 500;
    pub const MAX_NUMBER_OF_FISHES: u32 = 1024;
}

/// Parameters of an ongoing storm, computed outside the core
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StormParameters {
    pub number_of_clouds: u32,
    /// Scale of storm clouds
    pub clouds_size: f32,
    /// 0.0: dark, 1.0: light
    pub clouds_darkening: f32,
    /// Km/h, added to base wind
    pub wind_speed: f32,
}

impl Default for StormParameters {
    fn default() -> Self {
        Self {
            number_of_clouds: 0,
            clouds_size: 1.0,
            clouds_darkening: 1.0,
            wind_speed: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameParameters::default().validate().is_ok());
    }

    #[test]
    fn test_iterations_follow_adjustment() {
        let mut p = GameParameters::default();
        assert_eq!(p.num_mechanical_dynamics_iterations(), 24);
        p.num_mechanical_dynamics_iterations_adjustment = 0.5;
        assert_eq!(p.num_mechanical_dynamics_iterations(), 12);
        // Clamped to [0.5, 20]
        p.num_mechanical_dynamics_iterations_adjustment = 0.01;
        assert_eq!(p.num_mechanical_dynamics_iterations(), 12);
        p.num_mechanical_dynamics_iterations_adjustment = 100.0;
        assert_eq!(p.num_mechanical_dynamics_iterations(), 480);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let p = GameParameters::from_json_str(r#"{ "number_of_fishes": 7, "is_ultra_violent_mode": true }"#)
            .unwrap();
        assert_eq!(p.number_of_fishes, 7);
        assert!(p.is_ultra_violent_mode);
        assert_eq!(p.bomb_blast_radius, GameParameters::default().bomb_blast_radius);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let p = GameParameters {
            spring_strength_adjustment: 100.0,
            ..Default::default()
        };
        match p.validate() {
            Err(SandboxError::ParameterOutOfRange { name, .. }) => {
                assert_eq!(name, "spring_strength_adjustment")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(p.clamped().validate().is_ok());
        assert_eq!(p.clamped().spring_strength_adjustment, 50.0);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            GameParameters::from_json_str("{ not json"),
            Err(SandboxError::Json(_))
        ));
    }
}
