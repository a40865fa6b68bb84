//! Clouds: kinematic sky decoration plus the shadow strip used for lighting
//!
//! Coordinates are NDC. Normal and storm clouds live in separate pools whose
//! sizes follow `GameParameters::number_of_clouds` and
//! `StormParameters::number_of_clouds` independently.

use crate::consts::SIMULATION_STEP_TIME_DURATION;
use crate::params::{GameParameters, StormParameters, ranges};
use crate::random::GameRandom;
use crate::render::{CloudInstance, RenderContext};
use crate::PrecalculatedFunction;

/// Slices of the horizontal shadow strip
pub const SHADOW_BUFFER_SIZE: usize = 32;
/// Clouds wrap around when X leaves [-CLOUD_WRAP_X, CLOUD_WRAP_X]
const CLOUD_WRAP_X: f32 = 2.5;
/// NDC half-width of a cloud at scale 1
const CLOUD_HALF_WIDTH: f32 = 0.3;
const GROWTH_PROGRESS_SPEED: f32 = 0.05;
/// NDC per second, per km/h of wind
const CLOUD_SPEED_PER_WIND_KMH: f32 = 0.002;

/// How the shadow strip is normalized before upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowOffset {
    /// Subtract the mean coverage; the strip averages to no shadow
    Mean,
    /// Subtract the minimum coverage; the least covered slice is fully lit
    Min,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    /// Sticky and unique across both pools; doubles as texture frame
    pub id: u32,
    pub x: f32,
    /// 0.0 -> 1.0 above the horizon
    pub y: f32,
    /// 0.0 -> 1.0 depth
    pub z: f32,
    pub scale: f32,
    /// 0.0: dark, 1.0: light
    pub darkening: f32,
    pub growth_progress: f32,
    linear_speed_x: f32,
    growth_progress_phase: f32,
}

impl Cloud {
    fn update(&mut self, global_cloud_speed: f32, lo_freq_sin: &PrecalculatedFunction) {
        self.x += self.linear_speed_x * global_cloud_speed * SIMULATION_STEP_TIME_DURATION;
        if self.x > CLOUD_WRAP_X {
            self.x -= 2.0 * CLOUD_WRAP_X;
        } else if self.x < -CLOUD_WRAP_X {
            self.x += 2.0 * CLOUD_WRAP_X;
        }

        self.growth_progress_phase += GROWTH_PROGRESS_SPEED * SIMULATION_STEP_TIME_DURATION;
        self.growth_progress = 0.3 + (1.0 + lo_freq_sin.nearest_periodic(self.growth_progress_phase)) * 0.7 / 2.0;
    }

    fn to_instance(&self) -> CloudInstance {
        CloudInstance {
            id: self.id,
            x: self.x,
            y: self.y,
            z: self.z,
            scale: self.scale,
            darkening: self.darkening,
            growth_progress: self.growth_progress,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Clouds {
    last_cloud_id: u32,
    clouds: Vec<Cloud>,
    storm_clouds: Vec<Cloud>,
    are_shadows_enabled: bool,
    shadow_buffer: Vec<f32>,
    lo_freq_sin: PrecalculatedFunction,
}

impl Clouds {
    pub fn new(are_shadows_enabled: bool) -> Self {
        Self {
            last_cloud_id: 0,
            clouds: Vec::new(),
            storm_clouds: Vec::new(),
            are_shadows_enabled,
            shadow_buffer: vec![0.0; SHADOW_BUFFER_SIZE],
            lo_freq_sin: PrecalculatedFunction::lo_freq_sin(),
        }
    }

    pub fn set_shadows_enabled(&mut self, value: bool) {
        self.are_shadows_enabled = value;
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn storm_clouds(&self) -> &[Cloud] {
        &self.storm_clouds
    }

    pub fn shadow_buffer(&self) -> &[f32] {
        &self.shadow_buffer
    }

    pub fn shadow_offset(&self) -> ShadowOffset {
        if self.storm_clouds.is_empty() {
            ShadowOffset::Min
        } else {
            ShadowOffset::Mean
        }
    }

    /// `wind_speed_magnitude` is base plus storm wind, km/h
    pub fn update(
        &mut self,
        wind_speed_magnitude: f32,
        storm: &StormParameters,
        params: &GameParameters,
        rng: &mut GameRandom,
    ) {
        let target = params.number_of_clouds.min(ranges::MAX_NUMBER_OF_CLOUDS) as usize;
        if self.clouds.len() > target {
            self.clouds.truncate(target);
        }
        while self.clouds.len() < target {
            let y = rng.normal(0.0, 0.5).abs().min(1.0);
            let scale = rng.uniform(0.4, 1.2);
            let cloud = self.new_cloud(y, scale, 1.0, rng);
            self.clouds.push(cloud);
        }

        let storm_target = storm.number_of_clouds as usize;
        if self.storm_clouds.len() > storm_target {
            self.storm_clouds.truncate(storm_target);
        }
        while self.storm_clouds.len() < storm_target {
            let y = rng.uniform(0.0, 0.2);
            let cloud = self.new_cloud(y, storm.clouds_size, storm.clouds_darkening, rng);
            self.storm_clouds.push(cloud);
        }

        let global_cloud_speed = wind_speed_magnitude * CLOUD_SPEED_PER_WIND_KMH;
        for cloud in self.clouds.iter_mut().chain(self.storm_clouds.iter_mut()) {
            cloud.update(global_cloud_speed, &self.lo_freq_sin);
        }

        if self.are_shadows_enabled {
            self.update_shadows();
        }
    }

    fn new_cloud(&mut self, y: f32, scale: f32, darkening: f32, rng: &mut GameRandom) -> Cloud {
        self.last_cloud_id += 1;
        Cloud {
            id: self.last_cloud_id,
            x: rng.uniform(-CLOUD_WRAP_X, CLOUD_WRAP_X),
            y,
            z: rng.normalized_uniform(),
            scale,
            darkening,
            growth_progress: 0.3,
            linear_speed_x: rng.uniform(0.7, 1.3),
            growth_progress_phase: rng.uniform(0.0, std::f32::consts::TAU),
        }
    }

    /// Project cloud coverage onto the strip spanning NDC [-1, 1]
    fn update_shadows(&mut self) {
        self.shadow_buffer.iter_mut().for_each(|s| *s = 0.0);
        let slice_width = 2.0 / SHADOW_BUFFER_SIZE as f32;
        for cloud in self.clouds.iter().chain(self.storm_clouds.iter()) {
            let half_width = CLOUD_HALF_WIDTH * cloud.scale * cloud.growth_progress;
            let opacity = cloud.growth_progress * (1.0 - 0.5 * cloud.darkening);
            for (i, shadow) in self.shadow_buffer.iter_mut().enumerate() {
                let slice_x = -1.0 + (i as f32 + 0.5) * slice_width;
                let distance = (slice_x - cloud.x).abs();
                if distance < half_width {
                    *shadow += opacity * (1.0 - distance / half_width);
                }
            }
        }

        let offset = match self.shadow_offset() {
            ShadowOffset::Mean => self.shadow_buffer.iter().sum::<f32>() / SHADOW_BUFFER_SIZE as f32,
            ShadowOffset::Min => self.shadow_buffer.iter().copied().fold(f32::INFINITY, f32::min),
        };
        for shadow in &mut self.shadow_buffer {
            *shadow = (*shadow - offset).clamp(0.0, 1.0);
        }
    }

    pub fn upload(&self, render: &mut dyn RenderContext) {
        render.upload_clouds_start(self.clouds.len() + self.storm_clouds.len());
        for cloud in self.clouds.iter().chain(self.storm_clouds.iter()) {
            render.upload_cloud(cloud.to_instance());
        }
        render.upload_clouds_end();

        if self.are_shadows_enabled {
            render.upload_cloud_shadows(&self.shadow_buffer);
        }
    }
}

/// Wind magnitude feeding cloud speed
pub fn wind_speed_magnitude(params: &GameParameters, storm: &StormParameters) -> f32 {
    (params.wind_speed_base + storm.wind_speed).abs()
}
