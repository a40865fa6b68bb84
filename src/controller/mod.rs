//! Frame orchestration
//!
//! `GameController` owns the world and everything that runs once per frame
//! around it: parameter smoothing, the wall-clock state machines and the
//! notification layer. The driver calls `run_game_iteration` once per fixed
//! simulation step and `upload` once per rendered frame.

pub mod daylight;
pub mod smoother;
pub mod thanos;
pub mod tsunami;

use std::time::Duration;

use glam::Vec2;

use crate::clock::{SystemClock, WallClock};
use crate::consts::SIMULATION_STEP_TIME_DURATION;
use crate::error::Result;
use crate::events::{GameEventDispatcher, GameEventHandler};
use crate::notification::{HeatBlasterAction, NotificationLayer};
use crate::params::{GameParameters, StormParameters, ranges};
use crate::random::GameRandom;
use crate::render::RenderContext;
use crate::sim::{FishSpeciesDatabase, GadgetId, GadgetType, ShipDefinition, ShipId, VisibleWorld, World};

pub use daylight::{DayLightCycle, DayLightPhase};
pub use smoother::ParameterSmoother;
pub use thanos::{ThanosSnap, ThanosSnaps};
pub use tsunami::{TsunamiNotification, TsunamiPhase};

/// Fraction of the remaining distance covered per frame
const PARAMETER_CONVERGENCE_FACTOR: f32 = 0.05;

pub struct GameController {
    world: World,
    params: GameParameters,
    storm: StormParameters,
    visible_world: VisibleWorld,
    events: GameEventDispatcher,
    rng: GameRandom,
    clock: Box<dyn WallClock>,
    notification_layer: NotificationLayer,

    current_simulation_time: f32,
    is_paused: bool,

    tsunami: Option<TsunamiNotification>,
    thanos_snaps: ThanosSnaps,
    day_light_cycle: Option<DayLightCycle>,

    spring_stiffness: ParameterSmoother,
    spring_strength: ParameterSmoother,
}

impl GameController {
    /// Controller paced by the system clock
    pub fn new(params: GameParameters, fish_species: FishSpeciesDatabase, seed: u64) -> Self {
        Self::with_clock(params, fish_species, seed, Box::new(SystemClock::default()))
    }

    pub fn with_clock(
        params: GameParameters,
        fish_species: FishSpeciesDatabase,
        seed: u64,
        clock: Box<dyn WallClock>,
    ) -> Self {
        let params = params.clamped();
        log::info!("Game controller created (seed {seed})");
        Self {
            world: World::new(fish_species, true),
            storm: StormParameters::default(),
            visible_world: VisibleWorld::default(),
            events: GameEventDispatcher::new(),
            rng: GameRandom::new(seed),
            clock,
            notification_layer: NotificationLayer::new(params.is_ultra_violent_mode, false, false, false),
            current_simulation_time: 0.0,
            is_paused: false,
            tsunami: None,
            thanos_snaps: ThanosSnaps::default(),
            day_light_cycle: None,
            spring_stiffness: ParameterSmoother::new(
                params.spring_stiffness_adjustment,
                ranges::SPRING_STIFFNESS_ADJUSTMENT,
                PARAMETER_CONVERGENCE_FACTOR,
            ),
            spring_strength: ParameterSmoother::new(
                params.spring_strength_adjustment,
                ranges::SPRING_STRENGTH_ADJUSTMENT,
                PARAMETER_CONVERGENCE_FACTOR,
            ),
            params,
        }
    }

    pub fn add_ship(&mut self, definition: &ShipDefinition) -> Result<ShipId> {
        self.world.add_ship(definition)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn params(&self) -> &GameParameters {
        &self.params
    }

    pub fn notification_layer(&self) -> &NotificationLayer {
        &self.notification_layer
    }

    pub fn notification_layer_mut(&mut self) -> &mut NotificationLayer {
        &mut self.notification_layer
    }

    pub fn current_simulation_time(&self) -> f32 {
        self.current_simulation_time
    }

    pub fn tsunami(&self) -> Option<&TsunamiNotification> {
        self.tsunami.as_ref()
    }

    pub fn thanos_snaps(&self) -> &ThanosSnaps {
        &self.thanos_snaps
    }

    pub fn day_light_cycle(&self) -> Option<&DayLightCycle> {
        self.day_light_cycle.as_ref()
    }

    /// Seed the run was started with; replaying it reproduces the run
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn register_event_handler(&mut self, handler: Box<dyn GameEventHandler>) {
        self.events.register_handler(handler);
    }

    // === Frame loop ===

    /// One fixed simulation step plus the per-frame state machines
    pub fn run_game_iteration(&mut self, render: &mut dyn RenderContext) {
        let now = self.clock.now_as_float();

        if !self.is_paused {
            self.params.spring_stiffness_adjustment = self.spring_stiffness.update();
            self.params.spring_strength_adjustment = self.spring_strength.update();

            self.current_simulation_time += SIMULATION_STEP_TIME_DURATION;
            self.world.update(
                self.current_simulation_time,
                &self.params,
                &self.storm,
                &self.visible_world,
                &mut self.events,
                &mut self.rng,
            );
            self.thanos_snaps
                .update(self.current_simulation_time, &mut self.world, &mut self.events);
        }

        let is_tsunami_over = match self.tsunami.as_mut() {
            Some(tsunami) => !tsunami.update(now, render, &mut self.notification_layer),
            None => false,
        };
        if is_tsunami_over {
            if let Some(tsunami) = self.tsunami.take() {
                tsunami.finish(render);
            }
        }

        if let Some(cycle) = self.day_light_cycle.as_mut() {
            cycle.update(now, self.params.day_light_cycle_duration_seconds, render);
        }

        self.notification_layer.update(now);
        self.events.flush();
    }

    /// Push the current frame to `render`; idempotent between iterations
    pub fn upload(&self, render: &mut dyn RenderContext) {
        self.world.upload(render);
        self.notification_layer.render_upload(render);
    }

    pub fn set_status_text(&mut self, immediate_fps: f32, average_fps: f32) {
        let (points, springs) = self.world.ships().iter().fold((0, 0), |(p, s), ship| {
            (p + ship.points().ship_point_count(), s + ship.springs().len())
        });
        self.notification_layer.set_status_texts(
            immediate_fps,
            average_fps,
            Duration::from_secs_f32(self.current_simulation_time),
            self.is_paused,
            1.0,
            self.visible_world.center,
            points,
            springs,
        );
    }

    // === State machines ===

    /// Start the tsunami rumble, replacing any in progress
    pub fn start_tsunami_notification(&mut self, x: f32, render: &mut dyn RenderContext) {
        if let Some(previous) = self.tsunami.take() {
            previous.finish(render);
        }
        self.events.on_tsunami_notification(x);
        self.tsunami = Some(TsunamiNotification::start(self.clock.now_as_float()));
    }

    pub fn start_thanos_snap(&mut self, center_x: f32) {
        self.thanos_snaps
            .start(center_x, self.current_simulation_time, &mut self.world, &mut self.events);
    }

    pub fn start_day_light_cycle(&mut self) {
        if self.day_light_cycle.is_none() {
            log::info!("Day light cycle started");
            self.day_light_cycle = Some(DayLightCycle::new(self.clock.now_as_float()));
        }
        self.notification_layer.set_day_light_cycle_indicator(true);
    }

    pub fn stop_day_light_cycle(&mut self) {
        if self.day_light_cycle.take().is_some() {
            log::info!("Day light cycle stopped");
        }
        self.notification_layer.set_day_light_cycle_indicator(false);
    }

    /// Abort every state machine and release what they hold
    pub fn reset_state_machines(&mut self, render: &mut dyn RenderContext) {
        if let Some(tsunami) = self.tsunami.take() {
            tsunami.finish(render);
        }
        if !self.thanos_snaps.is_empty() {
            self.thanos_snaps.clear();
            self.world.set_silence(0.0);
            self.events.on_silence_lifted();
        }
    }

    // === Settings ===

    /// Replace all parameters; smoothed ones converge from their current value
    pub fn set_params(&mut self, params: GameParameters) {
        let params = params.clamped();
        self.spring_stiffness.set_value(params.spring_stiffness_adjustment);
        self.spring_strength.set_value(params.spring_strength_adjustment);
        let is_ultra_violent_mode = params.is_ultra_violent_mode;
        self.params = GameParameters {
            spring_stiffness_adjustment: self.spring_stiffness.current(),
            spring_strength_adjustment: self.spring_strength.current(),
            ..params
        };
        self.notification_layer
            .set_ultra_violent_mode_indicator(is_ultra_violent_mode);
    }

    pub fn set_spring_stiffness_adjustment(&mut self, value: f32) {
        self.spring_stiffness.set_value(value);
    }

    pub fn spring_stiffness_adjustment(&self) -> f32 {
        self.spring_stiffness.value()
    }

    pub fn set_spring_strength_adjustment(&mut self, value: f32) {
        self.spring_strength.set_value(value);
    }

    pub fn spring_strength_adjustment(&self) -> f32 {
        self.spring_strength.value()
    }

    pub fn set_storm(&mut self, storm: StormParameters) {
        self.storm = storm;
    }

    pub fn set_visible_world(&mut self, visible_world: VisibleWorld) {
        self.visible_world = visible_world;
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn set_paused(&mut self, is_paused: bool) {
        self.is_paused = is_paused;
    }

    pub fn set_ultra_violent_mode(&mut self, value: bool) {
        self.params.is_ultra_violent_mode = value;
        self.notification_layer.set_ultra_violent_mode_indicator(value);
    }

    // === Interactions ===

    pub fn toggle_gadget_at(&mut self, gadget_type: GadgetType, position: Vec2) -> Option<GadgetId> {
        self.world
            .toggle_gadget_at(gadget_type, position, &self.params, &mut self.events)
    }

    pub fn detonate_rc_bombs(&mut self) -> usize {
        self.world.detonate_rc_bombs()
    }

    pub fn detonate_anti_matter_bombs(&mut self) -> usize {
        self.world.detonate_anti_matter_bombs()
    }

    /// Heat (or cool, with a negative flow) around `position` for one step
    pub fn apply_heat_blaster_at(&mut self, position: Vec2, action: HeatBlasterAction) -> usize {
        let radius = self.params.heat_blaster_radius;
        let heat_flow = match action {
            HeatBlasterAction::Heat => self.params.heat_blaster_heat_flow,
            HeatBlasterAction::Cool => -self.params.heat_blaster_heat_flow,
        } * self.params.ultra_violent_multiplier();
        self.notification_layer.set_heat_blaster(position, radius, action);
        self.world.apply_heat_blaster_at(position, radius, heat_flow)
    }

    pub fn destroy_at(&mut self, position: Vec2, radius_fraction: f32) -> usize {
        let radius = self.params.destroy_radius * radius_fraction.clamp(0.0, 1.0) * self.params.ultra_violent_multiplier();
        self.world
            .destroy_at(position, radius, &self.params, &mut self.events, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::events::GameEvent;
    use crate::render::RenderBuffers;
    use crate::sim::StructuralMaterial;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<GameEvent>>>);

    impl GameEventHandler for Recorder {
        fn on_game_event(&mut self, event: &GameEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    fn controller(clock: &ManualClock) -> GameController {
        GameController::with_clock(
            GameParameters::default(),
            FishSpeciesDatabase::built_in(),
            42,
            Box::new(clock.clone()),
        )
    }

    #[test]
    fn test_pause_freezes_simulation_time() {
        let clock = ManualClock::new(0.0);
        let mut gc = controller(&clock);
        assert_eq!(gc.seed(), 42);
        let mut render = RenderBuffers::new();
        gc.run_game_iteration(&mut render);
        let t = gc.current_simulation_time();
        assert!(t > 0.0);

        gc.set_paused(true);
        gc.run_game_iteration(&mut render);
        assert_eq!(gc.current_simulation_time(), t);
    }

    #[test]
    fn test_tsunami_runs_to_completion_and_resets_offset() {
        let clock = ManualClock::new(0.0);
        let mut gc = controller(&clock);
        let recorder = Recorder::default();
        gc.register_event_handler(Box::new(recorder.clone()));
        let mut render = RenderBuffers::new();

        gc.start_tsunami_notification(10.0, &mut render);
        let mut frames = 0;
        while gc.tsunami().is_some() {
            clock.advance(0.05);
            gc.run_game_iteration(&mut render);
            frames += 1;
            assert!(frames < 1000);
        }
        assert_eq!(render.frame().pixel_offset, (0.0, 0.0));
        assert!(
            recorder
                .0
                .borrow()
                .contains(&GameEvent::TsunamiNotification { x: 10.0 })
        );
    }

    #[test]
    fn test_reset_releases_state_machines() {
        let clock = ManualClock::new(0.0);
        let mut gc = controller(&clock);
        let mut render = RenderBuffers::new();
        gc.start_tsunami_notification(0.0, &mut render);
        gc.start_thanos_snap(0.0);
        assert_eq!(gc.world().silence(), 1.0);

        clock.advance(1.5);
        gc.run_game_iteration(&mut render);
        gc.reset_state_machines(&mut render);
        assert!(gc.tsunami().is_none());
        assert!(gc.thanos_snaps().is_empty());
        assert_eq!(gc.world().silence(), 0.0);
        assert_eq!(render.frame().pixel_offset, (0.0, 0.0));
    }

    #[test]
    fn test_stiffness_is_smoothed() {
        let clock = ManualClock::new(0.0);
        let mut gc = controller(&clock);
        let mut render = RenderBuffers::new();
        let start = gc.params().spring_stiffness_adjustment;
        gc.set_spring_stiffness_adjustment(2.0);
        assert_eq!(gc.spring_stiffness_adjustment(), 2.0);

        gc.run_game_iteration(&mut render);
        let live = gc.params().spring_stiffness_adjustment;
        assert!(live > start && live < 2.0);
    }

    #[test]
    fn test_day_light_cycle_toggles_indicator() {
        let clock = ManualClock::new(0.0);
        let mut gc = controller(&clock);
        let mut render = RenderBuffers::new();
        gc.start_day_light_cycle();
        assert!(gc.notification_layer().is_day_light_cycle_indicator_on());
        for _ in 0..8 {
            clock.advance(1.0);
            gc.run_game_iteration(&mut render);
        }
        assert!(render.ambient_light_intensity() < 1.0);

        gc.stop_day_light_cycle();
        assert!(gc.day_light_cycle().is_none());
        assert!(!gc.notification_layer().is_day_light_cycle_indicator_on());
    }

    #[test]
    fn test_interactions_reach_the_ship() {
        let clock = ManualClock::new(0.0);
        let mut gc = controller(&clock);
        let mut render = RenderBuffers::new();
        let def = ShipDefinition::rectangle(Vec2::new(-4.0, -1.0), 8, 3, StructuralMaterial::wood());
        gc.add_ship(&def).unwrap();

        assert!(gc.toggle_gadget_at(GadgetType::RcBomb, Vec2::new(0.0, 0.0)).is_some());
        assert_eq!(gc.detonate_rc_bombs(), 1);
        assert!(gc.apply_heat_blaster_at(Vec2::new(0.0, 0.0), HeatBlasterAction::Heat) > 0);

        gc.upload(&mut render);
        assert_eq!(render.frame().ships.len(), 1);
        assert!(!render.frame().halos.is_empty());
    }

    #[test]
    fn test_upload_twice_gives_identical_frame() {
        let clock = ManualClock::new(0.0);
        let mut gc = controller(&clock);
        let def = ShipDefinition::rectangle(Vec2::new(-4.0, -1.0), 8, 3, StructuralMaterial::wood());
        gc.add_ship(&def).unwrap();
        gc.start_day_light_cycle();
        gc.notification_layer_mut()
            .add_ephemeral_text_line("HELLO", crate::notification::DEFAULT_EPHEMERAL_LIFETIME);

        let mut render = RenderBuffers::new();
        gc.run_game_iteration(&mut render);
        gc.set_status_text(60.0, 60.0);
        gc.apply_heat_blaster_at(Vec2::ZERO, HeatBlasterAction::Cool);

        gc.upload(&mut render);
        let once = render.take_snapshot();
        gc.upload(&mut render);
        gc.upload(&mut render);
        let twice = render.take_snapshot();
        assert_eq!(once, twice);
        assert!(!once.text_lines.is_empty());
        assert_eq!(once.halos.len(), 1);

        // The overlay lasts until the next iteration
        gc.run_game_iteration(&mut render);
        gc.upload(&mut render);
        assert!(render.take_snapshot().halos.is_empty());
    }
}
