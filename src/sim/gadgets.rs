//! Gadgets (bombs)
//!
//! Every gadget kind runs the same lifecycle:
//! - attach to a spring and sit `Idle`, checking its trigger each frame
//! - on trigger, detach and start one explosion (`TriggeringExplosion`)
//! - fade out over `EXPLOSION_FADEOUT_STEPS_COUNT` frames (`Exploding`)
//! - `Expired`, at which point `update` returns false and the owning
//!   collection prunes it
//!
//! Kinds differ only in trigger condition and blast parameters. Anti-matter
//! bombs add an `Imploding` phase before they explode.

use glam::Vec2;

use super::explosions::{Blast, ExplosionType, ShipPhysicsHandler};
use super::points::Points;
use super::springs::Springs;
use super::types::{ElementIndex, GadgetId, GadgetType, PlaneId, ShipId};
use super::world::OceanSurface;
use crate::consts::SIMULATION_STEP_TIME_DURATION;
use crate::events::{GameEvent, GameEventDispatcher};
use crate::params::GameParameters;
use crate::render::{GadgetSprite, RenderContext};

/// Frames between detonation and expiry
pub const EXPLOSION_FADEOUT_STEPS_COUNT: u32 = 8;
/// Frames of anti-matter implosion before the explosion
pub const ANTI_MATTER_IMPLOSION_STEPS: u32 = 50;

const BASE_BLAST_STRENGTH: f32 = 60.0;
const ANTI_MATTER_BLAST_STRENGTH: f32 = 200.0;
const ANTI_MATTER_BLAST_RADIUS_FACTOR: f32 = 4.0;
/// Texture frames per gadget type in the gadget atlas
const FRAMES_PER_TYPE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GadgetState {
    Idle,
    /// Anti-matter only
    Imploding { step: u32 },
    TriggeringExplosion,
    Exploding { fadeout_counter: u32 },
    Expired,
}

/// Kind-specific trigger state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GadgetKind {
    ImpactBomb,
    TimerBomb { fuse_remaining: f32, is_defused: bool },
    RcBomb { detonation_requested: bool },
    AntiMatterBomb { detonation_requested: bool },
}

impl GadgetKind {
    pub fn new(gadget_type: GadgetType, params: &GameParameters) -> Self {
        match gadget_type {
            GadgetType::ImpactBomb => Self::ImpactBomb,
            GadgetType::TimerBomb => Self::TimerBomb {
                fuse_remaining: params.timer_bomb_interval_seconds,
                is_defused: false,
            },
            GadgetType::RcBomb => Self::RcBomb { detonation_requested: false },
            GadgetType::AntiMatterBomb => Self::AntiMatterBomb { detonation_requested: false },
        }
    }

    pub fn gadget_type(&self) -> GadgetType {
        match self {
            Self::ImpactBomb => GadgetType::ImpactBomb,
            Self::TimerBomb { .. } => GadgetType::TimerBomb,
            Self::RcBomb { .. } => GadgetType::RcBomb,
            Self::AntiMatterBomb { .. } => GadgetType::AntiMatterBomb,
        }
    }
}

/// What a gadget sees of the world during `update`
pub struct GadgetUpdateContext<'a> {
    pub current_simulation_time: f32,
    pub params: &'a GameParameters,
    pub points: &'a Points,
    pub springs: &'a Springs,
    pub ocean: &'a OceanSurface,
    pub handler: &'a mut dyn ShipPhysicsHandler,
    pub events: &'a mut GameEventDispatcher,
}

#[derive(Debug, Clone)]
pub struct Gadget {
    id: GadgetId,
    kind: GadgetKind,
    state: GadgetState,
    spring_index: Option<ElementIndex>,
    /// Follows the spring midpoint while attached, frozen afterwards
    position: Vec2,
    plane_id: PlaneId,
    is_neighborhood_disturbed: bool,
}

impl Gadget {
    pub fn new(
        id: GadgetId,
        gadget_type: GadgetType,
        spring_index: ElementIndex,
        points: &Points,
        springs: &Springs,
        params: &GameParameters,
    ) -> Self {
        debug_assert!(!springs.is_deleted(spring_index));
        let plane_id = points
            .plane_id(springs.endpoint_a(spring_index))
            .max(points.plane_id(springs.endpoint_b(spring_index)));
        Self {
            id,
            kind: GadgetKind::new(gadget_type, params),
            state: GadgetState::Idle,
            spring_index: Some(spring_index),
            position: springs.midpoint(spring_index, points),
            plane_id,
            is_neighborhood_disturbed: false,
        }
    }

    pub fn id(&self) -> GadgetId {
        self.id
    }

    pub fn gadget_type(&self) -> GadgetType {
        self.kind.gadget_type()
    }

    pub fn kind(&self) -> &GadgetKind {
        &self.kind
    }

    pub fn state(&self) -> GadgetState {
        self.state
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Spring this gadget is attached to, if still attached
    pub fn attached_spring_index(&self) -> Option<ElementIndex> {
        self.spring_index
    }

    /// The attached spring was severed
    pub fn on_spring_destroyed(&mut self) {
        self.spring_index = None;
        if self.kind == GadgetKind::ImpactBomb {
            self.is_neighborhood_disturbed = true;
        }
    }

    pub fn on_neighborhood_disturbed(&mut self) {
        self.is_neighborhood_disturbed = true;
    }

    /// Arm remote detonation; returns false for kinds without a detonator
    pub fn request_detonation(&mut self) -> bool {
        match &mut self.kind {
            GadgetKind::RcBomb { detonation_requested } | GadgetKind::AntiMatterBomb { detonation_requested } => {
                *detonation_requested = true;
                true
            }
            _ => false,
        }
    }

    /// Advance one frame; returns false once expired
    pub fn update(&mut self, ctx: &mut GadgetUpdateContext<'_>) -> bool {
        match self.state {
            GadgetState::Idle => {
                if let Some(s) = self.spring_index {
                    debug_assert!(!ctx.springs.is_deleted(s), "gadget {:?} on severed spring {s}", self.id);
                    self.position = ctx.springs.midpoint(s, ctx.points);
                }
                if self.check_trigger(ctx) {
                    log::debug!("{:?} {:?} triggered", self.gadget_type(), self.id);
                    self.state = if matches!(self.kind, GadgetKind::AntiMatterBomb { .. }) {
                        ctx.events.dispatch(GameEvent::AntiMatterBombImploding);
                        GadgetState::Imploding { step: 0 }
                    } else {
                        GadgetState::TriggeringExplosion
                    };
                }
                true
            }

            GadgetState::Imploding { step } => {
                ctx.handler.do_anti_matter_bomb_implosion(
                    self.position,
                    step as f32 / ANTI_MATTER_IMPLOSION_STEPS as f32,
                    ctx.params.anti_matter_bomb_implosion_strength,
                );
                self.state = if step + 1 >= ANTI_MATTER_IMPLOSION_STEPS {
                    GadgetState::TriggeringExplosion
                } else {
                    GadgetState::Imploding { step: step + 1 }
                };
                true
            }

            GadgetState::TriggeringExplosion => {
                // Detach so the blast does not ride the deforming ship
                self.spring_index = None;
                ctx.handler.start_explosion(ctx.current_simulation_time, self.blast(ctx.params));
                ctx.events.on_bomb_explosion(self.gadget_type(), ctx.ocean.is_underwater(self.position), 1);
                self.state = GadgetState::Exploding { fadeout_counter: 0 };
                true
            }

            GadgetState::Exploding { fadeout_counter } => {
                let fadeout_counter = fadeout_counter + 1;
                if fadeout_counter >= EXPLOSION_FADEOUT_STEPS_COUNT {
                    self.state = GadgetState::Expired;
                    false
                } else {
                    self.state = GadgetState::Exploding { fadeout_counter };
                    true
                }
            }

            GadgetState::Expired => false,
        }
    }

    fn is_hot(&self, points: &Points, springs: &Springs) -> bool {
        self.spring_index.is_some_and(|s| {
            points.temperature(springs.endpoint_a(s)) > GameParameters::BOMBS_TEMPERATURE_TRIGGER
                || points.temperature(springs.endpoint_b(s)) > GameParameters::BOMBS_TEMPERATURE_TRIGGER
        })
    }

    fn check_trigger(&mut self, ctx: &mut GadgetUpdateContext<'_>) -> bool {
        let is_hot = self.is_hot(ctx.points, ctx.springs);
        let is_underwater = ctx.ocean.is_underwater(self.position);
        match &mut self.kind {
            GadgetKind::ImpactBomb => is_hot || self.is_neighborhood_disturbed,
            GadgetKind::TimerBomb { fuse_remaining, is_defused } => {
                if is_underwater {
                    if !*is_defused {
                        *is_defused = true;
                        ctx.events.dispatch(GameEvent::TimerBombDefused { is_underwater });
                    }
                    return is_hot;
                }
                if *is_defused {
                    *is_defused = false;
                    ctx.events.dispatch(GameEvent::TimerBombFuse { is_underwater });
                }
                *fuse_remaining -= SIMULATION_STEP_TIME_DURATION;
                is_hot || *fuse_remaining <= 0.0
            }
            GadgetKind::RcBomb { detonation_requested } => is_hot || *detonation_requested,
            GadgetKind::AntiMatterBomb { detonation_requested } => *detonation_requested,
        }
    }

    fn blast(&self, params: &GameParameters) -> Blast {
        let uv = params.ultra_violent_multiplier();
        let strength = BASE_BLAST_STRENGTH * params.bomb_blast_force_adjustment;
        let (blast_radius, blast_strength, blast_heat, explosion_type) = match self.kind {
            GadgetKind::ImpactBomb => (
                params.bomb_blast_radius * uv,
                strength,
                params.bomb_blast_heat * 1.2 * uv,
                ExplosionType::Deflagration,
            ),
            GadgetKind::TimerBomb { .. } | GadgetKind::RcBomb { .. } => (
                params.bomb_blast_radius * uv,
                strength,
                params.bomb_blast_heat * uv,
                ExplosionType::Deflagration,
            ),
            GadgetKind::AntiMatterBomb { .. } => (
                params.bomb_blast_radius * ANTI_MATTER_BLAST_RADIUS_FACTOR * uv,
                ANTI_MATTER_BLAST_STRENGTH * params.bomb_blast_force_adjustment,
                0.0,
                ExplosionType::AntiMatter,
            ),
        };
        Blast {
            center: self.position,
            plane_id: self.plane_id,
            blast_radius,
            blast_strength,
            blast_heat,
            explosion_type,
        }
    }

    pub fn upload(&self, ship_id: ShipId, render: &mut dyn RenderContext) {
        let type_frame = self.gadget_type() as u32 * FRAMES_PER_TYPE;
        let (scale, alpha, frame) = match self.state {
            GadgetState::Idle => (1.0, 1.0, 0),
            GadgetState::Imploding { step } => (1.0 - 0.5 * step as f32 / ANTI_MATTER_IMPLOSION_STEPS as f32, 1.0, 1),
            GadgetState::TriggeringExplosion => (0.5, 1.0, 1),
            GadgetState::Exploding { fadeout_counter } => (
                1.0,
                1.0 - fadeout_counter as f32 / EXPLOSION_FADEOUT_STEPS_COUNT as f32,
                2,
            ),
            GadgetState::Expired => return,
        };
        render.upload_gadget(
            ship_id,
            GadgetSprite {
                position: self.position.to_array(),
                plane_id: self.plane_id as f32,
                scale,
                alpha,
                rotation: 0.0,
                texture_frame: type_frame + frame,
            },
        );
    }
}

/// The gadgets of one ship, oldest first
#[derive(Debug, Clone)]
pub struct Gadgets {
    ship_id: ShipId,
    gadgets: Vec<Gadget>,
    next_local_id: u32,
}

impl Gadgets {
    pub fn new(ship_id: ShipId) -> Self {
        Self {
            ship_id,
            gadgets: Vec::new(),
            next_local_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.gadgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gadgets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gadget> {
        self.gadgets.iter()
    }

    pub fn get(&self, id: GadgetId) -> Option<&Gadget> {
        self.gadgets.iter().find(|g| g.id == id)
    }

    /// Spring the gadget is attached to; `None` if detached or pruned
    pub fn attached_spring_index(&self, id: GadgetId) -> Option<ElementIndex> {
        self.get(id).and_then(Gadget::attached_spring_index)
    }

    pub fn gadget_at_spring(&self, spring_index: ElementIndex) -> Option<GadgetId> {
        self.gadgets
            .iter()
            .find(|g| g.spring_index == Some(spring_index))
            .map(|g| g.id)
    }

    /// Attach a new gadget, evicting the oldest when at capacity
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &mut self,
        gadget_type: GadgetType,
        spring_index: ElementIndex,
        points: &Points,
        springs: &Springs,
        params: &GameParameters,
        ocean: &OceanSurface,
        events: &mut GameEventDispatcher,
    ) -> GadgetId {
        if self.gadgets.len() >= GameParameters::MAX_BOMBS {
            let evicted = self.gadgets.remove(0);
            log::debug!("Bomb limit reached, evicting {:?}", evicted.id);
            events.dispatch(GameEvent::BombRemoved {
                gadget_type: evicted.gadget_type(),
                is_underwater: ocean.is_underwater(evicted.position),
            });
        }

        let id = GadgetId {
            ship_id: self.ship_id,
            local_id: self.next_local_id,
        };
        self.next_local_id += 1;

        let gadget = Gadget::new(id, gadget_type, spring_index, points, springs, params);
        let is_underwater = ocean.is_underwater(gadget.position);
        events.dispatch(GameEvent::BombPlaced { gadget_type, is_underwater });
        if gadget_type == GadgetType::TimerBomb {
            events.dispatch(GameEvent::TimerBombFuse { is_underwater });
        }
        log::debug!("Placed {gadget_type:?} {id:?} on spring {spring_index}");
        self.gadgets.push(gadget);
        id
    }

    /// Remove an idle gadget; gadgets already going off cannot be removed
    pub fn remove(&mut self, id: GadgetId, ocean: &OceanSurface, events: &mut GameEventDispatcher) -> bool {
        let Some(i) = self
            .gadgets
            .iter()
            .position(|g| g.id == id && g.state == GadgetState::Idle)
        else {
            return false;
        };
        let gadget = self.gadgets.remove(i);
        events.dispatch(GameEvent::BombRemoved {
            gadget_type: gadget.gadget_type(),
            is_underwater: ocean.is_underwater(gadget.position),
        });
        true
    }

    pub fn update(&mut self, ctx: &mut GadgetUpdateContext<'_>) {
        self.gadgets.retain_mut(|g| g.update(ctx));
    }

    pub fn on_spring_destroyed(&mut self, spring_index: ElementIndex) {
        for gadget in &mut self.gadgets {
            if gadget.spring_index == Some(spring_index) {
                gadget.on_spring_destroyed();
            }
        }
    }

    /// Disturb idle impact bombs within `radius` of `position`
    pub fn on_neighborhood_disturbed(&mut self, position: Vec2, radius: f32) {
        let radius_sq = radius * radius;
        for gadget in &mut self.gadgets {
            if gadget.kind == GadgetKind::ImpactBomb
                && gadget.state == GadgetState::Idle
                && gadget.position.distance_squared(position) <= radius_sq
            {
                gadget.on_neighborhood_disturbed();
            }
        }
    }

    fn detonate(&mut self, gadget_type: GadgetType) -> usize {
        self.gadgets
            .iter_mut()
            .filter(|g| g.gadget_type() == gadget_type && g.state == GadgetState::Idle)
            .map(|g| g.request_detonation())
            .filter(|armed| *armed)
            .count()
    }

    pub fn detonate_rc_bombs(&mut self) -> usize {
        self.detonate(GadgetType::RcBomb)
    }

    pub fn detonate_anti_matter_bombs(&mut self) -> usize {
        self.detonate(GadgetType::AntiMatterBomb)
    }

    pub fn upload(&self, render: &mut dyn RenderContext) {
        for gadget in &self.gadgets {
            gadget.upload(self.ship_id, render);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::materials::StructuralMaterial;

    #[derive(Default)]
    struct RecordingHandler {
        explosions: Vec<Blast>,
        implosions: u32,
    }

    impl ShipPhysicsHandler for RecordingHandler {
        fn start_explosion(&mut self, _current_simulation_time: f32, blast: Blast) {
            self.explosions.push(blast);
        }

        fn do_anti_matter_bomb_implosion(&mut self, _center: Vec2, _sequence_progress: f32, _strength: f32) {
            self.implosions += 1;
        }
    }

    /// One spring in the air, well above sea level
    fn fixture() -> (Points, Springs) {
        let steel = StructuralMaterial::steel();
        let mut points = Points::with_capacity(2);
        points.add(Vec2::new(0.0, 10.0), &steel, 0);
        points.add(Vec2::new(1.0, 10.0), &steel, 0);
        points.seal();
        let mut springs = Springs::with_capacity(1);
        springs.add(0, 1, &steel, &mut points);
        (points, springs)
    }

    struct Harness {
        params: GameParameters,
        ocean: OceanSurface,
        handler: RecordingHandler,
        events: GameEventDispatcher,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                params: GameParameters::default(),
                ocean: OceanSurface::default(),
                handler: RecordingHandler::default(),
                events: GameEventDispatcher::new(),
            }
        }

        fn update(&mut self, gadget: &mut Gadget, points: &Points, springs: &Springs) -> bool {
            let mut ctx = GadgetUpdateContext {
                current_simulation_time: 0.0,
                params: &self.params,
                points,
                springs,
                ocean: &self.ocean,
                handler: &mut self.handler,
                events: &mut self.events,
            };
            gadget.update(&mut ctx)
        }
    }

    fn gadget(gadget_type: GadgetType, points: &Points, springs: &Springs) -> Gadget {
        let id = GadgetId { ship_id: 0, local_id: 0 };
        Gadget::new(id, gadget_type, 0, points, springs, &GameParameters::default())
    }

    #[test]
    fn test_impact_bomb_stays_idle_when_cool() {
        let (mut points, springs) = fixture();
        let mut h = Harness::new();
        let mut bomb = gadget(GadgetType::ImpactBomb, &points, &springs);
        points.set_temperature(0, GameParameters::BOMBS_TEMPERATURE_TRIGGER - 0.01);
        for _ in 0..1000 {
            assert!(h.update(&mut bomb, &points, &springs));
        }
        assert_eq!(bomb.state(), GadgetState::Idle);
        assert!(h.handler.explosions.is_empty());
    }

    #[test]
    fn test_impact_bomb_lifecycle() {
        let (mut points, springs) = fixture();
        let mut h = Harness::new();
        let mut bomb = gadget(GadgetType::ImpactBomb, &points, &springs);
        assert!(h.update(&mut bomb, &points, &springs));

        points.set_temperature(1, 400.0);
        assert!(h.update(&mut bomb, &points, &springs));
        assert_eq!(bomb.state(), GadgetState::TriggeringExplosion);
        assert!(h.handler.explosions.is_empty());

        assert!(h.update(&mut bomb, &points, &springs));
        assert_eq!(bomb.state(), GadgetState::Exploding { fadeout_counter: 0 });
        assert_eq!(bomb.attached_spring_index(), None);
        assert_eq!(h.handler.explosions.len(), 1);
        assert_eq!(h.handler.explosions[0].blast_strength, 60.0);

        for _ in 0..EXPLOSION_FADEOUT_STEPS_COUNT - 1 {
            assert!(h.update(&mut bomb, &points, &springs));
        }
        assert!(!h.update(&mut bomb, &points, &springs));
        assert_eq!(bomb.state(), GadgetState::Expired);
        assert_eq!(h.handler.explosions.len(), 1);

        let events = h.events.drain();
        assert_eq!(
            events,
            vec![GameEvent::BombExplosion {
                gadget_type: GadgetType::ImpactBomb,
                is_underwater: false,
                count: 1
            }]
        );
    }

    #[test]
    fn test_ultra_violent_blast() {
        let (mut points, springs) = fixture();
        let mut h = Harness::new();
        h.params.is_ultra_violent_mode = true;
        let mut bomb = gadget(GadgetType::ImpactBomb, &points, &springs);
        points.set_temperature(0, 500.0);
        h.update(&mut bomb, &points, &springs);
        h.update(&mut bomb, &points, &springs);
        let blast = h.handler.explosions[0];
        assert_eq!(blast.blast_radius, h.params.bomb_blast_radius * 10.0);
        assert_eq!(blast.blast_heat, h.params.bomb_blast_heat * 1.2 * 10.0);
    }

    #[test]
    fn test_timer_bomb_fuse() {
        let (points, springs) = fixture();
        let mut h = Harness::new();
        h.params.timer_bomb_interval_seconds = 1.0;
        let mut bomb = Gadget::new(
            GadgetId { ship_id: 0, local_id: 0 },
            GadgetType::TimerBomb,
            0,
            &points,
            &springs,
            &h.params,
        );
        let mut frames = 0;
        while bomb.state() == GadgetState::Idle {
            h.update(&mut bomb, &points, &springs);
            frames += 1;
            assert!(frames < 100);
        }
        // 1s at 50Hz, give or take float accumulation
        assert!((49..=51).contains(&frames), "frames={frames}");
    }

    #[test]
    fn test_timer_bomb_defuses_underwater() {
        let (points, springs) = fixture();
        let mut h = Harness::new();
        h.ocean.sea_level = 100.0;
        h.params.timer_bomb_interval_seconds = 0.1;
        let mut bomb = gadget(GadgetType::TimerBomb, &points, &springs);
        bomb.kind = GadgetKind::new(GadgetType::TimerBomb, &h.params);
        for _ in 0..100 {
            h.update(&mut bomb, &points, &springs);
        }
        assert_eq!(bomb.state(), GadgetState::Idle);
        assert_eq!(h.events.drain(), vec![GameEvent::TimerBombDefused { is_underwater: true }]);
    }

    #[test]
    fn test_rc_bomb_waits_for_detonation() {
        let (points, springs) = fixture();
        let mut h = Harness::new();
        let mut bomb = gadget(GadgetType::RcBomb, &points, &springs);
        h.update(&mut bomb, &points, &springs);
        assert_eq!(bomb.state(), GadgetState::Idle);
        assert!(bomb.request_detonation());
        h.update(&mut bomb, &points, &springs);
        assert_eq!(bomb.state(), GadgetState::TriggeringExplosion);
    }

    #[test]
    fn test_anti_matter_implodes_then_explodes() {
        let (points, springs) = fixture();
        let mut h = Harness::new();
        let mut bomb = gadget(GadgetType::AntiMatterBomb, &points, &springs);
        bomb.request_detonation();
        h.update(&mut bomb, &points, &springs);
        assert_eq!(bomb.state(), GadgetState::Imploding { step: 0 });
        for _ in 0..ANTI_MATTER_IMPLOSION_STEPS {
            h.update(&mut bomb, &points, &springs);
        }
        assert_eq!(h.handler.implosions, ANTI_MATTER_IMPLOSION_STEPS);
        assert_eq!(bomb.state(), GadgetState::TriggeringExplosion);
        h.update(&mut bomb, &points, &springs);
        assert_eq!(h.handler.explosions[0].explosion_type, ExplosionType::AntiMatter);
    }

    #[test]
    fn test_collection_evicts_oldest() {
        let (points, springs) = fixture();
        let params = GameParameters::default();
        let ocean = OceanSurface::default();
        let mut events = GameEventDispatcher::new();
        let mut gadgets = Gadgets::new(3);
        let first = gadgets.place(GadgetType::RcBomb, 0, &points, &springs, &params, &ocean, &mut events);
        for _ in 1..GameParameters::MAX_BOMBS {
            gadgets.place(GadgetType::RcBomb, 0, &points, &springs, &params, &ocean, &mut events);
        }
        assert_eq!(gadgets.len(), GameParameters::MAX_BOMBS);
        assert!(gadgets.get(first).is_some());

        let last = gadgets.place(GadgetType::ImpactBomb, 0, &points, &springs, &params, &ocean, &mut events);
        assert_eq!(gadgets.len(), GameParameters::MAX_BOMBS);
        assert!(gadgets.get(first).is_none());
        assert_eq!(last.ship_id, 3);
        assert_eq!(gadgets.attached_spring_index(last), Some(0));
        assert_eq!(gadgets.attached_spring_index(first), None);
    }

    #[test]
    fn test_severed_spring_detaches_and_disturbs() {
        let (points, springs) = fixture();
        let params = GameParameters::default();
        let ocean = OceanSurface::default();
        let mut events = GameEventDispatcher::new();
        let mut gadgets = Gadgets::new(0);
        let id = gadgets.place(GadgetType::ImpactBomb, 0, &points, &springs, &params, &ocean, &mut events);
        gadgets.on_spring_destroyed(0);
        assert_eq!(gadgets.attached_spring_index(id), None);

        let mut handler = RecordingHandler::default();
        let mut ctx = GadgetUpdateContext {
            current_simulation_time: 0.0,
            params: &params,
            points: &points,
            springs: &springs,
            ocean: &ocean,
            handler: &mut handler,
            events: &mut events,
        };
        gadgets.update(&mut ctx);
        assert_eq!(gadgets.get(id).map(Gadget::state), Some(GadgetState::TriggeringExplosion));
    }
}
