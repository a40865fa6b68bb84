//! Render upload boundary
//!
//! The simulation pushes render-ready data through `RenderContext` during
//! `upload`. `RenderBuffers` records uploads into plain buffers and hands
//! immutable `RenderSnapshot`s to a render thread.

pub mod vertex;

use std::collections::BTreeMap;

pub use vertex::{
    CloudInstance, EphemeralParticleVertex, ExplosionSprite, FishInstance, GadgetSprite,
    HaloInstance, HaloKind, PointAttributes, SpringElement, TriangleElement,
};

use crate::sim::types::ShipId;

/// Where a text line is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Status lines, top-left
    Status,
    /// Ephemeral notifications, top-right
    Notification,
}

/// Texture indicators shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureNotification {
    UltraViolentMode,
    SoundMuted,
    DayLightCycle,
    AutoFocus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub anchor: TextAnchor,
    pub ordinal: usize,
    pub text: String,
    pub alpha: f32,
}

/// Sink for per-frame render data, plus the renderer-owned ambient state
/// that orchestration reads and writes
pub trait RenderContext {
    fn ambient_light_intensity(&self) -> f32;
    fn set_ambient_light_intensity(&mut self, value: f32);
    fn set_pixel_offset(&mut self, x: f32, y: f32);
    fn reset_pixel_offset(&mut self);

    fn upload_ship_start(&mut self, ship_id: ShipId, point_count: usize);
    fn upload_points(&mut self, ship_id: ShipId, points: &[PointAttributes]);
    fn upload_springs(&mut self, ship_id: ShipId, springs: &[SpringElement]);
    fn upload_ropes(&mut self, ship_id: ShipId, ropes: &[SpringElement]);
    fn upload_stressed_springs(&mut self, ship_id: ShipId, springs: &[SpringElement]);
    fn upload_triangles(&mut self, ship_id: ShipId, triangles: &[TriangleElement]);
    fn upload_ephemeral_particles(&mut self, ship_id: ShipId, particles: &[EphemeralParticleVertex]);
    fn upload_gadget(&mut self, ship_id: ShipId, gadget: GadgetSprite);
    fn upload_explosion(&mut self, ship_id: ShipId, explosion: ExplosionSprite);
    fn upload_ship_end(&mut self, ship_id: ShipId);

    fn upload_fishes_start(&mut self, count: usize);
    fn upload_fish(&mut self, fish: FishInstance);
    fn upload_fishes_end(&mut self);

    fn upload_clouds_start(&mut self, count: usize);
    fn upload_cloud(&mut self, cloud: CloudInstance);
    fn upload_clouds_end(&mut self);
    fn upload_cloud_shadows(&mut self, shadows: &[f32]);

    fn upload_notifications_start(&mut self);
    fn upload_text_line(&mut self, line: TextLine);
    fn upload_texture_notification(&mut self, notification: TextureNotification, alpha: f32);
    fn upload_halo(&mut self, halo: HaloInstance);
    fn upload_notifications_end(&mut self);
}

/// Everything uploaded for one ship
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipRenderData {
    pub points: Vec<PointAttributes>,
    pub springs: Vec<SpringElement>,
    pub ropes: Vec<SpringElement>,
    pub stressed_springs: Vec<SpringElement>,
    pub triangles: Vec<TriangleElement>,
    pub ephemeral_particles: Vec<EphemeralParticleVertex>,
    pub gadgets: Vec<GadgetSprite>,
    pub explosions: Vec<ExplosionSprite>,
}

/// Immutable frame handed to the render thread
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSnapshot {
    pub ambient_light_intensity: f32,
    pub pixel_offset: (f32, f32),
    pub ships: BTreeMap<ShipId, ShipRenderData>,
    pub fishes: Vec<FishInstance>,
    pub clouds: Vec<CloudInstance>,
    pub cloud_shadows: Vec<f32>,
    pub text_lines: Vec<TextLine>,
    pub texture_notifications: Vec<(TextureNotification, f32)>,
    pub halos: Vec<HaloInstance>,
}

impl RenderSnapshot {
    pub fn total_points(&self) -> usize {
        self.ships.values().map(|s| s.points.len()).sum()
    }

    pub fn total_springs(&self) -> usize {
        self.ships.values().map(|s| s.springs.len() + s.ropes.len()).sum()
    }
}

/// Recording `RenderContext`
#[derive(Debug, Clone)]
pub struct RenderBuffers {
    current: RenderSnapshot,
}

impl Default for RenderBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBuffers {
    pub fn new() -> Self {
        Self {
            current: RenderSnapshot {
                ambient_light_intensity: 1.0,
                ..Default::default()
            },
        }
    }

    /// Frame recorded so far
    pub fn frame(&self) -> &RenderSnapshot {
        &self.current
    }

    /// Hand off the recorded frame and start a new one; ambient state persists
    pub fn take_snapshot(&mut self) -> RenderSnapshot {
        let next = RenderSnapshot {
            ambient_light_intensity: self.current.ambient_light_intensity,
            pixel_offset: self.current.pixel_offset,
            ..Default::default()
        };
        std::mem::replace(&mut self.current, next)
    }

    fn ship(&mut self, ship_id: ShipId) -> &mut ShipRenderData {
        self.current.ships.entry(ship_id).or_default()
    }
}

impl RenderContext for RenderBuffers {
    fn ambient_light_intensity(&self) -> f32 {
        self.current.ambient_light_intensity
    }

    fn set_ambient_light_intensity(&mut self, value: f32) {
        self.current.ambient_light_intensity = value.clamp(0.0, 1.0);
    }

    fn set_pixel_offset(&mut self, x: f32, y: f32) {
        self.current.pixel_offset = (x, y);
    }

    fn reset_pixel_offset(&mut self) {
        self.current.pixel_offset = (0.0, 0.0);
    }

    fn upload_ship_start(&mut self, ship_id: ShipId, point_count: usize) {
        let ship = self.ship(ship_id);
        *ship = ShipRenderData::default();
        ship.points.reserve(point_count);
    }

    fn upload_points(&mut self, ship_id: ShipId, points: &[PointAttributes]) {
        self.ship(ship_id).points.extend_from_slice(points);
    }

    fn upload_springs(&mut self, ship_id: ShipId, springs: &[SpringElement]) {
        self.ship(ship_id).springs.extend_from_slice(springs);
    }

    fn upload_ropes(&mut self, ship_id: ShipId, ropes: &[SpringElement]) {
        self.ship(ship_id).ropes.extend_from_slice(ropes);
    }

    fn upload_stressed_springs(&mut self, ship_id: ShipId, springs: &[SpringElement]) {
        self.ship(ship_id).stressed_springs.extend_from_slice(springs);
    }

    fn upload_triangles(&mut self, ship_id: ShipId, triangles: &[TriangleElement]) {
        self.ship(ship_id).triangles.extend_from_slice(triangles);
    }

    fn upload_ephemeral_particles(&mut self, ship_id: ShipId, particles: &[EphemeralParticleVertex]) {
        self.ship(ship_id).ephemeral_particles.extend_from_slice(particles);
    }

    fn upload_gadget(&mut self, ship_id: ShipId, gadget: GadgetSprite) {
        self.ship(ship_id).gadgets.push(gadget);
    }

    fn upload_explosion(&mut self, ship_id: ShipId, explosion: ExplosionSprite) {
        self.ship(ship_id).explosions.push(explosion);
    }

    fn upload_ship_end(&mut self, _ship_id: ShipId) {}

    fn upload_fishes_start(&mut self, count: usize) {
        self.current.fishes.clear();
        self.current.fishes.reserve(count);
    }

    fn upload_fish(&mut self, fish: FishInstance) {
        self.current.fishes.push(fish);
    }

    fn upload_fishes_end(&mut self) {}

    fn upload_clouds_start(&mut self, count: usize) {
        self.current.clouds.clear();
        self.current.clouds.reserve(count);
    }

    fn upload_cloud(&mut self, cloud: CloudInstance) {
        self.current.clouds.push(cloud);
    }

    fn upload_clouds_end(&mut self) {}

    fn upload_cloud_shadows(&mut self, shadows: &[f32]) {
        self.current.cloud_shadows.clear();
        self.current.cloud_shadows.extend_from_slice(shadows);
    }

    fn upload_notifications_start(&mut self) {
        self.current.text_lines.clear();
        self.current.texture_notifications.clear();
        self.current.halos.clear();
    }

    fn upload_text_line(&mut self, line: TextLine) {
        self.current.text_lines.push(line);
    }

    fn upload_texture_notification(&mut self, notification: TextureNotification, alpha: f32) {
        self.current.texture_notifications.push((notification, alpha));
    }

    fn upload_halo(&mut self, halo: HaloInstance) {
        self.current.halos.push(halo);
    }

    fn upload_notifications_end(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[test]
    fn test_snapshot_keeps_ambient_state() {
        let mut buffers = RenderBuffers::new();
        buffers.set_ambient_light_intensity(0.25);
        buffers.set_pixel_offset(3.0, 0.0);
        buffers.upload_fish(FishInstance::zeroed());

        let snapshot = buffers.take_snapshot();
        assert_eq!(snapshot.fishes.len(), 1);
        assert!(buffers.frame().fishes.is_empty());
        assert_eq!(buffers.ambient_light_intensity(), 0.25);
        assert_eq!(buffers.frame().pixel_offset, (3.0, 0.0));
    }

    #[test]
    fn test_ship_start_resets_ship_buffers() {
        let mut buffers = RenderBuffers::new();
        buffers.upload_ship_start(0, 1);
        buffers.upload_points(0, &[PointAttributes::zeroed()]);
        buffers.upload_ship_start(0, 1);
        assert!(buffers.frame().ships[&0].points.is_empty());
    }

    #[test]
    fn test_notifications_start_resets_hud_buffers() {
        let mut buffers = RenderBuffers::new();
        buffers.upload_notifications_start();
        buffers.upload_texture_notification(TextureNotification::SoundMuted, 1.0);
        buffers.upload_halo(HaloInstance::zeroed());
        buffers.upload_notifications_start();
        assert!(buffers.frame().texture_notifications.is_empty());
        assert!(buffers.frame().halos.is_empty());
    }

    #[test]
    fn test_ambient_light_is_clamped() {
        let mut buffers = RenderBuffers::new();
        buffers.set_ambient_light_intensity(4.0);
        assert_eq!(buffers.ambient_light_intensity(), 1.0);
    }
}
