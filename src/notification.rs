//! HUD overlay state produced each frame
//!
//! Holds status text, ephemeral notification lines, texture indicators and
//! one-frame interaction overlays. Overlays set during a frame are uploaded
//! until the next `update` clears them.

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec2;

use crate::render::{HaloInstance, HaloKind, RenderContext, TextAnchor, TextLine, TextureNotification};

const FADE_IN_SECONDS: f32 = 0.5;
const FADE_OUT_SECONDS: f32 = 0.5;
/// Oldest lines are dropped beyond this
const MAX_EPHEMERAL_TEXT_LINES: usize = 8;
pub const DEFAULT_EPHEMERAL_LIFETIME: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatBlasterAction {
    Heat,
    Cool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EphemeralTextState {
    Initial,
    FadingIn,
    Displaying,
    FadingOut,
    Disappearing,
}

#[derive(Debug, Clone, PartialEq)]
struct EphemeralTextLine {
    text: String,
    lifetime: f32,
    state: EphemeralTextState,
    state_start_time: f32,
    state_progress: f32,
}

impl EphemeralTextLine {
    fn alpha(&self) -> f32 {
        match self.state {
            EphemeralTextState::Initial | EphemeralTextState::Disappearing => 0.0,
            EphemeralTextState::FadingIn => self.state_progress,
            EphemeralTextState::Displaying => 1.0,
            EphemeralTextState::FadingOut => 1.0 - self.state_progress,
        }
    }

    fn enter(&mut self, state: EphemeralTextState, now: f32) {
        self.state = state;
        self.state_start_time = now;
        self.state_progress = 0.0;
    }

    fn update(&mut self, now: f32) {
        let elapsed = now - self.state_start_time;
        match self.state {
            EphemeralTextState::Initial => self.enter(EphemeralTextState::FadingIn, now),
            EphemeralTextState::FadingIn => {
                self.state_progress = (elapsed / FADE_IN_SECONDS).min(1.0);
                if elapsed >= FADE_IN_SECONDS {
                    self.enter(EphemeralTextState::Displaying, now);
                }
            }
            EphemeralTextState::Displaying => {
                self.state_progress = (elapsed / self.lifetime).min(1.0);
                if elapsed >= self.lifetime {
                    self.enter(EphemeralTextState::FadingOut, now);
                }
            }
            EphemeralTextState::FadingOut => {
                self.state_progress = (elapsed / FADE_OUT_SECONDS).min(1.0);
                if elapsed >= FADE_OUT_SECONDS {
                    self.enter(EphemeralTextState::Disappearing, now);
                }
            }
            EphemeralTextState::Disappearing => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Overlay {
    center: Vec2,
    radius: f32,
    progress: f32,
    kind: HaloKind,
}

#[derive(Debug, Clone)]
pub struct NotificationLayer {
    is_status_text_enabled: bool,
    is_extended_status_text_enabled: bool,
    status_text_lines: [String; 3],

    ephemeral_text_lines: VecDeque<EphemeralTextLine>,

    is_ultra_violent_mode_indicator_on: bool,
    is_sound_mute_indicator_on: bool,
    is_day_light_cycle_indicator_on: bool,
    is_auto_focus_indicator_on: bool,

    overlays: Vec<Overlay>,
}

impl Default for NotificationLayer {
    fn default() -> Self {
        Self::new(false, false, false, false)
    }
}

impl NotificationLayer {
    pub fn new(is_ultra_violent_mode: bool, is_sound_muted: bool, is_day_light_cycle_on: bool, is_auto_focus_on: bool) -> Self {
        Self {
            is_status_text_enabled: true,
            is_extended_status_text_enabled: false,
            status_text_lines: Default::default(),
            ephemeral_text_lines: VecDeque::new(),
            is_ultra_violent_mode_indicator_on: is_ultra_violent_mode,
            is_sound_mute_indicator_on: is_sound_muted,
            is_day_light_cycle_indicator_on: is_day_light_cycle_on,
            is_auto_focus_indicator_on: is_auto_focus_on,
            overlays: Vec::new(),
        }
    }

    pub fn is_status_text_enabled(&self) -> bool {
        self.is_status_text_enabled
    }

    pub fn set_status_text_enabled(&mut self, is_enabled: bool) {
        self.is_status_text_enabled = is_enabled;
    }

    pub fn is_extended_status_text_enabled(&self) -> bool {
        self.is_extended_status_text_enabled
    }

    pub fn set_extended_status_text_enabled(&mut self, is_enabled: bool) {
        self.is_extended_status_text_enabled = is_enabled;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_status_texts(
        &mut self,
        immediate_fps: f32,
        average_fps: f32,
        elapsed_game_time: Duration,
        is_paused: bool,
        zoom: f32,
        camera: Vec2,
        point_count: usize,
        spring_count: usize,
    ) {
        let seconds = elapsed_game_time.as_secs();
        self.status_text_lines[0] = format!(
            "FPS:{average_fps:.1} ({immediate_fps:.1}) {:02}:{:02}:{:02}{}",
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60,
            if is_paused { " (PAUSED)" } else { "" }
        );
        self.status_text_lines[1] = format!("ZOOM:{zoom:.2} CAM:{:.2}, {:.2}", camera.x, camera.y);
        self.status_text_lines[2] = format!("PNT:{point_count} SPR:{spring_count}");
    }

    pub fn add_ephemeral_text_line(&mut self, text: impl Into<String>, lifetime: Duration) {
        if self.ephemeral_text_lines.len() >= MAX_EPHEMERAL_TEXT_LINES {
            self.ephemeral_text_lines.pop_front();
        }
        self.ephemeral_text_lines.push_back(EphemeralTextLine {
            text: text.into(),
            lifetime: lifetime.as_secs_f32(),
            state: EphemeralTextState::Initial,
            state_start_time: 0.0,
            state_progress: 0.0,
        });
    }

    /// Text and state of the ephemeral lines, top to bottom
    pub fn ephemeral_text_lines(&self) -> impl Iterator<Item = (&str, EphemeralTextState)> {
        self.ephemeral_text_lines.iter().map(|l| (l.text.as_str(), l.state))
    }

    pub fn set_ultra_violent_mode_indicator(&mut self, value: bool) {
        self.is_ultra_violent_mode_indicator_on = value;
    }

    pub fn set_sound_mute_indicator(&mut self, value: bool) {
        self.is_sound_mute_indicator_on = value;
    }

    pub fn set_day_light_cycle_indicator(&mut self, value: bool) {
        self.is_day_light_cycle_indicator_on = value;
    }

    pub fn is_day_light_cycle_indicator_on(&self) -> bool {
        self.is_day_light_cycle_indicator_on
    }

    pub fn set_auto_focus_indicator(&mut self, value: bool) {
        self.is_auto_focus_indicator_on = value;
    }

    // One frame only: gone after the next `update`

    pub fn set_heat_blaster(&mut self, position: Vec2, radius: f32, action: HeatBlasterAction) {
        let kind = match action {
            HeatBlasterAction::Heat => HaloKind::HeatBlasterHeat,
            HeatBlasterAction::Cool => HaloKind::HeatBlasterCool,
        };
        self.set_overlay(position, radius, 0.0, kind);
    }

    pub fn set_fire_extinguisher_spray(&mut self, position: Vec2, radius: f32) {
        self.set_overlay(position, radius, 0.0, HaloKind::FireExtinguisherSpray);
    }

    pub fn set_blast_tool_halo(&mut self, position: Vec2, radius: f32, render_progress: f32) {
        self.set_overlay(position, radius, render_progress, HaloKind::BlastTool);
    }

    pub fn set_pressure_injection_halo(&mut self, position: Vec2, flow_multiplier: f32) {
        self.set_overlay(position, flow_multiplier, 0.0, HaloKind::PressureInjection);
    }

    pub fn set_wind_sphere(&mut self, source: Vec2, main_front_radius: f32, intensity_multiplier: f32) {
        self.set_overlay(source, main_front_radius, intensity_multiplier, HaloKind::WindSphere);
    }

    /// At most one overlay per kind per frame
    fn set_overlay(&mut self, center: Vec2, radius: f32, progress: f32, kind: HaloKind) {
        self.overlays.retain(|o| o.kind != kind);
        self.overlays.push(Overlay {
            center,
            radius,
            progress,
            kind,
        });
    }

    pub fn reset(&mut self) {
        self.ephemeral_text_lines.clear();
        self.overlays.clear();
    }

    /// Advance ephemeral text lines; `now` is wall-clock seconds
    pub fn update(&mut self, now: f32) {
        self.overlays.clear();
        for line in &mut self.ephemeral_text_lines {
            line.update(now);
        }
        self.ephemeral_text_lines
            .retain(|l| l.state != EphemeralTextState::Disappearing);
    }

    pub fn render_upload(&self, render: &mut dyn RenderContext) {
        render.upload_notifications_start();

        if self.is_status_text_enabled {
            let count = if self.is_extended_status_text_enabled { 3 } else { 1 };
            for (ordinal, text) in self.status_text_lines[..count].iter().enumerate() {
                render.upload_text_line(TextLine {
                    anchor: TextAnchor::Status,
                    ordinal,
                    text: text.clone(),
                    alpha: 1.0,
                });
            }
        }

        for (ordinal, line) in self.ephemeral_text_lines.iter().enumerate() {
            render.upload_text_line(TextLine {
                anchor: TextAnchor::Notification,
                ordinal,
                text: line.text.clone(),
                alpha: line.alpha(),
            });
        }

        for (notification, is_on) in [
            (TextureNotification::UltraViolentMode, self.is_ultra_violent_mode_indicator_on),
            (TextureNotification::SoundMuted, self.is_sound_mute_indicator_on),
            (TextureNotification::DayLightCycle, self.is_day_light_cycle_indicator_on),
            (TextureNotification::AutoFocus, self.is_auto_focus_indicator_on),
        ] {
            if is_on {
                render.upload_texture_notification(notification, 1.0);
            }
        }

        for overlay in &self.overlays {
            render.upload_halo(HaloInstance {
                center: overlay.center.to_array(),
                radius: overlay.radius,
                progress: overlay.progress,
                kind: overlay.kind as u32,
            });
        }

        render.upload_notifications_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderBuffers;

    #[test]
    fn test_ephemeral_line_lifecycle() {
        let mut layer = NotificationLayer::default();
        layer.add_ephemeral_text_line("TSUNAMI WARNING!", Duration::from_secs(5));
        let state = |layer: &NotificationLayer| layer.ephemeral_text_lines().next().map(|(_, s)| s);

        assert_eq!(state(&layer), Some(EphemeralTextState::Initial));
        layer.update(10.0);
        assert_eq!(state(&layer), Some(EphemeralTextState::FadingIn));
        layer.update(10.5);
        assert_eq!(state(&layer), Some(EphemeralTextState::Displaying));
        layer.update(15.5);
        assert_eq!(state(&layer), Some(EphemeralTextState::FadingOut));
        layer.update(16.0);
        assert_eq!(state(&layer), None);
    }

    #[test]
    fn test_overlays_last_one_frame() {
        let mut layer = NotificationLayer::default();
        layer.set_heat_blaster(Vec2::ZERO, 2.0, HeatBlasterAction::Cool);
        layer.set_heat_blaster(Vec2::ONE, 3.0, HeatBlasterAction::Cool);
        layer.set_wind_sphere(Vec2::ZERO, 10.0, 1.0);

        let mut buffers = RenderBuffers::new();
        layer.render_upload(&mut buffers);
        let halos = buffers.take_snapshot().halos;
        assert_eq!(halos.len(), 2);
        assert_eq!(halos[0].radius, 3.0);
        assert_eq!(halos[0].kind, HaloKind::HeatBlasterCool as u32);

        // Uploading again without an update repeats the frame
        layer.render_upload(&mut buffers);
        layer.render_upload(&mut buffers);
        assert_eq!(buffers.take_snapshot().halos, halos);

        layer.update(1.0);
        layer.render_upload(&mut buffers);
        assert!(buffers.take_snapshot().halos.is_empty());
    }

    #[test]
    fn test_status_and_indicators_upload() {
        let mut layer = NotificationLayer::new(true, false, true, false);
        layer.set_status_texts(59.5, 60.0, Duration::from_secs(3723), true, 1.0, Vec2::ZERO, 10, 20);
        layer.set_extended_status_text_enabled(true);

        let mut buffers = RenderBuffers::new();
        layer.render_upload(&mut buffers);
        let snapshot = buffers.take_snapshot();
        assert_eq!(snapshot.text_lines.len(), 3);
        assert!(snapshot.text_lines[0].text.contains("01:02:03"));
        assert!(snapshot.text_lines[0].text.ends_with("(PAUSED)"));
        assert_eq!(
            snapshot.texture_notifications,
            vec![(TextureNotification::UltraViolentMode, 1.0), (TextureNotification::DayLightCycle, 1.0)]
        );
    }

    #[test]
    fn test_ephemeral_lines_are_capped() {
        let mut layer = NotificationLayer::default();
        for i in 0..(MAX_EPHEMERAL_TEXT_LINES + 3) {
            layer.add_ephemeral_text_line(format!("line {i}"), DEFAULT_EPHEMERAL_LIFETIME);
        }
        assert_eq!(layer.ephemeral_text_lines().count(), MAX_EPHEMERAL_TEXT_LINES);
        assert_eq!(layer.ephemeral_text_lines().next().map(|(t, _)| t), Some("line 3"));
    }
}
