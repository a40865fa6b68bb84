//! GPU-ready vertex and instance types for render uploads

use bytemuck::{Pod, Zeroable};

/// Per-point attributes of a ship point
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointAttributes {
    pub position: [f32; 2],
    pub water: f32,
    /// Kelvin
    pub temperature: f32,
    /// 1.0 = pristine, 0.0 = fully decayed
    pub decay: f32,
    pub plane_id: f32,
}

/// Two point indices forming a spring or rope
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct SpringElement {
    pub point_a: u32,
    pub point_b: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct TriangleElement {
    pub point_a: u32,
    pub point_b: u32,
    pub point_c: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct EphemeralParticleVertex {
    pub position: [f32; 2],
    /// Discriminant of `EphemeralKind`
    pub kind: u32,
    /// 0.0 at birth, 1.0 at end of life
    pub progress: f32,
    pub plane_id: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GadgetSprite {
    pub position: [f32; 2],
    pub plane_id: f32,
    pub scale: f32,
    pub alpha: f32,
    /// Radians
    pub rotation: f32,
    /// Texture frame, one per gadget type and state
    pub texture_frame: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ExplosionSprite {
    pub center: [f32; 2],
    pub plane_id: f32,
    pub radius: f32,
    pub progress: f32,
    /// Discriminant of `ExplosionType`
    pub kind: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct FishInstance {
    pub position: [f32; 2],
    pub angle_cw: f32,
    /// Negative when the sprite is mirrored
    pub horizontal_scale: f32,
    pub tail_x: f32,
    /// Tail-flap amplitude in [-1, 1]
    pub progress: f32,
    pub texture_frame: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CloudInstance {
    pub id: u32,
    /// NDC
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub scale: f32,
    pub darkening: f32,
    pub growth_progress: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct HaloInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub progress: f32,
    /// Discriminant of `HaloKind`
    pub kind: u32,
}

/// Overlay kinds carried by `HaloInstance::kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum HaloKind {
    HeatBlasterHeat = 0,
    HeatBlasterCool = 1,
    FireExtinguisherSpray = 2,
    BlastTool = 3,
    PressureInjection = 4,
    WindSphere = 5,
}
