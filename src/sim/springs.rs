//! Spring storage
//!
//! Springs are never removed from the buffers: a severed spring keeps its
//! slot with `is_deleted` set and zero coefficients, so indices stay stable
//! and the solver can run over the whole buffer without branching.

use glam::Vec2;

use super::materials::StructuralMaterial;
use super::points::{ConnectedSpring, Points};
use super::types::ElementIndex;
use crate::params::GameParameters;
use crate::render::SpringElement;

/// Strain fraction of the break threshold above which a spring shows as stressed
pub const STRESSED_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct Springs {
    pub(crate) endpoint_a: Vec<ElementIndex>,
    pub(crate) endpoint_b: Vec<ElementIndex>,
    pub(crate) rest_length: Vec<f32>,
    pub(crate) material_stiffness: Vec<f32>,
    pub(crate) material_strength: Vec<f32>,
    pub(crate) is_rope: Vec<bool>,
    pub(crate) is_deleted: Vec<bool>,

    // Recomputed every frame from masses and adjustments
    pub(crate) stiffness_coefficient: Vec<f32>,
    pub(crate) damping_coefficient: Vec<f32>,

    /// Strain over break threshold, from the last strain check
    pub(crate) stress: Vec<f32>,
}

impl Springs {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            endpoint_a: Vec::with_capacity(capacity),
            endpoint_b: Vec::with_capacity(capacity),
            rest_length: Vec::with_capacity(capacity),
            material_stiffness: Vec::with_capacity(capacity),
            material_strength: Vec::with_capacity(capacity),
            is_rope: Vec::with_capacity(capacity),
            is_deleted: Vec::with_capacity(capacity),
            stiffness_coefficient: Vec::with_capacity(capacity),
            damping_coefficient: Vec::with_capacity(capacity),
            stress: Vec::with_capacity(capacity),
        }
    }

    /// Add a spring between two points, registering it with both endpoints.
    /// Returns `None` when either endpoint is already fully connected.
    pub fn add(
        &mut self,
        a: ElementIndex,
        b: ElementIndex,
        material: &StructuralMaterial,
        points: &mut Points,
    ) -> Option<ElementIndex> {
        debug_assert!(a != b);
        if points.connected_springs(a).is_full() || points.connected_springs(b).is_full() {
            return None;
        }

        let s = self.endpoint_a.len() as ElementIndex;
        points.connect_spring(a, ConnectedSpring { spring_index: s, other_endpoint_index: b, is_endpoint_a: true });
        points.connect_spring(b, ConnectedSpring { spring_index: s, other_endpoint_index: a, is_endpoint_a: false });

        self.endpoint_a.push(a);
        self.endpoint_b.push(b);
        self.rest_length.push(points.position(a).distance(points.position(b)));
        self.material_stiffness.push(material.stiffness);
        self.material_strength.push(material.strength);
        self.is_rope.push(material.is_rope);
        self.is_deleted.push(false);
        self.stiffness_coefficient.push(0.0);
        self.damping_coefficient.push(0.0);
        self.stress.push(0.0);
        Some(s)
    }

    pub fn len(&self) -> usize {
        self.endpoint_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoint_a.is_empty()
    }

    pub fn endpoint_a(&self, s: ElementIndex) -> ElementIndex {
        self.endpoint_a[s as usize]
    }

    pub fn endpoint_b(&self, s: ElementIndex) -> ElementIndex {
        self.endpoint_b[s as usize]
    }

    pub fn rest_length(&self, s: ElementIndex) -> f32 {
        self.rest_length[s as usize]
    }

    pub fn is_rope(&self, s: ElementIndex) -> bool {
        self.is_rope[s as usize]
    }

    pub fn is_deleted(&self, s: ElementIndex) -> bool {
        self.is_deleted[s as usize]
    }

    pub fn stress(&self, s: ElementIndex) -> f32 {
        self.stress[s as usize]
    }

    /// Number of springs not yet severed
    pub fn live_count(&self) -> usize {
        self.is_deleted.iter().filter(|d| !**d).count()
    }

    pub fn midpoint(&self, s: ElementIndex, points: &Points) -> Vec2 {
        (points.position(self.endpoint_a(s)) + points.position(self.endpoint_b(s))) / 2.0
    }

    /// Sever a spring: detach it from its endpoints and zero its coefficients
    pub(crate) fn destroy(&mut self, s: ElementIndex, points: &mut Points) {
        let i = s as usize;
        debug_assert!(!self.is_deleted[i], "spring {s} already deleted");
        points.disconnect_spring(self.endpoint_a[i], s);
        points.disconnect_spring(self.endpoint_b[i], s);
        self.is_deleted[i] = true;
        self.stiffness_coefficient[i] = 0.0;
        self.damping_coefficient[i] = 0.0;
        self.stress[i] = 0.0;
    }

    /// Hooke and damping coefficients for one solver sub-step of `dt`
    ///
    /// Scaled by the reduced mass of the endpoints so that every spring
    /// removes the same fraction of its displacement per sub-step.
    pub fn update_coefficients(&mut self, points: &Points, params: &GameParameters, dt: f32) {
        let stiffness = GameParameters::SPRING_REDUCTION_FRACTION * params.spring_stiffness_adjustment / (dt * dt);
        let damping = GameParameters::SPRING_DAMPING_COEFFICIENT * params.spring_damping_adjustment / dt;
        for i in 0..self.len() {
            if self.is_deleted[i] {
                continue;
            }
            let ma = points.mass[self.endpoint_a[i] as usize];
            let mb = points.mass[self.endpoint_b[i] as usize];
            let mass_factor = (ma * mb) / (ma + mb);
            self.stiffness_coefficient[i] = stiffness * self.material_stiffness[i] * mass_factor;
            self.damping_coefficient[i] = damping * mass_factor;
        }
    }

    /// Break threshold on relative elongation, weakened by endpoint decay
    pub fn break_strain(&self, s: ElementIndex, points: &Points, params: &GameParameters) -> f32 {
        let i = s as usize;
        let decay = points.decay(self.endpoint_a[i]).min(points.decay(self.endpoint_b[i]));
        self.material_strength[i] * params.spring_strength_adjustment * decay
    }

    /// Live springs split into (springs, ropes, stressed springs) for upload
    pub fn render_elements(&self) -> (Vec<SpringElement>, Vec<SpringElement>, Vec<SpringElement>) {
        let mut springs = Vec::with_capacity(self.len());
        let mut ropes = Vec::new();
        let mut stressed = Vec::new();
        for i in 0..self.len() {
            if self.is_deleted[i] {
                continue;
            }
            let element = SpringElement { point_a: self.endpoint_a[i], point_b: self.endpoint_b[i] };
            if self.is_rope[i] {
                ropes.push(element);
            } else {
                springs.push(element);
            }
            if self.stress[i] > STRESSED_THRESHOLD {
                stressed.push(element);
            }
        }
        (springs, ropes, stressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Points, Springs) {
        let steel = StructuralMaterial::steel();
        let mut points = Points::with_capacity(2);
        points.add(Vec2::ZERO, &steel, 0);
        points.add(Vec2::new(2.0, 0.0), &steel, 0);
        points.seal();
        let mut springs = Springs::with_capacity(1);
        springs.add(0, 1, &steel, &mut points).unwrap();
        (points, springs)
    }

    #[test]
    fn test_add_registers_connectivity() {
        let (points, springs) = pair();
        assert_eq!(springs.rest_length(0), 2.0);
        let c = points.connected_springs(1).as_slice()[0];
        assert_eq!(c.other_endpoint_index, 0);
        assert!(!c.is_endpoint_a);
        assert!(points.connected_springs(0).as_slice()[0].is_endpoint_a);
    }

    #[test]
    fn test_destroy_disconnects_and_zeroes() {
        let (mut points, mut springs) = pair();
        springs.update_coefficients(&points, &GameParameters::default(), 0.02 / 24.0);
        assert!(springs.stiffness_coefficient[0] > 0.0);

        springs.destroy(0, &mut points);
        assert!(springs.is_deleted(0));
        assert_eq!(springs.stiffness_coefficient[0], 0.0);
        assert!(points.connected_springs(0).is_empty());
        assert!(points.connected_springs(1).is_empty());
        assert_eq!(springs.live_count(), 0);

        // Coefficients of severed springs stay zero
        springs.update_coefficients(&points, &GameParameters::default(), 0.02 / 24.0);
        assert_eq!(springs.stiffness_coefficient[0], 0.0);
    }

    #[test]
    fn test_connectivity_limit() {
        let steel = StructuralMaterial::steel();
        let mut points = Points::with_capacity(11);
        for i in 0..11 {
            points.add(Vec2::new(i as f32, 1.0), &steel, 0);
        }
        points.seal();
        let mut springs = Springs::with_capacity(10);
        for i in 1..=GameParameters::MAX_SPRINGS_PER_POINT as u32 {
            assert!(springs.add(0, i, &steel, &mut points).is_some());
        }
        assert!(springs.add(0, 10, &steel, &mut points).is_none());
    }

    #[test]
    fn test_break_strain_follows_decay() {
        let (mut points, springs) = pair();
        let params = GameParameters::default();
        let pristine = springs.break_strain(0, &points, &params);
        points.decay[1] = 0.5;
        assert!((springs.break_strain(0, &points, &params) - pristine * 0.5).abs() < 1e-6);
    }
}
