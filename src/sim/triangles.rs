//! Triangle storage
//!
//! Triangles carry no physical state beyond their vertices. They are
//! invalidated when one of their edges is severed, or when they collapse
//! (area shrinks below a fraction of the rest area, or inverts).

use super::points::Points;
use super::types::ElementIndex;
use crate::render::TriangleElement;

/// Fraction of the rest area below which a triangle counts as collapsed
pub const COLLAPSE_AREA_FRACTION: f32 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct Triangles {
    pub(crate) point_a: Vec<ElementIndex>,
    pub(crate) point_b: Vec<ElementIndex>,
    pub(crate) point_c: Vec<ElementIndex>,
    /// Signed, counter-clockwise positive
    pub(crate) rest_area: Vec<f32>,
    pub(crate) is_deleted: Vec<bool>,
}

impl Triangles {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            point_a: Vec::with_capacity(capacity),
            point_b: Vec::with_capacity(capacity),
            point_c: Vec::with_capacity(capacity),
            rest_area: Vec::with_capacity(capacity),
            is_deleted: Vec::with_capacity(capacity),
        }
    }

    /// Returns `None` when a vertex already has the maximum triangle count
    pub fn add(&mut self, a: ElementIndex, b: ElementIndex, c: ElementIndex, points: &mut Points) -> Option<ElementIndex> {
        if [a, b, c].iter().any(|&p| points.connected_triangles(p).is_full()) {
            return None;
        }
        let t = self.point_a.len() as ElementIndex;
        for p in [a, b, c] {
            points.connect_triangle(p, t);
        }
        self.point_a.push(a);
        self.point_b.push(b);
        self.point_c.push(c);
        self.rest_area.push(signed_area(points, a, b, c));
        self.is_deleted.push(false);
        Some(t)
    }

    pub fn len(&self) -> usize {
        self.point_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_a.is_empty()
    }

    pub fn is_deleted(&self, t: ElementIndex) -> bool {
        self.is_deleted[t as usize]
    }

    pub fn vertices(&self, t: ElementIndex) -> [ElementIndex; 3] {
        let i = t as usize;
        [self.point_a[i], self.point_b[i], self.point_c[i]]
    }

    pub fn live_count(&self) -> usize {
        self.is_deleted.iter().filter(|d| !**d).count()
    }

    pub(crate) fn destroy(&mut self, t: ElementIndex, points: &mut Points) {
        let i = t as usize;
        if self.is_deleted[i] {
            return;
        }
        for p in self.vertices(t) {
            points.disconnect_triangle(p, t);
        }
        self.is_deleted[i] = true;
    }

    /// Live triangles having both `a` and `b` as vertices
    pub fn with_edge(&self, a: ElementIndex, b: ElementIndex, points: &Points) -> Vec<ElementIndex> {
        points
            .connected_triangles(a)
            .iter()
            .copied()
            .filter(|&t| !self.is_deleted(t) && self.vertices(t).contains(&b))
            .collect()
    }

    /// Destroy every triangle sharing edge (a, b); returns how many
    pub(crate) fn destroy_with_edge(&mut self, a: ElementIndex, b: ElementIndex, points: &mut Points) -> usize {
        let doomed = self.with_edge(a, b, points);
        for &t in &doomed {
            self.destroy(t, points);
        }
        doomed.len()
    }

    pub fn area(&self, t: ElementIndex, points: &Points) -> f32 {
        let [a, b, c] = self.vertices(t);
        signed_area(points, a, b, c)
    }

    pub fn is_collapsed(&self, t: ElementIndex, points: &Points) -> bool {
        let rest = self.rest_area[t as usize];
        if rest == 0.0 {
            return false;
        }
        self.area(t, points) / rest < COLLAPSE_AREA_FRACTION
    }

    /// Destroy collapsed or inverted triangles; returns how many
    pub(crate) fn destroy_collapsed(&mut self, points: &mut Points) -> usize {
        let collapsed: Vec<ElementIndex> = (0..self.len() as ElementIndex)
            .filter(|&t| !self.is_deleted(t) && self.is_collapsed(t, points))
            .collect();
        for &t in &collapsed {
            self.destroy(t, points);
        }
        collapsed.len()
    }

    pub fn render_elements(&self) -> Vec<TriangleElement> {
        (0..self.len())
            .filter(|&i| !self.is_deleted[i])
            .map(|i| TriangleElement {
                point_a: self.point_a[i],
                point_b: self.point_b[i],
                point_c: self.point_c[i],
            })
            .collect()
    }
}

fn signed_area(points: &Points, a: ElementIndex, b: ElementIndex, c: ElementIndex) -> f32 {
    let pa = points.position(a);
    (points.position(b) - pa).perp_dot(points.position(c) - pa) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::materials::StructuralMaterial;
    use glam::Vec2;

    fn quad() -> (Points, Triangles) {
        let steel = StructuralMaterial::steel();
        let mut points = Points::with_capacity(4);
        points.add(Vec2::new(0.0, 0.0), &steel, 0);
        points.add(Vec2::new(1.0, 0.0), &steel, 0);
        points.add(Vec2::new(1.0, 1.0), &steel, 0);
        points.add(Vec2::new(0.0, 1.0), &steel, 0);
        points.seal();
        let mut triangles = Triangles::with_capacity(2);
        triangles.add(0, 1, 2, &mut points).unwrap();
        triangles.add(0, 2, 3, &mut points).unwrap();
        (points, triangles)
    }

    #[test]
    fn test_rest_area() {
        let (points, triangles) = quad();
        assert_eq!(triangles.area(0, &points), 0.5);
        assert!(!triangles.is_collapsed(0, &points));
    }

    #[test]
    fn test_destroy_with_shared_edge() {
        let (mut points, mut triangles) = quad();
        // Diagonal 0-2 is shared by both
        assert_eq!(triangles.destroy_with_edge(0, 2, &mut points), 2);
        assert_eq!(triangles.live_count(), 0);
        assert!(points.connected_triangles(0).is_empty());
        assert!(triangles.render_elements().is_empty());
    }

    #[test]
    fn test_destroy_with_outer_edge() {
        let (mut points, mut triangles) = quad();
        assert_eq!(triangles.destroy_with_edge(2, 3, &mut points), 1);
        assert!(triangles.is_deleted(1));
        assert!(!triangles.is_deleted(0));
    }

    #[test]
    fn test_inverted_triangle_collapses() {
        let (mut points, mut triangles) = quad();
        points.set_position(2, Vec2::new(1.0, -1.0));
        assert!(triangles.is_collapsed(0, &points));
        assert_eq!(triangles.destroy_collapsed(&mut points), 1);
        assert!(triangles.is_deleted(0));
    }
}
