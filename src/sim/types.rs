//! Index and identifier types shared across the simulation

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Index into a structure-of-arrays element buffer
pub type ElementIndex = u32;

/// Draw-order and partition key of a point
pub type PlaneId = u32;

pub type ShipId = u32;

/// Gadget identity, unique within the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GadgetId {
    pub ship_id: ShipId,
    pub local_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GadgetType {
    ImpactBomb,
    TimerBomb,
    RcBomb,
    AntiMatterBomb,
}

/// The part of the world currently on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleWorld {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Default for VisibleWorld {
    fn default() -> Self {
        Self {
            center: Vec2::new(0.0, -20.0),
            width: 200.0,
            height: 112.5,
        }
    }
}

impl VisibleWorld {
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.center.x - self.width / 2.0, self.center.y + self.height / 2.0)
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.center.x + self.width / 2.0, self.center.y - self.height / 2.0)
    }
}

/// Inline vector with fixed capacity, for per-point connectivity
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeVec<T: Copy + Default, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> Default for FixedSizeVec<T, N> {
    fn default() -> Self {
        Self {
            items: [T::default(); N],
            len: 0,
        }
    }
}

impl<T: Copy + Default, const N: usize> FixedSizeVec<T, N> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Returns false when full
    pub fn push(&mut self, item: T) -> bool {
        if self.len == N {
            return false;
        }
        self.items[self.len] = item;
        self.len += 1;
        true
    }

    /// Order-preserving removal of the first item matching `predicate`
    pub fn remove_first(&mut self, predicate: impl Fn(&T) -> bool) -> bool {
        if let Some(i) = self.as_slice().iter().position(predicate) {
            self.items.copy_within(i + 1..self.len, i);
            self.len -= 1;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_size_vec_capacity() {
        let mut v: FixedSizeVec<u32, 2> = FixedSizeVec::default();
        assert!(v.push(1));
        assert!(v.push(2));
        assert!(!v.push(3));
        assert!(v.is_full());
        assert_eq!(v.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_fixed_size_vec_remove_preserves_order() {
        let mut v: FixedSizeVec<u32, 4> = FixedSizeVec::default();
        for i in 0..4 {
            v.push(i);
        }
        assert!(v.remove_first(|&x| x == 1));
        assert_eq!(v.as_slice(), &[0, 2, 3]);
        assert!(!v.remove_first(|&x| x == 9));
    }

    #[test]
    fn test_visible_world_corners() {
        let vw = VisibleWorld {
            center: Vec2::new(10.0, 0.0),
            width: 20.0,
            height: 10.0,
        };
        assert_eq!(vw.top_left(), Vec2::new(0.0, 5.0));
        assert_eq!(vw.bottom_right(), Vec2::new(20.0, -5.0));
    }
}
