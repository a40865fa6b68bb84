//! Spring normalization kernels
//!
//! Per sub-step, every spring needs its length and unit direction. This is
//! the hottest loop of the solver. The batched kernel processes four springs
//! at a time in lane arrays the compiler can keep in SIMD registers:
//! - gather endpoint positions into lanes
//! - reciprocal of the square root of the squared length
//! - zero-length guard by compare-and-mask instead of a branch
//!
//! A zero-length spring normalizes to exactly (0, 0) with length 0.

use glam::Vec2;

use super::types::ElementIndex;

pub const BATCH_SIZE: usize = 4;

/// Reference implementation with a branch per spring
pub fn normalize_springs_naive(
    positions: &[Vec2],
    endpoint_a: &[ElementIndex],
    endpoint_b: &[ElementIndex],
    directions: &mut [Vec2],
    lengths: &mut [f32],
) {
    for s in 0..endpoint_a.len() {
        let d = positions[endpoint_b[s] as usize] - positions[endpoint_a[s] as usize];
        let length = d.length();
        lengths[s] = length;
        directions[s] = if length > 0.0 { d / length } else { Vec2::ZERO };
    }
}

/// Batched, branch-free normalization
///
/// All four slices must have the same length.
pub fn normalize_springs(
    positions: &[Vec2],
    endpoint_a: &[ElementIndex],
    endpoint_b: &[ElementIndex],
    directions: &mut [Vec2],
    lengths: &mut [f32],
) {
    debug_assert_eq!(endpoint_a.len(), endpoint_b.len());
    debug_assert_eq!(endpoint_a.len(), directions.len());
    debug_assert_eq!(endpoint_a.len(), lengths.len());

    let mut a_batches = endpoint_a.chunks_exact(BATCH_SIZE);
    let mut b_batches = endpoint_b.chunks_exact(BATCH_SIZE);
    let mut dir_batches = directions.chunks_exact_mut(BATCH_SIZE);
    let mut len_batches = lengths.chunks_exact_mut(BATCH_SIZE);

    for (((a, b), dirs), lens) in (&mut a_batches).zip(&mut b_batches).zip(&mut dir_batches).zip(&mut len_batches) {
        let (d, l) = normalize_batch(positions, lanes(a, a[0]), lanes(b, a[0]));
        dirs.copy_from_slice(&d);
        lens.copy_from_slice(&l);
    }

    // Tail: pad unused lanes with a degenerate spring, keep only valid lanes
    let a = a_batches.remainder();
    if !a.is_empty() {
        let b = b_batches.remainder();
        let (d, l) = normalize_batch(positions, lanes(a, a[0]), lanes(b, a[0]));
        let n = a.len();
        dir_batches.into_remainder().copy_from_slice(&d[..n]);
        len_batches.into_remainder().copy_from_slice(&l[..n]);
    }
}

#[inline(always)]
fn lanes(indices: &[ElementIndex], pad: ElementIndex) -> [ElementIndex; BATCH_SIZE] {
    std::array::from_fn(|l| indices.get(l).copied().unwrap_or(pad))
}

#[inline(always)]
fn normalize_batch(
    positions: &[Vec2],
    a: [ElementIndex; BATCH_SIZE],
    b: [ElementIndex; BATCH_SIZE],
) -> ([Vec2; BATCH_SIZE], [f32; BATCH_SIZE]) {
    let mut dx = [0.0f32; BATCH_SIZE];
    let mut dy = [0.0f32; BATCH_SIZE];
    for l in 0..BATCH_SIZE {
        let d = positions[b[l] as usize] - positions[a[l] as usize];
        dx[l] = d.x;
        dy[l] = d.y;
    }

    let squared: [f32; BATCH_SIZE] = std::array::from_fn(|l| dx[l] * dx[l] + dy[l] * dy[l]);
    let length = squared.map(f32::sqrt);
    // +inf for zero-length lanes; masked out below
    let inverse = length.map(f32::recip);
    let mask: [u32; BATCH_SIZE] = std::array::from_fn(|l| ((squared[l] != 0.0) as u32).wrapping_neg());

    let directions = std::array::from_fn(|l| {
        Vec2::new(
            f32::from_bits((dx[l] * inverse[l]).to_bits() & mask[l]),
            f32::from_bits((dy[l] * inverse[l]).to_bits() & mask[l]),
        )
    });
    (directions, length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::GameRandom;
    use proptest::prelude::*;

    fn random_springs(n: usize, rng: &mut GameRandom) -> (Vec<Vec2>, Vec<u32>, Vec<u32>) {
        let positions: Vec<Vec2> = (0..n * 2)
            .map(|_| Vec2::new(rng.uniform(-50.0, 50.0), rng.uniform(-50.0, 50.0)))
            .collect();
        let a = (0..n as u32).map(|i| 2 * i).collect();
        let b = (0..n as u32).map(|i| 2 * i + 1).collect();
        (positions, a, b)
    }

    #[test]
    fn test_zero_length_masks_to_zero() {
        let positions = vec![Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0), Vec2::new(0.0, 0.0)];
        // Coincident springs in both the batched body and the tail
        let a = [0, 0, 1, 2, 0];
        let b = [1, 2, 0, 2, 1];
        let mut dirs = [Vec2::splat(f32::NAN); 5];
        let mut lens = [f32::NAN; 5];
        normalize_springs(&positions, &a, &b, &mut dirs, &mut lens);

        for s in [0, 2, 3, 4] {
            assert_eq!(dirs[s], Vec2::ZERO, "spring {s}");
            assert_eq!(lens[s], 0.0);
        }
        assert!((dirs[1] - Vec2::new(-0.6, -0.8)).length() < 1e-6);
        assert_eq!(lens[1], 5.0);
    }

    #[test]
    fn test_unit_length_for_non_degenerate() {
        let mut rng = GameRandom::new(5);
        let (positions, a, b) = random_springs(1003, &mut rng);
        let mut dirs = vec![Vec2::ZERO; a.len()];
        let mut lens = vec![0.0; a.len()];
        normalize_springs(&positions, &a, &b, &mut dirs, &mut lens);
        for d in &dirs {
            assert!((d.length() - 1.0).abs() < 1e-5, "{d:?}");
        }
    }

    #[test]
    fn test_batched_matches_naive() {
        let mut rng = GameRandom::new(11);
        let (positions, a, b) = random_springs(257, &mut rng);
        let n = a.len();
        let (mut d1, mut l1) = (vec![Vec2::ZERO; n], vec![0.0; n]);
        let (mut d2, mut l2) = (vec![Vec2::ZERO; n], vec![0.0; n]);
        normalize_springs_naive(&positions, &a, &b, &mut d1, &mut l1);
        normalize_springs(&positions, &a, &b, &mut d2, &mut l2);
        for s in 0..n {
            assert_eq!(l1[s], l2[s]);
            assert!((d1[s] - d2[s]).length() < 1e-6);
        }
    }

    proptest! {
        #[test]
        fn prop_direction_is_unit_or_masked(
            ax in -1000.0f32..1000.0, ay in -1000.0f32..1000.0,
            dx in -10.0f32..10.0, dy in -10.0f32..10.0,
            is_coincident in any::<bool>(),
        ) {
            let a = Vec2::new(ax, ay);
            let b = if is_coincident { a } else { a + Vec2::new(dx, dy) };
            let positions = [a, b];
            let mut dirs = [Vec2::splat(f32::NAN); 3];
            let mut lens = [f32::NAN; 3];
            normalize_springs(&positions, &[0, 1, 0], &[1, 0, 0], &mut dirs, &mut lens);

            prop_assert_eq!(dirs[2], Vec2::ZERO);
            for d in &dirs[..2] {
                prop_assert!(d.is_finite());
                if lens[0] > 1e-3 {
                    prop_assert!((d.length() - 1.0).abs() < 1e-4);
                } else if lens[0] == 0.0 {
                    prop_assert_eq!(*d, Vec2::ZERO);
                }
            }
        }
    }
}
