//! Spring relaxation solver
//!
//! Explicit Jacobi-style integration: within a sub-step every spring force
//! is computed from the positions left by the previous sub-step, then each
//! point gathers the forces of its own springs and integrates. No point
//! reads another point's new state mid sub-step, so both phases run in
//! parallel without changing the result.
//!
//! Per sub-step:
//! 1. normalize springs (length, direction), masked batch kernel
//! 2. per-spring force: Hooke + damping along the direction
//! 3. per-point gather over connected springs, then integrate

use glam::Vec2;
use rayon::prelude::*;

use super::points::Points;
use super::springs::Springs;
use super::vectorization::{BATCH_SIZE, normalize_springs};
use crate::params::GameParameters;

/// Element count above which phases run on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;
/// Springs per parallel normalization partition; multiple of the batch size
const PARTITION_SIZE: usize = 256 * BATCH_SIZE;

#[derive(Debug, Clone)]
pub struct SpringRelaxationSolver {
    parallel_threshold: usize,
    directions: Vec<Vec2>,
    lengths: Vec<f32>,
    /// Force on endpoint A of each spring; endpoint B receives the opposite
    spring_forces: Vec<Vec2>,
}

impl Default for SpringRelaxationSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SpringRelaxationSolver {
    pub fn new() -> Self {
        Self::with_parallel_threshold(DEFAULT_PARALLEL_THRESHOLD)
    }

    pub fn with_parallel_threshold(parallel_threshold: usize) -> Self {
        Self {
            parallel_threshold,
            directions: Vec::new(),
            lengths: Vec::new(),
            spring_forces: Vec::new(),
        }
    }

    /// Spring lengths from the last sub-step
    pub fn lengths(&self) -> &[f32] {
        &self.lengths
    }

    /// Run all sub-steps of one simulation step
    ///
    /// Spring coefficients must be up to date for the sub-step duration.
    pub fn run(&mut self, points: &mut Points, springs: &Springs, params: &GameParameters) {
        let iterations = params.num_mechanical_dynamics_iterations();
        let dt = params.mechanical_simulation_step_time_duration();
        let damp = GameParameters::GLOBAL_DAMP.powf(1.0 / iterations as f32);

        let n = springs.len();
        self.directions.resize(n, Vec2::ZERO);
        self.lengths.resize(n, 0.0);
        self.spring_forces.resize(n, Vec2::ZERO);

        for _ in 0..iterations {
            self.relax(points, springs, dt, damp);
        }
    }

    fn relax(&mut self, points: &mut Points, springs: &Springs, dt: f32, damp: f32) {
        self.normalize(points, springs);
        self.compute_spring_forces(points, springs);
        self.integrate(points, dt, damp);
    }

    fn normalize(&mut self, points: &Points, springs: &Springs) {
        let positions = &points.position;
        if springs.len() >= self.parallel_threshold {
            self.directions
                .par_chunks_mut(PARTITION_SIZE)
                .zip(self.lengths.par_chunks_mut(PARTITION_SIZE))
                .zip(springs.endpoint_a.par_chunks(PARTITION_SIZE))
                .zip(springs.endpoint_b.par_chunks(PARTITION_SIZE))
                .for_each(|(((d, l), a), b)| normalize_springs(positions, a, b, d, l));
        } else {
            normalize_springs(
                positions,
                &springs.endpoint_a,
                &springs.endpoint_b,
                &mut self.directions,
                &mut self.lengths,
            );
        }
    }

    fn compute_spring_forces(&mut self, points: &Points, springs: &Springs) {
        let velocity = &points.velocity;
        let directions = &self.directions;
        let lengths = &self.lengths;

        let force = |s: usize| -> Vec2 {
            let relative_velocity = velocity[springs.endpoint_b[s] as usize] - velocity[springs.endpoint_a[s] as usize];
            let direction = directions[s];
            let hooke = (lengths[s] - springs.rest_length[s]) * springs.stiffness_coefficient[s];
            let damping = relative_velocity.dot(direction) * springs.damping_coefficient[s];
            direction * (hooke + damping)
        };

        if springs.len() >= self.parallel_threshold {
            self.spring_forces.par_iter_mut().enumerate().for_each(|(s, f)| *f = force(s));
        } else {
            self.spring_forces.iter_mut().enumerate().for_each(|(s, f)| *f = force(s));
        }
    }

    fn integrate(&mut self, points: &mut Points, dt: f32, damp: f32) {
        let n = points.ship_point_count();
        let static_force = &points.static_force;
        let mass = &points.mass;
        let connected_springs = &points.connected_springs;
        let spring_forces = &self.spring_forces;

        let step = |p: usize, position: &mut Vec2, velocity: &mut Vec2| {
            let mut force = static_force[p];
            for c in connected_springs[p].iter() {
                let f = spring_forces[c.spring_index as usize];
                if c.is_endpoint_a {
                    force += f;
                } else {
                    force -= f;
                }
            }
            let delta = *velocity * dt + force * (dt * dt / mass[p]);
            *position += delta;
            *velocity = delta / dt * damp;
        };

        let positions = &mut points.position[..n];
        let velocities = &mut points.velocity[..n];
        if n >= self.parallel_threshold {
            positions
                .par_iter_mut()
                .zip(velocities.par_iter_mut())
                .enumerate()
                .for_each(|(p, (x, v))| step(p, x, v));
        } else {
            positions
                .iter_mut()
                .zip(velocities.iter_mut())
                .enumerate()
                .for_each(|(p, (x, v))| step(p, x, v));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::materials::StructuralMaterial;

    /// Square lattice with diagonals, one corner pulled out of place
    fn lattice(size: usize) -> (Points, Springs) {
        let steel = StructuralMaterial::steel();
        let mut points = Points::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                points.add(Vec2::new(x as f32, y as f32), &steel, 0);
            }
        }
        points.seal();
        let mut springs = Springs::with_capacity(size * size * 4);
        let idx = |x: usize, y: usize| (y * size + x) as u32;
        for y in 0..size {
            for x in 0..size {
                if x + 1 < size {
                    springs.add(idx(x, y), idx(x + 1, y), &steel, &mut points);
                }
                if y + 1 < size {
                    springs.add(idx(x, y), idx(x, y + 1), &steel, &mut points);
                }
                if x + 1 < size && y + 1 < size {
                    springs.add(idx(x, y), idx(x + 1, y + 1), &steel, &mut points);
                    springs.add(idx(x + 1, y), idx(x, y + 1), &steel, &mut points);
                }
            }
        }
        points.set_position(0, Vec2::new(-0.4, -0.3));
        (points, springs)
    }

    fn run_frames(solver: &mut SpringRelaxationSolver, frames: usize, size: usize) -> Vec<Vec2> {
        let params = GameParameters::default();
        let (mut points, mut springs) = lattice(size);
        for _ in 0..frames {
            springs.update_coefficients(&points, &params, params.mechanical_simulation_step_time_duration());
            solver.run(&mut points, &springs, &params);
        }
        points.position[..points.ship_point_count()].to_vec()
    }

    #[test]
    fn test_determinism() {
        let a = run_frames(&mut SpringRelaxationSolver::new(), 20, 6);
        let b = run_frames(&mut SpringRelaxationSolver::new(), 20, 6);
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let serial = run_frames(&mut SpringRelaxationSolver::with_parallel_threshold(usize::MAX), 10, 8);
        let parallel = run_frames(&mut SpringRelaxationSolver::with_parallel_threshold(0), 10, 8);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_displacement_relaxes() {
        let params = GameParameters::default();
        let (mut points, mut springs) = lattice(3);
        let error = |points: &Points, springs: &Springs| -> f32 {
            (0..springs.len() as u32)
                .map(|s| {
                    let l = points.position(springs.endpoint_a(s)).distance(points.position(springs.endpoint_b(s)));
                    (l - springs.rest_length(s)).abs()
                })
                .sum()
        };
        let before = error(&points, &springs);
        let mut solver = SpringRelaxationSolver::new();
        for _ in 0..50 {
            springs.update_coefficients(&points, &params, params.mechanical_simulation_step_time_duration());
            solver.run(&mut points, &springs, &params);
        }
        let after = error(&points, &springs);
        assert!(after < before * 0.5, "before={before} after={after}");
    }

    #[test]
    fn test_coincident_endpoints_stay_finite() {
        let params = GameParameters::default();
        let steel = StructuralMaterial::steel();
        let mut points = Points::with_capacity(2);
        points.add(Vec2::ZERO, &steel, 0);
        points.add(Vec2::new(1.0, 0.0), &steel, 0);
        points.seal();
        let mut springs = Springs::with_capacity(1);
        springs.add(0, 1, &steel, &mut points);
        points.set_position(1, Vec2::ZERO);

        let mut solver = SpringRelaxationSolver::new();
        springs.update_coefficients(&points, &params, params.mechanical_simulation_step_time_duration());
        solver.run(&mut points, &springs, &params);
        assert!(points.position(0).is_finite());
        assert!(points.position(1).is_finite());
    }
}
