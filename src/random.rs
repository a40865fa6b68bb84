//! Seedable random source
//!
//! Passed explicitly into every subsystem that needs randomness, so that a
//! simulation is reproducible from its seed alone.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct GameRandom {
    seed: u64,
    rng: Pcg32,
}

impl GameRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `0..count`; `count` must be non-zero
    pub fn choose(&mut self, count: usize) -> usize {
        debug_assert!(count > 0);
        self.rng.random_range(0..count)
    }

    /// Uniform integer in `min..=max`
    pub fn uniform_int(&mut self, min: u32, max: u32) -> u32 {
        self.rng.random_range(min..=max)
    }

    /// Uniform real in `[min, max)`
    pub fn uniform(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }

    /// Uniform real in `[0, 1)`
    pub fn normalized_uniform(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Normally distributed real (Box-Muller)
    pub fn normal(&mut self, mean: f32, std_dev: f32) -> f32 {
        // Shift into (0, 1] so the log is finite
        let u1 = 1.0 - self.rng.random::<f32>();
        let u2 = self.rng.random::<f32>();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos();
        mean + z * std_dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = GameRandom::new(42);
        let mut b = GameRandom::new(42);
        assert_eq!(a.seed(), 42);
        for _ in 0..100 {
            assert_eq!(a.uniform(-5.0, 5.0), b.uniform(-5.0, 5.0));
            assert_eq!(a.choose(7), b.choose(7));
        }
    }

    #[test]
    fn test_ranges() {
        let mut r = GameRandom::new(7);
        for _ in 0..1000 {
            let v = r.uniform(2.0, 3.0);
            assert!((2.0..3.0).contains(&v));
            assert!(r.choose(4) < 4);
            let n = r.normalized_uniform();
            assert!((0.0..1.0).contains(&n));
            assert!(r.normal(0.0, 1.0).is_finite());
        }
        assert_eq!(r.uniform(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_normal_mean() {
        let mut r = GameRandom::new(99);
        let n = 20_000;
        let mean = (0..n).map(|_| r.normal(10.0, 2.0)).sum::<f32>() / n as f32;
        assert!((mean - 10.0).abs() < 0.1, "mean={mean}");
    }
}
