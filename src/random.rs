// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Random Sources

//! Randomness capabilities for chart generation.
//!
//! Every price-path draw goes through one [`RandomSource`] per chart. The
//! default implementation is a seeded ChaCha8 stream, so a fixed seed
//! reproduces the same candles bit-for-bit. Chart identifiers come from a
//! separate, unseeded source and never touch the price-path stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform and Gaussian sampling. Implementors only need `next_unit`.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform draw in `[min, max)`.
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_unit()
    }

    /// Uniform integer in `[min, max]`, both ends inclusive.
    fn uniform_int(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        (min + (self.next_unit() * span) as usize).min(max)
    }

    /// Standard normal draw via Box-Muller on two uniforms from this stream.
    fn gaussian(&mut self) -> f64 {
        // 1 - u keeps the log argument in (0, 1]
        let u1 = 1.0 - self.next_unit();
        let u2 = self.next_unit();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

// ─── Seeded Stream ──────────────────────────────────────────────────────────

/// ChaCha8-backed source. Instantiate one per chart; never share across charts.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn uniform_int(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

// ─── Unseeded Identifiers ───────────────────────────────────────────────────

/// Cosmetic chart identifier from the thread-local OS-seeded generator.
/// Not reproducible and independent of the price-path stream.
pub fn chart_id() -> String {
    let n: u64 = rand::thread_rng().gen();
    format!("chart-{n:016x}")
}

/// Fresh seed for callers that do not care about reproducibility.
pub fn entropy_seed() -> u64 {
    rand::thread_rng().gen()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..100 {
            assert_eq!(a.gaussian().to_bits(), b.gaussian().to_bits());
            assert_eq!(a.uniform_int(0, 1000), b.uniform_int(0, 1000));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRandom::new(1);
        let mut b = SeededRandom::new(2);
        let xs: Vec<f64> = (0..8).map(|_| a.next_unit()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.next_unit()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn uniform_int_is_inclusive() {
        let mut rng = SeededRandom::new(42);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2000 {
            let v = rng.uniform_int(3, 6);
            assert!((3..=6).contains(&v));
            seen_min |= v == 3;
            seen_max |= v == 6;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn default_uniform_int_stays_in_range() {
        struct Edge(f64);
        impl RandomSource for Edge {
            fn next_unit(&mut self) -> f64 {
                self.0
            }
        }
        assert_eq!(Edge(0.0).uniform_int(10, 29), 10);
        assert_eq!(Edge(0.999_999_999).uniform_int(10, 29), 29);
        assert_eq!(Edge(0.5).uniform_int(5, 5), 5);
    }

    #[test]
    fn gaussian_moments() {
        let mut rng = SeededRandom::new(42);
        let samples: Vec<f64> = (0..20_000).map(|_| rng.gaussian()).collect();
        let mean = stats::mean(&samples);
        let var = stats::variance(&samples);
        assert!(mean.abs() < 0.03, "mean {mean} far from 0");
        assert!((var - 1.0).abs() < 0.05, "variance {var} far from 1");
        assert!(samples.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn uniform_respects_bounds() {
        let mut rng = SeededRandom::new(3);
        for _ in 0..1000 {
            let v = rng.uniform(0.85, 0.95);
            assert!((0.85..0.95).contains(&v));
        }
    }

    #[test]
    fn chart_ids_are_distinct() {
        assert_ne!(chart_id(), chart_id());
        assert!(chart_id().starts_with("chart-"));
    }
}
