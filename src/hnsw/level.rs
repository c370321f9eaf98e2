//! Probabilistic layer assignment.
//!
//! Each inserted node draws its top layer from an exponential decay
//! distribution: with `μ = 1 / ln(M)`, the probability of landing exactly on
//! layer `ℓ` is `e^(−ℓ/μ) · (1 − e^(−1/μ))`. For M=16 that puts ~93.75% of
//! nodes on layer 0 alone, which is what gives the hierarchy its logarithmic
//! shape.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Probabilities below this are treated as never happening; the table stops
/// there and any residual mass maps to the last level.
const MIN_LEVEL_PROBABILITY: f64 = 1e-9;

/// Seedable sampler of node top layers.
pub(crate) struct LevelGenerator {
    probabilities: Vec<f64>,
    rng: StdRng,
}

impl LevelGenerator {
    /// Build the probability table for connectivity parameter `m` (must be
    /// at least 2; the caller validates) and seed the RNG. A fixed seed makes
    /// every level sequence, and therefore every graph, reproducible.
    pub(crate) fn new(m: usize, seed: Option<u64>) -> Self {
        let mu = 1.0 / (m as f64).ln();
        let mut probabilities = Vec::new();
        let mut level = 0u32;
        loop {
            let p = (-f64::from(level) / mu).exp() * (1.0 - (-1.0 / mu).exp());
            if p < MIN_LEVEL_PROBABILITY {
                break;
            }
            probabilities.push(p);
            level += 1;
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { probabilities, rng }
    }

    /// Draw one top layer.
    ///
    /// A single uniform draw is walked down the table by subtraction: each
    /// level's probability mass is peeled off until the remainder falls
    /// inside one. Exhausting the table (residual mass below the cutoff)
    /// yields the last level.
    pub(crate) fn sample(&mut self) -> usize {
        let mut u = self.rng.random::<f64>();
        for (level, &p) in self.probabilities.iter().enumerate() {
            if u < p {
                return level;
            }
            u -= p;
        }
        self.probabilities.len() - 1
    }

    #[cfg(test)]
    pub(crate) fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_decays_monotonically() {
        let generator = LevelGenerator::new(16, Some(1));
        let table = generator.probabilities();
        assert!(table.len() > 1);
        for pair in table.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        assert!(*table.last().unwrap() >= MIN_LEVEL_PROBABILITY);
    }

    #[test]
    fn level_zero_mass_matches_formula() {
        // P(level 0) = 1 - e^(-ln M) = 1 - 1/M; for M=16 that is 0.9375.
        let generator = LevelGenerator::new(16, Some(1));
        let p0 = generator.probabilities()[0];
        assert!((p0 - 0.9375).abs() < 1e-6);
    }

    #[test]
    fn empirical_frequencies_track_table() {
        let mut generator = LevelGenerator::new(16, Some(42));
        let samples = 1_000_000;
        let mut counts = vec![0u32; generator.probabilities().len()];
        for _ in 0..samples {
            counts[generator.sample()] += 1;
        }

        let freq0 = f64::from(counts[0]) / f64::from(samples);
        assert!(
            (freq0 - 0.9375).abs() < 0.01,
            "level-0 frequency {} too far from 0.9375",
            freq0
        );

        // Occupancy drops level over level; only judge pairs with enough
        // samples for the comparison to be meaningful.
        for pair in counts.windows(2) {
            if pair[0] >= 100 {
                assert!(pair[1] < pair[0], "occupancy did not decrease: {:?}", counts);
            }
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = LevelGenerator::new(16, Some(99));
        let mut b = LevelGenerator::new(16, Some(99));
        for _ in 0..1000 {
            assert_eq!(a.sample(), b.sample());
        }
    }
}
