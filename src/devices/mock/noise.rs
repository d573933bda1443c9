//! Seedable noise source for simulated readings

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, StandardNormal, Uniform};

/// Noise generator with configurable seed for reproducibility
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Seed 0 draws from entropy; any other seed is reproducible.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    #[inline]
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }

    /// Uniform in [0, 1)
    #[inline]
    pub fn uniform(&mut self) -> f32 {
        Uniform::new(0.0f32, 1.0).sample(&mut self.rng)
    }

    /// Returns true with given probability
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        probability > 0.0 && self.uniform() < probability
    }

    /// Add gaussian noise to an ADC reading, clamped to `0..=max`
    pub fn perturb_counts(&mut self, counts: u16, stddev: f32, max: u16) -> u16 {
        let noisy = f32::from(counts) + self.gaussian(stddev);
        noisy.round().clamp(0.0, f32::from(max)) as u16
    }
}
