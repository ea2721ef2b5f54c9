//! Owned, seedable random source
//!
//! Every random decision in the engine draws from one `NoiseSource`, so a
//! fixed seed reproduces a render exactly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Number of distinct noise values; draws are quantized to 1/32768 steps.
const NOISE_STEPS: u32 = 65_536;
const HALF_STEPS: f32 = 32_768.0;

/// Pseudo-random generator for noise and stochastic scheduling
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: Pcg32,
}

impl NoiseSource {
    /// Create a deterministic source
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Create a source seeded from the thread-local entropy pool
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// Uniform value in [-1, 1)
    pub fn bipolar(&mut self) -> f32 {
        self.rng.gen_range(0..NOISE_STEPS) as f32 / HALF_STEPS - 1.0
    }

    /// Uniform index in [0, len). `len` of zero is treated as one.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }
}
