//! Random-source handles threaded explicitly through generation and shrinking.
//!
//! Every logical test run owns its own [`StdRng`]. Nothing in the crate reaches
//! for a process-wide generator, so runs stay independent and a recorded seed
//! is enough to replay one.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Trait for providing random number generators
pub trait RngProvider: Send + Sync {
    /// The type of RNG this provider creates
    type Rng: RngCore + Clone + Send;

    /// Create a new RNG instance from a seed
    fn create_rng(&self, seed: u64) -> Self::Rng;

    /// Pick a fresh seed when the caller did not configure one
    fn fresh_seed(&self) -> u64 {
        rand::thread_rng().next_u64()
    }
}

/// Default RNG provider using `StdRng`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRngProvider;

impl RngProvider for DefaultRngProvider {
    type Rng = StdRng;

    fn create_rng(&self, seed: u64) -> Self::Rng {
        StdRng::seed_from_u64(seed)
    }
}

/// An RNG together with the seed it was built from
#[derive(Debug, Clone)]
pub struct SeededRng<R = StdRng> {
    seed: u64,
    rng: R,
}

impl<R: RngCore> SeededRng<R> {
    /// Build from an optional seed, drawing one from entropy when absent
    pub fn from_provider<P>(provider: &P, seed: Option<u64>) -> Self
    where
        P: RngProvider<Rng = R>,
    {
        let seed = seed.unwrap_or_else(|| provider.fresh_seed());
        Self {
            seed,
            rng: provider.create_rng(seed),
        }
    }

    /// The seed that reproduces this stream
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Borrow the generator
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

impl SeededRng<StdRng> {
    /// `StdRng` seeded from `seed`, or from entropy when `None`
    pub fn new(seed: Option<u64>) -> Self {
        Self::from_provider(&DefaultRngProvider, seed)
    }
}

/// Seed for worker `index` of a run seeded with `base`
pub fn worker_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add(index as u64)
}

/// Create a new RNG with a specific seed
pub fn create_seeded_rng(seed: u64) -> StdRng {
    DefaultRngProvider.create_rng(seed)
}
