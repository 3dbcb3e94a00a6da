//! Randomness service used to fill block nonces.

use parking_lot::Mutex;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

/// Bounded non-negative integers.
pub trait RandomnessService: Send + Sync {
    /// Returns a value in `[0, bound)`. A zero bound yields 0.
    fn next_below(&self, bound: u64) -> u64;
}

/// Backed by the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomness;

impl OsRandomness {
    pub fn new() -> Self {
        OsRandomness
    }
}

impl RandomnessService for OsRandomness {
    fn next_below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        OsRng.gen_range(0..bound)
    }
}

/// Deterministic generator for reproducible runs and tests.
pub struct SeededRandomness {
    rng: Mutex<StdRng>,
}

impl SeededRandomness {
    pub fn new(seed: u64) -> Self {
        SeededRandomness {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomnessService for SeededRandomness {
    fn next_below(&self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.rng.lock().gen_range(0..bound)
    }
}
