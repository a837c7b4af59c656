//! Deterministic per-bus and model-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each bus gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (bus_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive bus ids uniformly across the seed space.
//! Boarding draws for a bus therefore never depend on how many draws other
//! buses made, and the environment's draws live on a separate `SimRng`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::Poisson;

use crate::BusId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Draw a Poisson count with the given mean.
///
/// A mean that is zero, negative or non-finite yields 0 without reaching
/// the distribution (which rejects such parameters).
fn poisson_count(rng: &mut SmallRng, mean: f64) -> u32 {
    if !(mean.is_finite() && mean > 0.0) {
        return 0;
    }
    match Poisson::new(mean) {
        Ok(dist) => {
            let draw: f64 = rng.sample(dist);
            draw as u32
        }
        Err(_) => 0,
    }
}

// ── BusRng ────────────────────────────────────────────────────────────────────

/// Per-bus deterministic RNG used for boarding draws.
pub struct BusRng(SmallRng);

impl BusRng {
    /// Seed deterministically from the run's global seed and a bus id.
    pub fn new(global_seed: u64, bus: BusId) -> Self {
        let seed = global_seed ^ (bus.0 as u64).wrapping_mul(MIXING_CONSTANT);
        BusRng(SmallRng::seed_from_u64(seed))
    }

    /// Poisson-distributed passenger count with mean `mean`.
    #[inline]
    pub fn poisson(&mut self, mean: f64) -> u32 {
        poisson_count(&mut self.0, mean)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Model-level RNG for environment redraws and replication seeding.
///
/// Used only in single-threaded contexts.  Replications running in parallel
/// each get their own `SimRng` via [`SimRng::child`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child seed with a different offset.  Used to seed
    /// independent replications deterministically from the root seed.
    pub fn child_seed(&mut self, offset: u64) -> u64 {
        self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT)
    }

    /// Derive a child `SimRng` (see [`SimRng::child_seed`]).
    pub fn child(&mut self, offset: u64) -> SimRng {
        SimRng(SmallRng::seed_from_u64(self.child_seed(offset)))
    }

    /// Uniform draw in `[low, high]`.  Returns `low` when the bounds coincide
    /// or are out of order.
    #[inline]
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.0.gen_range(low..=high)
        } else {
            low
        }
    }

    /// Poisson-distributed count with mean `mean`.
    #[inline]
    pub fn poisson(&mut self, mean: f64) -> u32 {
        poisson_count(&mut self.0, mean)
    }
}
