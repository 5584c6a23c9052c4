//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the single master seed of the run.
//!
//! Each sensor family gets its own RNG stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new family never changes existing families' streams.
//!   - Each family's stream is fully reproducible in isolation.
//!   - Families could be stepped in any order without changing output.

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// A named, deterministic RNG for a single subsystem.
#[derive(Debug, Clone)]
pub struct SubsystemRng {
    pub name: &'static str,
    seed: u64,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// slot index. The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(GOLDEN_GAMMA));
        Self {
            name: "unnamed",
            seed: derived_seed,
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Derive an independent child stream. Depends only on this stream's
    /// seed and `index`, never on how many values were drawn so far.
    pub fn fork(&self, index: u64) -> SubsystemRng {
        let child_seed = self
            .seed
            .rotate_left(17)
            .wrapping_add(index.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA));
        Self {
            name: self.name,
            seed: child_seed,
            inner: Pcg64Mcg::seed_from_u64(child_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll an integer uniformly in [low, high], inclusive on both ends.
    pub fn range_i64(&mut self, low: i64, high: i64) -> i64 {
        assert!(low <= high, "empty range {low}..={high}");
        self.inner.gen_range(low..=high)
    }

    /// Roll a float uniformly in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Bernoulli trial: returns true with probability p.
    /// p <= 0 never fires, p >= 1 always fires.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// All subsystem RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_subsystem(&self, slot: SubsystemSlot) -> SubsystemRng {
        SubsystemRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Occupancy = 0,
    Temperature = 1,
    DoorMotion = 2,
    HumidityCo2 = 3,
    Smoke = 4,
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Occupancy => "occupancy",
            Self::Temperature => "temperature",
            Self::DoorMotion => "door_motion",
            Self::HumidityCo2 => "humidity_co2",
            Self::Smoke => "smoke",
        }
    }
}
