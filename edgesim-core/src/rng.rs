//! Random sources and the deterministic RNG hierarchy.
//!
//! Every draw the simulators make goes through [`UniformSource`], so tests can
//! swap in a scripted [`SequenceSource`] without touching call sites.
//!
//! A master seed generates deterministic sub-seeds for each `(stream, run_index)`
//! pair. Sub-seeds are derived via BLAKE3 hashing, independently of thread
//! scheduling order, so an ensemble produces identical runs regardless of
//! thread count.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Capability to produce uniform floats in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl UniformSource for StdRng {
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl<T: UniformSource + ?Sized> UniformSource for &mut T {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// Values are clamped into `[0, 1)` so a script can never produce a draw the
/// generator would consider out of range.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    draws: Vec<f64>,
    pos: usize,
}

impl SequenceSource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, pos: 0 }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let v = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Deterministic RNG hierarchy.
///
/// The master seed is expanded into per-(stream, run) sub-seeds using BLAKE3.
/// Because derivation is hash-based (not order-dependent), run 17 of a
/// 10 000-run ensemble sees the same stream whether it executes first, last,
/// or on another thread.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a specific (stream, run_index).
    pub fn sub_seed(&self, stream: &str, run_index: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&run_index.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Create a seeded StdRng for one run.
    pub fn rng_for(&self, stream: &str, run_index: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, run_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_seeds_are_deterministic() {
        let hierarchy = RngHierarchy::new(42);
        assert_eq!(
            hierarchy.sub_seed("per_trade", 0),
            hierarchy.sub_seed("per_trade", 0)
        );
    }

    #[test]
    fn different_runs_different_seeds() {
        let hierarchy = RngHierarchy::new(42);
        assert_ne!(
            hierarchy.sub_seed("per_trade", 0),
            hierarchy.sub_seed("per_trade", 1)
        );
    }

    #[test]
    fn different_streams_different_seeds() {
        let hierarchy = RngHierarchy::new(42);
        assert_ne!(
            hierarchy.sub_seed("per_trade", 3),
            hierarchy.sub_seed("daily", 3)
        );
    }

    #[test]
    fn derivation_order_independent() {
        let hierarchy = RngHierarchy::new(7);
        let a_first = hierarchy.sub_seed("daily", 5);
        let b_second = hierarchy.sub_seed("daily", 9);
        let b_first = hierarchy.sub_seed("daily", 9);
        let a_second = hierarchy.sub_seed("daily", 5);
        assert_eq!(a_first, a_second);
        assert_eq!(b_first, b_second);
    }

    #[test]
    fn different_master_seeds_different_output() {
        let h1 = RngHierarchy::new(42);
        let h2 = RngHierarchy::new(43);
        assert_ne!(h1.sub_seed("daily", 0), h2.sub_seed("daily", 0));
    }

    #[test]
    fn std_rng_draws_stay_in_unit_interval() {
        let mut rng = RngHierarchy::new(1).rng_for("per_trade", 0);
        for _ in 0..10_000 {
            let u = rng.next_uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn sequence_source_wraps_and_clamps() {
        let mut src = SequenceSource::new(vec![0.25, 1.5, -0.1]);
        assert_eq!(src.next_uniform(), 0.25);
        assert!(src.next_uniform() < 1.0);
        assert_eq!(src.next_uniform(), 0.0);
        assert_eq!(src.next_uniform(), 0.25);
        assert_eq!(src.consumed(), 4);
    }

    #[test]
    fn empty_sequence_yields_zero() {
        let mut src = SequenceSource::new(vec![]);
        assert_eq!(src.next_uniform(), 0.0);
    }
}
