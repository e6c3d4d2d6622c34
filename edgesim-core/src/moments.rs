//! Mergeable running moments for return series.
//!
//! Sharpe and Sortino need the mean, variance and downside second moment of
//! every per-trade (or per-day) return in the ensemble. Keeping the returns
//! would cost O(runs x trades); these accumulators cost O(1) per run and merge
//! in run order.

use serde::{Deserialize, Serialize};

/// Welford mean/M2 plus the downside sum of squares (returns below zero).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMoments {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
    pub downside_sq: f64,
}

impl RunningMoments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        if x < 0.0 {
            self.downside_sq += x * x;
        }
    }

    /// Combine two disjoint samples (Chan et al. pairwise update).
    pub fn merge(&mut self, other: &RunningMoments) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.downside_sq += other.downside_sq;
        self.count += other.count;
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.m2 / self.count as f64).max(0.0)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Downside deviation over the full sample size (Sortino convention).
    pub fn downside_deviation(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.downside_sq / self.count as f64).sqrt()
    }
}
