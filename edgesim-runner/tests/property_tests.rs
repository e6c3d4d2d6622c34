//! Property tests for the reducer and the bucketizer.
//!
//! Uses proptest to verify:
//! 1. Bucket accounting — counts sum to the input size, percentages to 100
//! 2. Bucket geometry — contiguous ranges spanning [min, max]
//! 3. Percentile order — worst <= median <= best for any sample
//! 4. Profit factor — never NaN, infinite only without losses

use edgesim_core::RunningMoments;
use edgesim_runner::statistics::{sharpe_ratio, sortino_ratio, PercentileSummary};
use edgesim_runner::{bucketize, ProfitFactor};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_balances() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((-1_000_000..50_000_000_i64).prop_map(|c| c as f64), 1..400)
}

// ── 1. Bucket Accounting ─────────────────────────────────────────────

proptest! {
    #[test]
    fn bucket_counts_sum_to_total(values in arb_balances(), n in 1..60_usize) {
        let buckets = bucketize(&values, n);
        let total: usize = buckets.iter().map(|b| b.count).sum();
        prop_assert_eq!(total, values.len());
        let pct: f64 = buckets.iter().map(|b| b.percentage).sum();
        prop_assert!((pct - 100.0).abs() < 1e-6);
    }
}

// ── 2. Bucket Geometry ───────────────────────────────────────────────

proptest! {
    #[test]
    fn buckets_are_contiguous_and_span_range(values in arb_balances(), n in 1..60_usize) {
        let buckets = bucketize(&values, n);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(buckets[0].range_start, min);
        prop_assert_eq!(buckets[buckets.len() - 1].range_end, max);
        for pair in buckets.windows(2) {
            prop_assert_eq!(pair[0].range_end, pair[1].range_start);
        }
        if min < max {
            prop_assert_eq!(buckets.len(), n);
        }
        for v in &values {
            let hits = buckets
                .iter()
                .enumerate()
                .filter(|(i, b)| {
                    let last = *i + 1 == buckets.len();
                    *v >= b.range_start && (*v < b.range_end || (last && *v <= b.range_end))
                })
                .count();
            prop_assert_eq!(hits, 1);
        }
    }
}

// ── 3. Percentile Order ──────────────────────────────────────────────

proptest! {
    #[test]
    fn percentiles_are_ordered(values in prop::collection::vec(-1e6..1e6_f64, 1..500)) {
        let p = PercentileSummary::from_values(values);
        prop_assert!(p.worst_case <= p.median);
        prop_assert!(p.median <= p.best_case);
    }

    #[test]
    fn ratios_are_finite(values in prop::collection::vec(-10.0..10.0_f64, 0..200)) {
        let mut m = RunningMoments::new();
        for v in &values {
            m.push(*v);
        }
        prop_assert!(sharpe_ratio(&m, 15.87).is_finite());
        prop_assert!(sortino_ratio(&m, 15.87).is_finite());
    }
}

// ── 4. Profit Factor ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn profit_factor_never_nan(profit in 0.0..1e6_f64, loss in 0.0..1e6_f64) {
        let pf = ProfitFactor::from_gross(profit, loss);
        prop_assert!(!pf.as_f64().is_nan());
        if pf.is_infinite() {
            prop_assert!(profit > 0.0 && loss == 0.0);
        }
    }
}
