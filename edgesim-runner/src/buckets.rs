//! Distribution bucketizer — fixed-width histogram over terminal balances.
//!
//! Buckets span `[min, max]` of the ensemble in `bucket_count` equal-width
//! ranges. Each bucket is half-open `[range_start, range_end)`, except the last
//! which also holds the maximum. Empty buckets are kept so the ranges are
//! contiguous.

use serde::{Deserialize, Serialize};

/// Default number of histogram buckets.
pub const DEFAULT_BUCKET_COUNT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub range_start: f64,
    pub range_end: f64,
    pub count: usize,
    /// `count / total * 100`.
    pub percentage: f64,
}

/// Bin `values` into `bucket_count` equal-width buckets.
///
/// Boundaries are `min + width * i`, computed the same way for assignment and
/// for output, so a value on a boundary always lands in the bucket that starts
/// there. A degenerate ensemble (every value equal) yields one bucket holding
/// every run. Returns an empty vector for empty input.
pub fn bucketize(values: &[f64], bucket_count: usize) -> Vec<DistributionBucket> {
    if values.is_empty() {
        return Vec::new();
    }
    let total = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min || bucket_count <= 1 {
        return vec![DistributionBucket {
            range_start: min,
            range_end: max,
            count: total,
            percentage: 100.0,
        }];
    }

    let width = (max - min) / bucket_count as f64;
    let starts: Vec<f64> = (0..bucket_count).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0usize; bucket_count];

    for &v in values {
        let mut idx = (((v - min) / width).floor() as usize).min(bucket_count - 1);
        // Floating-point division can land one bucket off a boundary.
        while idx > 0 && v < starts[idx] {
            idx -= 1;
        }
        while idx + 1 < bucket_count && v >= starts[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| DistributionBucket {
            range_start: starts[i],
            range_end: if i + 1 == bucket_count { max } else { starts[i + 1] },
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(bucketize(&[], 10).is_empty());
    }

    #[test]
    fn counts_sum_to_total_and_percentages_to_hundred() {
        let values: Vec<f64> = (0..1_000).map(|i| (i * 37 % 1_000) as f64).collect();
        let buckets = bucketize(&values, 20);
        assert_eq!(buckets.len(), 20);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 1_000);
        let pct: f64 = buckets.iter().map(|b| b.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn boundary_value_goes_to_bucket_that_starts_there() {
        // width 25: [0,25) [25,50) [50,75) [75,100]
        let buckets = bucketize(&[0.0, 25.0, 50.0, 100.0], 4);
        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1]);
        assert_eq!(buckets[1].range_start, 25.0);
    }

    #[test]
    fn maximum_lands_in_last_bucket() {
        let buckets = bucketize(&[0.0, 10.0], 5);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[4].count, 1);
        assert_eq!(buckets[4].range_end, 10.0);
    }

    #[test]
    fn empty_buckets_are_kept() {
        let buckets = bucketize(&[0.0, 0.1, 100.0], 10);
        assert_eq!(buckets.len(), 10);
        assert!(buckets[1..9].iter().all(|b| b.count == 0));
    }

    #[test]
    fn ranges_are_contiguous() {
        let buckets = bucketize(&[-3.5, 7.25, 1.0, 99.0], 7);
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].range_end, pair[1].range_start);
        }
        assert_eq!(buckets[0].range_start, -3.5);
        assert_eq!(buckets[6].range_end, 99.0);
    }

    #[test]
    fn degenerate_ensemble_is_one_bucket() {
        let buckets = bucketize(&[5.0; 8], 20);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 8);
        assert_eq!(buckets[0].percentage, 100.0);
    }

    #[test]
    fn same_input_same_boundaries() {
        let values = [1.0, 2.0, 3.3, 9.9, 4.4];
        assert_eq!(bucketize(&values, 6), bucketize(&values, 6));
    }
}
