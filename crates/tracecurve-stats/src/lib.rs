//! Summary statistics over sample buckets.
//!
//! Every function takes a slice of samples and returns `None` when it is
//! empty. Callers decide what "no data" means for their output (skip the
//! point, draw zero, warn); nothing here silently returns `0.0` or `NaN`.

use serde::{Deserialize, Serialize};

/// Average, median and population standard deviation of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSample {
    pub average: f64,
    pub median: f64,
    pub stddev: f64,
}

impl StatSample {
    /// Computes all three statistics, or `None` if `samples` is empty.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        Some(Self {
            average: average(samples)?,
            median: median(samples)?,
            stddev: stddev(samples)?,
        })
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "bucket sizes stay far below 2^52"
)]
fn len_f64(samples: &[f64]) -> f64 {
    samples.len() as f64
}

/// Arithmetic mean.
///
/// ```
/// assert_eq!(tracecurve_stats::average(&[10.0, 10.0, 20.0, 30.0, 40.0]), Some(22.0));
/// assert_eq!(tracecurve_stats::average(&[]), None);
/// ```
pub fn average(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / len_f64(samples))
}

/// Median of the samples.
///
/// Sorts a private copy, so the input order is left untouched. For an even
/// number of samples this is the mean of the two middle values.
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(f64::midpoint(sorted[mid - 1], sorted[mid]))
    }
}

/// Population standard deviation (denominator `n`).
pub fn stddev(samples: &[f64]) -> Option<f64> {
    let mean = average(samples)?;
    let variance = samples
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / len_f64(samples);
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn average_examples() {
        assert_eq!(average(&[10.0, 10.0, 20.0, 30.0, 40.0]), Some(22.0));
        assert_eq!(average(&[5.0]), Some(5.0));
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[10.0, 10.0, 20.0, 30.0, 40.0]), Some(20.0));
        assert_eq!(median(&[40.0, 10.0, 30.0, 20.0]), Some(25.0));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn stddev_is_population() {
        // Mean 5, squared deviations sum to 32, n = 8.
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(stddev(&xs), Some(2.0));
        assert_eq!(stddev(&[3.0]), Some(0.0));
        assert_eq!(stddev(&[]), None);
    }

    #[test]
    fn stat_sample_bundles_all_three() {
        let s = StatSample::from_samples(&[1.0, 3.0]).unwrap();
        assert_eq!(s.average, 2.0);
        assert_eq!(s.median, 2.0);
        assert_eq!(s.stddev, 1.0);
        assert!(StatSample::from_samples(&[]).is_none());
    }

    proptest! {
        #[test]
        fn median_ignores_order_and_leaves_input_alone(
            xs in prop::collection::vec(-1.0e6f64..1.0e6, 1..64),
            seed in any::<u64>(),
        ) {
            let original = xs.clone();
            let expected = median(&xs);
            prop_assert_eq!(&xs, &original);

            // Rotate and reverse as cheap permutations.
            let mut permuted = xs.clone();
            let len = permuted.len();
            permuted.rotate_left(usize::try_from(seed % len as u64).unwrap());
            prop_assert_eq!(median(&permuted), expected);
            permuted.reverse();
            prop_assert_eq!(median(&permuted), expected);
        }

        #[test]
        fn median_lies_within_range(
            xs in prop::collection::vec(-1.0e6f64..1.0e6, 1..64),
        ) {
            let m = median(&xs).unwrap();
            let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(lo <= m && m <= hi);
        }
    }
}
