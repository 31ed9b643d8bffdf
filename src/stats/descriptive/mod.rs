// Descriptive statistics module

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::stats::{DescriptiveStats, Metric};

/// Smallest sample the bias-adjusted skewness formula accepts
pub const SKEWNESS_MIN_SAMPLES: usize = 3;

/// Smallest sample with a possibly non-zero spread
pub const KURTOSIS_MIN_SAMPLES: usize = 2;

/// Internal implementation of descriptive statistics
pub(crate) fn describe_impl(data: &[f64]) -> Result<DescriptiveStats> {
    if data.is_empty() {
        return Err(Error::EmptyData("descriptive statistics need at least one value".into()));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidInput("descriptive statistics need finite values".into()));
    }

    let count = data.len();
    let sum = data.iter().sum::<f64>();
    let mean = mean_impl(data);

    // population variance
    let variance = data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / count as f64;
    let std_dev = variance.sqrt();

    // sort a copy; the caller's order is left alone
    let sorted = sorted_copy(data);
    let min = sorted[0];
    let max = sorted[count - 1];

    let median = median_impl(&sorted)?;
    let q1 = percentile_impl(&sorted, 25.0)?;
    let q2 = percentile_impl(&sorted, 50.0)?;
    let q3 = percentile_impl(&sorted, 75.0)?;

    Ok(DescriptiveStats {
        count,
        sum,
        mean,
        median,
        mode: mode_impl(data),
        variance,
        std_dev,
        coefficient_of_variation: Metric::from_result(coefficient_of_variation_impl(mean, std_dev))?,
        min,
        max,
        range: max - min,
        q1,
        q2,
        q3,
        iqr: q3 - q1,
        skewness: Metric::from_result(skewness_impl(data, mean, std_dev))?,
        kurtosis: Metric::from_result(kurtosis_impl(data, mean, std_dev))?,
    })
}

/// Arithmetic mean
///
/// Falls back to a running mean when the plain sum leaves the `f64` range, so
/// finite values always give a finite mean.
pub(crate) fn mean_impl(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    let sum = data.iter().sum::<f64>();
    if sum.is_finite() {
        return sum / n;
    }

    let mut mean = 0.0;
    for (i, &x) in data.iter().enumerate() {
        mean += (x - mean) / (i + 1) as f64;
    }
    mean
}

/// Ascending copy of the data
pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Median of sorted data
pub(crate) fn median_impl(sorted: &[f64]) -> Result<f64> {
    let n = sorted.len();
    if n == 0 {
        return Err(Error::EmptyData("median of an empty sample".into()));
    }

    if n % 2 == 0 {
        Ok((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    } else {
        Ok(sorted[n / 2])
    }
}

/// Percentile of sorted data by linear interpolation, `p` in `[0, 100]`
pub(crate) fn percentile_impl(sorted: &[f64], p: f64) -> Result<f64> {
    if sorted.is_empty() {
        return Err(Error::EmptyData("percentile of an empty sample".into()));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::InvalidInput(format!("percentile must be within [0, 100], got {}", p)));
    }

    let idx = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;

    if lower == upper {
        return Ok(sorted[lower]);
    }

    let weight = idx - lower as f64;
    Ok(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

/// Every value that shares the highest frequency, ascending
pub(crate) fn mode_impl(data: &[f64]) -> Vec<f64> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for &value in data {
        // -0.0 and 0.0 are the same value
        let key = if value == 0.0 { 0.0f64.to_bits() } else { value.to_bits() };
        *counts.entry(key).or_insert(0) += 1;
    }

    let max_count = counts.values().copied().max().unwrap_or(0);
    let mut modes: Vec<f64> = counts
        .into_iter()
        .filter(|&(_, count)| count == max_count)
        .map(|(key, _)| f64::from_bits(key))
        .collect();
    modes.sort_by(f64::total_cmp);
    modes
}

/// Whether the spread is zero up to rounding noise in the mean
pub(crate) fn negligible_spread(std_dev: f64, mean: f64) -> bool {
    std_dev == 0.0 || std_dev <= mean.abs() * f64::EPSILON * 8.0
}

/// Bias-adjusted Fisher-Pearson skewness: n / ((n-1)(n-2)) * sum(((x - mean) / sd)^3)
pub(crate) fn skewness_impl(data: &[f64], mean: f64, std_dev: f64) -> Result<f64> {
    let n = data.len();
    if n < SKEWNESS_MIN_SAMPLES {
        return Err(Error::DegenerateInput {
            metric: "skewness",
            required: SKEWNESS_MIN_SAMPLES,
            actual: n,
        });
    }
    if negligible_spread(std_dev, mean) {
        return Err(Error::UndefinedMetric("skewness"));
    }

    let n = n as f64;
    let sum = data.iter().map(|&x| ((x - mean) / std_dev).powi(3)).sum::<f64>();
    Ok(n / ((n - 1.0) * (n - 2.0)) * sum)
}

/// Excess kurtosis from the population fourth moment: mean(((x - mean) / sd)^4) - 3
pub(crate) fn kurtosis_impl(data: &[f64], mean: f64, std_dev: f64) -> Result<f64> {
    let n = data.len();
    if n < KURTOSIS_MIN_SAMPLES {
        return Err(Error::DegenerateInput {
            metric: "kurtosis",
            required: KURTOSIS_MIN_SAMPLES,
            actual: n,
        });
    }
    if negligible_spread(std_dev, mean) {
        return Err(Error::UndefinedMetric("kurtosis"));
    }

    let sum = data.iter().map(|&x| ((x - mean) / std_dev).powi(4)).sum::<f64>();
    Ok(sum / n as f64 - 3.0)
}

/// Coefficient of variation in percent
pub(crate) fn coefficient_of_variation_impl(mean: f64, std_dev: f64) -> Result<f64> {
    if negligible_spread(std_dev, mean) || mean == 0.0 {
        return Err(Error::UndefinedMetric("coefficient of variation"));
    }
    Ok(std_dev / mean * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = describe_impl(&data).unwrap();

        assert_eq!(stats.count, 5);
        assert_eq!(stats.sum, 15.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.variance, 2.0);
        assert_eq!(stats.std_dev, 2.0f64.sqrt());
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.iqr, 2.0);
        assert_eq!(stats.range, 4.0);
        // symmetric sample
        assert!(stats.skewness.value().unwrap().abs() < 1e-12);
        // every value appears once
        assert_eq!(stats.mode, data);
    }

    #[test]
    fn test_describe_empty() {
        let data: Vec<f64> = vec![];
        assert!(matches!(describe_impl(&data), Err(Error::EmptyData(_))));
    }

    #[test]
    fn test_describe_rejects_non_finite() {
        assert!(matches!(describe_impl(&[1.0, f64::NAN]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_describe_large_magnitudes() {
        let stats = describe_impl(&[1e308, 1e308, 1e308]).unwrap();
        assert_eq!(stats.mean, 1e308);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.skewness, Metric::Undefined);

        let stats = describe_impl(&[1e308, 1.5e308]).unwrap();
        assert!((stats.mean - 1.25e308).abs() <= 1.25e308 * 1e-15);
    }

    #[test]
    fn test_mean_impl() {
        assert_eq!(mean_impl(&[1.0, 2.0, 3.0, 4.0, 100.0]), 22.0);
        assert_eq!(mean_impl(&[-1e308, -1e308]), -1e308);
    }

    #[test]
    fn test_describe_does_not_reorder_input() {
        let data = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        let copy = data.clone();
        describe_impl(&data).unwrap();
        assert_eq!(data, copy);
    }

    #[test]
    fn test_median_even() {
        assert_eq!(median_impl(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
        assert_eq!(median_impl(&[7.0]).unwrap(), 7.0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = vec![10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile_impl(&sorted, 0.0).unwrap(), 10.0);
        assert_eq!(percentile_impl(&sorted, 100.0).unwrap(), 40.0);
        // idx = 0.1 * 3 = 0.3
        assert!((percentile_impl(&sorted, 10.0).unwrap() - 13.0).abs() < 1e-12);
        assert!(percentile_impl(&sorted, 101.0).is_err());
        assert!(percentile_impl(&[], 50.0).is_err());
    }

    #[test]
    fn test_mode_ties() {
        assert_eq!(mode_impl(&[3.0, 1.0, 3.0, 1.0, 2.0]), vec![1.0, 3.0]);
        assert_eq!(mode_impl(&[2.0, 2.0, 5.0]), vec![2.0]);
        assert_eq!(mode_impl(&[0.0, -0.0, 1.0]), vec![0.0]);
    }

    #[test]
    fn test_skewness_needs_three_values() {
        let result = skewness_impl(&[1.0, 2.0], 1.5, 0.5);
        assert!(matches!(
            result,
            Err(Error::DegenerateInput { metric: "skewness", required: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_skewness_sign() {
        let data = [1.0, 2.0, 3.0, 4.0, 100.0];
        let stats = describe_impl(&data).unwrap();
        assert!(stats.skewness.value().unwrap() > 1.0);
    }

    #[test]
    fn test_kurtosis_uniform_pair() {
        // z = +-1 for both values: 1 - 3
        let k = kurtosis_impl(&[1.0, 3.0], 2.0, 1.0).unwrap();
        assert!((k + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_sample_is_undefined() {
        let stats = describe_impl(&[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.skewness, Metric::Undefined);
        assert_eq!(stats.kurtosis, Metric::Undefined);
        assert_eq!(stats.coefficient_of_variation, Metric::Undefined);
        assert_eq!(stats.mode, vec![5.0]);
    }

    #[test]
    fn test_near_constant_with_rounding_noise() {
        let stats = describe_impl(&[0.1, 0.1, 0.1]).unwrap();
        assert_eq!(stats.skewness, Metric::Undefined);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert!((coefficient_of_variation_impl(10.0, 5.0).unwrap() - 50.0).abs() < 1e-12);
        assert!(coefficient_of_variation_impl(0.0, 1.0).is_err());
    }
}
