//! Outlier detection (IQR fences and Z-score)
//!
//! Both methods reduce to a pair of bounds; a value strictly outside the bounds
//! is an outlier. Reports keep the row of every outlier so the caller can point
//! at the original record.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::descriptive::{mean_impl, negligible_spread, percentile_impl, sorted_copy};

/// Default multiplier for the IQR fences
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Default Z-score threshold
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// Detection method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum OutlierMethod {
    /// `[Q1 - k * IQR, Q3 + k * IQR]`
    Iqr { multiplier: f64 },
    /// `[mean - t * sd, mean + t * sd]`
    ZScore { threshold: f64 },
}

impl Default for OutlierMethod {
    fn default() -> Self {
        OutlierMethod::Iqr {
            multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

/// Which fence a value crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierSide {
    Lower,
    Upper,
}

/// One outlying value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outlier {
    /// Row of the value in the dataset (or position in the sample)
    pub row: usize,
    /// The value
    pub value: f64,
    /// Fence that was crossed
    pub side: OutlierSide,
}

/// Inclusive bounds of the non-outlier range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// Classify a value against the bounds
    pub fn side_of(&self, value: f64) -> Option<OutlierSide> {
        if value < self.lower {
            Some(OutlierSide::Lower)
        } else if value > self.upper {
            Some(OutlierSide::Upper)
        } else {
            None
        }
    }

    /// Clamp a value into the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

/// Result of an outlier scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    /// Method used
    pub method: OutlierMethod,
    /// Bounds derived from the sample
    pub bounds: OutlierBounds,
    /// Outliers in row order
    pub outliers: Vec<Outlier>,
    /// Number of outliers
    pub count: usize,
    /// Share of the sample, in percent
    pub percentage: f64,
}

/// IQR fences from sorted data
pub(crate) fn iqr_bounds(sorted: &[f64], multiplier: f64) -> Result<OutlierBounds> {
    let q1 = percentile_impl(sorted, 25.0)?;
    let q3 = percentile_impl(sorted, 75.0)?;
    let iqr = q3 - q1;

    Ok(OutlierBounds {
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Z-score bounds; a zero spread collapses them onto the mean
pub(crate) fn zscore_bounds(data: &[f64], threshold: f64) -> Result<OutlierBounds> {
    if data.is_empty() {
        return Err(Error::EmptyData("z-score of an empty sample".into()));
    }

    let n = data.len() as f64;
    let mean = mean_impl(data);
    let std_dev = (data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();

    if negligible_spread(std_dev, mean) {
        // every value equals the mean up to rounding: nothing can be an outlier
        let (lower, upper) = data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        return Ok(OutlierBounds { lower, upper });
    }

    Ok(OutlierBounds {
        lower: mean - threshold * std_dev,
        upper: mean + threshold * std_dev,
    })
}

fn validate(method: &OutlierMethod) -> Result<()> {
    let (name, value) = match method {
        OutlierMethod::Iqr { multiplier } => ("IQR multiplier", *multiplier),
        OutlierMethod::ZScore { threshold } => ("z-score threshold", *threshold),
    };
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!("{} must be a non-negative number, got {}", name, value)));
    }
    Ok(())
}

/// Scan `(row, value)` pairs for outliers
pub(crate) fn detect_impl(values: &[(usize, f64)], method: OutlierMethod) -> Result<OutlierReport> {
    if values.is_empty() {
        return Err(Error::EmptyData("outlier detection needs at least one value".into()));
    }
    validate(&method)?;

    let data: Vec<f64> = values.iter().map(|&(_, v)| v).collect();
    let bounds = match method {
        OutlierMethod::Iqr { multiplier } => iqr_bounds(&sorted_copy(&data), multiplier)?,
        OutlierMethod::ZScore { threshold } => zscore_bounds(&data, threshold)?,
    };

    let outliers: Vec<Outlier> = values
        .iter()
        .filter_map(|&(row, value)| bounds.side_of(value).map(|side| Outlier { row, value, side }))
        .collect();
    let count = outliers.len();

    Ok(OutlierReport {
        method,
        bounds,
        outliers,
        count,
        percentage: crate::stats::percentage(count, values.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed(data: &[f64]) -> Vec<(usize, f64)> {
        data.iter().copied().enumerate().collect()
    }

    #[test]
    fn test_iqr_no_outliers() {
        let report = detect_impl(&indexed(&[1.0, 2.0, 3.0, 4.0, 5.0]), OutlierMethod::default()).unwrap();
        assert_eq!(report.bounds, OutlierBounds { lower: -1.0, upper: 7.0 });
        assert_eq!(report.count, 0);
        assert_eq!(report.percentage, 0.0);
    }

    #[test]
    fn test_iqr_upper_outlier() {
        let report = detect_impl(&indexed(&[1.0, 2.0, 3.0, 4.0, 100.0]), OutlierMethod::default()).unwrap();
        assert_eq!(report.bounds, OutlierBounds { lower: -1.0, upper: 7.0 });
        assert_eq!(
            report.outliers,
            vec![Outlier { row: 4, value: 100.0, side: OutlierSide::Upper }]
        );
        assert_eq!(report.percentage, 20.0);
    }

    #[test]
    fn test_custom_multiplier() {
        let data = indexed(&[1.0, 2.0, 3.0, 4.0, 8.0]);
        // k = 1.5 -> upper 7, k = 3 -> upper 10
        assert_eq!(detect_impl(&data, OutlierMethod::Iqr { multiplier: 1.5 }).unwrap().count, 1);
        assert_eq!(detect_impl(&data, OutlierMethod::Iqr { multiplier: 3.0 }).unwrap().count, 0);
    }

    #[test]
    fn test_rows_are_preserved() {
        let values = vec![(10, 1.0), (11, -50.0), (15, 2.0), (20, 3.0), (21, 2.5)];
        let report = detect_impl(&values, OutlierMethod::default()).unwrap();
        assert_eq!(report.outliers.len(), 1);
        assert_eq!(report.outliers[0].row, 11);
        assert_eq!(report.outliers[0].side, OutlierSide::Lower);
    }

    #[test]
    fn test_zscore() {
        let mut data = vec![10.0; 20];
        data.push(1000.0);
        let report = detect_impl(&indexed(&data), OutlierMethod::ZScore { threshold: 3.0 }).unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.outliers[0].row, 20);
    }

    #[test]
    fn test_zscore_constant() {
        let report = detect_impl(&indexed(&[4.0, 4.0, 4.0]), OutlierMethod::ZScore { threshold: 2.0 }).unwrap();
        assert_eq!(report.count, 0);
    }

    #[test]
    fn test_invalid_method() {
        let result = detect_impl(&indexed(&[1.0]), OutlierMethod::Iqr { multiplier: -1.0 });
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(detect_impl(&[], OutlierMethod::default()).is_err());
    }

    #[test]
    fn test_bounds_helpers() {
        let bounds = OutlierBounds { lower: 0.0, upper: 10.0 };
        assert_eq!(bounds.side_of(-0.5), Some(OutlierSide::Lower));
        assert_eq!(bounds.side_of(10.0), None);
        assert_eq!(bounds.clamp(12.0), 10.0);
        assert_eq!(bounds.clamp(-3.0), 0.0);
    }
}
