// tabstat statistics module
//
// Numeric descriptive statistics, outlier detection, equal-width binning,
// categorical frequency analysis and Pearson correlation.

pub mod categorical;
pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod outliers;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

pub use categorical::{CategoricalAnalysis, CategoricalQuality, Cardinality, FrequencyEntry};
pub use correlation::{CaveatKind, CorrelationCaveat, CorrelationMatrix};
pub use distribution::{Histogram, HistogramBin};
pub use outliers::{Outlier, OutlierBounds, OutlierMethod, OutlierReport, OutlierSide};

/// A metric that may be undefined for the given input
///
/// Analyses keep going when a single metric cannot be computed; the metric is
/// then carried as a sentinel instead of a NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// Regular value
    Value(f64),
    /// Mathematically undefined (zero variance, zero mean)
    Undefined,
    /// Sample too small for this metric
    Insufficient { required: usize, actual: usize },
}

impl Metric {
    /// The value, if defined
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether a value is present
    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    /// Turn the sentinel back into an error
    pub fn into_result(self, metric: &'static str) -> Result<f64> {
        match self {
            Metric::Value(v) => Ok(v),
            Metric::Undefined => Err(Error::UndefinedMetric(metric)),
            Metric::Insufficient { required, actual } => Err(Error::DegenerateInput {
                metric,
                required,
                actual,
            }),
        }
    }

    /// Convert a metric computation into a sentinel
    ///
    /// Only metric-level errors are absorbed; anything else is passed through.
    pub fn from_result(result: Result<f64>) -> Result<Metric> {
        match result {
            Ok(v) if v.is_finite() => Ok(Metric::Value(v)),
            Ok(_) => Ok(Metric::Undefined),
            Err(Error::UndefinedMetric(_)) => Ok(Metric::Undefined),
            Err(Error::DegenerateInput { required, actual, .. }) => {
                Ok(Metric::Insufficient { required, actual })
            }
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.4}", v),
            Metric::Undefined => write!(f, "undefined"),
            Metric::Insufficient { required, actual } => {
                write!(f, "insufficient data (n={}, need {})", actual, required)
            }
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Metric::Value(v) => serializer.serialize_f64(*v),
            Metric::Undefined => serializer.serialize_str("undefined"),
            Metric::Insufficient { required, actual } => {
                #[derive(Serialize)]
                struct Insufficient {
                    required: usize,
                    actual: usize,
                }

                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(
                    "insufficient",
                    &Insufficient {
                        required: *required,
                        actual: *actual,
                    },
                )?;
                map.end()
            }
        }
    }
}

/// Descriptive statistics of one numeric sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    /// Number of values
    pub count: usize,
    /// Sum of values
    pub sum: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Median
    pub median: f64,
    /// All values sharing the highest frequency, ascending
    pub mode: Vec<f64>,
    /// Population variance (divided by n)
    pub variance: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Coefficient of variation in percent
    pub coefficient_of_variation: Metric,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
    /// max - min
    pub range: f64,
    /// 25th percentile
    pub q1: f64,
    /// 50th percentile
    pub q2: f64,
    /// 75th percentile
    pub q3: f64,
    /// q3 - q1
    pub iqr: f64,
    /// Bias-adjusted Fisher-Pearson skewness
    pub skewness: Metric,
    /// Excess kurtosis
    pub kurtosis: Metric,
}

/// Compute descriptive statistics
///
/// # Example
/// ```rust
/// use tabstat::stats;
///
/// let stats = stats::describe(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_eq!(stats.mean, 3.0);
/// assert_eq!(stats.variance, 2.0);
/// assert_eq!(stats.q1, 2.0);
/// ```
pub fn describe<T: AsRef<[f64]>>(data: T) -> Result<DescriptiveStats> {
    descriptive::describe_impl(data.as_ref())
}

/// Linear-interpolation percentile, `p` in `[0, 100]`
///
/// The input does not need to be sorted.
///
/// # Example
/// ```rust
/// use tabstat::stats;
///
/// assert_eq!(stats::percentile(&[4.0, 1.0, 3.0, 2.0], 50.0).unwrap(), 2.5);
/// ```
pub fn percentile<T: AsRef<[f64]>>(data: T, p: f64) -> Result<f64> {
    let sorted = descriptive::sorted_copy(data.as_ref());
    descriptive::percentile_impl(&sorted, p)
}

/// Pearson correlation of two equally long samples
///
/// A constant input yields 0.
///
/// # Example
/// ```rust
/// use tabstat::stats;
///
/// let r = stats::correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
/// assert_eq!(r, 1.0);
/// ```
pub fn correlation<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> Result<f64> {
    correlation::pearson_impl(x.as_ref(), y.as_ref()).map(|p| p.r)
}

/// IQR / Z-score outlier detection over a plain sample (rows are positions)
pub fn detect_outliers<T: AsRef<[f64]>>(data: T, method: OutlierMethod) -> Result<OutlierReport> {
    let indexed: Vec<(usize, f64)> = data.as_ref().iter().copied().enumerate().collect();
    outliers::detect_impl(&indexed, method)
}

/// Equal-width histogram; `bins = None` uses `min(10, ceil(sqrt(n)))`
pub fn histogram<T: AsRef<[f64]>>(data: T, bins: Option<usize>) -> Result<Histogram> {
    let data = data.as_ref();
    let bins = bins.unwrap_or_else(|| distribution::default_bin_count(data.len(), distribution::DEFAULT_MAX_BINS));
    distribution::histogram_impl(data, bins)
}

/// `part / whole * 100`, 0 for an empty whole
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_from_result() {
        assert_eq!(Metric::from_result(Ok(1.5)).unwrap(), Metric::Value(1.5));
        assert_eq!(Metric::from_result(Ok(f64::NAN)).unwrap(), Metric::Undefined);
        assert_eq!(
            Metric::from_result(Err(Error::UndefinedMetric("cv"))).unwrap(),
            Metric::Undefined
        );
        assert_eq!(
            Metric::from_result(Err(Error::DegenerateInput {
                metric: "skewness",
                required: 3,
                actual: 2
            }))
            .unwrap(),
            Metric::Insufficient { required: 3, actual: 2 }
        );
        assert!(Metric::from_result(Err(Error::EmptyData("x".into()))).is_err());
    }

    #[test]
    fn test_metric_into_result() {
        assert_eq!(Metric::Value(2.0).into_result("m").unwrap(), 2.0);
        assert!(matches!(
            Metric::Undefined.into_result("kurtosis"),
            Err(Error::UndefinedMetric("kurtosis"))
        ));
        assert!(matches!(
            Metric::Insufficient { required: 3, actual: 1 }.into_result("skewness"),
            Err(Error::DegenerateInput { required: 3, actual: 1, .. })
        ));
    }

    #[test]
    fn test_metric_serialization() {
        assert_eq!(serde_json::to_string(&Metric::Value(0.5)).unwrap(), "0.5");
        assert_eq!(serde_json::to_string(&Metric::Undefined).unwrap(), "\"undefined\"");
        assert_eq!(
            serde_json::to_string(&Metric::Insufficient { required: 3, actual: 2 }).unwrap(),
            r#"{"insufficient":{"required":3,"actual":2}}"#
        );
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 0), 0.0);
    }
}
