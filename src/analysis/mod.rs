//! Dataset profiling
//!
//! [`Analyzer`] classifies every column and runs the matching analysis:
//! descriptive statistics, outliers and a histogram for numeric columns, a
//! frequency table for categorical ones. A metric that cannot be computed for a
//! column is carried as a [`Metric`] sentinel, so a single column never aborts
//! the batch.

use rayon::prelude::*;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::column::{self, ColumnKind, ColumnValues};
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::insights::Insight;
use crate::stats::categorical::{self, CategoricalAnalysis};
use crate::stats::correlation::{self, CorrelationMatrix};
use crate::stats::descriptive::{self, percentile_impl, sorted_copy};
use crate::stats::distribution::{self, Histogram};
use crate::stats::outliers::{self, OutlierMethod, OutlierReport};
use crate::stats::{percentage, DescriptiveStats};

/// Percentile table of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Sign breakdown of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericQuality {
    pub zero_count: usize,
    pub zero_percentage: f64,
    pub negative_count: usize,
    pub negative_percentage: f64,
    pub positive_count: usize,
    pub positive_percentage: f64,
}

/// Shape flags; a flag is `false` when the metric behind it is not a value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionShape {
    /// `|skewness| < 1` and `|kurtosis| < 2`
    pub is_normal: bool,
    /// `|skewness| > 1`
    pub is_skewed: bool,
    /// CV above the configured threshold
    pub has_high_variability: bool,
}

/// Analysis of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericAnalysis {
    pub column: String,
    pub missing: usize,
    pub missing_percentage: f64,
    #[serde(flatten)]
    pub stats: DescriptiveStats,
    pub percentiles: Percentiles,
    /// IQR outliers, rows refer to dataset records
    pub outliers: OutlierReport,
    pub histogram: Histogram,
    pub data_quality: NumericQuality,
    pub shape: DistributionShape,
}

/// A column with no usable values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyAnalysis {
    pub column: String,
    /// Always 0
    pub count: usize,
    /// Total row count
    pub missing: usize,
}

/// Analysis of one column, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnAnalysis {
    Empty(EmptyAnalysis),
    Numeric(NumericAnalysis),
    Categorical(CategoricalAnalysis),
}

impl ColumnAnalysis {
    /// Column name
    pub fn column(&self) -> &str {
        match self {
            ColumnAnalysis::Empty(a) => &a.column,
            ColumnAnalysis::Numeric(a) => &a.column,
            ColumnAnalysis::Categorical(a) => &a.column,
        }
    }

    /// Column kind
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnAnalysis::Empty(_) => ColumnKind::Empty,
            ColumnAnalysis::Numeric(_) => ColumnKind::Numeric,
            ColumnAnalysis::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Number of non-missing values
    pub fn count(&self) -> usize {
        match self {
            ColumnAnalysis::Empty(a) => a.count,
            ColumnAnalysis::Numeric(a) => a.stats.count,
            ColumnAnalysis::Categorical(a) => a.count,
        }
    }

    /// Number of missing values
    pub fn missing(&self) -> usize {
        match self {
            ColumnAnalysis::Empty(a) => a.missing,
            ColumnAnalysis::Numeric(a) => a.missing,
            ColumnAnalysis::Categorical(a) => a.missing,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericAnalysis> {
        match self {
            ColumnAnalysis::Numeric(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&CategoricalAnalysis> {
        match self {
            ColumnAnalysis::Categorical(a) => Some(a),
            _ => None,
        }
    }
}

/// Per-column analyses of a dataset, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetProfile {
    row_count: usize,
    columns: Vec<ColumnAnalysis>,
}

impl DatasetProfile {
    /// Number of rows of the analyzed dataset
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Analysis of one column
    pub fn get(&self, column: &str) -> Option<&ColumnAnalysis> {
        self.columns.iter().find(|a| a.column() == column)
    }

    /// Analyses in column order
    pub fn iter(&self) -> impl Iterator<Item = &ColumnAnalysis> {
        self.columns.iter()
    }

    fn names_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|a| a.kind() == kind)
            .map(ColumnAnalysis::column)
            .collect()
    }

    /// Names of the numeric columns
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.names_of(ColumnKind::Numeric)
    }

    /// Names of the categorical columns
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.names_of(ColumnKind::Categorical)
    }

    /// Missing values over every column
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(ColumnAnalysis::missing).sum()
    }

    /// Number of columns with at least one missing value
    pub fn columns_with_missing(&self) -> usize {
        self.columns.iter().filter(|a| a.missing() > 0).count()
    }

    /// Number of numeric columns with at least one outlier
    pub fn columns_with_outliers(&self) -> usize {
        self.columns
            .iter()
            .filter_map(ColumnAnalysis::as_numeric)
            .filter(|a| a.outliers.count > 0)
            .count()
    }
}

struct ColumnMap<'a>(&'a [ColumnAnalysis]);

impl Serialize for ColumnMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for analysis in self.0 {
            map.serialize_entry(analysis.column(), analysis)?;
        }
        map.end()
    }
}

impl Serialize for DatasetProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DatasetProfile", 2)?;
        state.serialize_field("row_count", &self.row_count)?;
        state.serialize_field("columns", &ColumnMap(&self.columns))?;
        state.end()
    }
}

/// One analysis request, as selected on a dashboard
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AnalysisRequest {
    /// Profile every column
    Descriptive,
    /// Correlate the named columns, or every numeric column
    Correlation {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    /// Outliers of one column; IQR with the configured multiplier by default
    Outliers {
        column: String,
        #[serde(default)]
        method: Option<OutlierMethod>,
    },
    /// Histogram of one column
    Distribution {
        column: String,
        #[serde(default)]
        bins: Option<usize>,
    },
    /// Summary insights
    Insights,
}

/// Result of an [`AnalysisRequest`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "result", rename_all = "kebab-case")]
pub enum AnalysisOutput {
    Descriptive(DatasetProfile),
    Correlation(CorrelationMatrix),
    Outliers(OutlierReport),
    Distribution(Histogram),
    Insights(Vec<Insight>),
}

/// Runs analyses with one configuration
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer; the configuration is validated first
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// IQR method with the configured multiplier
    pub fn outlier_method(&self) -> OutlierMethod {
        OutlierMethod::Iqr {
            multiplier: self.config.iqr_multiplier,
        }
    }

    /// Profile every column of the dataset
    pub fn analyze(&self, dataset: &Dataset) -> Result<DatasetProfile> {
        let names = dataset.columns();
        let columns = if self.config.parallel {
            names
                .par_iter()
                .map(|name| self.analyze_column(dataset, name))
                .collect::<Result<Vec<_>>>()?
        } else {
            names
                .iter()
                .map(|name| self.analyze_column(dataset, name))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(DatasetProfile {
            row_count: dataset.row_count(),
            columns,
        })
    }

    /// Analyze one column
    pub fn analyze_column(&self, dataset: &Dataset, column: &str) -> Result<ColumnAnalysis> {
        let values = column::extract(dataset, column)?;
        let kind = values.kind();
        log::debug!("analyzing column '{}' ({}, {} values)", column, kind, values.len());

        match kind {
            ColumnKind::Empty => Ok(ColumnAnalysis::Empty(EmptyAnalysis {
                column: column.to_string(),
                count: 0,
                missing: values.total(),
            })),
            ColumnKind::Numeric => self.numeric_analysis(&values).map(ColumnAnalysis::Numeric),
            ColumnKind::Categorical => {
                categorical::analyze_impl(column, &values.texts(), values.total()).map(ColumnAnalysis::Categorical)
            }
        }
    }

    fn numeric_analysis(&self, values: &ColumnValues<'_>) -> Result<NumericAnalysis> {
        let name = values.name();
        let indexed = values.numeric().ok_or_else(|| Error::NotNumeric(name.to_string()))?;
        let data: Vec<f64> = indexed.iter().map(|&(_, v)| v).collect();

        let stats = descriptive::describe_impl(&data)?;
        let sorted = sorted_copy(&data);
        let percentiles = Percentiles {
            p10: percentile_impl(&sorted, 10.0)?,
            p25: percentile_impl(&sorted, 25.0)?,
            p50: percentile_impl(&sorted, 50.0)?,
            p75: percentile_impl(&sorted, 75.0)?,
            p90: percentile_impl(&sorted, 90.0)?,
        };

        let outliers = outliers::detect_impl(&indexed, self.outlier_method())?;
        let bins = distribution::default_bin_count(data.len(), self.config.max_histogram_bins);
        let histogram = distribution::histogram_impl(&data, bins)?;

        let n = data.len();
        let zero_count = data.iter().filter(|&&v| v == 0.0).count();
        let negative_count = data.iter().filter(|&&v| v < 0.0).count();
        let positive_count = n - zero_count - negative_count;

        let shape = self.shape_of(&stats);

        Ok(NumericAnalysis {
            column: name.to_string(),
            missing: values.missing(),
            missing_percentage: percentage(values.missing(), values.total()),
            stats,
            percentiles,
            outliers,
            histogram,
            data_quality: NumericQuality {
                zero_count,
                zero_percentage: percentage(zero_count, n),
                negative_count,
                negative_percentage: percentage(negative_count, n),
                positive_count,
                positive_percentage: percentage(positive_count, n),
            },
            shape,
        })
    }

    fn shape_of(&self, stats: &DescriptiveStats) -> DistributionShape {
        let skewness = stats.skewness.value();
        let kurtosis = stats.kurtosis.value();

        DistributionShape {
            is_normal: matches!((skewness, kurtosis), (Some(s), Some(k)) if s.abs() < 1.0 && k.abs() < 2.0),
            is_skewed: skewness.map_or(false, |s| s.abs() > 1.0),
            has_high_variability: stats
                .coefficient_of_variation
                .value()
                .map_or(false, |cv| cv > self.config.high_variability_cv),
        }
    }

    fn numeric_values(&self, dataset: &Dataset, column: &str) -> Result<Vec<(usize, f64)>> {
        let values = column::extract(dataset, column)?;
        match values.kind() {
            ColumnKind::Numeric => values.numeric().ok_or_else(|| Error::NotNumeric(column.to_string())),
            ColumnKind::Empty => Err(Error::EmptyData(format!("column '{}' has no values", column))),
            ColumnKind::Categorical => Err(Error::NotNumeric(column.to_string())),
        }
    }

    /// Descriptive statistics of one numeric column
    pub fn describe(&self, dataset: &Dataset, column: &str) -> Result<DescriptiveStats> {
        let data: Vec<f64> = self.numeric_values(dataset, column)?.into_iter().map(|(_, v)| v).collect();
        descriptive::describe_impl(&data)
    }

    /// Outliers of one numeric column; rows refer to dataset records
    pub fn outliers(&self, dataset: &Dataset, column: &str, method: Option<OutlierMethod>) -> Result<OutlierReport> {
        let indexed = self.numeric_values(dataset, column)?;
        outliers::detect_impl(&indexed, method.unwrap_or_else(|| self.outlier_method()))
    }

    /// Histogram of one numeric column
    pub fn distribution(&self, dataset: &Dataset, column: &str, bins: Option<usize>) -> Result<Histogram> {
        let data: Vec<f64> = self.numeric_values(dataset, column)?.into_iter().map(|(_, v)| v).collect();
        let bins = bins.unwrap_or_else(|| distribution::default_bin_count(data.len(), self.config.max_histogram_bins));
        distribution::histogram_impl(&data, bins)
    }

    /// Correlation matrix of the named columns
    ///
    /// Every column must be numeric; fewer than two columns is an error.
    pub fn correlate<S: AsRef<str>>(&self, dataset: &Dataset, columns: &[S]) -> Result<CorrelationMatrix> {
        let mut aligned = Vec::with_capacity(columns.len());
        for column in columns {
            let column = column.as_ref();
            if column::extract(dataset, column)?.kind() != ColumnKind::Numeric {
                return Err(Error::NotNumeric(column.to_string()));
            }
            aligned.push((column.to_string(), column::aligned_numbers(dataset, column)?));
        }

        correlation::correlation_matrix_impl(&aligned, self.config.parallel)
    }

    /// Correlation matrix of every numeric column
    pub fn correlate_all(&self, dataset: &Dataset) -> Result<CorrelationMatrix> {
        let numeric = self.numeric_column_names(dataset)?;
        self.correlate(dataset, numeric.as_slice())
    }

    fn numeric_column_names<'a>(&self, dataset: &'a Dataset) -> Result<Vec<&'a str>> {
        let mut numeric = Vec::new();
        for name in dataset.columns() {
            if column::extract(dataset, name)?.kind() == ColumnKind::Numeric {
                numeric.push(name.as_str());
            }
        }
        Ok(numeric)
    }

    /// Summary insights of the dataset
    pub fn insights(&self, dataset: &Dataset) -> Result<Vec<Insight>> {
        let profile = self.analyze(dataset)?;
        let numeric = profile.numeric_columns();

        let correlation = match self.correlate(dataset, numeric.as_slice()) {
            Ok(matrix) => Some(matrix),
            Err(Error::InsufficientColumns { .. }) => None,
            Err(err) => return Err(err),
        };

        Ok(crate::insights::generate(
            dataset.column_count(),
            &profile,
            correlation.as_ref(),
            self.config.strong_correlation,
        ))
    }

    /// Run one analysis request
    pub fn run(&self, dataset: &Dataset, request: &AnalysisRequest) -> Result<AnalysisOutput> {
        match request {
            AnalysisRequest::Descriptive => self.analyze(dataset).map(AnalysisOutput::Descriptive),
            AnalysisRequest::Correlation { columns: Some(columns) } => {
                self.correlate(dataset, columns.as_slice()).map(AnalysisOutput::Correlation)
            }
            AnalysisRequest::Correlation { columns: None } => {
                self.correlate_all(dataset).map(AnalysisOutput::Correlation)
            }
            AnalysisRequest::Outliers { column, method } => {
                self.outliers(dataset, column, *method).map(AnalysisOutput::Outliers)
            }
            AnalysisRequest::Distribution { column, bins } => {
                self.distribution(dataset, column, *bins).map(AnalysisOutput::Distribution)
            }
            AnalysisRequest::Insights => self.insights(dataset).map(AnalysisOutput::Insights),
        }
    }
}

/// Profile every column with the default configuration
pub fn analyze(dataset: &Dataset) -> Result<DatasetProfile> {
    Analyzer::default().analyze(dataset)
}

/// Correlate the named numeric columns with the default configuration
pub fn correlate<S: AsRef<str>>(dataset: &Dataset, columns: &[S]) -> Result<CorrelationMatrix> {
    Analyzer::default().correlate(dataset, columns)
}

/// Summary insights with the default configuration
pub fn insights(dataset: &Dataset) -> Result<Vec<Insight>> {
    Analyzer::default().insights(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CellValue;

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            ("x", CellValue::from_numbers(&[1.0, 2.0, 3.0, 4.0, 100.0])),
            (
                "label",
                vec!["a".into(), "a".into(), "b".into(), "c".into(), CellValue::Null],
            ),
            ("blank", vec![CellValue::Null; 5]),
        ])
        .unwrap()
    }

    #[test]
    fn test_analyze_dispatches_by_kind() {
        let profile = analyze(&dataset()).unwrap();
        assert_eq!(profile.row_count(), 5);
        assert_eq!(profile.get("x").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(profile.get("label").unwrap().kind(), ColumnKind::Categorical);
        assert_eq!(profile.get("blank").unwrap().kind(), ColumnKind::Empty);
        assert_eq!(profile.get("blank").unwrap().missing(), 5);
        assert_eq!(profile.total_missing(), 6);
        assert_eq!(profile.columns_with_missing(), 2);
    }

    #[test]
    fn test_numeric_analysis() {
        let profile = analyze(&dataset()).unwrap();
        let x = profile.get("x").unwrap().as_numeric().unwrap();
        assert_eq!(x.stats.mean, 22.0);
        assert_eq!(x.stats.median, 3.0);
        assert_eq!(x.outliers.count, 1);
        assert_eq!(x.outliers.outliers[0].row, 4);
        assert_eq!(x.percentiles.p50, 3.0);
        assert_eq!(x.data_quality.positive_count, 5);
        assert!(x.shape.is_skewed);
        assert!(x.shape.has_high_variability);
        assert_eq!(profile.columns_with_outliers(), 1);
    }

    #[test]
    fn test_describe_rejects_categorical() {
        let analyzer = Analyzer::default();
        assert!(matches!(analyzer.describe(&dataset(), "label"), Err(Error::NotNumeric(_))));
        assert!(matches!(analyzer.describe(&dataset(), "blank"), Err(Error::EmptyData(_))));
        assert!(matches!(analyzer.describe(&dataset(), "nope"), Err(Error::ColumnNotFound(_))));
    }

    #[test]
    fn test_correlate_rejects_non_numeric() {
        let result = correlate(&dataset(), &["x", "label"]);
        assert!(matches!(result, Err(Error::NotNumeric(name)) if name == "label"));
        assert!(matches!(correlate(&dataset(), &["x"]), Err(Error::InsufficientColumns { .. })));
    }

    #[test]
    fn test_run_requests() {
        let analyzer = Analyzer::new(AnalysisConfig::default().with_parallel(false)).unwrap();
        let ds = dataset();

        let request: AnalysisRequest = serde_json::from_str(r#"{"type": "distribution", "column": "x", "bins": 2}"#).unwrap();
        match analyzer.run(&ds, &request).unwrap() {
            AnalysisOutput::Distribution(hist) => assert_eq!(hist.bins.len(), 2),
            other => panic!("unexpected output: {:?}", other),
        }

        let request: AnalysisRequest = serde_json::from_str(r#"{"type": "outliers", "column": "x"}"#).unwrap();
        assert!(matches!(analyzer.run(&ds, &request).unwrap(), AnalysisOutput::Outliers(r) if r.count == 1));

        let request: AnalysisRequest = serde_json::from_str(r#"{"type": "insights"}"#).unwrap();
        assert!(matches!(analyzer.run(&ds, &request).unwrap(), AnalysisOutput::Insights(_)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalysisConfig::default().with_zscore_threshold(0.0);
        assert!(matches!(Analyzer::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_profile_serializes_columns_as_map() {
        let profile = analyze(&dataset()).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["row_count"], 5);
        assert_eq!(json["columns"]["x"]["type"], "numeric");
        assert_eq!(json["columns"]["x"]["mean"], 22.0);
        assert_eq!(json["columns"]["blank"]["type"], "empty");
    }
}
