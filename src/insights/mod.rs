//! Summary insights
//!
//! Insights only threshold results that the column analyses and the
//! correlation matrix already computed.

use serde::Serialize;

use crate::analysis::DatasetProfile;
use crate::stats::CorrelationMatrix;

/// A titled one-line finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
}

impl Insight {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Build the insight list
///
/// `correlation` is `None` when fewer than two numeric columns exist.
pub fn generate(
    column_count: usize,
    profile: &DatasetProfile,
    correlation: Option<&CorrelationMatrix>,
    strong_threshold: f64,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    insights.push(Insight::new(
        "Data Overview",
        format!(
            "Dataset contains {} rows and {} columns ({} numeric, {} categorical).",
            profile.row_count(),
            column_count,
            profile.numeric_columns().len(),
            profile.categorical_columns().len()
        ),
    ));

    let total_missing = profile.total_missing();
    if total_missing > 0 {
        insights.push(Insight::new(
            "Missing Data Alert",
            format!(
                "Found {} missing values across {} columns. Consider data cleaning.",
                total_missing,
                profile.columns_with_missing()
            ),
        ));
    }

    let with_outliers = profile.columns_with_outliers();
    if with_outliers > 0 {
        insights.push(Insight::new(
            "Outlier Detection",
            format!(
                "Detected outliers in {} numeric columns. Review for data quality issues.",
                with_outliers
            ),
        ));
    }

    if let Some(matrix) = correlation.filter(|m| m.len() >= 2) {
        let strong = matrix.strong_pairs(strong_threshold).len();
        if strong > 0 {
            insights.push(Insight::new(
                "Strong Correlations",
                format!(
                    "Found {} strong correlations (|r| > {}) between variables.",
                    strong, strong_threshold
                ),
            ));
        }
    }

    log::debug!("generated {} insight(s)", insights.len());
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::dataset::{CellValue, Dataset};

    fn titles(insights: &[Insight]) -> Vec<&str> {
        insights.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_overview_only() {
        let ds = Dataset::from_columns(vec![("name", vec![CellValue::from("a"), CellValue::from("b")])]).unwrap();
        let insights = Analyzer::default().insights(&ds).unwrap();
        assert_eq!(titles(&insights), vec!["Data Overview"]);
        assert_eq!(
            insights[0].description,
            "Dataset contains 2 rows and 1 columns (0 numeric, 1 categorical)."
        );
    }

    #[test]
    fn test_all_insights() {
        let ds = Dataset::from_columns(vec![
            ("x", CellValue::from_numbers(&[1.0, 2.0, 3.0, 4.0, 100.0])),
            ("y", CellValue::from_numbers(&[2.0, 4.0, 6.0, 8.0, 200.0])),
            ("note", vec!["a".into(), CellValue::Null, "b".into(), "a".into(), "c".into()]),
        ])
        .unwrap();
        let insights = Analyzer::default().insights(&ds).unwrap();

        assert_eq!(
            titles(&insights),
            vec!["Data Overview", "Missing Data Alert", "Outlier Detection", "Strong Correlations"]
        );
        assert_eq!(
            insights[1].description,
            "Found 1 missing values across 1 columns. Consider data cleaning."
        );
        assert_eq!(
            insights[2].description,
            "Detected outliers in 2 numeric columns. Review for data quality issues."
        );
        assert_eq!(
            insights[3].description,
            "Found 1 strong correlations (|r| > 0.7) between variables."
        );
    }
}
