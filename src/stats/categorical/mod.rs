//! Categorical column analysis

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::na;
use crate::stats::percentage;

/// `max / min` frequency ratio below which a column counts as balanced
const BALANCE_RATIO: f64 = 3.0;

/// Unique/total ratio above which cardinality is high
const HIGH_CARDINALITY_RATIO: f64 = 0.5;

/// Unique count below which cardinality is low
const LOW_CARDINALITY_LIMIT: usize = 5;

/// Cardinality class of a categorical column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    High,
    Medium,
    Low,
}

impl Cardinality {
    /// Classify from unique and total counts
    pub fn classify(unique: usize, total: usize) -> Self {
        if unique as f64 > HIGH_CARDINALITY_RATIO * total as f64 {
            Cardinality::High
        } else if unique < LOW_CARDINALITY_LIMIT {
            Cardinality::Low
        } else {
            Cardinality::Medium
        }
    }
}

/// One value of the frequency distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

/// Data-quality signals inside the non-missing values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalQuality {
    /// Whitespace-only values
    pub blank_count: usize,
    pub blank_percentage: f64,
    /// "null", "NULL", "None", "none"
    pub null_like_count: usize,
    pub null_like_percentage: f64,
    /// Values that are neither blank nor null-like
    pub valid_values: usize,
    pub valid_percentage: f64,
}

/// Analysis of one categorical column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalAnalysis {
    pub column: String,
    /// Non-missing values
    pub count: usize,
    pub missing: usize,
    pub missing_percentage: f64,
    pub unique_values: usize,
    pub most_frequent: String,
    pub most_frequent_count: usize,
    pub most_frequent_percentage: f64,
    /// Count-descending; equal counts keep first-encountered order
    pub distribution: Vec<FrequencyEntry>,
    /// unique / count
    pub diversity_index: f64,
    pub is_balanced: bool,
    pub cardinality: Cardinality,
    pub data_quality: CategoricalQuality,
}

/// Frequency table sorted by count, ties in first-encountered order
pub fn frequencies<S: AsRef<str>>(values: &[S]) -> Vec<FrequencyEntry> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for value in values {
        let value = value.as_ref();
        match index.get(value) {
            Some(&pos) => order[pos].1 += 1,
            None => {
                index.insert(value, order.len());
                order.push((value, 1));
            }
        }
    }

    // stable sort keeps first-encountered order among equal counts
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let total = values.len();
    order
        .into_iter()
        .map(|(value, count)| FrequencyEntry {
            value: value.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Internal implementation of the categorical analysis
///
/// `values` are the non-missing values in string form; `total_rows` is the
/// dataset row count used for the missing figures.
pub(crate) fn analyze_impl<S: AsRef<str>>(column: &str, values: &[S], total_rows: usize) -> Result<CategoricalAnalysis> {
    if values.is_empty() {
        return Err(Error::EmptyData(format!("column '{}' has no values", column)));
    }
    if total_rows < values.len() {
        return Err(Error::InvalidInput(format!(
            "column '{}' has {} values but only {} rows",
            column,
            values.len(),
            total_rows
        )));
    }

    let count = values.len();
    let missing = total_rows - count;
    let distribution = frequencies(values);
    let unique_values = distribution.len();

    let (most_frequent, most_frequent_count) = distribution
        .first()
        .map(|e| (e.value.clone(), e.count))
        .unwrap_or_default();
    let max_count = most_frequent_count;
    let min_count = distribution.last().map_or(0, |e| e.count);

    let is_balanced = unique_values > 1 && (max_count as f64 / min_count as f64) < BALANCE_RATIO;

    let blank_count = values.iter().filter(|v| na::is_blank(v.as_ref())).count();
    let null_like_count = values.iter().filter(|v| na::is_null_like(v.as_ref())).count();
    let valid_values = count - blank_count - null_like_count;

    Ok(CategoricalAnalysis {
        column: column.to_string(),
        count,
        missing,
        missing_percentage: percentage(missing, total_rows),
        unique_values,
        most_frequent,
        most_frequent_count,
        most_frequent_percentage: percentage(most_frequent_count, count),
        distribution,
        diversity_index: unique_values as f64 / count as f64,
        is_balanced,
        cardinality: Cardinality::classify(unique_values, count),
        data_quality: CategoricalQuality {
            blank_count,
            blank_percentage: percentage(blank_count, count),
            null_like_count,
            null_like_percentage: percentage(null_like_count, count),
            valid_values,
            valid_percentage: percentage(valid_values, count),
        },
    })
}
