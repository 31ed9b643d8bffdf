//! Cleaning workbench
//!
//! Every operation borrows the input dataset and returns a cleaned copy together
//! with [`CleaningStats`]; the input is never modified.

pub mod convert;
pub mod text;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::column::{self, ColumnKind};
use crate::dataset::{CellValue, Dataset, Record};
use crate::error::{Error, Result};
use crate::na;
use crate::stats::descriptive::{mean_impl, median_impl, sorted_copy};
use crate::stats::outliers::{iqr_bounds, DEFAULT_IQR_MULTIPLIER};

pub use self::convert::{detect_data_type, DataType, TargetType};
pub use self::text::TextAction;

/// What to do with missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum MissingAction {
    FillMean,
    FillMedian,
    FillZero,
    FillCustom { value: CellValue },
    Drop,
}

/// What to do with IQR outliers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutlierAction {
    /// Drop the rows
    Remove,
    /// Clamp the values to the fences
    Cap,
    /// Add a boolean `<column>_outlier` column
    Flag,
}

/// Which occurrence of a duplicated row survives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeepPolicy {
    #[default]
    First,
    Last,
}

/// Rescaling method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizeMethod {
    /// `(x - min) / (max - min)`
    MinMax,
    /// `(x - mean) / sd` with the sample standard deviation
    ZScore,
    /// `x / max(|x|)`
    Decimal,
}

fn default_multiplier() -> f64 {
    DEFAULT_IQR_MULTIPLIER
}

/// One cleaning request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum CleaningOperation {
    MissingValues {
        column: String,
        #[serde(flatten)]
        action: MissingAction,
    },
    Outliers {
        column: String,
        action: OutlierAction,
        #[serde(default = "default_multiplier")]
        multiplier: f64,
    },
    DataType {
        column: String,
        target: TargetType,
    },
    TextCleaning {
        column: String,
        actions: Vec<TextAction>,
    },
    Duplicates {
        #[serde(default)]
        keep: KeepPolicy,
    },
    Normalize {
        column: String,
        method: NormalizeMethod,
    },
}

/// Outcome counters of one cleaning operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningStats {
    /// Rows removed or touched
    pub rows_affected: usize,
    /// Cells whose value changed
    pub values_changed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates_removed: Option<usize>,
}

/// Cleaned dataset plus counters
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningResult {
    pub dataset: Dataset,
    pub stats: CleaningStats,
}

/// Run one cleaning request
pub fn apply(dataset: &Dataset, operation: &CleaningOperation) -> Result<CleaningResult> {
    let result = match operation {
        CleaningOperation::MissingValues { column, action } => handle_missing(dataset, column, action),
        CleaningOperation::Outliers {
            column,
            action,
            multiplier,
        } => handle_outliers(dataset, column, *action, *multiplier),
        CleaningOperation::DataType { column, target } => convert_column(dataset, column, *target),
        CleaningOperation::TextCleaning { column, actions } => clean_text(dataset, column, actions),
        CleaningOperation::Duplicates { keep } => Ok(remove_duplicates(dataset, *keep)),
        CleaningOperation::Normalize { column, method } => normalize(dataset, column, *method),
    }?;

    log::info!(
        "cleaning {:?}: {} row(s) affected, {} value(s) changed",
        operation,
        result.stats.rows_affected,
        result.stats.values_changed
    );
    Ok(result)
}

/// Values of `column` that are present and not NaN-like, parsed as numbers
fn workbench_numbers(dataset: &Dataset, column: &str) -> Result<Vec<f64>> {
    let cells = dataset.column(column)?;
    let mut numbers = Vec::new();
    for cell in cells.into_iter().flatten() {
        if na::is_missing_value(cell) || na::is_nan_value(cell) {
            continue;
        }
        match cell.to_number() {
            Some(n) => numbers.push(n),
            None => return Err(Error::NotNumeric(column.to_string())),
        }
    }
    if numbers.is_empty() {
        return Err(Error::EmptyData(format!("column '{}' has no values", column)));
    }
    Ok(numbers)
}

/// Fill or drop missing values of one column
pub fn handle_missing(dataset: &Dataset, column: &str, action: &MissingAction) -> Result<CleaningResult> {
    let cells = dataset.column(column)?;
    let missing_rows: Vec<bool> = cells.iter().map(|c| na::is_missing_or_nan(*c)).collect();
    let missing = missing_rows.iter().filter(|m| **m).count();

    let fill = match action {
        MissingAction::Drop => {
            let records: Vec<Record> = dataset
                .records()
                .iter()
                .zip(&missing_rows)
                .filter(|(_, missing)| !**missing)
                .map(|(record, _)| record.clone())
                .collect();
            return Ok(CleaningResult {
                dataset: dataset.with_records(records),
                stats: CleaningStats {
                    rows_affected: missing,
                    missing_found: Some(missing),
                    ..CleaningStats::default()
                },
            });
        }
        MissingAction::FillMean => {
            let numbers = workbench_numbers(dataset, column)?;
            CellValue::Number(mean_impl(&numbers))
        }
        MissingAction::FillMedian => {
            let numbers = workbench_numbers(dataset, column)?;
            CellValue::Number(median_impl(&sorted_copy(&numbers))?)
        }
        MissingAction::FillZero => CellValue::Number(0.0),
        MissingAction::FillCustom { value } => value.clone(),
    };

    let values: Vec<CellValue> = cells
        .iter()
        .zip(&missing_rows)
        .map(|(cell, missing)| if *missing { fill.clone() } else { cell.cloned().unwrap_or_default() })
        .collect();

    let mut cleaned = dataset.clone();
    cleaned.set_column(column, values)?;
    Ok(CleaningResult {
        dataset: cleaned,
        stats: CleaningStats {
            rows_affected: missing,
            values_changed: missing,
            missing_found: Some(missing),
            ..CleaningStats::default()
        },
    })
}

/// Row-aligned numbers of a numeric column, erroring for any other kind
fn numeric_column(dataset: &Dataset, column: &str) -> Result<Vec<Option<f64>>> {
    match column::extract(dataset, column)?.kind() {
        ColumnKind::Numeric => column::aligned_numbers(dataset, column),
        ColumnKind::Empty => Err(Error::EmptyData(format!("column '{}' has no values", column))),
        ColumnKind::Categorical => Err(Error::NotNumeric(column.to_string())),
    }
}

/// Remove, cap or flag IQR outliers of one numeric column
pub fn handle_outliers(dataset: &Dataset, column: &str, action: OutlierAction, multiplier: f64) -> Result<CleaningResult> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(Error::InvalidInput(format!(
            "IQR multiplier must be a non-negative number, got {}",
            multiplier
        )));
    }

    let aligned = numeric_column(dataset, column)?;
    let present: Vec<f64> = aligned.iter().flatten().copied().collect();
    let bounds = iqr_bounds(&sorted_copy(&present), multiplier)?;
    let is_outlier: Vec<bool> = aligned
        .iter()
        .map(|v| v.map_or(false, |x| bounds.side_of(x).is_some()))
        .collect();
    let found = is_outlier.iter().filter(|o| **o).count();

    let mut stats = CleaningStats {
        outliers_found: Some(found),
        ..CleaningStats::default()
    };

    let cleaned = match action {
        OutlierAction::Remove => {
            stats.rows_affected = found;
            let records = dataset
                .records()
                .iter()
                .zip(&is_outlier)
                .filter(|(_, outlier)| !**outlier)
                .map(|(record, _)| record.clone())
                .collect();
            dataset.with_records(records)
        }
        OutlierAction::Cap => {
            stats.rows_affected = found;
            stats.values_changed = found;
            let cells = dataset.column(column)?;
            let values = cells
                .iter()
                .zip(&aligned)
                .zip(&is_outlier)
                .map(|((cell, number), outlier)| match number {
                    Some(x) if *outlier => CellValue::Number(bounds.clamp(*x)),
                    _ => cell.cloned().unwrap_or_default(),
                })
                .collect();
            let mut cleaned = dataset.clone();
            cleaned.set_column(column, values)?;
            cleaned
        }
        OutlierAction::Flag => {
            let flag_column = format!("{}_outlier", column);
            stats.values_changed = dataset.row_count();
            let values = is_outlier.iter().map(|o| CellValue::Bool(*o)).collect();
            let mut cleaned = dataset.clone();
            cleaned.set_column(&flag_column, values)?;
            cleaned
        }
    };

    Ok(CleaningResult { dataset: cleaned, stats })
}

/// Cell equality where a NaN number equals another NaN number
fn same_cell(a: &CellValue, b: &CellValue) -> bool {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a == b,
    }
}

/// Replace a column's values cell by cell
fn map_column<F>(dataset: &Dataset, column: &str, f: F) -> Result<CleaningResult>
where
    F: Fn(&CellValue) -> CellValue,
{
    let cells = dataset.column(column)?;
    let mut changed = 0;
    let values: Vec<CellValue> = cells
        .into_iter()
        .map(|cell| {
            let original = cell.cloned().unwrap_or_default();
            let converted = f(&original);
            if !same_cell(&converted, &original) {
                changed += 1;
            }
            converted
        })
        .collect();

    let mut cleaned = dataset.clone();
    cleaned.set_column(column, values)?;
    Ok(CleaningResult {
        dataset: cleaned,
        stats: CleaningStats {
            rows_affected: changed,
            values_changed: changed,
            ..CleaningStats::default()
        },
    })
}

/// Convert a column to another type; values that cannot be converted become null
pub fn convert_column(dataset: &Dataset, column: &str, target: TargetType) -> Result<CleaningResult> {
    map_column(dataset, column, |cell| convert::convert_cell(cell, target))
}

/// Run text-cleaning steps over the present values of a column
pub fn clean_text(dataset: &Dataset, column: &str, actions: &[TextAction]) -> Result<CleaningResult> {
    map_column(dataset, column, |cell| {
        if na::is_missing_value(cell) {
            cell.clone()
        } else {
            CellValue::Text(text::clean_text(&cell.as_text(), actions))
        }
    })
}

/// Identity of a row across every column, in column order
fn row_key(dataset: &Dataset, record: &Record) -> String {
    let cells: Vec<Option<&CellValue>> = dataset.columns().iter().map(|c| record.get(c)).collect();
    // every CellValue serializes, so this cannot fail
    serde_json::to_string(&cells).unwrap_or_default()
}

/// Indices of the rows that survive de-duplication, in row order
fn unique_rows(dataset: &Dataset, keep: KeepPolicy) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut kept: Vec<usize> = match keep {
        KeepPolicy::First => (0..dataset.row_count())
            .filter(|&i| seen.insert(row_key(dataset, &dataset.records()[i])))
            .collect(),
        KeepPolicy::Last => (0..dataset.row_count())
            .rev()
            .filter(|&i| seen.insert(row_key(dataset, &dataset.records()[i])))
            .collect(),
    };
    kept.sort_unstable();
    kept
}

/// Drop exact duplicate rows
pub fn remove_duplicates(dataset: &Dataset, keep: KeepPolicy) -> CleaningResult {
    let kept = unique_rows(dataset, keep);
    let removed = dataset.row_count() - kept.len();
    let records = kept.into_iter().map(|i| dataset.records()[i].clone()).collect();

    CleaningResult {
        dataset: dataset.with_records(records),
        stats: CleaningStats {
            rows_affected: removed,
            duplicates_removed: Some(removed),
            ..CleaningStats::default()
        },
    }
}

/// Rescale a numeric column; a zero spread leaves it unchanged
pub fn normalize(dataset: &Dataset, column: &str, method: NormalizeMethod) -> Result<CleaningResult> {
    let aligned = numeric_column(dataset, column)?;
    let present: Vec<f64> = aligned.iter().flatten().copied().collect();
    let n = present.len() as f64;

    let transform: Option<Box<dyn Fn(f64) -> f64>> = match method {
        NormalizeMethod::MinMax => {
            let min = present.iter().copied().fold(f64::INFINITY, f64::min);
            let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (max != min).then(|| Box::new(move |x: f64| (x - min) / (max - min)) as Box<dyn Fn(f64) -> f64>)
        }
        NormalizeMethod::ZScore => {
            let mean = mean_impl(&present);
            let sd = if present.len() < 2 {
                0.0
            } else {
                (present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
            };
            (sd != 0.0).then(|| Box::new(move |x: f64| (x - mean) / sd) as Box<dyn Fn(f64) -> f64>)
        }
        NormalizeMethod::Decimal => {
            let max_abs = present.iter().map(|x| x.abs()).fold(0.0, f64::max);
            (max_abs != 0.0).then(|| Box::new(move |x: f64| x / max_abs) as Box<dyn Fn(f64) -> f64>)
        }
    };

    let Some(transform) = transform else {
        log::info!("normalize {:?} skipped for '{}': no spread", method, column);
        return Ok(CleaningResult {
            dataset: dataset.clone(),
            stats: CleaningStats::default(),
        });
    };

    let cells = dataset.column(column)?;
    let values = cells
        .iter()
        .zip(&aligned)
        .map(|(cell, number)| match number {
            Some(x) => CellValue::Number(transform(*x)),
            None => cell.cloned().unwrap_or_default(),
        })
        .collect();

    let mut cleaned = dataset.clone();
    cleaned.set_column(column, values)?;
    let changed = present.len();
    Ok(CleaningResult {
        dataset: cleaned,
        stats: CleaningStats {
            rows_affected: changed,
            values_changed: changed,
            ..CleaningStats::default()
        },
    })
}

/// Number of cells of `column` that are missing or NaN-like
pub fn missing_count(dataset: &Dataset, column: &str) -> Result<usize> {
    Ok(dataset
        .column(column)?
        .into_iter()
        .filter(|c| na::is_missing_or_nan(*c))
        .count())
}

/// Number of rows that repeat an earlier row exactly
pub fn duplicate_count(dataset: &Dataset) -> usize {
    dataset.row_count() - unique_rows(dataset, KeepPolicy::First).len()
}

/// Guess the data type of a column from its first `sample_size` non-null values
pub fn column_data_type(dataset: &Dataset, column: &str, sample_size: usize) -> Result<DataType> {
    let cells = dataset.column(column)?;
    Ok(detect_data_type(cells.into_iter().flatten(), sample_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            (
                "x",
                vec![
                    CellValue::Number(1.0),
                    CellValue::Null,
                    CellValue::Number(3.0),
                    CellValue::from("N/A"),
                    CellValue::Number(8.0),
                ],
            ),
            ("name", vec!["a".into(), "b".into(), "a".into(), "c".into(), "b".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fill_mean() {
        let ds = dataset();
        let result = handle_missing(&ds, "x", &MissingAction::FillMean).unwrap();
        assert_eq!(result.stats.missing_found, Some(2));
        assert_eq!(result.dataset.get(1, "x"), Some(&CellValue::Number(4.0)));
        assert_eq!(result.dataset.get(3, "x"), Some(&CellValue::Number(4.0)));
        // the input stays as it was
        assert_eq!(ds.get(1, "x"), Some(&CellValue::Null));
    }

    #[test]
    fn test_fill_median_and_custom() {
        let ds = dataset();
        let median = handle_missing(&ds, "x", &MissingAction::FillMedian).unwrap();
        assert_eq!(median.dataset.get(1, "x"), Some(&CellValue::Number(3.0)));

        let custom = handle_missing(&ds, "x", &MissingAction::FillCustom { value: "?".into() }).unwrap();
        assert_eq!(custom.dataset.get(3, "x"), Some(&CellValue::from("?")));
    }

    #[test]
    fn test_fill_mean_needs_numbers() {
        let result = handle_missing(&dataset(), "name", &MissingAction::FillMean);
        assert!(matches!(result, Err(Error::NotNumeric(_))));
    }

    #[test]
    fn test_untouched_nan_is_not_a_change() {
        let ds = Dataset::from_columns(vec![(
            "s",
            vec![CellValue::Number(f64::NAN), CellValue::from(" a "), CellValue::from("b")],
        )])
        .unwrap();
        let result = clean_text(&ds, "s", &[TextAction::Trim]).unwrap();
        assert_eq!(result.stats.values_changed, 1);
        assert_eq!(result.dataset.get(1, "s"), Some(&CellValue::from("a")));

        assert!(same_cell(&CellValue::Number(f64::NAN), &CellValue::Number(f64::NAN)));
        assert!(!same_cell(&CellValue::Number(f64::NAN), &CellValue::Null));
    }

    #[test]
    fn test_drop_missing() {
        let result = handle_missing(&dataset(), "x", &MissingAction::Drop).unwrap();
        assert_eq!(result.dataset.row_count(), 3);
        assert_eq!(result.stats.rows_affected, 2);
    }

    #[test]
    fn test_duplicates() {
        let ds = Dataset::from_columns(vec![
            ("k", vec!["a".into(), "b".into(), "a".into()]),
            ("v", CellValue::from_numbers(&[1, 2, 1])),
        ])
        .unwrap();
        assert_eq!(duplicate_count(&ds), 1);

        let first = remove_duplicates(&ds, KeepPolicy::First);
        assert_eq!(first.dataset.row_count(), 2);
        assert_eq!(first.dataset.get(1, "k"), Some(&CellValue::from("b")));

        let last = remove_duplicates(&ds, KeepPolicy::Last);
        assert_eq!(last.dataset.get(0, "k"), Some(&CellValue::from("b")));
        assert_eq!(last.stats.duplicates_removed, Some(1));
    }

    #[test]
    fn test_operation_from_json() {
        let op: CleaningOperation =
            serde_json::from_str(r#"{"operation": "missing-values", "column": "x", "action": "fill-zero"}"#).unwrap();
        assert_eq!(
            op,
            CleaningOperation::MissingValues {
                column: "x".into(),
                action: MissingAction::FillZero
            }
        );

        let op: CleaningOperation =
            serde_json::from_str(r#"{"operation": "outliers", "column": "x", "action": "cap"}"#).unwrap();
        assert!(matches!(op, CleaningOperation::Outliers { multiplier, .. } if multiplier == 1.5));
    }

    #[test]
    fn test_missing_count() {
        assert_eq!(missing_count(&dataset(), "x").unwrap(), 2);
        assert_eq!(missing_count(&dataset(), "name").unwrap(), 0);
        assert!(missing_count(&dataset(), "nope").is_err());
    }
}
