//! Column extraction and classification

use serde::Serialize;

use crate::dataset::{CellValue, Dataset};
use crate::error::{Error, Result};
use crate::na;

/// Kind of a column, derived fresh from its values on every call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-missing value is a finite real number
    Numeric,
    /// At least one non-missing value is not a number
    Categorical,
    /// No non-missing values
    Empty,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Empty => write!(f, "empty"),
        }
    }
}

/// Classify a column from its values
///
/// Missing values are skipped, so passing an unfiltered column is fine.
pub fn classify<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut seen = false;
    for value in values.into_iter().filter(|v| !na::is_missing_value(v)) {
        if value.to_number().is_none() {
            return ColumnKind::Categorical;
        }
        seen = true;
    }

    if seen {
        ColumnKind::Numeric
    } else {
        ColumnKind::Empty
    }
}

/// The non-missing cells of one column, with their row positions
#[derive(Debug, Clone)]
pub struct ColumnValues<'a> {
    name: &'a str,
    total: usize,
    present: Vec<(usize, &'a CellValue)>,
}

impl<'a> ColumnValues<'a> {
    /// Column name
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Total number of rows in the dataset
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of non-missing values
    pub fn len(&self) -> usize {
        self.present.len()
    }

    /// Whether every value is missing
    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Number of missing values
    pub fn missing(&self) -> usize {
        self.total - self.present.len()
    }

    /// `(row, value)` pairs of the non-missing cells
    pub fn present(&self) -> &[(usize, &'a CellValue)] {
        &self.present
    }

    /// Kind of this column
    pub fn kind(&self) -> ColumnKind {
        classify(self.present.iter().map(|(_, v)| *v))
    }

    /// Parsed `(row, value)` pairs; `None` if any value is not numeric
    pub fn numeric(&self) -> Option<Vec<(usize, f64)>> {
        self.present
            .iter()
            .map(|(row, value)| value.to_number().map(|n| (*row, n)))
            .collect()
    }

    /// String forms of the non-missing values
    pub fn texts(&self) -> Vec<String> {
        self.present.iter().map(|(_, v)| v.as_text().into_owned()).collect()
    }
}

/// Pull the non-missing cells of `column` out of `dataset`
pub fn extract<'a>(dataset: &'a Dataset, column: &str) -> Result<ColumnValues<'a>> {
    let name = dataset
        .columns()
        .iter()
        .find(|c| c.as_str() == column)
        .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;

    let present = dataset
        .records()
        .iter()
        .enumerate()
        .filter_map(|(row, record)| match record.get(column) {
            Some(value) if !na::is_missing_value(value) => Some((row, value)),
            _ => None,
        })
        .collect();

    Ok(ColumnValues {
        name: name.as_str(),
        total: dataset.row_count(),
        present,
    })
}

/// Row-aligned numeric view of a column: `None` for missing or non-numeric cells
pub(crate) fn aligned_numbers(dataset: &Dataset, column: &str) -> Result<Vec<Option<f64>>> {
    Ok(dataset
        .column(column)?
        .into_iter()
        .map(|cell| cell.filter(|v| !na::is_missing_value(v)).and_then(CellValue::to_number))
        .collect())
}
