//! Tabular dataset model
//!
//! A [`Dataset`] is an ordered list of records plus an ordered list of column
//! names. Record order is kept so that positional reports (e.g. outlier rows)
//! point back at the original rows.

mod value;

use std::collections::{HashMap, HashSet};

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

pub use self::value::CellValue;

/// One row: column name to cell value. An absent key is a missing cell.
pub type Record = HashMap<String, CellValue>;

/// Dataset struct: ordered records with an ordered column list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Column names in display order
    columns: Vec<String>,

    /// Records in original order
    records: Vec<Record>,
}

impl Dataset {
    /// Create a dataset from column names and records
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateColumnName(name.clone()));
            }
        }

        Ok(Dataset { columns, records })
    }

    /// Create a dataset column by column
    ///
    /// Every column must have the same number of values.
    pub fn from_columns<S, I>(columns: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Vec<CellValue>)>,
    {
        let mut names = Vec::new();
        let mut data: Vec<Vec<CellValue>> = Vec::new();
        for (name, values) in columns {
            names.push(name.into());
            data.push(values);
        }

        let row_count = data.first().map_or(0, Vec::len);
        if let Some((pos, values)) = data.iter().enumerate().find(|(_, v)| v.len() != row_count) {
            return Err(Error::InvalidInput(format!(
                "column '{}' has {} values, expected {}",
                names[pos],
                values.len(),
                row_count
            )));
        }

        let mut records: Vec<Record> = (0..row_count).map(|_| Record::with_capacity(names.len())).collect();
        for (name, values) in names.iter().zip(data) {
            for (record, value) in records.iter_mut().zip(values) {
                record.insert(name.clone(), value);
            }
        }

        Dataset::new(names, records)
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Get a cell; `None` when the row is out of range or the key is absent
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.records.get(row).and_then(|r| r.get(column))
    }

    /// All cells of one column in row order (absent keys as `None`)
    pub fn column(&self, name: &str) -> Result<Vec<Option<&CellValue>>> {
        if !self.has_column(name) {
            return Err(Error::ColumnNotFound(name.to_string()));
        }
        Ok(self.records.iter().map(|r| r.get(name)).collect())
    }

    /// Same columns, different records
    pub(crate) fn with_records(&self, records: Vec<Record>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }

    /// Add or replace a column, one value per record
    pub(crate) fn set_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<()> {
        if values.len() != self.records.len() {
            return Err(Error::InvalidInput(format!(
                "column '{}' has {} values, expected {}",
                name,
                values.len(),
                self.records.len()
            )));
        }

        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
        for (record, value) in self.records.iter_mut().zip(values) {
            record.insert(name.to_string(), value);
        }
        Ok(())
    }
}

/// Serializes one record with keys in column order
struct OrderedRecord<'a> {
    columns: &'a [String],
    record: &'a Record,
}

impl Serialize for OrderedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for name in self.columns {
            if let Some(value) = self.record.get(name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let data: Vec<OrderedRecord<'_>> = self
            .records
            .iter()
            .map(|record| OrderedRecord {
                columns: &self.columns,
                record,
            })
            .collect();

        let mut state = serializer.serialize_struct("Dataset", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("data", &data)?;
        state.end()
    }
}
