//! Dataset loading
//!
//! Payloads come in three JSON shapes:
//!
//! - a bare array of records,
//! - the page payload `{"data": [...], "columns": [...]}`,
//! - the API envelope `{"success": true, "data": [...], "columns": [...], "error": null}`.
//!
//! Loading from a remote source is fire-and-fallback: [`load_with_fallback`]
//! uses the fallback source whenever the primary one fails.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::dataset::{CellValue, Dataset, Record};
use crate::error::{Error, Result};

impl Dataset {
    /// Parse a dataset from a JSON payload
    pub fn from_json(payload: &str) -> Result<Dataset> {
        let value: Value = serde_json::from_str(payload)?;
        match value {
            Value::Array(array) => read_records(array, None),
            Value::Object(map) => read_envelope(map),
            _ => Err(Error::Load("payload must be a JSON array or object".into())),
        }
    }

    /// Read a JSON payload from a file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let content = fs::read_to_string(path.as_ref())?;
        Dataset::from_json(&content)
    }
}

fn read_envelope(mut map: Map<String, Value>) -> Result<Dataset> {
    if let Some(success) = map.get("success") {
        if success != &Value::Bool(true) {
            let reason = match map.get("error") {
                Some(Value::String(message)) => message.clone(),
                _ => "source reported failure".to_string(),
            };
            return Err(Error::Load(reason));
        }
    }

    let data = match map.remove("data") {
        Some(Value::Array(array)) => array,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(Error::Load("'data' must be an array of records".into())),
    };

    let columns = match map.remove("columns") {
        Some(Value::Array(names)) => Some(
            names
                .into_iter()
                .map(|name| match name {
                    Value::String(s) => Ok(s),
                    other => Err(Error::Load(format!("column name must be a string, got {}", other))),
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        Some(Value::Null) | None => None,
        Some(_) => return Err(Error::Load("'columns' must be an array of names".into())),
    };

    read_records(data, columns)
}

/// Build records; without explicit columns the first-seen key order is used
fn read_records(array: Vec<Value>, columns: Option<Vec<String>>) -> Result<Dataset> {
    let mut seen = HashSet::new();
    let mut discovered = Vec::new();
    let mut records = Vec::with_capacity(array.len());

    for (row, item) in array.into_iter().enumerate() {
        let Value::Object(map) = item else {
            return Err(Error::Load(format!("record {} is not an object", row)));
        };

        let mut record = Record::with_capacity(map.len());
        for (key, value) in map {
            if seen.insert(key.clone()) {
                discovered.push(key.clone());
            }
            record.insert(key, CellValue::from(value));
        }
        records.push(record);
    }

    Dataset::new(columns.unwrap_or(discovered), records)
}

/// Something that can produce a dataset
pub trait DataSource {
    /// Name used in log messages
    fn name(&self) -> &str;

    /// Produce the dataset
    fn fetch(&self) -> Result<Dataset>;
}

/// Payload that is already in memory, e.g. embedded in a page
#[derive(Debug, Clone)]
pub struct EmbeddedSource {
    name: String,
    payload: String,
}

impl EmbeddedSource {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

impl DataSource for EmbeddedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Dataset> {
        Dataset::from_json(&self.payload)
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl DataSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Dataset> {
        Dataset::from_json_file(&self.path)
    }
}

/// Payload produced by a host-provided closure, e.g. a remote fetch
pub struct FnSource<F> {
    name: String,
    fetch: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> Result<String>,
{
    pub fn new(name: impl Into<String>, fetch: F) -> Self {
        Self {
            name: name.into(),
            fetch,
        }
    }
}

impl<F> DataSource for FnSource<F>
where
    F: Fn() -> Result<String>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Dataset> {
        let payload = (self.fetch)()?;
        Dataset::from_json(&payload)
    }
}

/// Load from `primary`, falling back to `fallback` on any failure
pub fn load_with_fallback(primary: &dyn DataSource, fallback: &dyn DataSource) -> Result<Dataset> {
    match primary.fetch() {
        Ok(dataset) => {
            log::debug!("loaded {} rows from {}", dataset.row_count(), primary.name());
            Ok(dataset)
        }
        Err(err) => {
            log::warn!(
                "loading from {} failed ({}), using {}",
                primary.name(),
                err,
                fallback.name()
            );
            fallback.fetch()
        }
    }
}
