//! Cell type conversion and type detection

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dataset::CellValue;
use crate::na;

/// Date-time layouts tried after RFC 3339
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Date layouts
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Output layout of converted dates
pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// Conversion target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Text,
    Number,
    Date,
    Boolean,
}

/// Detected type of a column sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Number,
    Boolean,
    Date,
    Text,
    Unknown,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Number => write!(f, "number"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Date => write!(f, "date"),
            DataType::Text => write!(f, "text"),
            DataType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Parse a date in any supported layout
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Boolean reading of a cell; `None` for missing cells
pub fn to_boolean(value: &CellValue) -> Option<bool> {
    if na::is_missing_value(value) {
        return None;
    }
    match value {
        CellValue::Bool(b) => Some(*b),
        CellValue::Number(n) => Some(*n != 0.0),
        CellValue::Text(s) => {
            let s = s.trim().to_ascii_lowercase();
            match s.as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                // any other non-empty text is truthy
                _ => Some(true),
            }
        }
        CellValue::Null => None,
    }
}

/// Convert one cell; missing cells become `Null`
pub fn convert_cell(value: &CellValue, target: TargetType) -> CellValue {
    if na::is_missing_value(value) {
        return CellValue::Null;
    }

    match target {
        TargetType::Text => CellValue::Text(value.as_text().into_owned()),
        TargetType::Number => match value {
            CellValue::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
            other => other.to_number().map_or(CellValue::Null, CellValue::Number),
        },
        TargetType::Date => match value {
            CellValue::Text(s) => parse_date(s)
                .map(|d| CellValue::Text(d.format(DATE_OUTPUT_FORMAT).to_string()))
                .unwrap_or(CellValue::Null),
            _ => CellValue::Null,
        },
        TargetType::Boolean => to_boolean(value).map_or(CellValue::Null, CellValue::Bool),
    }
}

/// Guess the type of the first `sample_size` non-null values
pub fn detect_data_type<'a, I>(values: I, sample_size: usize) -> DataType
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let sample: Vec<&CellValue> = values
        .into_iter()
        .filter(|v| !v.is_null())
        .take(sample_size)
        .collect();

    if sample.is_empty() {
        return DataType::Unknown;
    }
    if sample.iter().all(|v| v.to_number().is_some()) {
        return DataType::Number;
    }
    if sample.iter().all(|v| match v {
        CellValue::Bool(_) => true,
        CellValue::Text(s) => s == "true" || s == "false",
        _ => false,
    }) {
        return DataType::Boolean;
    }
    if sample
        .iter()
        .all(|v| matches!(v, CellValue::Text(s) if parse_date(s).is_some()))
    {
        return DataType::Date;
    }
    DataType::Text
}
