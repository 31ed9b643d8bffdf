//! Common test utilities module
//!
//! Dataset builders, a reproducible sample generator and temporary files.

#![allow(dead_code)]

use std::io::Write;

use tabstat::{CellValue, Dataset};

/// Dataset made of numeric columns of equal length
pub fn numeric_dataset(columns: &[(&str, &[f64])]) -> Dataset {
    Dataset::from_columns(
        columns
            .iter()
            .map(|(name, values)| (name.to_string(), CellValue::from_numbers(values))),
    )
    .unwrap()
}

/// Text cells; `""` stays an (empty, missing) text cell
pub fn text_column(values: &[&str]) -> Vec<CellValue> {
    values.iter().map(|v| CellValue::from(*v)).collect()
}

/// Reproducible pseudo-random values in `[0, scale)`
pub fn sample_values(n: usize, seed: u64, scale: f64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 33) as f64 / (u32::MAX as f64) * scale
        })
        .collect()
}

/// Small mixed dataset resembling an uploaded sales sheet
pub fn sales_dataset() -> Dataset {
    Dataset::from_json(
        r#"[
            {"region": "north", "units": 12, "price": 9.5,  "note": "ok",   "discount": null},
            {"region": "south", "units": 15, "price": 10.0, "note": "",     "discount": null},
            {"region": "north", "units": 11, "price": 9.0,  "note": "null", "discount": null},
            {"region": "east",  "units": 14, "price": 11.5, "note": "ok",   "discount": null},
            {"region": "north", "units": 90, "price": 55.0, "note": "NaN",  "discount": null},
            {"region": "south", "units": 13, "price": 10.5, "note": "late", "discount": null}
        ]"#,
    )
    .unwrap()
}

/// Temporary file with the given content; the suffix picks the format
pub fn temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
