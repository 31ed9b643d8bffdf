//! Missing-value policy
//!
//! Three separate notions live here:
//!
//! - [`is_missing`]: the filter applied before any column analysis
//!   (null, absent, empty string, `nan` in any case, native NaN).
//! - [`is_nan_value`]: the broader NaN detector used by the cleaning workbench,
//!   which also treats `N/A` and `NA` as missing.
//! - [`is_null_like`]: null-looking strings that survive the filter and are only
//!   reported as a data-quality signal.

use crate::dataset::CellValue;

/// Strings that look like a null but are real, non-empty values
const NULL_LIKE: [&str; 4] = ["null", "NULL", "None", "none"];

/// Whether a cell (possibly absent) is missing for analysis purposes
pub fn is_missing(value: Option<&CellValue>) -> bool {
    value.map_or(true, is_missing_value)
}

/// Whether a present cell is missing for analysis purposes
pub fn is_missing_value(value: &CellValue) -> bool {
    match value {
        CellValue::Null => true,
        CellValue::Number(n) => n.is_nan(),
        CellValue::Text(s) => s.is_empty() || s.trim().eq_ignore_ascii_case("nan"),
        CellValue::Bool(_) => false,
    }
}

/// NaN detection: native NaN, "NaN" in any case, "N/A" and "NA"
pub fn is_nan_value(value: &CellValue) -> bool {
    match value {
        CellValue::Number(n) => n.is_nan(),
        CellValue::Text(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("n/a") || s.eq_ignore_ascii_case("na")
        }
        _ => false,
    }
}

/// Whether a cell counts as missing in the cleaning workbench
pub fn is_missing_or_nan(value: Option<&CellValue>) -> bool {
    value.map_or(true, |v| is_missing_value(v) || is_nan_value(v))
}

/// Null-like string check (exact match)
pub fn is_null_like(value: &str) -> bool {
    NULL_LIKE.contains(&value)
}

/// Whitespace-only (but non-empty) string check
pub fn is_blank(value: &str) -> bool {
    !value.is_empty() && value.trim().is_empty()
}
