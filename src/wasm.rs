//! Browser bindings
//!
//! Every export takes the dataset payload as JSON text plus an optional JSON
//! config, and returns the result as JSON text. Errors surface as JS strings.

use wasm_bindgen::prelude::*;

use crate::analysis::Analyzer;
use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::Result;

fn analyzer(config: Option<String>) -> Result<Analyzer> {
    let config = match config {
        Some(json) if !json.trim().is_empty() => AnalysisConfig::from_json_str(&json)?,
        _ => AnalysisConfig::default(),
    };
    // no threads in the browser
    Analyzer::new(config.with_parallel(false))
}

fn to_js<T: serde::Serialize>(result: Result<T>) -> std::result::Result<String, JsValue> {
    result
        .and_then(|value| serde_json::to_string(&value).map_err(Into::into))
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Profile every column
#[wasm_bindgen(js_name = analyzeJson)]
pub fn analyze_json(payload: &str, config: Option<String>) -> std::result::Result<String, JsValue> {
    to_js(Dataset::from_json(payload).and_then(|ds| analyzer(config)?.analyze(&ds)))
}

/// Correlation matrix of every numeric column
#[wasm_bindgen(js_name = correlateJson)]
pub fn correlate_json(payload: &str, config: Option<String>) -> std::result::Result<String, JsValue> {
    to_js(Dataset::from_json(payload).and_then(|ds| analyzer(config)?.correlate_all(&ds)))
}

/// Summary insights
#[wasm_bindgen(js_name = insightsJson)]
pub fn insights_json(payload: &str, config: Option<String>) -> std::result::Result<String, JsValue> {
    to_js(Dataset::from_json(payload).and_then(|ds| analyzer(config)?.insights(&ds)))
}
