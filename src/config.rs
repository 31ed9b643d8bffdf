//! Analysis configuration
//!
//! Every field has a default, so a config file only needs the values it changes.
//! Files are read as TOML, YAML or JSON depending on their extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::distribution::{DEFAULT_MAX_BINS, MAX_BINS};
use crate::stats::outliers::{DEFAULT_IQR_MULTIPLIER, DEFAULT_ZSCORE_THRESHOLD};

/// Configuration of an [`Analyzer`](crate::analysis::Analyzer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Multiplier `k` of the IQR fences
    pub iqr_multiplier: f64,
    /// Threshold of the Z-score method
    pub zscore_threshold: f64,
    /// Upper limit of the default histogram bin count
    pub max_histogram_bins: usize,
    /// `|r|` above which a pair counts as strongly correlated
    pub strong_correlation: f64,
    /// CV (percent) above which a column has high variability
    pub high_variability_cv: f64,
    /// Analyze columns and correlation pairs on the rayon pool
    pub parallel: bool,
    /// Values inspected when guessing a column's data type
    pub type_sample_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            zscore_threshold: DEFAULT_ZSCORE_THRESHOLD,
            max_histogram_bins: DEFAULT_MAX_BINS,
            strong_correlation: 0.7,
            high_variability_cv: 50.0,
            parallel: true,
            type_sample_size: 100,
        }
    }
}

impl AnalysisConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IQR multiplier
    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = multiplier;
        self
    }

    /// Set the Z-score threshold
    pub fn with_zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = threshold;
        self
    }

    /// Set the upper limit of the histogram bin count
    pub fn with_max_histogram_bins(mut self, bins: usize) -> Self {
        self.max_histogram_bins = bins;
        self
    }

    /// Set the strong-correlation threshold
    pub fn with_strong_correlation(mut self, threshold: f64) -> Self {
        self.strong_correlation = threshold;
        self
    }

    /// Set the high-variability CV threshold
    pub fn with_high_variability_cv(mut self, cv: f64) -> Self {
        self.high_variability_cv = cv;
        self
    }

    /// Enable or disable parallel analysis
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the type-detection sample size
    pub fn with_type_sample_size(mut self, size: usize) -> Self {
        self.type_sample_size = size;
        self
    }

    /// Check every threshold
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("iqr_multiplier", self.iqr_multiplier),
            ("zscore_threshold", self.zscore_threshold),
            ("high_variability_cv", self.high_variability_cv),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!("{} must be a positive number, got {}", name, value)));
            }
        }

        if !(self.strong_correlation > 0.0 && self.strong_correlation <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "strong_correlation must be within (0, 1], got {}",
                self.strong_correlation
            )));
        }
        if self.max_histogram_bins == 0 || self.max_histogram_bins > MAX_BINS {
            return Err(Error::InvalidConfig(format!(
                "max_histogram_bins must be within 1..={}, got {}",
                MAX_BINS, self.max_histogram_bins
            )));
        }
        if self.type_sample_size == 0 {
            return Err(Error::InvalidConfig("type_sample_size must be at least 1".into()));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, choosing the format by extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        log::debug!("loading analysis config from {}", path.display());
        match extension.as_str() {
            "toml" => Self::from_toml_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => Self::from_json_str(&content),
            other => Err(Error::InvalidConfig(format!(
                "unsupported config format '{}' for {}",
                other,
                path.display()
            ))),
        }
    }
}
