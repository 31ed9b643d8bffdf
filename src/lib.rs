#![allow(clippy::too_many_arguments)]

//! Descriptive statistics and column profiling for small tabular datasets.
//!
//! ```rust
//! use tabstat::{analyze, CellValue, Dataset};
//!
//! let ds = Dataset::from_columns(vec![("x", CellValue::from_numbers(&[1.0, 2.0, 3.0, 4.0, 5.0]))]).unwrap();
//! let profile = analyze(&ds).unwrap();
//! let x = profile.get("x").unwrap().as_numeric().unwrap();
//! assert_eq!(x.stats.mean, 3.0);
//! assert_eq!(x.outliers.count, 0);
//! ```

pub mod analysis;
pub mod cleaning;
pub mod column;
pub mod config;
pub mod dataset;
pub mod error;
pub mod insights;
pub mod loader;
pub mod na;
pub mod stats;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use analysis::{analyze, correlate, insights, AnalysisOutput, AnalysisRequest, Analyzer, ColumnAnalysis, DatasetProfile};
pub use column::ColumnKind;
pub use config::AnalysisConfig;
pub use dataset::{CellValue, Dataset, Record};
pub use error::{Error, Result};
pub use insights::Insight;
pub use loader::{load_with_fallback, DataSource, EmbeddedSource, FileSource, FnSource};
pub use stats::{CorrelationMatrix, DescriptiveStats, Metric, OutlierMethod};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
