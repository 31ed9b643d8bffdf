use thiserror::Error;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not enough data for {metric}: need at least {required} values, got {actual}")]
    DegenerateInput {
        metric: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Correlation needs at least {required} numeric columns, found {found}")]
    InsufficientColumns { required: usize, found: usize },

    #[error("Metric is undefined for this input: {0}")]
    UndefinedMetric(&'static str),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Column is not numeric: {0}")]
    NotNumeric(String),

    #[error("No data: {0}")]
    EmptyData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load dataset: {0}")]
    Load(String),

    #[error("I/O error")]
    Io(#[source] std::io::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),

    #[error("TOML error")]
    Toml(#[source] toml::de::Error),

    #[error("YAML error")]
    Yaml(#[source] serde_yaml::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error only affects a single metric and can be turned into a sentinel
    pub fn is_metric_level(&self) -> bool {
        matches!(self, Error::DegenerateInput { .. } | Error::UndefinedMetric(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}
