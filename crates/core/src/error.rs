use thiserror::Error;

pub type RoiResult<T> = Result<T, RoiError>;

#[derive(Error, Debug)]
pub enum RoiError {
    #[error("Schema error: table '{table}' is missing required column '{column}'")]
    Schema { table: &'static str, column: String },

    #[error("Invalid value: table '{table}' row {row} column '{column}': {reason}")]
    InvalidValue {
        table: &'static str,
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("Cannot open input table {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid baseline revenue {0}: must be a finite, non-negative number")]
    InvalidBaseline(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RoiError {
    pub fn schema(table: &'static str, column: impl Into<String>) -> Self {
        Self::Schema {
            table,
            column: column.into(),
        }
    }

    pub fn invalid_value(
        table: &'static str,
        row: usize,
        column: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            table,
            row,
            column,
            reason: reason.into(),
        }
    }

    /// Schema and value errors abort the render pass; the caller should
    /// surface the message as-is.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::InvalidValue { .. })
    }
}
