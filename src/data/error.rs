use thiserror::Error;

/// Failures of the wide-to-long normalisation.
///
/// All of them abort the load; no partial record set is ever returned.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("no header row found after skipping {skip_rows} rows")]
    MissingHeader { skip_rows: usize },

    #[error(
        "expected {expected} columns (indicator, unit, frequency and {periods} periods), found {found}: {header:?}"
    )]
    ColumnCount {
        expected: usize,
        periods: usize,
        found: usize,
        header: Vec<String>,
    },

    #[error("malformed period token '{token}', expected '<year>_<1|2>'")]
    MalformedPeriod { token: String },

    #[error("row {row}, column '{column}': '{text}' is not a number")]
    InvalidValue {
        row: usize,
        column: String,
        text: String,
    },
}

impl PipelineError {
    /// Whether this error means the table does not have the expected shape.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingHeader { .. } | PipelineError::ColumnCount { .. }
        )
    }
}
