use thiserror::Error;

// ---------------------------------------------------------------------------
// Typed failures of the core (dataset, filter, regression)
// ---------------------------------------------------------------------------

/// The source table could not be turned into a prepared [`Table`].
///
/// Fatal at start-up: no partial table is ever exposed.
///
/// [`Table`]: crate::data::model::Table
#[derive(Debug, Error)]
pub enum DataIntegrityError {
    #[error("cannot read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing column '{0}'")]
    MissingColumn(String),

    #[error("line {line}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
}

/// A user-supplied filter expression that cannot be parsed or does not fit
/// the table's columns. The caller is expected to re-prompt.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid filter at position {position}: {message}")]
pub struct FilterSyntaxError {
    /// Byte offset into the expression.
    pub position: usize,
    pub message: String,
}

impl FilterSyntaxError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Failures of a single prediction request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    #[error("invalid regression request: {0}")]
    InvalidRequest(String),

    #[error("cannot predict with this input selection: {0}")]
    NumericalInstability(String),
}
