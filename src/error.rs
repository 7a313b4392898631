//! Error types shared by every computation in the crate.

use thiserror::Error;

/// Errors raised by the statistical core and the dataset loaders.
#[derive(Debug, Error)]
pub enum AbTestError {
    /// A numeric precondition was violated (zero observations, conversions exceeding
    /// observations, an effect size that makes the power equation unsolvable, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Tabular data does not have the expected `id, group, converted` shape.
    #[error("{}", schema_message(.row, .message))]
    Schema {
        /// 1-based data row (header excluded) where the problem was found.
        row: Option<usize>,
        message: String,
    },

    #[error("unsupported file type for '{0}': expected a .csv or .xlsx file")]
    UnsupportedFileType(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),
}

fn schema_message(row: &Option<usize>, message: &str) -> String {
    match row {
        Some(row) => format!("schema error at row {}: {}", row, message),
        None => format!("schema error: {}", message),
    }
}

impl AbTestError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AbTestError::InvalidInput(message.into())
    }

    pub(crate) fn schema(row: Option<usize>, message: impl Into<String>) -> Self {
        AbTestError::Schema {
            row,
            message: message.into(),
        }
    }

    /// True for the error kinds a caller should surface as "fix your input and retry".
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AbTestError::InvalidInput(_)
                | AbTestError::Schema { .. }
                | AbTestError::UnsupportedFileType(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AbTestError>;
