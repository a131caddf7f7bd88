//! Error types for the calendar events service.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving calendar event requests.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request body could not be parsed
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// A field required by the action was not supplied
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Positional identifier outside the table's data rows
    #[error("Row {row_index} is out of range (data rows are 2..={last_row})")]
    RowOutOfRange { row_index: i64, last_row: i64 },

    /// Stable identifier with no matching row
    #[error("Event not found: {0}")]
    NotFound(Uuid),
}

impl Error {
    /// Build the range error for `row_index` against a table with `rows` data rows.
    pub fn out_of_range(row_index: i64, rows: usize) -> Self {
        Error::RowOutOfRange {
            row_index,
            last_row: rows as i64 + 1,
        }
    }
}
