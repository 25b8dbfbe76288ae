use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors raised by the record loaders.
///
/// Every variant is fatal to the load that produced it: the loaders are
/// all-or-nothing and never hand back a partial table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source file is missing or unreadable.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited text (bad quoting, uneven record lengths, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// Two rows carry the same observation id.
    #[error("duplicate observation id {0}")]
    DuplicateId(i64),

    /// A cell could not be parsed as its declared type.
    #[error("row {row}, column '{column}': {message}")]
    Parse {
        row: usize,
        column: String,
        message: String,
    },

    /// A `request` field did not deserialize to a flat JSON object.
    #[error("row {row}: malformed request record: {message}")]
    MalformedRequest { row: usize, message: String },

    /// The deserialized request width disagrees with the caller's column list.
    #[error("row {row}: request record has {actual} data fields, expected {expected}")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl LoadError {
    pub(crate) fn parse(row: usize, column: &str, message: impl Into<String>) -> Self {
        LoadError::Parse {
            row,
            column: column.to_string(),
            message: message.into(),
        }
    }
}
