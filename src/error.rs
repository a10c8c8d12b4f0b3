use thiserror::Error;

#[derive(Error, Debug)]
/// Formatting error
pub enum FormatError {
    #[error("Illegal argument: {0}")]
    InvalidArgument(String),

    #[cfg(feature = "time")]
    #[error("Invalid date {value}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    #[error("TableWriter from: {0}")]
    TableWriter(String),

    #[error("TableReader from: {0}")]
    TableReader(String),

    #[error("Json from: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
