#[cfg(feature = "logger")]
/// This module provides a report writer logging every row.
pub mod logger;

#[cfg(feature = "csv")]
/// This module provides a table reader and writer for the minimal CSV dialect.
pub mod csv;

#[cfg(feature = "json")]
/// This module provides the record-aware JSON encoder and the JSON report writer.
pub mod json;
