/// Attribute-reflecting records.
pub mod record;

/// Tabular results and their cells.
pub mod table;

/// Streaming report writers.
pub mod report;

#[cfg(feature = "report")]
/// Period partitioned reports.
pub mod partitioned;
