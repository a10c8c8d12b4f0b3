#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # jobstats

 Formatting utilities for job statistics reports.

 ## Core Concepts

- **Record:** an object exposing a fixed, ordered list of named attributes, each
  resolved either from a stored field or from a derivation. Records render as an
  ordered mapping and serialize to JSON as that mapping.
- **Table:** a tabular result made of column names and rows of scalar cells.
- **ReportWriter:** a streaming sink receiving the columns of a report, then its
  rows, then the end of the report.

 ## Features

| **Feature** | **Description**                                                   |
|-------------|-------------------------------------------------------------------|
| json        | Record-aware JSON encoder and JSON report writer                  |
| csv         | Table reader and writer for the minimal CSV dialect               |
| time        | Timestamp formatting and day / week / month date partitions       |
| logger      | Report writer logging every row                                   |
| report      | Reports partitioned by period, one file per date range            |
| full        | Enables all available features (default)                          |

 ## Getting Started

```rust
# use jobstats::{
#     core::table::{Cell, Table},
#     error::FormatError,
#     item::{csv::{read_table, write_table}, json::{dumps_json, EncoderOptions}},
#     time::partition,
# };
fn main() -> Result<(), FormatError> {
    let mut table = Table::new(["date", "jobname", "total_maps"]);
    table.push_row(vec![
        Cell::from("2024-01-02 10:00:00"),
        Cell::from("wordcount"),
        Cell::Integer(12),
    ]);

    let mut buffer = Vec::new();
    write_table(&table, &mut buffer)?;
    assert_eq!(read_table(buffer.as_slice())?, table);

    let json = dumps_json(&table, &EncoderOptions::default())?;
    assert!(json.starts_with(r#"{"columns": ["date", "jobname", "total_maps"]"#));

    let weeks = partition("2024-01-01", "2024-01-10", "week")?;
    assert_eq!(weeks.len(), 2);

    Ok(())
}
```
 */

/// Core module: records, tables and report writers
pub mod core;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of table readers / writers and encoders (for example: csv reader and writer)
pub mod item;

#[cfg(feature = "time")]
/// Timestamp formatting and date range partitioning
pub mod time;
