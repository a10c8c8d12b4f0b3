//! Minimal delimited-text support for tabular results.
//!
//! The dialect is deliberately lossy: fields are never quoted or escaped, the
//! delimiter is simply deleted from text values on write, and every line
//! (header included) ends with `\n`. On read, digit-only fields come back as
//! integers.
//!
//! Path based helpers open and close the file within the call; helpers taking
//! a sink or source leave it to the caller.
//!
//! # Examples
//!
//! ```
//! use jobstats::core::table::{Cell, Table};
//! use jobstats::item::csv::{read_table, write_table};
//!
//! let mut table = Table::new(["jobid", "user", "total_maps"]);
//! table.push_row(vec![Cell::from("job_1"), Cell::from("hadoop"), Cell::Integer(3)]);
//! table.push_row(vec![Cell::from("job_2"), Cell::from("hive"), Cell::Integer(12)]);
//!
//! let mut buffer = Vec::new();
//! write_table(&table, &mut buffer).unwrap();
//!
//! let read = read_table(buffer.as_slice()).unwrap();
//! assert_eq!(read, table);
//! ```

/// A module providing facilities for reading tables.
pub mod csv_reader;

/// A module providing facilities for writing tables.
pub mod csv_writer;

use std::{
    io::{Read, Write},
    path::Path,
};

use log::debug;

use crate::{core::table::Table, error::FormatError};

pub use csv_reader::{CsvTableReader, CsvTableReaderBuilder};
pub use csv_writer::{CsvTableWriter, CsvTableWriterBuilder, to_csv_value};

/// Writes `table` to a caller-owned sink, which is flushed but left open.
pub fn write_table<W: Write>(table: &Table, wtr: W) -> Result<(), FormatError> {
    CsvTableWriterBuilder::new().from_writer(wtr).write_table(table)
}

/// Writes `table` to a new file at `path`.
pub fn write_table_to_path<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), FormatError> {
    debug!("Writing {} rows to {}", table.data.len(), path.as_ref().display());
    CsvTableWriterBuilder::new().from_path(path)?.write_table(table)
}

/// Reads a table from a caller-owned source.
pub fn read_table<R: Read>(rdr: R) -> Result<Table, FormatError> {
    CsvTableReaderBuilder::new().from_reader(rdr).read_table()
}

/// Reads a table from the file at `path`.
pub fn read_table_from_path<P: AsRef<Path>>(path: P) -> Result<Table, FormatError> {
    debug!("Reading table from {}", path.as_ref().display());
    CsvTableReaderBuilder::new().from_path(path)?.read_table()
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::core::table::{Cell, Table};

    use super::{read_table, write_table};

    #[test]
    fn empty_single_fields_should_round_trip() -> Result<(), Box<dyn Error>> {
        let mut table = Table::new(["note"]);
        table.push_row(vec![Cell::from("")]);
        table.push_row(vec![Cell::Null]);
        table.push_row(vec![Cell::from("x")]);

        let mut buffer = Vec::new();
        write_table(&table, &mut buffer)?;
        assert_eq!(buffer, b"note\n\n\nx\n");

        let read = read_table(buffer.as_slice())?;
        assert_eq!(read.columns, table.columns);
        assert_eq!(
            read.data,
            vec![vec![Cell::from("")], vec![Cell::from("")], vec![Cell::from("x")]]
        );

        Ok(())
    }
}
