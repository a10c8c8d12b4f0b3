use csv::{ReaderBuilder, Terminator};
use log::{debug, warn};
use std::{
    cell::RefCell,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use crate::{
    core::table::{Cell, Table},
    error::FormatError,
};

/// A reader for tables written in the minimal delimited dialect.
///
/// The first line holds the column names. Every following line is split on
/// the delimiter and each field is coerced with [`Cell::parse`]: digit-only
/// fields become integers, anything else stays text.
///
/// Rows are not validated against the column count: short and long rows are
/// returned as read, and reported with a warning by [`CsvTableReader::read_table`].
/// A blank line is a row of one empty field. Lines may end with `\n` or `\r\n`.
///
/// # Examples
///
/// ```
/// use jobstats::core::table::Cell;
/// use jobstats::item::csv::csv_reader::CsvTableReaderBuilder;
///
/// let data = "\
/// jobid,total_maps
/// job_201209091200_0001,12
/// job_201209091200_0002,n/a
/// ";
///
/// let table = CsvTableReaderBuilder::new()
///     .from_reader(data.as_bytes())
///     .read_table()
///     .unwrap();
///
/// assert_eq!(table.columns, vec!["jobid", "total_maps"]);
/// assert_eq!(table.data[0][1], Cell::Integer(12));
/// assert_eq!(table.data[1][1], Cell::from("n/a"));
/// ```
pub struct CsvTableReader<R> {
    source: RefCell<BufReader<R>>,
    delimiter: u8,
}

impl<R: Read> CsvTableReader<R> {
    fn next_line(&self) -> Result<Option<String>, FormatError> {
        let mut line = String::new();
        let read = self
            .source
            .borrow_mut()
            .read_line(&mut line)
            .map_err(|error| FormatError::TableReader(error.to_string()))?;

        if read == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Splits one line on the delimiter, quotes taken literally.
    fn split_line(&self, line: &str) -> Result<Vec<String>, FormatError> {
        if line.is_empty() {
            return Ok(vec![String::new()]);
        }

        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .terminator(Terminator::Any(b'\n'))
            .buffer_capacity(line.len())
            .from_reader(line.as_bytes());

        match rdr.records().next() {
            Some(Ok(record)) => Ok(record.iter().map(str::to_string).collect()),
            Some(Err(error)) => Err(FormatError::TableReader(error.to_string())),
            None => Ok(vec![String::new()]),
        }
    }

    /// Reads the next line as raw text fields, without coercion.
    pub fn read_fields(&self) -> Result<Option<Vec<String>>, FormatError> {
        match self.next_line()? {
            Some(line) => self.split_line(&line).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the next line as coerced cells.
    ///
    /// # Returns
    /// - `Ok(Some(row))` if a line was read
    /// - `Ok(None)` at the end of the input
    /// - `Err(FormatError::TableReader(_))` on I/O or UTF-8 errors
    pub fn read(&self) -> Result<Option<Vec<Cell>>, FormatError> {
        Ok(self
            .read_fields()?
            .map(|fields| fields.iter().map(|field| Cell::parse(field)).collect()))
    }

    /// Reads the whole input: first line as columns, the rest as rows.
    pub fn read_table(self) -> Result<Table, FormatError> {
        let columns = self.read_fields()?.unwrap_or_default();
        let mut data = Vec::new();

        while let Some(row) = self.read()? {
            if row.len() != columns.len() {
                warn!(
                    "Row {} has {} fields, expected {}",
                    data.len() + 1,
                    row.len(),
                    columns.len()
                );
            }
            data.push(row);
        }

        debug!("Read table of {} columns and {} rows", columns.len(), data.len());
        Ok(Table { columns, data })
    }
}

/// A builder for configuring table reading.
///
/// Defaults to a comma delimiter.
pub struct CsvTableReaderBuilder {
    delimiter: u8,
}

impl Default for CsvTableReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvTableReaderBuilder {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Wraps a caller-owned source; pass `&mut source` to keep it afterwards.
    pub fn from_reader<R: Read>(self, rdr: R) -> CsvTableReader<R> {
        CsvTableReader {
            source: RefCell::new(BufReader::new(rdr)),
            delimiter: self.delimiter,
        }
    }

    /// Opens the file at `path`. The file is closed when the reader is dropped.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvTableReader<File>, FormatError> {
        let file = File::open(path).map_err(|error| FormatError::TableReader(error.to_string()))?;
        Ok(self.from_reader(file))
    }
}
