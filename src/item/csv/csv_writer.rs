use std::{
    cell::RefCell,
    fs::File,
    io::{self, Write},
    path::Path,
    result,
};

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::{
    core::{
        report::{DateFilter, ReportResult, ReportWriter},
        table::{Cell, Table},
    },
    error::FormatError,
};

/// Renders a cell for the delimiter-stripping dialect: nulls are empty, the
/// delimiter is deleted from text, everything else uses its display form.
pub fn to_csv_value(cell: &Cell, delimiter: u8) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Text(value) => value.replace(char::from(delimiter), ""),
        other => other.to_string(),
    }
}

/// Writes tables in a minimal delimited dialect: no quoting, no escaping,
/// one `\n` terminated line per row.
pub struct CsvTableWriter<T: Write> {
    wrapper: RefCell<Writer<T>>,
    delimiter: u8,
    filter: DateFilter,
}

impl<T: Write> CsvTableWriter<T> {
    /// Column names are written verbatim.
    pub fn write_columns<S: AsRef<str>>(&self, columns: &[S]) -> result::Result<(), FormatError> {
        self.write_line(columns)
    }

    pub fn write_row(&self, row: &[Cell]) -> result::Result<(), FormatError> {
        let fields: Vec<String> = row
            .iter()
            .map(|cell| to_csv_value(cell, self.delimiter))
            .collect();
        self.write_line(&fields)
    }

    fn write_line<S: AsRef<str>>(&self, fields: &[S]) -> result::Result<(), FormatError> {
        let mut wtr = self.wrapper.borrow_mut();

        // The csv crate renders a record without content as `""`; a lone
        // empty field is a bare line terminator in this dialect.
        if fields.len() <= 1 && fields.iter().all(|field| field.as_ref().is_empty()) {
            return wtr
                .flush()
                .and_then(|_| wtr.get_mut().write_all(b"\n"))
                .map_err(|error| FormatError::TableWriter(error.to_string()));
        }

        wtr.write_record(fields.iter().map(|field| field.as_ref()))
            .map_err(|error| FormatError::TableWriter(error.to_string()))
    }

    /// Writes the header line then every row, and flushes.
    pub fn write_table(&self, table: &Table) -> result::Result<(), FormatError> {
        self.write_columns(&table.columns)?;
        for row in &table.data {
            self.write_row(row)?;
        }
        self.flush_inner()
    }

    fn flush_inner(&self) -> result::Result<(), FormatError> {
        self.wrapper
            .borrow_mut()
            .flush()
            .map_err(|error| FormatError::TableWriter(error.to_string()))
    }

    pub fn into_inner(self) -> result::Result<T, FormatError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| FormatError::TableWriter(error.to_string()))
    }
}

impl<T: Write> ReportWriter for CsvTableWriter<T> {
    fn open(&self, columns: &[String]) -> ReportResult {
        self.write_columns(columns)?;
        self.flush_inner()
    }

    fn write(&self, row: &[Cell]) -> ReportResult {
        self.write_row(row)?;
        self.flush_inner()
    }

    fn flush(&self) -> ReportResult {
        self.flush_inner()
    }

    fn close(&self) -> ReportResult {
        self.flush_inner()
    }

    fn accepts(&self, date: &str) -> bool {
        self.filter.accepts(date)
    }
}

pub struct CsvTableWriterBuilder {
    delimiter: u8,
    filter: DateFilter,
}

impl Default for CsvTableWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvTableWriterBuilder {
    pub fn new() -> CsvTableWriterBuilder {
        CsvTableWriterBuilder {
            delimiter: b',',
            filter: DateFilter::default(),
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvTableWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    /// Restricts the rows accepted when used as a [`ReportWriter`].
    pub fn filter(mut self, filter: DateFilter) -> CsvTableWriterBuilder {
        self.filter = filter;
        self
    }

    fn writer_builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'));
        builder
    }

    /// Creates (or truncates) the file at `path`. The file is closed when the
    /// writer is dropped.
    pub fn from_path<R: AsRef<Path>>(
        self,
        path: R,
    ) -> result::Result<CsvTableWriter<File>, FormatError> {
        let wtr = self
            .writer_builder()
            .from_path(path)
            .map_err(|error| FormatError::TableWriter(error.to_string()))?;

        Ok(CsvTableWriter {
            wrapper: RefCell::new(wtr),
            delimiter: self.delimiter,
            filter: self.filter,
        })
    }

    /// Wraps a caller-owned sink. Pass `&mut sink` to keep using it afterwards.
    ///
    /// ```
    /// use jobstats::core::table::{Cell, Table};
    /// use jobstats::item::csv::csv_writer::CsvTableWriterBuilder;
    ///
    /// let mut table = Table::new(["jobname", "total_maps"]);
    /// table.push_row(vec![Cell::from("sort, then merge"), Cell::Integer(12)]);
    ///
    /// let wtr = CsvTableWriterBuilder::new().from_writer(vec![]);
    /// wtr.write_table(&table).unwrap();
    ///
    /// let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    /// assert_eq!(data, "jobname,total_maps\nsort then merge,12\n");
    /// ```
    pub fn from_writer<W: io::Write>(self, wtr: W) -> CsvTableWriter<W> {
        let wtr = self.writer_builder().from_writer(wtr);

        CsvTableWriter {
            wrapper: RefCell::new(wtr),
            delimiter: self.delimiter,
            filter: self.filter,
        }
    }
}
