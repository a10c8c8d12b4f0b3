use std::{
    cell::{self, RefCell},
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    core::{
        report::{DateFilter, ReportResult, ReportWriter},
        table::Cell,
    },
    error::FormatError,
};

use super::json_encoder::JsonEncoder;

/// Streams a report as a JSON object `{"columns": [...], "data": [[...], ...]}`
/// with one row per line.
pub struct JsonReportWriter<W: Write> {
    stream: RefCell<W>,
    is_first_row: cell::Cell<bool>,
    filter: DateFilter,
}

impl<W: Write> JsonReportWriter<W> {
    fn write_all(&self, bytes: &[u8]) -> ReportResult {
        self.stream.borrow_mut().write_all(bytes)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.stream.into_inner()
    }
}

impl<W: Write> ReportWriter for JsonReportWriter<W> {
    fn open(&self, columns: &[String]) -> ReportResult {
        let columns = JsonEncoder::default_encoder().encode(columns)?;
        self.write_all(format!("{{\n  \"columns\": {},\n  \"data\": [", columns).as_bytes())?;
        self.is_first_row.set(true);
        self.flush()
    }

    fn write(&self, row: &[Cell]) -> ReportResult {
        let row = JsonEncoder::default_encoder().encode(row)?;
        let separator = if self.is_first_row.replace(false) { "" } else { "," };
        self.write_all(format!("{}\n      {}", separator, row).as_bytes())?;
        self.flush()
    }

    fn flush(&self) -> ReportResult {
        self.stream.borrow_mut().flush()?;
        Ok(())
    }

    fn close(&self) -> ReportResult {
        self.write_all(b"\n  ]\n}\n")?;
        self.flush()
    }

    fn accepts(&self, date: &str) -> bool {
        self.filter.accepts(date)
    }
}

#[derive(Default)]
pub struct JsonReportWriterBuilder {
    filter: DateFilter,
}

impl JsonReportWriterBuilder {
    pub fn new() -> JsonReportWriterBuilder {
        JsonReportWriterBuilder::default()
    }

    pub fn filter(mut self, filter: DateFilter) -> JsonReportWriterBuilder {
        self.filter = filter;
        self
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> JsonReportWriter<W> {
        JsonReportWriter {
            stream: RefCell::new(wtr),
            is_first_row: cell::Cell::new(true),
            filter: self.filter,
        }
    }

    /// Creates (or truncates) the file at `path`.
    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<JsonReportWriter<BufWriter<File>>, FormatError> {
        let file = File::create(path)?;
        Ok(self.from_writer(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use serde_json::{Value, json};

    use super::JsonReportWriterBuilder;
    use crate::core::{
        report::{DateFilter, ReportWriter},
        table::Cell,
    };

    fn columns() -> Vec<String> {
        vec!["date".to_string(), "jobid".to_string(), "total_maps".to_string()]
    }

    #[test]
    fn report_should_be_valid_json() -> Result<(), Box<dyn Error>> {
        let wtr = JsonReportWriterBuilder::new().from_writer(vec![]);

        wtr.open(&columns())?;
        wtr.write(&[Cell::from("2012-09-09 10:00:00"), Cell::from("job_1"), Cell::Integer(4)])?;
        wtr.write(&[Cell::from("2012-09-09 11:00:00"), Cell::from("job_é"), Cell::Null])?;
        wtr.close()?;

        let output = String::from_utf8(wtr.into_inner())?;
        assert_eq!(
            output,
            "{\n  \"columns\": [\"date\", \"jobid\", \"total_maps\"],\n  \"data\": [\
             \n      [\"2012-09-09 10:00:00\", \"job_1\", 4],\
             \n      [\"2012-09-09 11:00:00\", \"job_\\u00e9\", null]\
             \n  ]\n}\n"
        );

        let parsed: Value = serde_json::from_str(&output)?;
        assert_eq!(parsed["data"][1][1], json!("job_é"));
        Ok(())
    }

    #[test]
    fn empty_report_should_be_valid_json() -> Result<(), Box<dyn Error>> {
        let wtr = JsonReportWriterBuilder::new().from_writer(vec![]);
        wtr.open(&columns())?;
        wtr.close()?;

        let parsed: Value = serde_json::from_slice(&wtr.into_inner())?;
        assert_eq!(parsed["data"], json!([]));
        assert_eq!(parsed["columns"], json!(["date", "jobid", "total_maps"]));
        Ok(())
    }

    #[test]
    fn filter_should_be_exposed() {
        let wtr = JsonReportWriterBuilder::new()
            .filter(DateFilter::between(Some("2012-09-01"), Some("2012-10-01")))
            .from_writer(vec![]);

        assert!(wtr.accepts("2012-09-30 23:00:00"));
        assert!(!wtr.accepts("2012-10-01 00:00:00"));
    }
}
