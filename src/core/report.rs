use crate::error::FormatError;

use super::table::Cell;

/// Result type of report writer operations.
pub type ReportResult = Result<(), FormatError>;

/// Streaming sink for a tabular report.
///
/// A report is written as one `open` carrying the column names, any number of
/// `write` calls with rows aligned to those columns, then one `close`.
pub trait ReportWriter {
    fn open(&self, columns: &[String]) -> ReportResult;

    fn write(&self, row: &[Cell]) -> ReportResult;

    fn flush(&self) -> ReportResult {
        Ok(())
    }

    fn close(&self) -> ReportResult {
        Ok(())
    }

    /// Whether rows dated `date` belong to this report.
    fn accepts(&self, _date: &str) -> bool {
        true
    }
}

/// Date window of a report, compared on the `YYYY-MM-DD` prefix of a date.
///
/// Unset bounds are open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateFilter {
    start: Option<String>,
    end: Option<String>,
    inclusive_end: bool,
}

impl DateFilter {
    /// `start <= day < end`
    pub fn between(start: Option<&str>, end: Option<&str>) -> Self {
        DateFilter {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            inclusive_end: false,
        }
    }

    /// Window of one partition range, closed on the end for month ranges.
    #[cfg(feature = "time")]
    pub fn from_range(range: &crate::time::DateRange, period: crate::time::Period) -> Self {
        let (start, end) = range.to_strings();
        DateFilter {
            start: Some(start),
            end: Some(end),
            inclusive_end: period.has_inclusive_end(),
        }
    }

    pub fn accepts(&self, date: &str) -> bool {
        let day = date.get(..10).unwrap_or(date);
        let after_start = self.start.as_deref().is_none_or(|start| day >= start);
        let before_end = match self.end.as_deref() {
            None => true,
            Some(end) if self.inclusive_end => day <= end,
            Some(end) => day < end,
        };
        after_start && before_end
    }
}
