use std::{
    path::PathBuf,
    str::FromStr,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use crate::{
    error::FormatError,
    item::{csv::CsvTableWriterBuilder, json::JsonReportWriterBuilder},
    time::{Period, date_range::parse_date, date_ranges},
};

use super::{
    report::{DateFilter, ReportWriter},
    table::{Cell, Table},
};

/// Name of the column rows are routed by.
pub const DATE_COLUMN: &str = "date";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Json,
    Csv,
    All,
}

impl FromStr for OutputType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputType::Json),
            "csv" => Ok(OutputType::Csv),
            "all" => Ok(OutputType::All),
            _ => Err(FormatError::InvalidArgument(format!("output type {}", s))),
        }
    }
}

impl OutputType {
    fn writes_json(self) -> bool {
        matches!(self, OutputType::Json | OutputType::All)
    }

    fn writes_csv(self) -> bool {
        matches!(self, OutputType::Csv | OutputType::All)
    }
}

/// Summary of the rows about to be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub total: usize,
    /// Rows without a usable date.
    pub unknown: usize,
    /// Rows with a usable date; `total` is `count + unknown`.
    pub count: usize,
    pub mindate: Option<String>,
    pub maxdate: Option<String>,
}

impl ReportStats {
    /// Counts the rows of `table` and the span of its `date` column.
    pub fn from_table(table: &Table) -> Self {
        let mut stats = ReportStats {
            total: table.data.len(),
            ..ReportStats::default()
        };
        let index = table.column_index(DATE_COLUMN);

        for row in &table.data {
            let day = index
                .and_then(|i| row.get(i))
                .filter(|cell| !cell.is_null())
                .map(|cell| cell.to_string())
                .and_then(|date| date.get(..10).map(str::to_string));

            match day {
                Some(day) => {
                    stats.count += 1;
                    if stats.mindate.as_ref().is_none_or(|min| &day < min) {
                        stats.mindate = Some(day.clone());
                    }
                    if stats.maxdate.as_ref().is_none_or(|max| &day > max) {
                        stats.maxdate = Some(day);
                    }
                }
                None => stats.unknown += 1,
            }
        }
        stats
    }
}

/// Writes one report per output type and date window, routing each row by its
/// `date` column.
///
/// Without a period a single window `[start_date, end_date)` is written to
/// `<prefix><start_date>.<ext>`. With a period the span between the stats'
/// `mindate` and `maxdate` is partitioned and each range is written to
/// `<prefix><range start>.<ext>`.
pub struct PartitionedReport {
    output_type: OutputType,
    output_prefix: String,
    period: Option<Period>,
    start_date: Option<String>,
    end_date: Option<String>,
    progress_interval: Duration,
    writers: Vec<Box<dyn ReportWriter>>,
    outputs: Vec<PathBuf>,
    date_index: Option<usize>,
    count: usize,
    current: usize,
    started: Option<Instant>,
    last_progress: Option<Instant>,
}

impl PartitionedReport {
    fn add_writers(
        &mut self,
        date_mark: &str,
        end_mark: &str,
        filter: DateFilter,
    ) -> Result<(), FormatError> {
        info!("Add date range {} -- {}", date_mark, end_mark);

        if self.output_type.writes_json() {
            let path = PathBuf::from(format!("{}{}.json", self.output_prefix, date_mark));
            let writer = JsonReportWriterBuilder::new()
                .filter(filter.clone())
                .from_path(&path)?;
            self.writers.push(Box::new(writer));
            self.outputs.push(path);
        }
        if self.output_type.writes_csv() {
            let path = PathBuf::from(format!("{}{}.csv", self.output_prefix, date_mark));
            let writer = CsvTableWriterBuilder::new().filter(filter).from_path(&path)?;
            self.writers.push(Box::new(writer));
            self.outputs.push(path);
        }
        Ok(())
    }

    /// Creates the output writers for the reported span.
    pub fn on_stats(&mut self, stats: &ReportStats) -> Result<(), FormatError> {
        self.count = stats.count;
        if stats.unknown > 0 {
            warn!("Progress may exceed 100% because rows of unknown date exist");
        }
        info!(
            "Total: {} Unknown: {} Needed: {} Date Range: {}-{}",
            stats.total,
            stats.unknown,
            stats.count,
            stats.mindate.as_deref().unwrap_or("None"),
            stats.maxdate.as_deref().unwrap_or("None"),
        );

        match self.period {
            None => {
                let date_mark = self.start_date.clone().unwrap_or_default();
                let filter =
                    DateFilter::between(self.start_date.as_deref(), self.end_date.as_deref());
                let end_mark = self.end_date.clone().unwrap_or_default();
                self.add_writers(&date_mark, &end_mark, filter)?;
            }
            Some(period) => {
                let (Some(mindate), Some(maxdate)) = (&stats.mindate, &stats.maxdate) else {
                    warn!("No dated rows, nothing to partition");
                    return Ok(());
                };
                let min = parse_date(mindate.get(..10).unwrap_or(mindate))?;
                let max = parse_date(maxdate.get(..10).unwrap_or(maxdate))?;
                for range in date_ranges(min, max, period)? {
                    let (start, end) = range.to_strings();
                    self.add_writers(&start, &end, DateFilter::from_range(&range, period))?;
                }
            }
        }
        debug!("Created {} report writers", self.writers.len());
        Ok(())
    }

    pub fn on_columns(&mut self, columns: &[String]) -> Result<(), FormatError> {
        let now = Instant::now();
        self.started = Some(now);
        self.last_progress = Some(now);
        self.date_index = columns.iter().position(|column| column == DATE_COLUMN);

        for writer in &self.writers {
            writer.open(columns)?;
        }
        Ok(())
    }

    pub fn on_record(&mut self, row: &[Cell]) -> Result<(), FormatError> {
        let date = self
            .date_index
            .and_then(|index| row.get(index))
            .map(Cell::to_string)
            .unwrap_or_default();

        for writer in &self.writers {
            if writer.accepts(&date) {
                writer.write(row)?;
            }
        }
        self.current += 1;

        if let (Some(started), Some(last)) = (self.started, self.last_progress) {
            if last.elapsed() > self.progress_interval {
                let elapsed = started.elapsed().as_secs_f64();
                let remaining = elapsed * self.count.saturating_sub(self.current) as f64
                    / self.current as f64;
                info!(
                    "Progress {:.0}%({}/{}) Remain: {:.1}s. Current parsing date: {}.",
                    self.current as f64 * 100.0 / self.count.max(1) as f64,
                    self.current,
                    self.count,
                    remaining,
                    date
                );
                self.last_progress = Some(Instant::now());
            }
        }
        Ok(())
    }

    pub fn on_end(&mut self) -> Result<(), FormatError> {
        for writer in &self.writers {
            writer.close()?;
        }
        // Dropping the writers closes their files.
        self.writers.clear();

        let elapsed = self
            .started
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or_default();
        info!(
            "Finished. Time: {:.1}s. Speed: {:.0} rows/s",
            elapsed,
            self.current as f64 / elapsed.max(f64::EPSILON)
        );
        Ok(())
    }

    /// Reports a whole table: stats, columns, every row, end.
    pub fn run(&mut self, table: &Table) -> Result<(), FormatError> {
        self.on_stats(&ReportStats::from_table(table))?;
        self.on_columns(&table.columns)?;
        for row in &table.data {
            self.on_record(row)?;
        }
        self.on_end()
    }

    /// Paths of the files created so far, in creation order.
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }
}

pub struct PartitionedReportBuilder {
    output_type: OutputType,
    output_prefix: String,
    period: Option<Period>,
    start_date: Option<String>,
    end_date: Option<String>,
    progress_interval: Duration,
}

impl Default for PartitionedReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionedReportBuilder {
    pub fn new() -> Self {
        PartitionedReportBuilder {
            output_type: OutputType::All,
            output_prefix: "jobstats".to_string(),
            period: None,
            start_date: None,
            end_date: None,
            progress_interval: Duration::from_secs(4),
        }
    }

    pub fn output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = output_type;
        self
    }

    /// Prefix of every output path; the date mark and extension are appended.
    pub fn output_prefix(mut self, prefix: &str) -> Self {
        self.output_prefix = prefix.to_string();
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn start_date(mut self, date: &str) -> Self {
        self.start_date = Some(date.to_string());
        self
    }

    pub fn end_date(mut self, date: &str) -> Self {
        self.end_date = Some(date.to_string());
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn build(self) -> PartitionedReport {
        PartitionedReport {
            output_type: self.output_type,
            output_prefix: self.output_prefix,
            period: self.period,
            start_date: self.start_date,
            end_date: self.end_date,
            progress_interval: self.progress_interval,
            writers: Vec::new(),
            outputs: Vec::new(),
            date_index: None,
            count: 0,
            current: 0,
            started: None,
            last_progress: None,
        }
    }
}
