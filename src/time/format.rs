use chrono::{Local, TimeZone};

use crate::error::FormatError;

/// Fixed, locale independent layouts for rendering a Unix timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `HH:MM:SS`
    Time,
    /// `MM-DD HH:MM:SS`
    MonthDayTime,
    /// `YYYY-MM-DD`
    Date,
    /// `YYYY-MM-DD HH:MM:SS`, the `date` column of job reports.
    DateTime,
}

impl TimeFormat {
    fn pattern(self) -> &'static str {
        match self {
            TimeFormat::Time => "%H:%M:%S",
            TimeFormat::MonthDayTime => "%m-%d %H:%M:%S",
            TimeFormat::Date => "%Y-%m-%d",
            TimeFormat::DateTime => "%Y-%m-%d %H:%M:%S",
        }
    }
}

/// Renders a Unix timestamp in the process local timezone.
///
/// # Errors
///
/// Returns [`FormatError::InvalidTimestamp`] when the timestamp cannot be
/// mapped to a single local time.
pub fn format_timestamp(timestamp: i64, format: TimeFormat) -> Result<String, FormatError> {
    let local = Local
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or(FormatError::InvalidTimestamp(timestamp))?;
    Ok(local.format(format.pattern()).to_string())
}

/// Renders a Unix timestamp as local `MM-DD HH:MM:SS` when `full` is set,
/// `HH:MM:SS` otherwise.
///
/// ```
/// use jobstats::time::format::format_time;
///
/// let short = format_time(0, false).unwrap();
/// assert_eq!(short.len(), "HH:MM:SS".len());
///
/// let full = format_time(0, true).unwrap();
/// assert_eq!(full.len(), "MM-DD HH:MM:SS".len());
/// ```
pub fn format_time(timestamp: i64, full: bool) -> Result<String, FormatError> {
    let format = if full {
        TimeFormat::MonthDayTime
    } else {
        TimeFormat::Time
    };
    format_timestamp(timestamp, format)
}
