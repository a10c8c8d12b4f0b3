use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, Months, NaiveDate};
use log::debug;

use crate::error::FormatError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar unit used to partition a date span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    /// Monday to the following Monday, exclusive.
    Week,
    /// First to last day of the month, inclusive.
    Month,
}

impl FromStr for Period {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            _ => Err(FormatError::InvalidArgument(format!("period {}", s))),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        })
    }
}

impl Period {
    /// Start and end of the period enclosing `day`.
    ///
    /// The end is the next period start for days and weeks, and the last day
    /// of the month for months.
    ///
    /// # Errors
    ///
    /// [`FormatError::InvalidArgument`] when a bound falls outside the
    /// representable calendar.
    pub fn enclosing(self, day: NaiveDate) -> Result<(NaiveDate, NaiveDate), FormatError> {
        let bounds = match self {
            Period::Day => day.checked_add_days(Days::new(1)).map(|end| (day, end)),
            Period::Week => day
                .checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
                .and_then(|monday| Some((monday, monday.checked_add_days(Days::new(7))?))),
            Period::Month => day.with_day(1).and_then(|first| {
                let last = first
                    .checked_add_months(Months::new(1))?
                    .checked_sub_days(Days::new(1))?;
                Some((first, last))
            }),
        };
        bounds.ok_or_else(|| {
            FormatError::InvalidArgument(format!("{} enclosing {} is out of range", self, day))
        })
    }

    /// Whether the end of the ranges produced for this period is the last
    /// day of the range rather than the first day of the next one.
    pub fn has_inclusive_end(self) -> bool {
        matches!(self, Period::Month)
    }
}

/// One partition period of a date span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn to_strings(&self) -> (String, String) {
        (
            self.start.format(DATE_FORMAT).to_string(),
            self.end.format(DATE_FORMAT).to_string(),
        )
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| FormatError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

/// Calendar aligned ranges covering `[min, max]`, both inclusive.
///
/// Consecutive days falling in the same period collapse into one range, so the
/// first and last ranges extend to the period boundaries. An empty list is
/// returned when `min` is after `max`.
///
/// # Errors
///
/// [`FormatError::InvalidArgument`] when a period boundary falls outside the
/// representable calendar.
pub fn date_ranges(
    min: NaiveDate,
    max: NaiveDate,
    period: Period,
) -> Result<Vec<DateRange>, FormatError> {
    let mut ranges: Vec<DateRange> = Vec::new();
    let mut current = min;

    while current <= max {
        let (start, end) = period.enclosing(current)?;
        if ranges.last().is_none_or(|last| last.start != start) {
            ranges.push(DateRange { start, end });
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    debug!(
        "Partitioned {} - {} by {} into {} ranges",
        min,
        max,
        period,
        ranges.len()
    );
    Ok(ranges)
}

/// String form of [`date_ranges`]: `YYYY-MM-DD` bounds in and out.
///
/// # Errors
///
/// - [`FormatError::InvalidDate`] when a bound is not a `YYYY-MM-DD` date.
/// - [`FormatError::InvalidArgument`] when `period` is not `day`, `week` or `month`.
///
/// # Examples
///
/// ```
/// use jobstats::time::date_range::partition;
///
/// let weeks = partition("2024-01-01", "2024-01-10", "week").unwrap();
/// assert_eq!(
///     weeks,
///     vec![
///         ("2024-01-01".to_string(), "2024-01-08".to_string()),
///         ("2024-01-08".to_string(), "2024-01-15".to_string()),
///     ]
/// );
///
/// assert!(partition("2024-01-01", "2024-01-10", "year").is_err());
/// ```
pub fn partition(
    min_date: &str,
    max_date: &str,
    period: &str,
) -> Result<Vec<(String, String)>, FormatError> {
    let min = parse_date(min_date)?;
    let max = parse_date(max_date)?;
    let period = period.parse::<Period>()?;

    Ok(date_ranges(min, max, period)?
        .iter()
        .map(DateRange::to_strings)
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{DateRange, Period, date_ranges, parse_date, partition};
    use crate::error::FormatError;

    fn pairs(ranges: &[(&str, &str)]) -> Vec<(String, String)> {
        ranges
            .iter()
            .map(|(s, e)| (s.to_string(), e.to_string()))
            .collect()
    }

    #[test]
    fn days_should_span_one_day_each() {
        let ranges = partition("2024-01-01", "2024-01-05", "day").unwrap();
        assert_eq!(
            ranges,
            pairs(&[
                ("2024-01-01", "2024-01-02"),
                ("2024-01-02", "2024-01-03"),
                ("2024-01-03", "2024-01-04"),
                ("2024-01-04", "2024-01-05"),
                ("2024-01-05", "2024-01-06"),
            ])
        );
    }

    #[test]
    fn weeks_should_start_on_monday() {
        let ranges = partition("2024-01-01", "2024-01-10", "week").unwrap();
        assert_eq!(
            ranges,
            pairs(&[("2024-01-01", "2024-01-08"), ("2024-01-08", "2024-01-15")])
        );

        // 2024-01-03 is a Wednesday
        let ranges = partition("2024-01-03", "2024-01-03", "week").unwrap();
        assert_eq!(ranges, pairs(&[("2024-01-01", "2024-01-08")]));
    }

    #[test]
    fn weeks_should_cross_year_boundary() {
        let ranges = partition("2023-12-30", "2024-01-02", "week").unwrap();
        assert_eq!(
            ranges,
            pairs(&[("2023-12-25", "2024-01-01"), ("2024-01-01", "2024-01-08")])
        );
    }

    #[test]
    fn months_should_end_on_last_day() {
        let ranges = partition("2024-02-01", "2024-03-01", "month").unwrap();
        assert_eq!(
            ranges,
            pairs(&[("2024-02-01", "2024-02-29"), ("2024-03-01", "2024-03-31")])
        );

        let ranges = partition("2023-12-15", "2024-01-15", "month").unwrap();
        assert_eq!(
            ranges,
            pairs(&[("2023-12-01", "2023-12-31"), ("2024-01-01", "2024-01-31")])
        );

        let ranges = partition("2023-02-10", "2023-02-10", "month").unwrap();
        assert_eq!(ranges, pairs(&[("2023-02-01", "2023-02-28")]));
    }

    #[test]
    fn period_should_be_case_insensitive() {
        assert_eq!("Week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("MONTH".parse::<Period>().unwrap(), Period::Month);
    }

    #[test]
    fn unknown_period_should_fail() {
        let result = partition("2024-01-01", "2024-01-05", "year");
        match result {
            Err(FormatError::InvalidArgument(message)) => assert!(message.contains("year")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn bad_date_should_fail() {
        let result = partition("2024/01/01", "2024-01-05", "day");
        assert!(matches!(result, Err(FormatError::InvalidDate { .. })));
    }

    #[test]
    fn calendar_edges_should_fail_instead_of_overflowing() {
        for period in ["day", "week", "month"] {
            let result = partition("+262142-12-31", "+262142-12-31", period);
            assert!(
                matches!(result, Err(FormatError::InvalidArgument(_))),
                "{} gave {:?}",
                period,
                result
            );
        }

        let first = NaiveDate::MIN;
        assert!(Period::Week.enclosing(first).is_err());
        assert!(Period::Day.enclosing(first).is_ok());
    }

    #[test]
    fn reversed_bounds_should_yield_nothing() {
        let min = parse_date("2024-01-05").unwrap();
        let max = parse_date("2024-01-01").unwrap();
        assert!(date_ranges(min, max, Period::Day).unwrap().is_empty());
    }

    #[test]
    fn ranges_should_be_contiguous() {
        let min = parse_date("2024-01-17").unwrap();
        let max = parse_date("2024-06-02").unwrap();

        for period in [Period::Day, Period::Week] {
            let ranges = date_ranges(min, max, period).unwrap();
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }

        let months = date_ranges(min, max, Period::Month).unwrap();
        assert_eq!(months.len(), 6);
        for pair in months.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
        assert!(months.first().is_some_and(|r: &DateRange| r.start <= min));
        assert!(months.last().is_some_and(|r: &DateRange| r.end >= max));
    }
}
