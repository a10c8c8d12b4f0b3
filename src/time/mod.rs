/// Unix timestamp rendering in local time.
pub mod format;

/// Calendar aligned day / week / month partitions of a date span.
pub mod date_range;

pub use date_range::{DateRange, Period, date_ranges, partition};
pub use format::{TimeFormat, format_time, format_timestamp};
