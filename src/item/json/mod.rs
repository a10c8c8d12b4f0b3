//! JSON support for records and reports.
//!
//! The encoder accepts any `Serialize` value. Records (`dyn Record`) are
//! expanded to their attribute mapping wherever they appear, so a record
//! nested in a vector or a map encodes exactly like its `to_dict()` form.
//!
//! Encoding with the default [`EncoderOptions`] goes through one shared
//! encoder built on first use; any other option set builds a fresh encoder for
//! the call. Both paths produce identical output.
//!
//! # Examples
//!
//! ```
//! use jobstats::core::record::Record;
//! use jobstats::item::json::{dumps_json, EncoderOptions};
//! use serde_json::{json, Value};
//!
//! struct Day {
//!     day: &'static str,
//!     jobs: Vec<&'static str>,
//! }
//!
//! impl Record for Day {
//!     fn attribute_names(&self) -> &[&'static str] {
//!         &["day", "jobs"]
//!     }
//!
//!     fn get_attr(&self, name: &str) -> Value {
//!         match name {
//!             "day" => json!(self.day),
//!             "jobs" => json!(self.jobs),
//!             _ => Value::Null,
//!         }
//!     }
//! }
//!
//! let day = Day { day: "2012-09-09", jobs: vec!["job_1"] };
//! let days: Vec<&dyn Record> = vec![&day];
//!
//! assert_eq!(
//!     dumps_json(&days, &EncoderOptions::default()).unwrap(),
//!     r#"[{"day": "2012-09-09", "jobs": ["job_1"]}]"#
//! );
//! ```

/// The `json_encoder` module contains the record-aware encoder and its options.
pub mod json_encoder;

/// The `json_report` module streams tabular reports as JSON.
pub mod json_report;

pub use json_encoder::{
    EncoderOptions, JsonEncoder, RecordFormatter, dump_json, dump_json_with_formatter, dumps_json,
};
pub use json_report::{JsonReportWriter, JsonReportWriterBuilder};
