use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::Record;

/// A single scalar value of a [`Table`] row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Coerces a raw text field: `Integer` when the field is non-empty, made of
    /// ASCII digits only and fits in an `i64`, `Text` otherwise.
    pub fn parse(field: &str) -> Cell {
        if !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = field.parse::<i64>() {
                return Cell::Integer(value);
            }
        }
        Cell::Text(field.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(value) => write!(f, "{}", value),
            Cell::Float(value) => write!(f, "{:?}", value),
            Cell::Bool(value) => write!(f, "{}", value),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

impl From<&Value> for Cell {
    /// Scalars map to their cell counterpart; arrays and objects are kept as
    /// their compact JSON text.
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Integer(i),
                None => n.as_f64().map_or(Cell::Null, Cell::Float),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Tabular result: ordered column names and rows aligned to them.
///
/// Row lengths are not enforced; [`Table::mismatched_rows`] reports the rows
/// whose length differs from the column count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            data: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        if row.len() != self.columns.len() {
            warn!(
                "Row of {} cells pushed into a table of {} columns",
                row.len(),
                self.columns.len()
            );
        }
        self.data.push(row);
    }

    /// Appends a row holding the record's attributes named after the columns.
    pub fn push_record(&mut self, record: &dyn Record) {
        let row = self
            .columns
            .iter()
            .map(|column| Cell::from(&record.get_attr(column)))
            .collect();
        self.data.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn mismatched_rows(&self) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() != self.columns.len())
            .map(|(index, _)| index)
            .collect()
    }
}
