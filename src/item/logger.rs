use std::cell::RefCell;

use log::info;

use crate::core::{
    report::{ReportResult, ReportWriter},
    table::Cell,
};

/// Logs every report row at info level, keyed by column name.
#[derive(Default)]
pub struct LoggerWriter {
    columns: RefCell<Vec<String>>,
}

impl ReportWriter for LoggerWriter {
    fn open(&self, columns: &[String]) -> ReportResult {
        info!("Columns:{:?}", columns);
        *self.columns.borrow_mut() = columns.to_vec();
        Ok(())
    }

    fn write(&self, row: &[Cell]) -> ReportResult {
        let columns = self.columns.borrow();
        let fields: Vec<String> = columns
            .iter()
            .zip(row)
            .map(|(column, cell)| format!("{}={}", column, cell))
            .collect();
        info!("Record:{}", fields.join(" "));
        Ok(())
    }
}
