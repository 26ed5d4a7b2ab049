//! Table scan: converts a table's text lines into tuples

use std::path::Path;

use crate::data::{Tuple, Value};

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::Operator;
use super::source::{FileRowSource, RowSource};

/// Reads one base table, one tuple per non-blank line.
///
/// Any unparsable field or I/O failure aborts the query; there is no
/// skip-and-continue.
pub struct ScanOperator {
    table: String,
    source: Box<dyn RowSource>,
    /// 1-based number of the last line read
    line: usize,
    exhausted: bool,
}

impl ScanOperator {
    /// Opens the table's CSV file
    pub fn open(table: impl Into<String>, path: &Path) -> ExecutorResult<Self> {
        let table = table.into();
        let source =
            FileRowSource::open(path).map_err(|e| ExecutorError::source_unavailable(&table, e))?;
        Ok(Self::new(table, Box::new(source)))
    }

    /// Scans an arbitrary row source
    pub fn new(table: impl Into<String>, source: Box<dyn RowSource>) -> Self {
        Self {
            table: table.into(),
            source,
            line: 0,
            exhausted: false,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn parse_line(&self, text: &str) -> ExecutorResult<Tuple> {
        let mut values = Vec::new();
        for field in text.split(',') {
            let field = field.trim();
            let value: Value = field.parse().map_err(|_| {
                ExecutorError::malformed_row(
                    &self.table,
                    self.line,
                    format!("field '{}' is not a 32-bit integer", field),
                )
            })?;
            values.push(value);
        }
        Ok(Tuple::new(values))
    }
}

impl Operator for ScanOperator {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            let text = self
                .source
                .next_line()
                .map_err(|e| ExecutorError::source_unavailable(&self.table, e))?;
            let Some(text) = text else {
                self.exhausted = true;
                return Ok(None);
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return self.parse_line(&text).map(Some);
        }
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.source
            .rewind()
            .map_err(|e| ExecutorError::source_unavailable(&self.table, e))?;
        self.line = 0;
        self.exhausted = false;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Scan"
    }
}
