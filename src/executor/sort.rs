//! Sort: materializes its input and replays it in key order
//!
//! Sorting is stable. Tuples equal on every key keep their input order, so
//! results stay deterministic.

use std::cmp::Ordering;

use serde::Serialize;

use crate::data::Tuple;

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::Operator;

/// One ORDER BY key, resolved to a tuple position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub column: usize,
    pub ascending: bool,
}

impl SortKey {
    pub fn asc(column: usize) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub fn desc(column: usize) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

pub struct SortOperator {
    tuples: Vec<Tuple>,
    cursor: usize,
}

impl SortOperator {
    /// Drains `child` and sorts by `keys`, in priority order
    pub fn new(mut child: Box<dyn Operator>, keys: Vec<SortKey>) -> ExecutorResult<Self> {
        let mut tuples = Vec::new();
        while let Some(tuple) = child.next()? {
            if let Some(key) = keys.iter().find(|k| k.column >= tuple.arity()) {
                return Err(ExecutorError::invalid_argument(format!(
                    "Sort column {} missing from tuple of arity {}",
                    key.column,
                    tuple.arity()
                )));
            }
            tuples.push(tuple);
        }

        // Arities were checked above; compare_by cannot fail here.
        tuples.sort_by(|a, b| {
            for key in &keys {
                let ordering = a.compare_by(b, key.column).unwrap_or(Ordering::Equal);
                let ordering = if key.ascending {
                    ordering
                } else {
                    ordering.reverse()
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        Ok(Self { tuples, cursor: 0 })
    }
}

impl Operator for SortOperator {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        let tuple = self.tuples.get(self.cursor).cloned();
        if tuple.is_some() {
            self.cursor += 1;
        }
        Ok(tuple)
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.cursor = 0;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Sort"
    }
}
