//! Tuple: the unit of data flow between operators

use std::cmp::Ordering;
use std::fmt;

use crate::executor::{ExecutorError, ExecutorResult};

/// A single tuple field
pub type Value = i32;

/// Immutable fixed-arity row of integers.
///
/// Operators that buffer tuples (sort, aggregate) own their copies; nothing
/// mutates a tuple after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    /// Creates a tuple, taking ownership of the values
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Concatenates two tuples: left values, then right values.
    ///
    /// Matches the column order of `Schema::combine(left, right)`.
    pub fn concat(left: &Tuple, right: &Tuple) -> Self {
        let mut values = Vec::with_capacity(left.arity() + right.arity());
        values.extend_from_slice(&left.values);
        values.extend_from_slice(&right.values);
        Self { values }
    }

    /// Returns the value at position `index`
    pub fn value_at(&self, index: usize) -> ExecutorResult<Value> {
        self.values
            .get(index)
            .copied()
            .ok_or_else(|| ExecutorError::index_out_of_range(index, self.arity()))
    }

    /// Returns the number of fields
    pub fn arity(&self) -> usize {
        self.values.len()
    }

    /// Returns all values in column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Compares two tuples on a single column.
    ///
    /// Fails if either tuple lacks the column.
    pub fn compare_by(&self, other: &Tuple, column: usize) -> ExecutorResult<Ordering> {
        match (self.values.get(column), other.values.get(column)) {
            (Some(a), Some(b)) => Ok(a.cmp(b)),
            _ => Err(ExecutorError::invalid_argument(format!(
                "Cannot compare on column {}: tuple arities are {} and {}",
                column,
                self.arity(),
                other.arity()
            ))),
        }
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// Output rendering: values joined by `", "`, no trailing separator.
impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
