//! Duplicate elimination keyed on selected columns

use std::collections::HashSet;

use crate::data::{Schema, Tuple, Value};

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::Operator;

/// Streams the first tuple seen for each distinct key.
///
/// The key is the vector of key column values. One tuple of lookahead is
/// held at all times; it is primed at construction and after `reset()`.
pub struct DistinctOperator {
    child: Box<dyn Operator>,
    key_positions: Vec<usize>,
    seen: HashSet<Vec<Value>>,
    lookahead: Option<Tuple>,
}

impl DistinctOperator {
    pub fn new<S: AsRef<str>>(
        child: Box<dyn Operator>,
        schema: &Schema,
        key_columns: &[S],
    ) -> ExecutorResult<Self> {
        let key_positions = key_columns
            .iter()
            .map(|c| {
                let c = c.as_ref();
                schema
                    .index_of(c)
                    .ok_or_else(|| ExecutorError::column_not_found(c))
            })
            .collect::<ExecutorResult<Vec<_>>>()?;

        let mut distinct = Self {
            child,
            key_positions,
            seen: HashSet::new(),
            lookahead: None,
        };
        distinct.advance()?;
        Ok(distinct)
    }

    /// Moves the lookahead to the next tuple with an unseen key
    fn advance(&mut self) -> ExecutorResult<()> {
        while let Some(tuple) = self.child.next()? {
            let key = self
                .key_positions
                .iter()
                .map(|&p| tuple.value_at(p))
                .collect::<ExecutorResult<Vec<_>>>()?;
            if self.seen.insert(key) {
                self.lookahead = Some(tuple);
                return Ok(());
            }
        }
        self.lookahead = None;
        Ok(())
    }
}

impl Operator for DistinctOperator {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        let Some(tuple) = self.lookahead.take() else {
            return Ok(None);
        };
        self.advance()?;
        Ok(Some(tuple))
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.child.reset()?;
        self.seen.clear();
        self.advance()
    }

    fn name(&self) -> &'static str {
        "Distinct"
    }
}
