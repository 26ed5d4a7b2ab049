//! Pull-based operator interface
//!
//! Every pipeline stage implements `Operator`. The root is drained by calling
//! `next()` until it returns `None`; each call runs to completion and may pull
//! from its children any number of times.

use crate::data::Tuple;

use super::errors::ExecutorResult;

/// Tuple-at-a-time iterator shared by all pipeline stages.
///
/// Operators are single-consumer: the tree has exactly one caller at the
/// root, and no operator is shared between parents.
pub trait Operator {
    /// Returns the next tuple, or `None` once the stream is exhausted.
    ///
    /// After the first `None`, every further call returns `None`.
    fn next(&mut self) -> ExecutorResult<Option<Tuple>>;

    /// Restarts the stream so the following `next()` calls reproduce the
    /// original output from the beginning.
    ///
    /// Streaming operators re-execute their children; materializing
    /// operators rewind their buffer.
    fn reset(&mut self) -> ExecutorResult<()>;

    /// Operator name for logs and explain output
    fn name(&self) -> &'static str;
}

impl<O: Operator + ?Sized> Operator for Box<O> {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        (**self).next()
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        (**self).reset()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Drains an operator, collecting every remaining tuple in emission order
pub fn drain(operator: &mut dyn Operator) -> ExecutorResult<Vec<Tuple>> {
    let mut tuples = Vec::new();
    while let Some(tuple) = operator.next()? {
        tuples.push(tuple);
    }
    Ok(tuples)
}
