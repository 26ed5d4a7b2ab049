//! Materialized query results

use std::io::{self, Write};

use crate::catalog::Catalog;
use crate::data::{Schema, Tuple};
use crate::planner::QueryPlan;

use super::builder::build_pipeline;
use super::errors::ExecutorResult;
use super::operator::drain;

/// Result of executing one plan to completion
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Qualified output column names
    pub schema: Schema,
    /// Tuples in emission order
    pub tuples: Vec<Tuple>,
}

impl ExecutionResult {
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    /// Writes one tuple per line, fields separated by `", "`
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for tuple in &self.tuples {
            writeln!(out, "{}", tuple)?;
        }
        Ok(())
    }
}

/// Builds the pipeline for `plan` and drains it.
///
/// Nothing is returned unless every tuple was produced without error.
pub fn execute(plan: &QueryPlan, catalog: &Catalog) -> ExecutorResult<ExecutionResult> {
    let mut root = build_pipeline(&plan.root, catalog)?;
    let tuples = drain(&mut root)?;
    Ok(ExecutionResult {
        schema: plan.output_schema().clone(),
        tuples,
    })
}
