//! Projection: keeps a chosen subset of columns in a chosen order

use crate::data::{Schema, Tuple};
use crate::planner::SelectTarget;

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::Operator;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Position(usize),
    /// Last value of the input tuple, where an aggregate places its sum
    Last,
}

/// Maps each input tuple to the projected target list.
///
/// Column targets are resolved once, against the input schema, when the
/// operator is built.
pub struct ProjectOperator {
    child: Box<dyn Operator>,
    slots: Vec<Slot>,
    output_schema: Schema,
}

impl ProjectOperator {
    pub fn new(
        child: Box<dyn Operator>,
        schema: &Schema,
        targets: &[SelectTarget],
    ) -> ExecutorResult<Self> {
        let mut slots = Vec::with_capacity(targets.len());
        let mut names = Vec::with_capacity(targets.len());

        for target in targets {
            match target {
                SelectTarget::Column(column) => {
                    let name = column.name();
                    let position = schema
                        .index_of(&name)
                        .ok_or_else(|| ExecutorError::column_not_found(name))?;
                    slots.push(Slot::Position(position));
                    names.push(schema.column_name(position).unwrap_or_default().to_string());
                }
                SelectTarget::Sum(_) => {
                    let last = schema.len().checked_sub(1).ok_or_else(|| {
                        ExecutorError::invalid_argument("SUM projected from an empty schema")
                    })?;
                    slots.push(Slot::Last);
                    names.push(schema.column_name(last).unwrap_or_default().to_string());
                }
            }
        }

        Ok(Self {
            child,
            slots,
            output_schema: Schema::from_qualified(names),
        })
    }

    /// Schema of the projected tuples
    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}

impl Operator for ProjectOperator {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        let Some(tuple) = self.child.next()? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let position = match *slot {
                Slot::Position(p) => p,
                Slot::Last => tuple
                    .arity()
                    .checked_sub(1)
                    .ok_or_else(|| ExecutorError::index_out_of_range(0, 0))?,
            };
            values.push(tuple.value_at(position)?);
        }
        Ok(Some(Tuple::new(values)))
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.child.reset()
    }

    fn name(&self) -> &'static str {
        "Project"
    }
}
