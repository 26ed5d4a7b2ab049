//! Selection: passes through tuples satisfying a predicate

use crate::data::{Schema, Tuple};
use crate::planner::Expr;

use super::errors::ExecutorResult;
use super::eval::{Binding, BoundExpr};
use super::operator::Operator;

/// Filters its child's output with a single-tuple predicate
pub struct SelectOperator {
    child: Box<dyn Operator>,
    predicate: BoundExpr,
}

impl SelectOperator {
    /// Binds `predicate` to the child's schema
    pub fn new(child: Box<dyn Operator>, predicate: Expr, schema: Schema) -> ExecutorResult<Self> {
        let predicate = BoundExpr::bind(&predicate, &schema)?;
        Ok(Self { child, predicate })
    }
}

impl Operator for SelectOperator {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            if self.predicate.evaluate_predicate(Binding::Single(&tuple))? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.child.reset()
    }

    fn name(&self) -> &'static str {
        "Select"
    }
}
