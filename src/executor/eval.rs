//! Predicate evaluation against tuples
//!
//! An `Expr` is first bound to a schema, turning column references into
//! positions; the bound tree is then evaluated by one recursive match. The
//! binding decides which tuple a position reads from.

use crate::data::{Schema, Tuple};
use crate::planner::{CompareOp, Expr};

use super::errors::{ExecutorError, ExecutorResult};

/// Result of evaluating a subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalValue {
    Int(i64),
    Bool(bool),
}

/// Tuples a predicate is evaluated against
#[derive(Debug, Clone, Copy)]
pub enum Binding<'a> {
    /// One tuple described by the schema (select)
    Single(&'a Tuple),
    /// Left and right join inputs described by their combined schema.
    ///
    /// Positions below `left.arity()` read the left tuple, the rest read
    /// the right tuple shifted by that arity.
    Pair(&'a Tuple, &'a Tuple),
}

impl Binding<'_> {
    fn value_at(&self, position: usize) -> ExecutorResult<i64> {
        let value = match self {
            Binding::Single(tuple) => tuple.value_at(position)?,
            Binding::Pair(left, right) => {
                if position < left.arity() {
                    left.value_at(position)?
                } else {
                    right.value_at(position - left.arity())?
                }
            }
        };
        Ok(i64::from(value))
    }
}

/// Predicate with every column reference resolved to a tuple position.
///
/// Operators bind once at construction, so an unknown column fails the
/// operator before any tuple flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundExpr {
    Literal(i64),
    Position(usize),
    Comparison {
        op: CompareOp,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    And(Box<BoundExpr>, Box<BoundExpr>),
    Or(Box<BoundExpr>, Box<BoundExpr>),
}

impl BoundExpr {
    /// Resolves every column of `expr` against `schema`
    pub fn bind(expr: &Expr, schema: &Schema) -> ExecutorResult<Self> {
        Ok(match expr {
            Expr::Literal(v) => BoundExpr::Literal(*v),
            Expr::Column(column) => {
                let name = column.name();
                let position = schema
                    .index_of(&name)
                    .ok_or_else(|| ExecutorError::column_not_found(name))?;
                BoundExpr::Position(position)
            }
            Expr::Comparison { op, left, right } => BoundExpr::Comparison {
                op: *op,
                left: Box::new(Self::bind(left, schema)?),
                right: Box::new(Self::bind(right, schema)?),
            },
            Expr::And(left, right) => BoundExpr::And(
                Box::new(Self::bind(left, schema)?),
                Box::new(Self::bind(right, schema)?),
            ),
            Expr::Or(left, right) => BoundExpr::Or(
                Box::new(Self::bind(left, schema)?),
                Box::new(Self::bind(right, schema)?),
            ),
        })
    }

    /// Evaluates against the bound tuples
    pub fn evaluate(&self, binding: Binding<'_>) -> ExecutorResult<EvalValue> {
        match self {
            BoundExpr::Literal(v) => Ok(EvalValue::Int(*v)),
            BoundExpr::Position(p) => Ok(EvalValue::Int(binding.value_at(*p)?)),
            BoundExpr::Comparison { op, left, right } => {
                let l = expect_int(left.evaluate(binding)?, op.as_str())?;
                let r = expect_int(right.evaluate(binding)?, op.as_str())?;
                Ok(EvalValue::Bool(op.apply(l, r)))
            }
            BoundExpr::And(left, right) => {
                if !expect_bool(left.evaluate(binding)?, "AND")? {
                    return Ok(EvalValue::Bool(false));
                }
                Ok(EvalValue::Bool(expect_bool(right.evaluate(binding)?, "AND")?))
            }
            BoundExpr::Or(left, right) => {
                if expect_bool(left.evaluate(binding)?, "OR")? {
                    return Ok(EvalValue::Bool(true));
                }
                Ok(EvalValue::Bool(expect_bool(right.evaluate(binding)?, "OR")?))
            }
        }
    }

    /// Evaluates a predicate that must produce a boolean
    pub fn evaluate_predicate(&self, binding: Binding<'_>) -> ExecutorResult<bool> {
        expect_bool(self.evaluate(binding)?, "predicate")
    }
}

/// Binds `expr` to `schema` and evaluates it once
pub fn evaluate(expr: &Expr, schema: &Schema, binding: Binding<'_>) -> ExecutorResult<EvalValue> {
    BoundExpr::bind(expr, schema)?.evaluate(binding)
}

/// Binds and evaluates a predicate that must produce a boolean
pub fn evaluate_predicate(
    expr: &Expr,
    schema: &Schema,
    binding: Binding<'_>,
) -> ExecutorResult<bool> {
    BoundExpr::bind(expr, schema)?.evaluate_predicate(binding)
}

fn expect_int(value: EvalValue, context: &str) -> ExecutorResult<i64> {
    match value {
        EvalValue::Int(v) => Ok(v),
        EvalValue::Bool(_) => Err(ExecutorError::invalid_argument(format!(
            "'{}' expects integer operands, got a boolean",
            context
        ))),
    }
}

fn expect_bool(value: EvalValue, context: &str) -> ExecutorResult<bool> {
    match value {
        EvalValue::Bool(b) => Ok(b),
        EvalValue::Int(_) => Err(ExecutorError::invalid_argument(format!(
            "'{}' expects boolean operands, got an integer",
            context
        ))),
    }
}
