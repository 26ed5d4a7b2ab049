//! Query planner
//!
//! Turns SQL text into a `Query`, then a `Query` into a tree of
//! `PlanNode`s that the executor instantiates.
//!
//! # Plan shape (bottom to top)
//!
//! 1. One `Scan` per FROM table, each wrapped in a `Select` for its
//!    single-table conjuncts
//! 2. Left-deep `Join`s in FROM order, each carrying the conditions that
//!    become applicable once its right table is in scope
//! 3. `Aggregate` when the query has GROUP BY or SUM
//! 4. `Project` when the SELECT list is not `*`
//! 5. `Distinct`, then `Sort`
//!
//! Same query and catalog always give the same plan.

mod ast;
mod classifier;
mod errors;
mod explain;
#[allow(clippy::module_inception)]
mod planner;
mod sql;

pub use ast::{
    ColumnRef, CompareOp, Expr, OrderByItem, Query, SelectTarget, SortDirection, SumExpr, SumTerm,
    TableRef,
};
pub use classifier::{classify, Classification, ScopeTable};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult};
pub use explain::ExplainPlan;
pub use planner::{PlanNode, QueryPlan, QueryPlanner};
pub use sql::parse_query;
