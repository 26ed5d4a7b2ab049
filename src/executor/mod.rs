//! Query executor
//!
//! Pull-based (volcano) operators. `build_pipeline` turns a `PlanNode` tree
//! into an operator tree; the caller drains the root with `next()`.
//!
//! Streaming operators (scan, select, join, project, distinct) hold at most
//! one tuple per input. Sort and aggregate read their whole input when built
//! and keep it in memory.
//!
//! Any error aborts the query. No operator substitutes a default value for
//! a failed lookup or parse.

mod aggregate;
mod builder;
mod distinct;
mod errors;
mod eval;
mod join;
mod operator;
mod project;
mod result;
mod scan;
mod select;
mod sort;
mod source;

pub use aggregate::{AggregateOperator, AGGREGATE_QUALIFIER};
pub use builder::build_pipeline;
pub use distinct::DistinctOperator;
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use eval::{evaluate, evaluate_predicate, Binding, BoundExpr, EvalValue};
pub use join::JoinOperator;
pub use operator::{drain, Operator};
pub use project::ProjectOperator;
pub use result::{execute, ExecutionResult};
pub use scan::ScanOperator;
pub use select::SelectOperator;
pub use sort::{SortKey, SortOperator};
pub use source::{FileRowSource, MemoryRowSource, RowSource};
