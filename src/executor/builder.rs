//! Pipeline assembly: `PlanNode` tree to operator tree

use crate::catalog::Catalog;
use crate::observability::{log_event_with_fields, Event};
use crate::planner::{PlanNode, SortDirection};

use super::aggregate::AggregateOperator;
use super::distinct::DistinctOperator;
use super::errors::{ExecutorError, ExecutorResult};
use super::join::JoinOperator;
use super::operator::Operator;
use super::project::ProjectOperator;
use super::scan::ScanOperator;
use super::select::SelectOperator;
use super::sort::{SortKey, SortOperator};

/// Instantiates the operator tree for `node`.
///
/// Scans open their files here, and materializing operators (sort and
/// aggregate) consume their whole input before this returns.
pub fn build_pipeline(node: &PlanNode, catalog: &Catalog) -> ExecutorResult<Box<dyn Operator>> {
    let operator = build_node(node, catalog)?;
    log_event_with_fields(
        Event::PipelineOpened,
        &[
            ("operators", &node.operator_count().to_string()),
            ("root", operator.name()),
        ],
    );
    Ok(operator)
}

fn build_node(node: &PlanNode, catalog: &Catalog) -> ExecutorResult<Box<dyn Operator>> {
    let operator: Box<dyn Operator> = match node {
        PlanNode::Scan { table, .. } => {
            let def = catalog.table(table).ok_or_else(|| {
                ExecutorError::invalid_argument(format!("table '{}' is not in the catalog", table))
            })?;
            Box::new(ScanOperator::open(table.as_str(), def.path())?)
        }
        PlanNode::Select {
            predicate,
            schema,
            input,
        } => Box::new(SelectOperator::new(
            build_node(input, catalog)?,
            predicate.clone(),
            schema.clone(),
        )?),
        PlanNode::Join {
            conditions,
            schema,
            left,
            right,
        } => Box::new(JoinOperator::new(
            build_node(left, catalog)?,
            build_node(right, catalog)?,
            conditions.clone(),
            schema.clone(),
        )?),
        PlanNode::Aggregate {
            sum,
            group_by,
            input,
            ..
        } => Box::new(AggregateOperator::new(
            build_node(input, catalog)?,
            sum,
            group_by,
            input.schema(),
        )?),
        PlanNode::Project { targets, input, .. } => Box::new(ProjectOperator::new(
            build_node(input, catalog)?,
            input.schema(),
            targets,
        )?),
        PlanNode::Distinct { keys, input, .. } => Box::new(DistinctOperator::new(
            build_node(input, catalog)?,
            input.schema(),
            keys,
        )?),
        PlanNode::Sort { keys, input, .. } => {
            let schema = input.schema();
            let sort_keys = keys
                .iter()
                .map(|item| {
                    let name = item.column.name();
                    let column = schema
                        .index_of(&name)
                        .ok_or_else(|| ExecutorError::column_not_found(name))?;
                    Ok(SortKey {
                        column,
                        ascending: item.direction == SortDirection::Asc,
                    })
                })
                .collect::<ExecutorResult<Vec<_>>>()?;
            Box::new(SortOperator::new(build_node(input, catalog)?, sort_keys)?)
        }
    };
    Ok(operator)
}
