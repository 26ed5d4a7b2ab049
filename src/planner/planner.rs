//! Query planner
//!
//! Turns a `Query` into a `PlanNode` tree. The tree shape is fixed by the
//! clauses present, bottom-up:
//!
//! 1. One scan per table in FROM-then-JOIN order, each wrapped in a select
//!    per single-table conjunct
//! 2. Left-deep joins; each join condition is attached to the first join
//!    whose combined schema has all of its columns
//! 3. Aggregate, if the query has SUM or GROUP BY
//! 4. Project, unless the SELECT list is `*`
//! 5. Distinct, keyed on every output column
//! 6. Sort, in ORDER BY clause order
//!
//! A sort key that the projection removes is still honored: the sort is
//! then placed directly beneath the projection.
//!
//! Planning is deterministic: same catalog and query, same plan.

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::catalog::Catalog;
use crate::data::Schema;
use crate::executor::AGGREGATE_QUALIFIER;
use crate::observability::{log_event_with_fields, Event};

use super::ast::{ColumnRef, Expr, OrderByItem, Query, SelectTarget, SumExpr};
use super::classifier::{classify, ScopeTable};
use super::errors::{PlannerError, PlannerResult};

/// Immutable description of one operator and its inputs.
///
/// Every node carries its output schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operator", rename_all = "snake_case")]
pub enum PlanNode {
    Scan {
        table: String,
        reference: String,
        schema: Schema,
    },
    Select {
        #[serde(serialize_with = "display")]
        predicate: Expr,
        schema: Schema,
        input: Box<PlanNode>,
    },
    Join {
        #[serde(serialize_with = "display_all")]
        conditions: Vec<Expr>,
        schema: Schema,
        left: Box<PlanNode>,
        right: Box<PlanNode>,
    },
    Aggregate {
        #[serde(serialize_with = "display")]
        sum: SumExpr,
        group_by: Vec<String>,
        schema: Schema,
        input: Box<PlanNode>,
    },
    Project {
        #[serde(serialize_with = "display_all")]
        targets: Vec<SelectTarget>,
        schema: Schema,
        input: Box<PlanNode>,
    },
    Distinct {
        keys: Vec<String>,
        schema: Schema,
        input: Box<PlanNode>,
    },
    Sort {
        #[serde(serialize_with = "display_all")]
        keys: Vec<OrderByItem>,
        schema: Schema,
        input: Box<PlanNode>,
    },
}

fn display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn display_all<T: fmt::Display, S: Serializer>(
    values: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|v| v.to_string()))
}

impl PlanNode {
    /// Output schema of this node
    pub fn schema(&self) -> &Schema {
        match self {
            PlanNode::Scan { schema, .. }
            | PlanNode::Select { schema, .. }
            | PlanNode::Join { schema, .. }
            | PlanNode::Aggregate { schema, .. }
            | PlanNode::Project { schema, .. }
            | PlanNode::Distinct { schema, .. }
            | PlanNode::Sort { schema, .. } => schema,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlanNode::Scan { .. } => "Scan",
            PlanNode::Select { .. } => "Select",
            PlanNode::Join { .. } => "Join",
            PlanNode::Aggregate { .. } => "Aggregate",
            PlanNode::Project { .. } => "Project",
            PlanNode::Distinct { .. } => "Distinct",
            PlanNode::Sort { .. } => "Sort",
        }
    }

    /// Direct inputs, left before right
    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::Scan { .. } => Vec::new(),
            PlanNode::Join { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            PlanNode::Select { input, .. }
            | PlanNode::Aggregate { input, .. }
            | PlanNode::Project { input, .. }
            | PlanNode::Distinct { input, .. }
            | PlanNode::Sort { input, .. } => vec![input.as_ref()],
        }
    }

    /// Number of nodes in this subtree
    pub fn operator_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|c| c.operator_count())
            .sum::<usize>()
    }
}

/// Compact one-line rendering, e.g. `Project(Join(Select(Scan(R)), Scan(S)))`
impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let PlanNode::Scan { reference, .. } = self {
            return write!(f, "Scan({})", reference);
        }
        write!(f, "{}(", self.name())?;
        for (i, child) in self.children().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str(")")
    }
}

/// Planner output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub root: PlanNode,
    /// WHERE conjuncts that no operator evaluates
    pub dropped_predicates: Vec<Expr>,
}

impl QueryPlan {
    pub fn output_schema(&self) -> &Schema {
        self.root.schema()
    }
}

/// Query planner over a loaded catalog
pub struct QueryPlanner<'a> {
    catalog: &'a Catalog,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Plans a query, returning an immutable plan or error
    pub fn plan(&self, query: &Query) -> PlannerResult<QueryPlan> {
        let scope = self.resolve_tables(query)?;

        let sums = query
            .projection
            .iter()
            .flatten()
            .filter(|t| matches!(t, SelectTarget::Sum(_)))
            .count();
        if sums > 1 {
            return Err(PlannerError::unsupported("more than one SUM in SELECT"));
        }

        let classification = classify(query.selection.as_ref(), &scope)?;
        let mut dropped: Vec<Expr> = classification
            .selections
            .iter()
            .filter(|(reference, _)| !scope.iter().any(|t| &t.reference == reference))
            .map(|(_, e)| e.clone())
            .collect();

        // Scans wrapped in their selections
        let mut inputs = scope.iter().map(|table| {
            let mut node = PlanNode::Scan {
                table: table.table.clone(),
                reference: table.reference.clone(),
                schema: table.schema.clone(),
            };
            for predicate in classification.selections_for(&table.reference) {
                node = PlanNode::Select {
                    predicate: predicate.clone(),
                    schema: table.schema.clone(),
                    input: Box::new(node),
                };
            }
            node
        });

        let mut root = inputs
            .next()
            .ok_or_else(|| PlannerError::query_invalid("Query has no tables"))?;

        let mut pending: Vec<Option<Expr>> = classification
            .join_conditions
            .iter()
            .cloned()
            .map(Some)
            .collect();
        for right in inputs {
            let schema = Schema::combine(root.schema(), right.schema());
            let conditions: Vec<Expr> = pending
                .iter_mut()
                .filter(|slot| match slot {
                    Some(c) => c.column_names().iter().all(|n| schema.has_column(n)),
                    None => false,
                })
                .filter_map(Option::take)
                .collect();
            root = PlanNode::Join {
                conditions,
                schema,
                left: Box::new(root),
                right: Box::new(right),
            };
        }
        dropped.extend(pending.into_iter().flatten());

        for predicate in &dropped {
            log_event_with_fields(
                Event::PredicateDropped,
                &[
                    ("predicate", &predicate.to_string()),
                    ("reason", "references a table not in FROM"),
                ],
            );
        }

        if query.is_aggregate() {
            root = Self::plan_aggregate(query, root)?;
        }

        let sort_keys = if query.order_by.is_empty() {
            None
        } else {
            Some(&query.order_by)
        };
        let mut sort_placed = false;

        if let Some(targets) = &query.projection {
            if let Some(keys) = sort_keys {
                let projected = Self::project_schema(root.schema(), targets)?;
                if !keys.iter().all(|k| projected.has_column(&k.column.name())) {
                    root = Self::plan_sort(keys, root)?;
                    sort_placed = true;
                }
            }
            root = Self::plan_project(targets, root)?;
        }

        if query.distinct {
            let schema = root.schema().clone();
            root = PlanNode::Distinct {
                keys: schema.columns().to_vec(),
                schema,
                input: Box::new(root),
            };
        }

        if let Some(keys) = sort_keys {
            if !sort_placed {
                root = Self::plan_sort(keys, root)?;
            }
        }

        log_event_with_fields(
            Event::PlanBuilt,
            &[
                ("operators", &root.operator_count().to_string()),
                ("plan", &root.to_string()),
            ],
        );

        Ok(QueryPlan {
            root,
            dropped_predicates: dropped,
        })
    }

    fn resolve_tables(&self, query: &Query) -> PlannerResult<Vec<ScopeTable>> {
        if query.tables.is_empty() {
            return Err(PlannerError::query_invalid("Query has no tables"));
        }
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(query.tables.len());
        for table_ref in &query.tables {
            let table = self
                .catalog
                .table(&table_ref.table)
                .ok_or_else(|| PlannerError::unknown_table(&table_ref.table))?;
            let reference = table_ref.reference_name();
            if !seen.insert(reference.to_string()) {
                return Err(PlannerError::query_invalid(format!(
                    "Table reference '{}' appears more than once; use an alias",
                    reference
                )));
            }
            resolved.push(ScopeTable {
                table: table.name().to_string(),
                reference: reference.to_string(),
                schema: table.schema(reference),
            });
        }
        Ok(resolved)
    }

    fn plan_aggregate(query: &Query, input: PlanNode) -> PlannerResult<PlanNode> {
        let input_schema = input.schema();

        let mut group_by = Vec::with_capacity(query.group_by.len());
        for column in &query.group_by {
            group_by.push(qualified_name(input_schema, &column.name())?);
        }

        let sum = query.sum_expr().cloned().unwrap_or(SumExpr::Literal(0));
        for column in sum.columns() {
            qualified_name(input_schema, column)?;
        }

        let mut names: Vec<String> = group_by
            .iter()
            .map(|c| format!("{}.{}", AGGREGATE_QUALIFIER, c))
            .collect();
        names.push(format!("{}.Sum", AGGREGATE_QUALIFIER));

        Ok(PlanNode::Aggregate {
            sum,
            group_by,
            schema: Schema::from_qualified(names),
            input: Box::new(input),
        })
    }

    /// Output schema of projecting `targets` from `input`
    fn project_schema(input: &Schema, targets: &[SelectTarget]) -> PlannerResult<Schema> {
        let mut names = Vec::with_capacity(targets.len());
        for target in targets {
            let name = match target {
                SelectTarget::Column(column) => qualified_name(input, &column.name())?,
                SelectTarget::Sum(_) => input
                    .columns()
                    .last()
                    .cloned()
                    .ok_or_else(|| PlannerError::query_invalid("SUM over an empty input"))?,
            };
            names.push(name);
        }
        Ok(Schema::from_qualified(names))
    }

    fn plan_project(targets: &[SelectTarget], input: PlanNode) -> PlannerResult<PlanNode> {
        let schema = Self::project_schema(input.schema(), targets)?;
        let targets = targets
            .iter()
            .map(|target| match target {
                SelectTarget::Column(column) => {
                    qualified_name(input.schema(), &column.name()).map(|n| {
                        SelectTarget::Column(ColumnRef::parse(&n))
                    })
                }
                SelectTarget::Sum(sum) => Ok(SelectTarget::Sum(sum.clone())),
            })
            .collect::<PlannerResult<Vec<_>>>()?;
        Ok(PlanNode::Project {
            targets,
            schema,
            input: Box::new(input),
        })
    }

    fn plan_sort(keys: &[OrderByItem], input: PlanNode) -> PlannerResult<PlanNode> {
        let schema = input.schema().clone();
        let keys = keys
            .iter()
            .map(|key| {
                qualified_name(&schema, &key.column.name()).map(|n| OrderByItem {
                    column: ColumnRef::parse(&n),
                    direction: key.direction,
                })
            })
            .collect::<PlannerResult<Vec<_>>>()?;
        Ok(PlanNode::Sort {
            keys,
            schema,
            input: Box::new(input),
        })
    }
}

/// Resolves `name` in `schema` and returns the qualified entry it maps to
fn qualified_name(schema: &Schema, name: &str) -> PlannerResult<String> {
    schema
        .index_of(name)
        .and_then(|i| schema.column_name(i))
        .map(str::to_string)
        .ok_or_else(|| PlannerError::unknown_column(name))
}
