//! WHERE clause classification
//!
//! The predicate is split into its top-level conjuncts. Each conjunct goes
//! to one bucket, chosen by the set of table references it mentions
//! anywhere in its subtree:
//!
//! - one reference: selection on that table
//! - several references: join condition
//! - none (e.g. `1 = 2`): selection on the first table in FROM
//!
//! Bare column names are qualified here with the leftmost table in FROM
//! order that has the column.

use std::collections::BTreeSet;

use crate::data::Schema;

use super::ast::{ColumnRef, Expr};
use super::errors::{PlannerError, PlannerResult};

/// A table in scope, qualified by its reference name (alias or table name)
#[derive(Debug, Clone)]
pub struct ScopeTable {
    pub table: String,
    pub reference: String,
    pub schema: Schema,
}

/// Conjuncts sorted into buckets, each bucket in WHERE order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// `(reference, conjunct)` for single-table conjuncts
    pub selections: Vec<(String, Expr)>,
    /// Conjuncts spanning more than one table
    pub join_conditions: Vec<Expr>,
}

impl Classification {
    /// Selections on `reference`, in WHERE order
    pub fn selections_for<'a>(&'a self, reference: &'a str) -> impl Iterator<Item = &'a Expr> + 'a {
        self.selections
            .iter()
            .filter(move |(r, _)| r == reference)
            .map(|(_, e)| e)
    }
}

pub fn classify(predicate: Option<&Expr>, scope: &[ScopeTable]) -> PlannerResult<Classification> {
    let mut result = Classification::default();
    let Some(predicate) = predicate else {
        return Ok(result);
    };
    let first = scope
        .first()
        .ok_or_else(|| PlannerError::query_invalid("Query has no tables"))?;

    for mut conjunct in predicate.clone().into_conjuncts() {
        qualify_columns(&mut conjunct, scope)?;

        let mut references = BTreeSet::new();
        conjunct.for_each_column(&mut |c| {
            if let Some(q) = &c.qualifier {
                references.insert(q.clone());
            }
        });

        let mut iter = references.into_iter();
        match (iter.next(), iter.next()) {
            (None, _) => result.selections.push((first.reference.clone(), conjunct)),
            (Some(reference), None) => result.selections.push((reference, conjunct)),
            (Some(_), Some(_)) => result.join_conditions.push(conjunct),
        }
    }
    Ok(result)
}

/// Qualifies bare names and checks qualified ones against tables in scope.
///
/// A qualifier naming no table in scope is left untouched; the planner
/// drops conditions that never become applicable.
fn qualify_columns(expr: &mut Expr, scope: &[ScopeTable]) -> PlannerResult<()> {
    let mut failure = None;
    expr.map_columns(&mut |column: &mut ColumnRef| {
        if failure.is_some() {
            return;
        }
        match &column.qualifier {
            None => match scope.iter().find(|t| t.schema.has_column(&column.column)) {
                Some(table) => column.qualifier = Some(table.reference.clone()),
                None => failure = Some(PlannerError::unknown_column(column.name())),
            },
            Some(q) => {
                if let Some(table) = scope.iter().find(|t| &t.reference == q) {
                    if !table.schema.has_column(&column.name()) {
                        failure = Some(PlannerError::unknown_column(column.name()));
                    }
                }
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
