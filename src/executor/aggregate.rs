//! SUM aggregation with optional grouping
//!
//! The operator is eager: construction drains the child and computes every
//! group. Groups are emitted in the order their key was first seen, so the
//! output is deterministic for a given input order.

use std::collections::HashMap;

use crate::data::{Schema, Tuple, Value};
use crate::planner::{SumExpr, SumTerm};

use super::errors::{ExecutorError, ExecutorResult};
use super::operator::Operator;

/// Qualifier of every column produced by the aggregate
pub const AGGREGATE_QUALIFIER: &str = "Aggregated";

#[derive(Debug, Clone, Copy)]
enum Term {
    Literal(i64),
    Position(usize),
}

/// Computes `SUM(expr)` per group key.
///
/// Output tuples carry the group values in declared order followed by the
/// sum. With no group columns there is exactly one (global) group.
pub struct AggregateOperator {
    results: Vec<Tuple>,
    cursor: usize,
    output_schema: Schema,
}

impl AggregateOperator {
    pub fn new<S: AsRef<str>>(
        mut child: Box<dyn Operator>,
        sum: &SumExpr,
        group_by: &[S],
        schema: &Schema,
    ) -> ExecutorResult<Self> {
        let mut key_positions = Vec::with_capacity(group_by.len());
        let mut output_names = Vec::with_capacity(group_by.len() + 1);
        for column in group_by {
            let column = column.as_ref();
            let position = schema
                .index_of(column)
                .ok_or_else(|| ExecutorError::column_not_found(column))?;
            key_positions.push(position);
            output_names.push(format!(
                "{}.{}",
                AGGREGATE_QUALIFIER,
                schema.column_name(position).unwrap_or(column)
            ));
        }
        output_names.push(format!("{}.Sum", AGGREGATE_QUALIFIER));

        let terms = resolve_terms(sum, schema)?;

        let mut groups: Vec<(Vec<Value>, i64)> = Vec::new();
        let mut index: HashMap<Vec<Value>, usize> = HashMap::new();
        while let Some(tuple) = child.next()? {
            let key = key_positions
                .iter()
                .map(|&p| tuple.value_at(p))
                .collect::<ExecutorResult<Vec<_>>>()?;
            let contribution = evaluate_terms(&terms, &tuple)?;
            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, 0));
                    groups.len() - 1
                }
            };
            let total = groups[slot].1;
            groups[slot].1 = total
                .checked_add(contribution)
                .ok_or_else(|| ExecutorError::accumulator_overflow("+", total, contribution))?;
        }

        if groups.is_empty() && key_positions.is_empty() {
            groups.push((Vec::new(), 0));
        }

        let mut results = Vec::with_capacity(groups.len());
        for (mut values, total) in groups {
            let total = Value::try_from(total).map_err(|_| ExecutorError::value_overflow(total))?;
            values.push(total);
            results.push(Tuple::new(values));
        }

        Ok(Self {
            results,
            cursor: 0,
            output_schema: Schema::from_qualified(output_names),
        })
    }

    /// `Aggregated.<group column>…, Aggregated.Sum`
    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }
}

fn resolve_terms(sum: &SumExpr, schema: &Schema) -> ExecutorResult<Vec<Term>> {
    let resolve = |column: &str| {
        schema
            .index_of(column)
            .map(Term::Position)
            .ok_or_else(|| ExecutorError::column_not_found(column))
    };
    match sum {
        SumExpr::Literal(v) => Ok(vec![Term::Literal(*v)]),
        SumExpr::Column(c) => Ok(vec![resolve(c)?]),
        SumExpr::Product(factors) => factors
            .iter()
            .map(|f| match f {
                SumTerm::Literal(v) => Ok(Term::Literal(*v)),
                SumTerm::Column(c) => resolve(c),
            })
            .collect(),
    }
}

/// Product of the resolved terms for one tuple
fn evaluate_terms(terms: &[Term], tuple: &Tuple) -> ExecutorResult<i64> {
    let mut product: i64 = 1;
    for term in terms {
        let factor = match *term {
            Term::Literal(v) => v,
            Term::Position(p) => i64::from(tuple.value_at(p)?),
        };
        product = product
            .checked_mul(factor)
            .ok_or_else(|| ExecutorError::accumulator_overflow("*", product, factor))?;
    }
    Ok(product)
}

impl Operator for AggregateOperator {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        let tuple = self.results.get(self.cursor).cloned();
        if tuple.is_some() {
            self.cursor += 1;
        }
        Ok(tuple)
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.cursor = 0;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Aggregate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::operator::drain;
    use crate::executor::scan::ScanOperator;
    use crate::executor::source::MemoryRowSource;
    use crate::executor::ExecutorErrorCode;

    const NO_GROUPS: &[&str] = &[];

    fn scan(rows: &[&[i32]]) -> Box<dyn Operator> {
        Box::new(ScanOperator::new(
            "R",
            Box::new(MemoryRowSource::from_rows(rows)),
        ))
    }

    fn schema_r() -> Schema {
        Schema::new("R", &["A", "B"])
    }

    fn rows() -> Box<dyn Operator> {
        scan(&[&[2, 10], &[1, 20], &[2, 30], &[3, 40], &[1, 50]])
    }

    #[test]
    fn test_global_sum() {
        let sum = SumExpr::parse("R.B").unwrap();
        let mut agg = AggregateOperator::new(rows(), &sum, NO_GROUPS, &schema_r()).unwrap();
        assert_eq!(agg.output_schema().columns(), &["Aggregated.Sum"]);
        assert_eq!(drain(&mut agg).unwrap(), vec![Tuple::new(vec![150])]);
    }

    #[test]
    fn test_global_count_via_literal() {
        let sum = SumExpr::parse("1").unwrap();
        let mut agg = AggregateOperator::new(rows(), &sum, NO_GROUPS, &schema_r()).unwrap();
        assert_eq!(agg.next().unwrap(), Some(Tuple::new(vec![5])));
        assert_eq!(agg.next().unwrap(), None);
    }

    #[test]
    fn test_grouped_first_seen_order() {
        let sum = SumExpr::parse("B").unwrap();
        let mut agg = AggregateOperator::new(rows(), &sum, &["A"], &schema_r()).unwrap();
        assert_eq!(
            agg.output_schema().columns(),
            &["Aggregated.R.A", "Aggregated.Sum"]
        );
        assert_eq!(
            drain(&mut agg).unwrap(),
            vec![
                Tuple::new(vec![2, 40]),
                Tuple::new(vec![1, 70]),
                Tuple::new(vec![3, 40]),
            ]
        );
    }

    #[test]
    fn test_product_expression() {
        let sum = SumExpr::parse("R.A * R.B").unwrap();
        let mut agg = AggregateOperator::new(rows(), &sum, NO_GROUPS, &schema_r()).unwrap();
        // 20 + 20 + 60 + 120 + 50
        assert_eq!(agg.next().unwrap(), Some(Tuple::new(vec![270])));
    }

    #[test]
    fn test_sum_of_group_values_equals_global() {
        let sum = SumExpr::parse("R.B").unwrap();
        let mut grouped = AggregateOperator::new(rows(), &sum, &["R.A"], &schema_r()).unwrap();
        let total: i32 = drain(&mut grouped)
            .unwrap()
            .iter()
            .map(|t| t.value_at(1).unwrap())
            .sum();
        assert_eq!(total, 150);
    }

    #[test]
    fn test_empty_input() {
        let sum = SumExpr::parse("R.B").unwrap();
        let mut global = AggregateOperator::new(scan(&[]), &sum, NO_GROUPS, &schema_r()).unwrap();
        assert_eq!(drain(&mut global).unwrap(), vec![Tuple::new(vec![0])]);

        let mut grouped = AggregateOperator::new(scan(&[]), &sum, &["R.A"], &schema_r()).unwrap();
        assert_eq!(grouped.next().unwrap(), None);
    }

    #[test]
    fn test_overflow_is_reported() {
        let sum = SumExpr::parse("R.B").unwrap();
        let input = scan(&[&[1, i32::MAX], &[1, 1]]);
        let result = AggregateOperator::new(input, &sum, NO_GROUPS, &schema_r());
        assert_eq!(
            result.err().unwrap().code(),
            ExecutorErrorCode::AeroValueOverflow
        );
    }

    #[test]
    fn test_unknown_group_column() {
        let sum = SumExpr::parse("R.B").unwrap();
        let result = AggregateOperator::new(rows(), &sum, &["R.Z"], &schema_r());
        assert_eq!(
            result.err().unwrap().code(),
            ExecutorErrorCode::AeroColumnNotFound
        );
    }

    #[test]
    fn test_reset_rewinds_buffer() {
        let sum = SumExpr::parse("R.B").unwrap();
        let mut agg = AggregateOperator::new(rows(), &sum, &["R.A"], &schema_r()).unwrap();
        let first = drain(&mut agg).unwrap();
        agg.reset().unwrap();
        assert_eq!(drain(&mut agg).unwrap(), first);
    }

    #[test]
    fn test_running_total_may_exceed_i32() {
        // Passes i32::MAX after the second row, ends back in range.
        let sum = SumExpr::parse("R.B").unwrap();
        let input = scan(&[&[1, i32::MAX], &[1, 1], &[1, -2]]);
        let mut agg = AggregateOperator::new(input, &sum, NO_GROUPS, &schema_r()).unwrap();
        assert_eq!(drain(&mut agg).unwrap(), vec![Tuple::new(vec![2147483646])]);
    }

    #[test]
    fn test_product_overflow_names_operands() {
        let sum = SumExpr::Product(vec![
            SumTerm::Literal(i64::MAX),
            SumTerm::Column("R.B".to_string()),
        ]);
        let input = scan(&[&[1, 2]]);
        let err = AggregateOperator::new(input, &sum, NO_GROUPS, &schema_r())
            .err()
            .unwrap();
        assert_eq!(err.code(), ExecutorErrorCode::AeroValueOverflow);
        assert!(err.message().contains("i64 accumulator overflowed"));
        assert!(err.message().contains(&format!("{} * 2", i64::MAX)));
    }

    #[test]
    fn test_accumulator_overflow_names_operands() {
        let half = 1_i64 << 62;
        let sum = SumExpr::Product(vec![SumTerm::Literal(half), SumTerm::Column("R.B".to_string())]);
        let input = scan(&[&[1, 1], &[1, 1]]);
        let err = AggregateOperator::new(input, &sum, NO_GROUPS, &schema_r())
            .err()
            .unwrap();
        assert_eq!(err.code(), ExecutorErrorCode::AeroValueOverflow);
        assert!(err.message().contains(&format!("{} + {}", half, half)));
    }
}
