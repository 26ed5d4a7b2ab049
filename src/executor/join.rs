//! Nested-loop join
//!
//! For each left tuple the whole right input is scanned; the right child is
//! reset every time the left cursor advances. Output order is left-major,
//! right-minor, and downstream operators rely on it.

use crate::data::{Schema, Tuple};
use crate::planner::Expr;

use super::errors::ExecutorResult;
use super::eval::{Binding, BoundExpr};
use super::operator::Operator;

/// Joins two inputs under zero or more conditions.
///
/// Conditions resolve against the combined (left + right) schema. An empty
/// condition list produces the cross product.
pub struct JoinOperator {
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,
    conditions: Vec<BoundExpr>,
    schema: Schema,
    left_tuple: Option<Tuple>,
    right_tuple: Option<Tuple>,
}

impl JoinOperator {
    /// Binds the conditions, then primes both cursors
    pub fn new(
        left: Box<dyn Operator>,
        right: Box<dyn Operator>,
        conditions: Vec<Expr>,
        schema: Schema,
    ) -> ExecutorResult<Self> {
        let conditions = conditions
            .iter()
            .map(|condition| BoundExpr::bind(condition, &schema))
            .collect::<ExecutorResult<Vec<_>>>()?;
        let mut join = Self {
            left,
            right,
            conditions,
            schema,
            left_tuple: None,
            right_tuple: None,
        };
        join.prime()?;
        Ok(join)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn prime(&mut self) -> ExecutorResult<()> {
        self.left_tuple = self.left.next()?;
        self.right_tuple = self.right.next()?;
        if self.right_tuple.is_none() {
            // Nothing can ever pair with the left side.
            self.left_tuple = None;
        }
        Ok(())
    }

    fn matches(&self, left: &Tuple, right: &Tuple) -> ExecutorResult<bool> {
        for condition in &self.conditions {
            if !condition.evaluate_predicate(Binding::Pair(left, right))? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Operator for JoinOperator {
    fn next(&mut self) -> ExecutorResult<Option<Tuple>> {
        loop {
            let Some(left) = self.left_tuple.as_ref() else {
                return Ok(None);
            };
            let Some(right) = self.right_tuple.take() else {
                self.left_tuple = self.left.next()?;
                self.right.reset()?;
                self.right_tuple = self.right.next()?;
                continue;
            };

            let output = if self.matches(left, &right)? {
                Some(Tuple::concat(left, &right))
            } else {
                None
            };
            self.right_tuple = self.right.next()?;
            if output.is_some() {
                return Ok(output);
            }
        }
    }

    fn reset(&mut self) -> ExecutorResult<()> {
        self.left.reset()?;
        self.right.reset()?;
        self.prime()
    }

    fn name(&self) -> &'static str {
        "Join"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::operator::drain;
    use crate::executor::scan::ScanOperator;
    use crate::executor::source::MemoryRowSource;
    use crate::executor::eval::evaluate_predicate;
    use crate::executor::ExecutorErrorCode;
    use crate::planner::CompareOp;

    fn scan(table: &str, rows: &[&[i32]]) -> Box<dyn Operator> {
        Box::new(ScanOperator::new(
            table,
            Box::new(MemoryRowSource::from_rows(rows)),
        ))
    }

    fn r() -> Box<dyn Operator> {
        scan("R", &[&[1, 10], &[2, 20]])
    }

    fn s() -> Box<dyn Operator> {
        scan("S", &[&[10, 100], &[30, 300]])
    }

    fn combined() -> Schema {
        Schema::combine(&Schema::new("R", &["A", "B"]), &Schema::new("S", &["B", "C"]))
    }

    #[test]
    fn test_cross_product_left_major() {
        let mut join = JoinOperator::new(r(), s(), Vec::new(), combined()).unwrap();
        let tuples = drain(&mut join).unwrap();
        assert_eq!(
            tuples,
            vec![
                Tuple::new(vec![1, 10, 10, 100]),
                Tuple::new(vec![1, 10, 30, 300]),
                Tuple::new(vec![2, 20, 10, 100]),
                Tuple::new(vec![2, 20, 30, 300]),
            ]
        );
        assert_eq!(join.next().unwrap(), None);
    }

    #[test]
    fn test_cross_product_size() {
        let left = scan("L", &[&[1], &[2], &[3]]);
        let right = scan("M", &[&[1], &[2], &[3], &[4]]);
        let schema = Schema::combine(&Schema::new("L", &["X"]), &Schema::new("M", &["Y"]));
        let mut join = JoinOperator::new(left, right, Vec::new(), schema).unwrap();
        assert_eq!(drain(&mut join).unwrap().len(), 12);
    }

    #[test]
    fn test_equi_join() {
        let mut join = JoinOperator::new(r(), s(), vec![Expr::columns_eq("R.B", "S.B")], combined())
            .unwrap();
        let tuples = drain(&mut join).unwrap();
        assert_eq!(tuples, vec![Tuple::new(vec![1, 10, 10, 100])]);
    }

    #[test]
    fn test_equi_join_matches_filtered_cross_product() {
        let condition = Expr::compare(CompareOp::Lt, Expr::column("R.B"), Expr::column("S.B"));
        let schema = combined();

        let mut join = JoinOperator::new(r(), s(), vec![condition.clone()], schema.clone()).unwrap();
        let joined = drain(&mut join).unwrap();

        let mut cross = JoinOperator::new(r(), s(), Vec::new(), schema.clone()).unwrap();
        let filtered: Vec<Tuple> = drain(&mut cross)
            .unwrap()
            .into_iter()
            .filter(|t| {
                let (l, rr) = t.values().split_at(2);
                let (l, rr) = (Tuple::new(l.to_vec()), Tuple::new(rr.to_vec()));
                evaluate_predicate(&condition, &schema, Binding::Pair(&l, &rr)).unwrap()
            })
            .collect();

        assert_eq!(joined, filtered);
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn test_multiple_conditions_all_required() {
        let conditions = vec![
            Expr::columns_eq("R.B", "S.B"),
            Expr::column_eq("R.A", 2),
        ];
        let mut join = JoinOperator::new(r(), s(), conditions, combined()).unwrap();
        assert_eq!(join.next().unwrap(), None);
    }

    #[test]
    fn test_empty_sides() {
        let mut join = JoinOperator::new(scan("R", &[]), s(), Vec::new(), combined()).unwrap();
        assert_eq!(join.next().unwrap(), None);

        let mut join = JoinOperator::new(r(), scan("S", &[]), Vec::new(), combined()).unwrap();
        assert_eq!(join.next().unwrap(), None);
        assert_eq!(join.next().unwrap(), None);
    }

    #[test]
    fn test_reset_replays() {
        let mut join = JoinOperator::new(r(), s(), Vec::new(), combined()).unwrap();
        join.next().unwrap();
        join.next().unwrap();
        join.reset().unwrap();
        assert_eq!(drain(&mut join).unwrap().len(), 4);
    }

    #[test]
    fn test_three_way_join_resets_nested_right() {
        let schema = Schema::combine(&combined(), &Schema::new("T", &["C"]));
        let inner = JoinOperator::new(r(), s(), Vec::new(), combined()).unwrap();
        let t = scan("T", &[&[100], &[300]]);
        let mut join =
            JoinOperator::new(Box::new(inner), t, vec![Expr::columns_eq("S.C", "T.C")], schema)
                .unwrap();
        let tuples = drain(&mut join).unwrap();
        assert_eq!(tuples.len(), 4);
        assert!(tuples.iter().all(|t| t.values()[3] == t.values()[4]));
    }

    #[test]
    fn test_unknown_condition_column_fails_before_reading() {
        let result = JoinOperator::new(
            scan("R", &[]),
            scan("S", &[]),
            vec![Expr::columns_eq("R.B", "S.Z")],
            combined(),
        );
        let err = result.err().unwrap();
        assert_eq!(err.code(), ExecutorErrorCode::AeroColumnNotFound);
        assert_eq!(err.column(), Some("S.Z"));
    }
}
