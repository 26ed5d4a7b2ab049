//! SQL text to `Query` translation
//!
//! Accepts a single `SELECT` over base tables:
//!
//! ```text
//! SELECT [DISTINCT] (* | item, ...)
//! FROM t [[AS] a] {, t [[AS] a] | [INNER | CROSS] JOIN t [[AS] a] [ON expr]}
//! [WHERE expr] [GROUP BY col, ...] [ORDER BY col [ASC | DESC], ...]
//! ```
//!
//! Items are column references or `SUM(expr)`, where `expr` is an integer,
//! a column, or a `*` product of those. `JOIN ... ON` conditions are
//! conjoined ahead of the WHERE predicate, in textual order. Everything
//! else is rejected with `AERO_QUERY_UNSUPPORTED`.

use sqlparser::ast::{
    BinaryOperator, Distinct, Expr as SqlExpr, FunctionArg, FunctionArgExpr, FunctionArguments,
    GroupByExpr, Ident, JoinConstraint, JoinOperator, ObjectName, Query as SqlQuery, Select,
    SelectItem, SetExpr, Statement, TableFactor, UnaryOperator, Value,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use super::ast::{
    ColumnRef, CompareOp, Expr, OrderByItem, Query, SelectTarget, SortDirection, SumExpr, SumTerm,
    TableRef,
};
use super::errors::{PlannerError, PlannerResult};

/// Parses one SELECT statement
pub fn parse_query(sql: &str) -> PlannerResult<Query> {
    let dialect = GenericDialect {};
    let statements =
        Parser::parse_sql(&dialect, sql).map_err(|e| PlannerError::query_invalid(e.to_string()))?;
    if statements.len() != 1 {
        return Err(PlannerError::query_invalid(format!(
            "Expected exactly one statement, found {}",
            statements.len()
        )));
    }
    match &statements[0] {
        Statement::Query(q) => query_to_ast(q),
        other => Err(PlannerError::unsupported(format!("statement '{}'", other))),
    }
}

fn query_to_ast(q: &SqlQuery) -> PlannerResult<Query> {
    if q.with.is_some() {
        return Err(PlannerError::unsupported("WITH"));
    }
    if q.limit.is_some() || q.offset.is_some() {
        return Err(PlannerError::unsupported("LIMIT/OFFSET"));
    }
    let select = match q.body.as_ref() {
        SetExpr::Select(s) => s.as_ref(),
        _ => return Err(PlannerError::unsupported("set operations")),
    };
    if select.having.is_some() {
        return Err(PlannerError::unsupported("HAVING"));
    }

    let (tables, on_conditions) = from_to_tables(select)?;
    let mut query = Query::new(tables);
    for condition in on_conditions {
        query = query.with_predicate(condition);
    }
    if let Some(selection) = &select.selection {
        query = query.with_predicate(predicate_to_expr(selection)?);
    }

    match &select.distinct {
        None => {}
        Some(Distinct::Distinct) => query = query.with_distinct(),
        Some(Distinct::On(_)) => return Err(PlannerError::unsupported("DISTINCT ON")),
    }

    query.projection = projection_to_targets(&select.projection)?;

    query.group_by = match &select.group_by {
        GroupByExpr::Expressions(exprs, _modifiers) => exprs
            .iter()
            .map(column_ref)
            .collect::<PlannerResult<Vec<_>>>()?,
        GroupByExpr::All(_) => return Err(PlannerError::unsupported("GROUP BY ALL")),
    };

    if let Some(order_by) = &q.order_by {
        for item in &order_by.exprs {
            let direction = match item.asc {
                Some(false) => SortDirection::Desc,
                _ => SortDirection::Asc,
            };
            query.order_by.push(OrderByItem {
                column: column_ref(&item.expr)?,
                direction,
            });
        }
    }

    Ok(query)
}

fn from_to_tables(select: &Select) -> PlannerResult<(Vec<TableRef>, Vec<Expr>)> {
    if select.from.is_empty() {
        return Err(PlannerError::query_invalid("SELECT requires a FROM clause"));
    }
    let mut tables = Vec::new();
    let mut conditions = Vec::new();
    for source in &select.from {
        tables.push(table_factor_to_ref(&source.relation)?);
        for join in &source.joins {
            tables.push(table_factor_to_ref(&join.relation)?);
            match &join.join_operator {
                JoinOperator::Inner(constraint) => match constraint {
                    JoinConstraint::On(e) => conditions.push(predicate_to_expr(e)?),
                    JoinConstraint::None => {}
                    _ => return Err(PlannerError::unsupported("JOIN ... USING / NATURAL")),
                },
                JoinOperator::CrossJoin => {}
                _ => return Err(PlannerError::unsupported("outer or lateral joins")),
            }
        }
    }
    Ok((tables, conditions))
}

fn table_factor_to_ref(factor: &TableFactor) -> PlannerResult<TableRef> {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            let table = object_name(name);
            Ok(match alias {
                Some(a) if a.columns.is_empty() => TableRef::aliased(table, a.name.value.clone()),
                Some(_) => return Err(PlannerError::unsupported("column aliases on tables")),
                None => TableRef::new(table),
            })
        }
        _ => Err(PlannerError::unsupported("FROM sources other than base tables")),
    }
}

fn projection_to_targets(items: &[SelectItem]) -> PlannerResult<Option<Vec<SelectTarget>>> {
    if let [SelectItem::Wildcard(_)] = items {
        return Ok(None);
    }
    let mut targets = Vec::with_capacity(items.len());
    for item in items {
        let expr = match item {
            SelectItem::UnnamedExpr(e) => e,
            SelectItem::ExprWithAlias { .. } => {
                return Err(PlannerError::unsupported("column aliases in SELECT"))
            }
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(_, _) => {
                return Err(PlannerError::unsupported("'*' mixed with other SELECT items"))
            }
        };
        let target = match expr {
            SqlExpr::Function(func) => {
                let name = object_name(&func.name);
                if !name.eq_ignore_ascii_case("SUM") {
                    return Err(PlannerError::unsupported(format!("function {}", name)));
                }
                let arg = match &func.args {
                    FunctionArguments::List(list) if list.args.len() == 1 => &list.args[0],
                    _ => return Err(PlannerError::query_invalid("SUM takes one argument")),
                };
                match arg {
                    FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => {
                        SelectTarget::Sum(sum_expr(e)?)
                    }
                    _ => return Err(PlannerError::unsupported("SUM argument form")),
                }
            }
            other => SelectTarget::Column(column_ref(other)?),
        };
        targets.push(target);
    }
    Ok(Some(targets))
}

fn sum_expr(e: &SqlExpr) -> PlannerResult<SumExpr> {
    let mut terms = Vec::new();
    collect_factors(e, &mut terms)?;
    Ok(match terms.as_slice() {
        [SumTerm::Literal(v)] => SumExpr::Literal(*v),
        [SumTerm::Column(c)] => SumExpr::Column(c.clone()),
        _ => SumExpr::Product(terms),
    })
}

fn collect_factors(e: &SqlExpr, out: &mut Vec<SumTerm>) -> PlannerResult<()> {
    match e {
        SqlExpr::BinaryOp {
            left,
            op: BinaryOperator::Multiply,
            right,
        } => {
            collect_factors(left, out)?;
            collect_factors(right, out)
        }
        SqlExpr::Nested(inner) => collect_factors(inner, out),
        other => {
            out.push(match operand_to_expr(other)? {
                Expr::Literal(v) => SumTerm::Literal(v),
                Expr::Column(c) => SumTerm::Column(c.name()),
                _ => return Err(PlannerError::unsupported("SUM operand")),
            });
            Ok(())
        }
    }
}

/// Converts a WHERE / ON expression
fn predicate_to_expr(e: &SqlExpr) -> PlannerResult<Expr> {
    match e {
        SqlExpr::Nested(inner) => predicate_to_expr(inner),
        SqlExpr::BinaryOp { left, op, right } => match op {
            BinaryOperator::And => Ok(Expr::and(
                predicate_to_expr(left)?,
                predicate_to_expr(right)?,
            )),
            BinaryOperator::Or => Ok(Expr::or(
                predicate_to_expr(left)?,
                predicate_to_expr(right)?,
            )),
            _ => Ok(Expr::compare(
                compare_op(op)?,
                operand_to_expr(left)?,
                operand_to_expr(right)?,
            )),
        },
        other => Err(PlannerError::unsupported(format!("predicate '{}'", other))),
    }
}

/// Converts a comparison operand: integer literal or column reference
fn operand_to_expr(e: &SqlExpr) -> PlannerResult<Expr> {
    match e {
        SqlExpr::Nested(inner) => operand_to_expr(inner),
        SqlExpr::Value(Value::Number(text, _)) => integer(text).map(Expr::Literal),
        SqlExpr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match expr.as_ref() {
            SqlExpr::Value(Value::Number(text, _)) => {
                integer(&format!("-{}", text)).map(Expr::Literal)
            }
            _ => Err(PlannerError::unsupported("negation of non-literals")),
        },
        SqlExpr::Identifier(_) | SqlExpr::CompoundIdentifier(_) => {
            column_ref(e).map(Expr::Column)
        }
        other => Err(PlannerError::unsupported(format!("operand '{}'", other))),
    }
}

fn integer(text: &str) -> PlannerResult<i64> {
    text.parse()
        .map_err(|_| PlannerError::query_invalid(format!("'{}' is not an integer", text)))
}

fn compare_op(op: &BinaryOperator) -> PlannerResult<CompareOp> {
    Ok(match op {
        BinaryOperator::Eq => CompareOp::Eq,
        BinaryOperator::NotEq => CompareOp::NotEq,
        BinaryOperator::Lt => CompareOp::Lt,
        BinaryOperator::LtEq => CompareOp::LtEq,
        BinaryOperator::Gt => CompareOp::Gt,
        BinaryOperator::GtEq => CompareOp::GtEq,
        other => return Err(PlannerError::unsupported(format!("operator '{}'", other))),
    })
}

fn column_ref(e: &SqlExpr) -> PlannerResult<ColumnRef> {
    match e {
        SqlExpr::Identifier(id) => Ok(ColumnRef::bare(id.value.clone())),
        SqlExpr::CompoundIdentifier(parts) => match parts.as_slice() {
            [qualifier, column] => Ok(ColumnRef::qualified(
                qualifier.value.clone(),
                column.value.clone(),
            )),
            _ => Err(PlannerError::unsupported(format!(
                "column name '{}'",
                join_idents(parts)
            ))),
        },
        other => Err(PlannerError::unsupported(format!(
            "expression '{}' where a column is expected",
            other
        ))),
    }
}

fn object_name(name: &ObjectName) -> String {
    join_idents(&name.0)
}

fn join_idents(parts: &[Ident]) -> String {
    parts
        .iter()
        .map(|i| i.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerErrorCode;

    #[test]
    fn test_select_star() {
        let query = parse_query("SELECT * FROM Sailors").unwrap();
        assert_eq!(query.tables, vec![TableRef::new("Sailors")]);
        assert!(query.projection.is_none());
        assert!(query.selection.is_none());
        assert!(!query.distinct);
    }

    #[test]
    fn test_where_and_projection() {
        let query =
            parse_query("SELECT S.A, B FROM Sailors S WHERE S.A = 1 AND S.B <> -2").unwrap();
        assert_eq!(query.tables, vec![TableRef::aliased("Sailors", "S")]);
        assert_eq!(
            query.projection,
            Some(vec![
                SelectTarget::Column(ColumnRef::qualified("S", "A")),
                SelectTarget::Column(ColumnRef::bare("B")),
            ])
        );
        let conjuncts = query.selection.unwrap().into_conjuncts();
        assert_eq!(conjuncts[0], Expr::column_eq("S.A", 1));
        assert_eq!(
            conjuncts[1],
            Expr::compare(CompareOp::NotEq, Expr::column("S.B"), Expr::Literal(-2))
        );
    }

    #[test]
    fn test_joins_and_on_conditions() {
        let query = parse_query(
            "SELECT * FROM R, S AS X JOIN T ON X.C = T.C CROSS JOIN U WHERE R.B = X.B",
        )
        .unwrap();
        let names: Vec<&str> = query.tables.iter().map(|t| t.reference_name()).collect();
        assert_eq!(names, vec!["R", "X", "T", "U"]);

        let conjuncts = query.selection.unwrap().into_conjuncts();
        assert_eq!(
            conjuncts,
            vec![Expr::columns_eq("X.C", "T.C"), Expr::columns_eq("R.B", "X.B")]
        );
    }

    #[test]
    fn test_nested_or() {
        let query = parse_query("SELECT * FROM R WHERE (R.A < 3 OR R.A >= 7) AND R.B = 1").unwrap();
        let conjuncts = query.selection.unwrap().into_conjuncts();
        assert_eq!(conjuncts.len(), 2);
        assert!(matches!(conjuncts[0], Expr::Or(_, _)));
    }

    #[test]
    fn test_aggregate_forms() {
        let query = parse_query("SELECT R.A, SUM(R.B * R.C) FROM R GROUP BY R.A").unwrap();
        assert_eq!(query.group_by, vec![ColumnRef::qualified("R", "A")]);
        assert_eq!(
            query.sum_expr(),
            Some(&SumExpr::Product(vec![
                SumTerm::Column("R.B".into()),
                SumTerm::Column("R.C".into()),
            ]))
        );

        let query = parse_query("SELECT SUM(1) FROM R").unwrap();
        assert_eq!(query.sum_expr(), Some(&SumExpr::Literal(1)));

        let query = parse_query("SELECT sum(B) FROM R").unwrap();
        assert_eq!(query.sum_expr(), Some(&SumExpr::Column("B".into())));
    }

    #[test]
    fn test_distinct_and_order_by() {
        let query = parse_query("SELECT DISTINCT R.A FROM R ORDER BY R.A DESC, R.B").unwrap();
        assert!(query.distinct);
        assert_eq!(
            query.order_by,
            vec![OrderByItem::desc("R.A"), OrderByItem::asc("R.B")]
        );
    }

    #[test]
    fn test_rejections() {
        let unsupported = [
            "SELECT * FROM R LIMIT 3",
            "SELECT * FROM R LEFT JOIN S ON R.A = S.A",
            "SELECT MAX(A) FROM R",
            "SELECT A AS X FROM R",
            "SELECT * FROM R WHERE R.A + 1 = 2",
            "SELECT A FROM R GROUP BY A HAVING SUM(B) > 1",
            "DELETE FROM R",
        ];
        for sql in unsupported {
            let err = parse_query(sql).unwrap_err();
            assert_eq!(err.code(), PlannerErrorCode::AeroQueryUnsupported, "{}", sql);
        }

        let err = parse_query("SELEC * FROM R").unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::AeroQueryInvalid);
        let err = parse_query("SELECT * FROM R; SELECT * FROM S").unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::AeroQueryInvalid);
    }
}
