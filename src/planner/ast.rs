//! Query AST structures
//!
//! Defines the parsed query representation consumed by the planner. The SQL
//! frontend produces it; tests and embedders may build it directly.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Reference to a column, qualified (`S.A`) or bare (`A`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct ColumnRef {
    /// Table name or alias, if written
    pub qualifier: Option<String>,
    /// Column name
    pub column: String,
}

impl ColumnRef {
    /// Parses `"S.A"` or `"A"`
    pub fn parse(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((qualifier, column)) => Self::qualified(qualifier, column),
            None => Self::bare(name),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            column: column.into(),
        }
    }

    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            column: column.into(),
        }
    }

    /// Returns the lookup name (`"S.A"` or `"A"`)
    pub fn name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.{}", q, self.column),
            None => self.column.clone(),
        }
    }
}

impl From<ColumnRef> for String {
    fn from(c: ColumnRef) -> Self {
        c.name()
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    /// Applies the operator to two integers
    pub fn apply(&self, left: i64, right: i64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::NotEq => left != right,
            CompareOp::Lt => left < right,
            CompareOp::LtEq => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::GtEq => left >= right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }
}

/// Predicate expression tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expr {
    Literal(i64),
    Column(ColumnRef),
    Comparison {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn column(name: &str) -> Self {
        Expr::Column(ColumnRef::parse(name))
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `column = literal` shorthand
    pub fn column_eq(name: &str, value: i64) -> Self {
        Self::compare(CompareOp::Eq, Self::column(name), Expr::Literal(value))
    }

    /// `left = right` over two columns
    pub fn columns_eq(left: &str, right: &str) -> Self {
        Self::compare(CompareOp::Eq, Self::column(left), Self::column(right))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    /// Splits a tree of top-level ANDs into its conjuncts, left to right
    pub fn into_conjuncts(self) -> Vec<Expr> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::And(left, right) => {
                    stack.push(*right);
                    stack.push(*left);
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Visits every column reference in the subtree
    pub fn for_each_column<'a>(&'a self, f: &mut impl FnMut(&'a ColumnRef)) {
        match self {
            Expr::Literal(_) => {}
            Expr::Column(c) => f(c),
            Expr::Comparison { left, right, .. } => {
                left.for_each_column(f);
                right.for_each_column(f);
            }
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.for_each_column(f);
                right.for_each_column(f);
            }
        }
    }

    /// Rewrites every column reference in place
    pub fn map_columns(&mut self, f: &mut impl FnMut(&mut ColumnRef)) {
        match self {
            Expr::Literal(_) => {}
            Expr::Column(c) => f(c),
            Expr::Comparison { left, right, .. } => {
                left.map_columns(f);
                right.map_columns(f);
            }
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.map_columns(f);
                right.map_columns(f);
            }
        }
    }

    /// Lookup names of every referenced column, sorted and deduplicated
    pub fn column_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.for_each_column(&mut |c| {
            names.insert(c.name());
        });
        names
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Column(c) => write!(f, "{}", c),
            Expr::Comparison { op, left, right } => {
                write!(f, "{} {} {}", left, op.as_str(), right)
            }
            Expr::And(left, right) => write!(f, "({} AND {})", left, right),
            Expr::Or(left, right) => write!(f, "({} OR {})", left, right),
        }
    }
}

/// One factor of a SUM product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SumTerm {
    Literal(i64),
    Column(String),
}

impl SumTerm {
    fn parse(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(v) => SumTerm::Literal(v),
            Err(_) => SumTerm::Column(text.to_string()),
        }
    }
}

impl fmt::Display for SumTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SumTerm::Literal(v) => write!(f, "{}", v),
            SumTerm::Column(c) => f.write_str(c),
        }
    }
}

/// Value expression summed by the aggregate operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SumExpr {
    /// `SUM(1)`
    Literal(i64),
    /// `SUM(R.A)`
    Column(String),
    /// `SUM(R.A * R.B)`
    Product(Vec<SumTerm>),
}

impl SumExpr {
    /// Parses the textual forms `"7"`, `"R.A"` and `"R.A * R.B"`.
    ///
    /// Returns `None` for empty input or an empty product factor.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text.contains('*') {
            let mut terms = Vec::new();
            for part in text.split('*') {
                let part = part.trim();
                if part.is_empty() {
                    return None;
                }
                terms.push(SumTerm::parse(part));
            }
            return Some(SumExpr::Product(terms));
        }
        Some(match SumTerm::parse(text) {
            SumTerm::Literal(v) => SumExpr::Literal(v),
            SumTerm::Column(c) => SumExpr::Column(c),
        })
    }

    /// Column names read by this expression
    pub fn columns(&self) -> Vec<&str> {
        match self {
            SumExpr::Literal(_) => Vec::new(),
            SumExpr::Column(c) => vec![c.as_str()],
            SumExpr::Product(terms) => terms
                .iter()
                .filter_map(|t| match t {
                    SumTerm::Column(c) => Some(c.as_str()),
                    SumTerm::Literal(_) => None,
                })
                .collect(),
        }
    }
}

impl fmt::Display for SumExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SumExpr::Literal(v) => write!(f, "{}", v),
            SumExpr::Column(c) => f.write_str(c),
            SumExpr::Product(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" * ")?;
                    }
                    write!(f, "{}", term)?;
                }
                Ok(())
            }
        }
    }
}

/// One SELECT list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectTarget {
    Column(ColumnRef),
    /// `SUM(...)`; the value comes from the aggregate's last column
    Sum(SumExpr),
}

impl fmt::Display for SelectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectTarget::Column(c) => write!(f, "{}", c),
            SelectTarget::Sum(e) => write!(f, "SUM({})", e),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// ORDER BY entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderByItem {
    pub column: ColumnRef,
    pub direction: SortDirection,
}

impl OrderByItem {
    pub fn asc(column: &str) -> Self {
        Self {
            column: ColumnRef::parse(column),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: ColumnRef::parse(column),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for OrderByItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction.as_str())
    }
}

/// Base table with an optional alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
        }
    }

    pub fn aliased(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: Some(alias.into()),
        }
    }

    /// Name that qualifies this table's columns: the alias if present
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }
}

/// Parsed SELECT statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Tables in FROM-then-JOIN order
    pub tables: Vec<TableRef>,
    /// WHERE predicate (JOIN ... ON conditions already conjoined)
    pub selection: Option<Expr>,
    /// SELECT list; `None` means `*`
    pub projection: Option<Vec<SelectTarget>>,
    pub distinct: bool,
    pub group_by: Vec<ColumnRef>,
    pub order_by: Vec<OrderByItem>,
}

impl Query {
    /// Creates a `SELECT * FROM <tables>` query builder
    pub fn new(tables: Vec<TableRef>) -> Self {
        Self {
            tables,
            selection: None,
            projection: None,
            distinct: false,
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Adds a predicate, conjoined with any existing one
    pub fn with_predicate(mut self, predicate: Expr) -> Self {
        self.selection = Some(match self.selection.take() {
            Some(existing) => Expr::and(existing, predicate),
            None => predicate,
        });
        self
    }

    pub fn with_projection(mut self, targets: Vec<SelectTarget>) -> Self {
        self.projection = Some(targets);
        self
    }

    /// Projects the given column names
    pub fn select_columns(self, columns: &[&str]) -> Self {
        let targets = columns
            .iter()
            .map(|c| SelectTarget::Column(ColumnRef::parse(c)))
            .collect();
        self.with_projection(targets)
    }

    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn with_group_by(mut self, columns: &[&str]) -> Self {
        self.group_by = columns.iter().map(|c| ColumnRef::parse(c)).collect();
        self
    }

    pub fn with_order_by(mut self, item: OrderByItem) -> Self {
        self.order_by.push(item);
        self
    }

    /// Returns the SUM expression of the SELECT list, if any
    pub fn sum_expr(&self) -> Option<&SumExpr> {
        self.projection.iter().flatten().find_map(|t| match t {
            SelectTarget::Sum(e) => Some(e),
            SelectTarget::Column(_) => None,
        })
    }

    /// Returns true if the query needs an aggregate stage
    pub fn is_aggregate(&self) -> bool {
        self.sum_expr().is_some() || !self.group_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = Query::new(vec![TableRef::new("R")])
            .with_predicate(Expr::column_eq("R.A", 1))
            .select_columns(&["R.A"])
            .with_order_by(OrderByItem::asc("R.B"));

        assert_eq!(query.tables[0].reference_name(), "R");
        assert!(query.selection.is_some());
        assert!(!query.is_aggregate());
        assert_eq!(query.order_by.len(), 1);
    }

    #[test]
    fn test_with_predicate_conjoins() {
        let query = Query::new(vec![TableRef::new("R")])
            .with_predicate(Expr::column_eq("R.A", 1))
            .with_predicate(Expr::column_eq("R.B", 2));

        let conjuncts = query.selection.unwrap().into_conjuncts();
        assert_eq!(conjuncts.len(), 2);
        assert_eq!(conjuncts[0], Expr::column_eq("R.A", 1));
        assert_eq!(conjuncts[1], Expr::column_eq("R.B", 2));
    }

    #[test]
    fn test_conjuncts_keep_or_intact() {
        let expr = Expr::and(
            Expr::or(Expr::column_eq("R.A", 1), Expr::column_eq("S.B", 2)),
            Expr::column_eq("R.A", 3),
        );
        let conjuncts = expr.into_conjuncts();
        assert_eq!(conjuncts.len(), 2);
        assert!(matches!(conjuncts[0], Expr::Or(_, _)));
    }

    #[test]
    fn test_column_ref_parse() {
        assert_eq!(ColumnRef::parse("S.A"), ColumnRef::qualified("S", "A"));
        assert_eq!(ColumnRef::parse("A"), ColumnRef::bare("A"));
        assert_eq!(ColumnRef::parse("S.A").name(), "S.A");
    }

    #[test]
    fn test_table_ref_alias() {
        assert_eq!(TableRef::aliased("Sailors", "S").reference_name(), "S");
        assert_eq!(TableRef::new("Sailors").reference_name(), "Sailors");
    }

    #[test]
    fn test_sum_expr_parse() {
        assert_eq!(SumExpr::parse("1"), Some(SumExpr::Literal(1)));
        assert_eq!(SumExpr::parse("R.A"), Some(SumExpr::Column("R.A".into())));
        assert_eq!(
            SumExpr::parse("R.A * R.B"),
            Some(SumExpr::Product(vec![
                SumTerm::Column("R.A".into()),
                SumTerm::Column("R.B".into())
            ]))
        );
        assert_eq!(SumExpr::parse(""), None);
        assert_eq!(SumExpr::parse("R.A * "), None);
    }

    #[test]
    fn test_expr_display() {
        let expr = Expr::and(Expr::columns_eq("R.B", "S.B"), Expr::column_eq("R.A", 1));
        assert_eq!(expr.to_string(), "(R.B = S.B AND R.A = 1)");
    }
}
