//! Explain output
//!
//! Deterministic JSON description of a plan, or of why planning failed.

use std::fmt;

use serde::Serialize;

use super::errors::PlannerError;
use super::planner::{PlanNode, QueryPlan};

#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// Operator tree, root first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanNode>,
    /// Qualified names of the result columns
    pub output_columns: Vec<String>,
    /// WHERE conjuncts no operator evaluates
    pub dropped_predicates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ExplainPlan {
    pub fn from_plan(plan: &QueryPlan) -> Self {
        Self {
            accepted: true,
            plan: Some(plan.root.clone()),
            output_columns: plan.output_schema().columns().to_vec(),
            dropped_predicates: plan
                .dropped_predicates
                .iter()
                .map(|p| p.to_string())
                .collect(),
            rejection_code: None,
            rejection_reason: None,
        }
    }

    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            plan: None,
            output_columns: Vec::new(),
            dropped_predicates: Vec::new(),
            rejection_code: Some(err.code().code().to_string()),
            rejection_reason: Some(err.message().to_string()),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Indented operator tree, one operator per line
impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.plan {
            Some(root) => write_node(f, root, 0),
            None => writeln!(
                f,
                "REJECTED {}: {}",
                self.rejection_code.as_deref().unwrap_or_default(),
                self.rejection_reason.as_deref().unwrap_or_default()
            ),
        }
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &PlanNode, depth: usize) -> fmt::Result {
    write!(f, "{:indent$}", "", indent = depth * 2)?;
    match node {
        PlanNode::Scan { table, reference, .. } if table != reference => {
            writeln!(f, "Scan {} AS {}", table, reference)?
        }
        PlanNode::Scan { table, .. } => writeln!(f, "Scan {}", table)?,
        PlanNode::Select { predicate, .. } => writeln!(f, "Select [{}]", predicate)?,
        PlanNode::Join { conditions, .. } => {
            let conditions: Vec<String> = conditions.iter().map(|c| c.to_string()).collect();
            writeln!(f, "Join [{}]", conditions.join(" AND "))?
        }
        PlanNode::Aggregate { sum, group_by, .. } => {
            writeln!(f, "Aggregate [SUM({}) BY {}]", sum, group_by.join(", "))?
        }
        PlanNode::Project { schema, .. } => {
            writeln!(f, "Project [{}]", schema.columns().join(", "))?
        }
        PlanNode::Distinct { keys, .. } => writeln!(f, "Distinct [{}]", keys.join(", "))?,
        PlanNode::Sort { keys, .. } => {
            let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
            writeln!(f, "Sort [{}]", keys.join(", "))?
        }
    }
    for child in node.children() {
        write_node(f, child, depth + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::planner::ast::{Expr, OrderByItem, Query, TableRef};
    use crate::planner::planner::QueryPlanner;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new("/db/data");
        catalog.register("R", &["A", "B"]).unwrap();
        catalog.register("S", &["B", "C"]).unwrap();
        catalog
    }

    #[test]
    fn test_explain_accepted_plan_json() {
        let catalog = catalog();
        let query = Query::new(vec![TableRef::new("R"), TableRef::aliased("S", "X")])
            .with_predicate(Expr::columns_eq("R.B", "X.B"))
            .select_columns(&["X.C"])
            .with_order_by(OrderByItem::asc("X.C"));
        let plan = QueryPlanner::new(&catalog).plan(&query).unwrap();

        let explain = ExplainPlan::from_plan(&plan);
        let json: serde_json::Value =
            serde_json::from_str(&explain.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["accepted"], true);
        assert_eq!(json["output_columns"], serde_json::json!(["X.C"]));
        assert_eq!(json["plan"]["operator"], "sort");
        assert_eq!(json["plan"]["keys"], serde_json::json!(["X.C asc"]));
        assert_eq!(json["plan"]["input"]["operator"], "project");
        let join = &json["plan"]["input"]["input"];
        assert_eq!(join["operator"], "join");
        assert_eq!(join["conditions"], serde_json::json!(["R.B = X.B"]));
        assert_eq!(join["right"]["table"], "S");
        assert_eq!(join["right"]["reference"], "X");
        assert!(json.get("rejection_code").is_none());
    }

    #[test]
    fn test_explain_text_tree() {
        let catalog = catalog();
        let query = Query::new(vec![TableRef::new("R")]).with_predicate(Expr::column_eq("A", 1));
        let plan = QueryPlanner::new(&catalog).plan(&query).unwrap();

        let text = ExplainPlan::from_plan(&plan).to_string();
        assert_eq!(text, "Select [R.A = 1]\n  Scan R\n");
    }

    #[test]
    fn test_explain_rejected() {
        let catalog = catalog();
        let err = QueryPlanner::new(&catalog)
            .plan(&Query::new(vec![TableRef::new("Missing")]))
            .unwrap_err();

        let explain = ExplainPlan::from_error(&err);
        assert!(!explain.accepted);
        assert_eq!(explain.rejection_code.as_deref(), Some("AERO_UNKNOWN_TABLE"));
        assert!(explain.to_string().starts_with("REJECTED AERO_UNKNOWN_TABLE"));
    }
}
