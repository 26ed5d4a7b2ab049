//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Catalog
    /// Catalog file read, tables registered
    CatalogLoaded,
    /// Malformed or duplicate catalog line ignored
    CatalogLineSkipped,

    // Planning
    /// Operator tree assembled
    PlanBuilt,
    /// WHERE conjunct never attached to any operator
    PredicateDropped,

    // Execution
    /// Operator tree instantiated over the table files
    PipelineOpened,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::CatalogLineSkipped => "CATALOG_LINE_SKIPPED",
            Event::PlanBuilt => "PLAN_BUILT",
            Event::PredicateDropped => "PREDICATE_DROPPED",
            Event::PipelineOpened => "PIPELINE_OPENED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::CatalogLineSkipped | Event::PredicateDropped => Severity::Warn,
            Event::PipelineOpened => Severity::Trace,
            Event::CatalogLoaded | Event::PlanBuilt => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
