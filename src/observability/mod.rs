//! Observability subsystem for aeroql
//!
//! Structured JSON logging and lifecycle events. Observability is read-only:
//! nothing logged here changes query results, and a failed log write never
//! fails a query.
//!
//! # Usage
//!
//! ```ignore
//! use aeroql::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::CatalogLoaded, &[("tables", "3")]);
//!
//! let scope = ObservationScope::with_fields("QUERY", &[("query_id", &id)]);
//! // ... plan and execute ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
