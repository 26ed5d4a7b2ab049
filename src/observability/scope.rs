//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` or `{name}_ERROR` when closed
//! - Logs `{name}_INCOMPLETE` if dropped without being closed

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the lifecycle of one unit of work.
///
/// Fields given at creation are repeated on every line the scope emits, so
/// all lines of one query share its `query_id`.
///
/// ```ignore
/// let scope = ObservationScope::with_fields("QUERY", &[("query_id", &id)]);
/// // ... do work ...
/// scope.complete_with_fields(&[("rows", "3")]);
/// ```
pub struct ObservationScope<'a> {
    name: &'a str,
    closed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    timer: Timer,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            closed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        }
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Logs `{name}_COMPLETE` with elapsed time and `extra_fields`
    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.closed.set(true);
        let elapsed = self.timer.elapsed_ms();
        let mut fields = self.field_refs();
        fields.extend(extra_fields.iter().copied());
        fields.push(("elapsed_ms", elapsed.as_str()));
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Logs `{name}_ERROR` at ERROR level
    pub fn fail(self, code: &str, reason: &str) {
        self.closed.set(true);
        let mut fields = self.field_refs();
        fields.push(("code", code));
        fields.push(("reason", reason));
        Logger::error(&format!("{}_ERROR", self.name), &fields);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.closed.get() {
            let mut fields = self.field_refs();
            fields.push(("reason", "scope dropped without completion"));
            Logger::warn(&format!("{}_INCOMPLETE", self.name), &fields);
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
