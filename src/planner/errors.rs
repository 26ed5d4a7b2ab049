//! Planner error types
//!
//! Error codes:
//! - AERO_QUERY_INVALID (REJECT)
//! - AERO_QUERY_UNSUPPORTED (REJECT)
//! - AERO_UNKNOWN_TABLE (REJECT)
//! - AERO_QUERY_UNKNOWN_COLUMN (REJECT)

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected before execution
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Malformed query text or structure
    AeroQueryInvalid,
    /// Valid SQL outside the supported subset
    AeroQueryUnsupported,
    /// FROM or JOIN names a table missing from the catalog
    AeroUnknownTable,
    /// Column reference resolves against no table in scope
    AeroQueryUnknownColumn,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::AeroQueryInvalid => "AERO_QUERY_INVALID",
            PlannerErrorCode::AeroQueryUnsupported => "AERO_QUERY_UNSUPPORTED",
            PlannerErrorCode::AeroUnknownTable => "AERO_UNKNOWN_TABLE",
            PlannerErrorCode::AeroQueryUnknownColumn => "AERO_QUERY_UNKNOWN_COLUMN",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    /// Table or column name if applicable
    field: Option<String>,
}

impl PlannerError {
    /// Create a query invalid error
    pub fn query_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::AeroQueryInvalid,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an unsupported construct error
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::AeroQueryUnsupported,
            message: format!("Unsupported construct: {}", construct.into()),
            field: None,
        }
    }

    /// Create an unknown table error
    pub fn unknown_table(table: impl Into<String>) -> Self {
        let t = table.into();
        Self {
            code: PlannerErrorCode::AeroUnknownTable,
            message: format!("Table '{}' not found in catalog", t),
            field: Some(t),
        }
    }

    /// Create an unknown column error
    pub fn unknown_column(column: impl Into<String>) -> Self {
        let c = column.into();
        Self {
            code: PlannerErrorCode::AeroQueryUnknownColumn,
            message: format!("Column '{}' does not resolve against any table in scope", c),
            field: Some(c),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table or column name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PlannerErrorCode::AeroQueryInvalid.code(),
            "AERO_QUERY_INVALID"
        );
        assert_eq!(
            PlannerErrorCode::AeroQueryUnsupported.code(),
            "AERO_QUERY_UNSUPPORTED"
        );
        assert_eq!(
            PlannerErrorCode::AeroUnknownTable.code(),
            "AERO_UNKNOWN_TABLE"
        );
        assert_eq!(
            PlannerErrorCode::AeroQueryUnknownColumn.code(),
            "AERO_QUERY_UNKNOWN_COLUMN"
        );
    }

    #[test]
    fn test_error_display() {
        let err = PlannerError::unknown_table("Orders");
        let display = format!("{}", err);
        assert!(display.starts_with("[REJECT] AERO_UNKNOWN_TABLE"));
        assert!(display.contains("Orders"));
        assert_eq!(err.field(), Some("Orders"));
    }
}
