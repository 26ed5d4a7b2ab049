//! Executor error types
//!
//! Error codes:
//! - AERO_COLUMN_NOT_FOUND (FATAL)
//! - AERO_MALFORMED_ROW (FATAL)
//! - AERO_SOURCE_UNAVAILABLE (FATAL)
//! - AERO_INVALID_ARGUMENT (FATAL)
//! - AERO_INDEX_OUT_OF_RANGE (FATAL)
//! - AERO_VALUE_OVERFLOW (FATAL)
//!
//! Every executor error aborts the running query. Nothing is retried and no
//! failed lookup is ever replaced by a default value.

use std::fmt;
use std::io;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Data problem: the query cannot produce a result from this input
    Data,
    /// Assembly bug: an operator was wired with impossible arguments
    Assembly,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Data => write!(f, "DATA"),
            Severity::Assembly => write!(f, "ASSEMBLY"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    /// Expression references a column absent from the active schema
    AeroColumnNotFound,
    /// A data row holds a non-integer field
    AeroMalformedRow,
    /// A table's row source cannot be opened or read
    AeroSourceUnavailable,
    /// Operator or evaluator received arguments it cannot work with
    AeroInvalidArgument,
    /// Tuple position past the tuple's arity
    AeroIndexOutOfRange,
    /// Aggregated value does not fit a tuple field
    AeroValueOverflow,
}

impl ExecutorErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::AeroColumnNotFound => "AERO_COLUMN_NOT_FOUND",
            ExecutorErrorCode::AeroMalformedRow => "AERO_MALFORMED_ROW",
            ExecutorErrorCode::AeroSourceUnavailable => "AERO_SOURCE_UNAVAILABLE",
            ExecutorErrorCode::AeroInvalidArgument => "AERO_INVALID_ARGUMENT",
            ExecutorErrorCode::AeroIndexOutOfRange => "AERO_INDEX_OUT_OF_RANGE",
            ExecutorErrorCode::AeroValueOverflow => "AERO_VALUE_OVERFLOW",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            ExecutorErrorCode::AeroInvalidArgument | ExecutorErrorCode::AeroIndexOutOfRange => {
                Severity::Assembly
            }
            _ => Severity::Data,
        }
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    /// Error code
    code: ExecutorErrorCode,
    /// Human-readable message
    message: String,
    /// Column name if applicable
    column: Option<String>,
    /// Underlying I/O failure, if any
    source: Option<io::Error>,
}

impl ExecutorError {
    fn new(code: ExecutorErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            column: None,
            source: None,
        }
    }

    /// Create a column not found error
    pub fn column_not_found(column: impl Into<String>) -> Self {
        let c = column.into();
        Self {
            code: ExecutorErrorCode::AeroColumnNotFound,
            message: format!("Column '{}' not found in schema", c),
            column: Some(c),
            source: None,
        }
    }

    /// Create a malformed row error.
    ///
    /// `line` is 1-based.
    pub fn malformed_row(table: &str, line: usize, reason: impl Into<String>) -> Self {
        Self::new(
            ExecutorErrorCode::AeroMalformedRow,
            format!("Table '{}' line {}: {}", table, line, reason.into()),
        )
    }

    /// Create a source unavailable error wrapping the I/O failure
    pub fn source_unavailable(table: &str, source: io::Error) -> Self {
        Self {
            code: ExecutorErrorCode::AeroSourceUnavailable,
            message: format!("Cannot read rows of table '{}'", table),
            column: None,
            source: Some(source),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::new(ExecutorErrorCode::AeroInvalidArgument, reason.into())
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, arity: usize) -> Self {
        Self::new(
            ExecutorErrorCode::AeroIndexOutOfRange,
            format!("Index {} out of range for tuple of arity {}", index, arity),
        )
    }

    /// Create a value overflow error
    pub fn value_overflow(value: i64) -> Self {
        Self::new(
            ExecutorErrorCode::AeroValueOverflow,
            format!("Value {} does not fit a 32-bit tuple field", value),
        )
    }

    /// Create an overflow error for the 64-bit SUM accumulator
    pub fn accumulator_overflow(op: &str, left: i64, right: i64) -> Self {
        Self::new(
            ExecutorErrorCode::AeroValueOverflow,
            format!(
                "i64 accumulator overflowed computing {} {} {}",
                left, op, right
            ),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
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

    /// Returns the offending column, if any
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns whether this error indicates an assembly bug
    pub fn is_assembly_bug(&self) -> bool {
        self.severity() == Severity::Assembly
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;
