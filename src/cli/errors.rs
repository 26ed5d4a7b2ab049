//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit status. Subsystem
//! errors keep their own `AERO_*` code.

use std::fmt;
use std::io;

use crate::catalog::CatalogError;
use crate::executor::ExecutorError;
use crate::planner::PlannerError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error reading the query or writing the result
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AERO_CLI_CONFIG_ERROR",
            Self::IoError => "AERO_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub enum CliError {
    /// Failure owned by the CLI itself
    Cli { code: CliErrorCode, message: String },
    Catalog(CatalogError),
    Planner(PlannerError),
    Executor(ExecutorError),
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        CliError::Cli {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Cli { code, .. } => code.code(),
            CliError::Catalog(e) => e.code(),
            CliError::Planner(e) => e.code().code(),
            CliError::Executor(e) => e.code().code(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Cli { code, message } => write!(f, "{}: {}", code.code(), message),
            CliError::Catalog(e) => write!(f, "{}: {}", e.code(), e),
            CliError::Planner(e) => write!(f, "{}", e),
            CliError::Executor(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Cli { .. } => None,
            CliError::Catalog(e) => Some(e),
            CliError::Planner(e) => Some(e),
            CliError::Executor(e) => Some(e),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<PlannerError> for CliError {
    fn from(e: PlannerError) -> Self {
        CliError::Planner(e)
    }
}

impl From<ExecutorError> for CliError {
    fn from(e: ExecutorError) -> Self {
        CliError::Executor(e)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
