//! Catalog error types
//!
//! Error codes:
//! - AERO_CATALOG_SCHEMA_MISSING (FATAL)
//! - AERO_CATALOG_IO (FATAL)
//! - AERO_CATALOG_DUPLICATE_TABLE (REJECT)
//! - AERO_CATALOG_NO_COLUMNS (REJECT)
//! - AERO_CATALOG_DUPLICATE_COLUMN (REJECT)

use std::io;

use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Schema file not found: {0}")]
    MissingSchemaFile(String),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Table '{0}' is already registered")]
    DuplicateTable(String),

    #[error("Table '{0}' must have at least one column")]
    NoColumns(String),

    #[error("Table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },
}

impl CatalogError {
    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::MissingSchemaFile(_) => "AERO_CATALOG_SCHEMA_MISSING",
            CatalogError::Io { .. } => "AERO_CATALOG_IO",
            CatalogError::DuplicateTable(_) => "AERO_CATALOG_DUPLICATE_TABLE",
            CatalogError::NoColumns(_) => "AERO_CATALOG_NO_COLUMNS",
            CatalogError::DuplicateColumn { .. } => "AERO_CATALOG_DUPLICATE_COLUMN",
        }
    }
}
