//! Catalog subsystem for aeroql
//!
//! Maps table names to their column lists and CSV files. The catalog is
//! loaded once from the database directory and read-only afterwards.

mod errors;
mod loader;

pub use errors::{CatalogError, CatalogResult};
pub use loader::{Catalog, SkippedLine, TableDef, DEFAULT_DATA_SUBDIR, DEFAULT_SCHEMA_FILE};
