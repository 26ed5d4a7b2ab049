//! Catalog loader
//!
//! The schema file lists one table per line, whitespace separated:
//!
//! ```text
//! Sailors A B C
//! Boats D E F
//! ```
//!
//! Table data lives at `<db>/<data_subdir>/<table>.csv`. Lines with fewer
//! than two tokens, repeated table names and repeated column names are
//! skipped and logged; the first definition of a table wins.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::data::Schema;
use crate::observability::{log_event_with_fields, Event};

use super::errors::{CatalogError, CatalogResult};

/// Default schema file name inside the database directory
pub const DEFAULT_SCHEMA_FILE: &str = "schema.txt";

/// Default data directory name inside the database directory
pub const DEFAULT_DATA_SUBDIR: &str = "data";

/// One registered base table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    name: String,
    columns: Vec<String>,
    path: PathBuf,
}

impl TableDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Path of the table's CSV file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema of this table qualified by `reference` (its alias or name)
    pub fn schema(&self, reference: &str) -> Schema {
        Schema::new(reference, &self.columns)
    }
}

/// A schema-file line that was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub reason: String,
}

/// Table registry for one database directory.
///
/// Built once per process and passed by reference to the planner and
/// pipeline builder.
#[derive(Debug, Clone)]
pub struct Catalog {
    data_dir: PathBuf,
    tables: HashMap<String, TableDef>,
    /// Table names in registration order
    order: Vec<String>,
    skipped: Vec<SkippedLine>,
}

impl Catalog {
    /// Creates an empty catalog whose tables live under `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            tables: HashMap::new(),
            order: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Loads `<db_dir>/schema.txt` with data under `<db_dir>/data`
    pub fn load(db_dir: &Path) -> CatalogResult<Self> {
        Self::load_from(db_dir, DEFAULT_SCHEMA_FILE, DEFAULT_DATA_SUBDIR)
    }

    /// Loads a catalog with an explicit schema file and data directory name
    pub fn load_from(db_dir: &Path, schema_file: &str, data_subdir: &str) -> CatalogResult<Self> {
        let schema_path = db_dir.join(schema_file);
        let display = schema_path.display().to_string();

        let content = fs::read_to_string(&schema_path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CatalogError::MissingSchemaFile(display.clone())
            } else {
                CatalogError::Io {
                    path: display.clone(),
                    source: e,
                }
            }
        })?;

        let mut catalog = Self::new(db_dir.join(data_subdir));
        for (index, line) in content.lines().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            let line_no = index + 1;

            let skip_reason = if tokens.len() < 2 {
                Some(format!("table '{}' declares no columns", tokens[0]))
            } else if catalog.contains(tokens[0]) {
                Some(format!("table '{}' is already defined", tokens[0]))
            } else if let Some(column) = repeated_column(&tokens[1..]) {
                Some(format!("table '{}' repeats column '{}'", tokens[0], column))
            } else {
                None
            };

            if let Some(reason) = skip_reason {
                log_event_with_fields(
                    Event::CatalogLineSkipped,
                    &[
                        ("line", &line_no.to_string()),
                        ("reason", &reason),
                        ("schema_file", &display),
                    ],
                );
                catalog.skipped.push(SkippedLine {
                    line: line_no,
                    reason,
                });
                continue;
            }

            catalog.register(tokens[0], &tokens[1..])?;
        }

        log_event_with_fields(
            Event::CatalogLoaded,
            &[
                ("schema_file", &display),
                ("skipped", &catalog.skipped.len().to_string()),
                ("tables", &catalog.len().to_string()),
            ],
        );
        Ok(catalog)
    }

    /// Registers a table whose file is `<data_dir>/<name>.csv`
    pub fn register<S: AsRef<str>>(&mut self, name: &str, columns: &[S]) -> CatalogResult<()> {
        if self.contains(name) {
            return Err(CatalogError::DuplicateTable(name.to_string()));
        }
        if columns.is_empty() {
            return Err(CatalogError::NoColumns(name.to_string()));
        }
        if let Some(column) = repeated_column(columns) {
            return Err(CatalogError::DuplicateColumn {
                table: name.to_string(),
                column: column.to_string(),
            });
        }
        let table = TableDef {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            path: self.data_dir.join(format!("{}.csv", name)),
        };
        self.order.push(name.to_string());
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in registration order
    pub fn table_names(&self) -> &[String] {
        &self.order
    }

    /// Schema-file lines ignored while loading
    pub fn skipped_lines(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// First column name that appears more than once
fn repeated_column<S: AsRef<str>>(columns: &[S]) -> Option<&str> {
    let mut seen = HashSet::new();
    columns
        .iter()
        .map(|c| c.as_ref())
        .find(|c| !seen.insert(*c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_schema(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.txt"), content).unwrap();
        dir
    }

    #[test]
    fn test_load_tables() {
        let dir = write_schema("Sailors A B C\nBoats D E F\n");
        let catalog = Catalog::load(dir.path()).unwrap();

        assert_eq!(catalog.table_names(), &["Sailors", "Boats"]);
        let sailors = catalog.table("Sailors").unwrap();
        assert_eq!(sailors.columns(), &["A", "B", "C"]);
        assert_eq!(sailors.path(), dir.path().join("data").join("Sailors.csv"));
        assert_eq!(sailors.schema("S").columns(), &["S.A", "S.B", "S.C"]);
    }

    #[test]
    fn test_malformed_and_duplicate_lines_skipped() {
        let dir = write_schema("R A B\nLonely\n\n   \nR X Y\nS C\n");
        let catalog = Catalog::load(dir.path()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.table("R").unwrap().columns(), &["A", "B"]);
        let skipped: Vec<usize> = catalog.skipped_lines().iter().map(|s| s.line).collect();
        assert_eq!(skipped, vec![2, 5]);
    }

    #[test]
    fn test_extra_whitespace_tolerated() {
        let dir = write_schema("  R \t A   B  \r\n");
        let catalog = Catalog::load(dir.path()).unwrap();
        assert_eq!(catalog.table("R").unwrap().columns(), &["A", "B"]);
    }

    #[test]
    fn test_missing_schema_file() {
        let dir = TempDir::new().unwrap();
        let err = Catalog::load(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::MissingSchemaFile(_)));
    }

    #[test]
    fn test_custom_layout() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tables.def"), "T X\n").unwrap();
        let catalog = Catalog::load_from(dir.path(), "tables.def", "csv").unwrap();
        assert_eq!(
            catalog.table("T").unwrap().path(),
            dir.path().join("csv").join("T.csv")
        );
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut catalog = Catalog::new("/tmp/db/data");
        catalog.register("R", &["A"]).unwrap();
        let err = catalog.register("R", &["B"]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTable(_)));

        let empty: &[&str] = &[];
        assert!(matches!(
            catalog.register("S", empty).unwrap_err(),
            CatalogError::NoColumns(_)
        ));
    }

    #[test]
    fn test_repeated_column_line_skipped() {
        let dir = write_schema("R A A
S B C
T X Y X
");
        let catalog = Catalog::load(dir.path()).unwrap();

        assert_eq!(catalog.table_names(), &["S"]);
        assert!(!catalog.contains("R"));
        let skipped = catalog.skipped_lines();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].line, 1);
        assert_eq!(skipped[0].reason, "table 'R' repeats column 'A'");
        assert_eq!(skipped[1].line, 3);
        assert!(skipped[1].reason.contains("'X'"));
    }

    #[test]
    fn test_register_rejects_repeated_column() {
        let mut catalog = Catalog::new("/tmp/db/data");
        let err = catalog.register("R", &["A", "B", "A"]).unwrap_err();
        assert_eq!(err.code(), "AERO_CATALOG_DUPLICATE_COLUMN");
        match err {
            CatalogError::DuplicateColumn { table, column } => {
                assert_eq!(table, "R");
                assert_eq!(column, "A");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(catalog.is_empty());
    }
}
