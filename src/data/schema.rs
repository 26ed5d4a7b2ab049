//! Schema: ordered mapping from qualified column name to tuple position

use serde::Serialize;

/// Ordered list of qualified column names (`"<table-or-alias>.<column>"`).
///
/// A column's position in the list is its position in the tuple. Lookups
/// accept either the qualified name or a suffix of it; when several entries
/// share the suffix, the leftmost one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// Builds the schema of one table under `table_or_alias`
    pub fn new<S: AsRef<str>>(table_or_alias: &str, columns: &[S]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| format!("{}.{}", table_or_alias, c.as_ref()))
                .collect(),
        }
    }

    /// Builds a schema from already-qualified names
    pub fn from_qualified(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Concatenates two schemas; `right`'s positions shift by `left.len()`
    pub fn combine(left: &Schema, right: &Schema) -> Schema {
        let mut columns = Vec::with_capacity(left.len() + right.len());
        columns.extend(left.columns.iter().cloned());
        columns.extend(right.columns.iter().cloned());
        Schema { columns }
    }

    /// Resolves a column name to its position.
    ///
    /// Exact match first, then the leftmost entry ending in `"." + name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        if let Some(pos) = self.columns.iter().position(|c| c == name) {
            return Some(pos);
        }
        self.columns.iter().position(|c| {
            c.len() > name.len()
                && c.ends_with(name)
                && c.as_bytes()[c.len() - name.len() - 1] == b'.'
        })
    }

    /// Returns true if `name` resolves in this schema
    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Returns the qualified name at `index`
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Returns all qualified names in position order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_qualifies_columns_in_order() {
        let schema = Schema::new("R", &["A", "B"]);
        assert_eq!(schema.columns(), &["R.A".to_string(), "R.B".to_string()]);
        assert_eq!(schema.index_of("R.B"), Some(1));
    }

    #[test]
    fn test_unqualified_lookup() {
        let schema = Schema::new("Sailors", &["A", "B", "C"]);
        assert_eq!(schema.index_of("C"), Some(2));
        assert!(schema.has_column("A"));
        assert!(!schema.has_column("D"));
        assert!(!schema.has_column("S.A"));
    }

    #[test]
    fn test_suffix_must_follow_separator() {
        let schema = Schema::new("R", &["AB"]);
        assert_eq!(schema.index_of("B"), None);
        assert_eq!(schema.index_of("AB"), Some(0));
    }

    #[test]
    fn test_combine_offsets_right() {
        let combined = Schema::combine(&Schema::new("R", &["A", "B"]), &Schema::new("S", &["B", "C"]));
        assert_eq!(combined.len(), 4);
        assert_eq!(combined.index_of("S.B"), Some(2));
        assert_eq!(combined.index_of("S.C"), Some(3));
        assert_eq!(combined.index_of("R.B"), Some(1));
    }

    #[test]
    fn test_ambiguous_bare_name_resolves_leftmost() {
        let combined = Schema::combine(&Schema::new("R", &["A", "B"]), &Schema::new("S", &["B", "C"]));
        assert_eq!(combined.index_of("B"), Some(1));

        let flipped = Schema::combine(&Schema::new("S", &["B", "C"]), &Schema::new("R", &["A", "B"]));
        assert_eq!(flipped.index_of("B"), Some(0));
    }

    #[test]
    fn test_qualified_name_under_synthetic_table() {
        let schema = Schema::from_qualified(vec!["Aggregated.R.A".into(), "Aggregated.Sum".into()]);
        assert_eq!(schema.index_of("R.A"), Some(0));
        assert_eq!(schema.index_of("A"), Some(0));
        assert_eq!(schema.index_of("Sum"), Some(1));
    }
}
