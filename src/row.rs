//! The row type shared by readers, the evaluator, and the executors.

use indexmap::IndexMap;

use crate::value::Value;

/// A single record: an insertion-ordered mapping from column name to value.
///
/// Insertion order is preserved (rather than using a plain hash map) so that `SELECT *`
/// and exported column order match the source header/schema order deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(IndexMap<String, Value>);

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Inserts or overwrites a column value, returning the row for chained construction.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Inserts or overwrites a column value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Looks up a column by its exact key (bare name or `alias.column`).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterates over `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Column names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Resolves a (possibly qualified) column reference against this row, implementing the
    /// three-step lookup from §4.2: qualified lookup, then bare lookup, then a suffix scan
    /// that requires an unambiguous match.
    ///
    /// # Errors
    ///
    /// Returns an error describing an ambiguous or missing column.
    pub fn resolve(&self, table: Option<&str>, name: &str) -> Result<&Value, String> {
        if let Some(table) = table {
            let qualified = format!("{table}.{name}");
            if let Some(v) = self.0.get(&qualified) {
                return Ok(v);
            }
        }
        if let Some(v) = self.0.get(name) {
            return Ok(v);
        }
        let suffix = format!(".{name}");
        let mut matches = self.0.iter().filter(|(k, _)| k.ends_with(&suffix));
        match (matches.next(), matches.next()) {
            (Some((_, v)), None) => Ok(v),
            (Some(_), Some(_)) => Err(format!("ambiguous column reference: {name}")),
            (None, _) => Err(format!("column not found: {name}")),
        }
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
