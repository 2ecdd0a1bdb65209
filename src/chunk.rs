//! Chunks: bounded, content-fingerprinted batches of rows moving through the read pipeline.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::row::Row;

/// An ordered block of rows drawn contiguously from one source.
///
/// `hash` is a content fingerprint computed over a deterministic (sorted-key) projection
/// of every row, so two chunks carrying identical row content always fingerprint the same
/// way regardless of the order columns were inserted into each [`Row`] (§9: the original
/// engine hashed rows in map-iteration order, which is non-deterministic across runs — this
/// is a deliberate fix, not a faithful port).
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: u64,
    pub hash: u64,
    pub rows: Vec<Row>,
    pub start_pos: u64,
    pub end_pos: u64,
}

impl Chunk {
    /// Builds a chunk, computing its content fingerprint from `rows`.
    #[must_use]
    pub fn new(id: u64, rows: Vec<Row>, start_pos: u64, end_pos: u64) -> Self {
        let hash = fingerprint(&rows);
        Self {
            id,
            hash,
            rows,
            start_pos,
            end_pos,
        }
    }
}

/// Computes a deterministic content fingerprint for a batch of rows.
///
/// Each row's columns are sorted by key before hashing, and rows are hashed in sequence
/// order (chunk row order is itself part of the content being fingerprinted).
#[must_use]
pub fn fingerprint(rows: &[Row]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for row in rows {
        let mut entries: Vec<(&str, String)> = row.iter().map(|(k, v)| (k, v.as_text())).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            key.hash(&mut hasher);
            0u8.hash(&mut hasher); // separator, avoids "ab"+"c" colliding with "a"+"bc"
            value.hash(&mut hasher);
            1u8.hash(&mut hasher);
        }
        2u8.hash(&mut hasher); // row separator
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_fingerprint_independent_of_insertion_order() {
        let a = Row::new()
            .with("id", Value::Integer(1))
            .with("name", Value::Text("Ada".to_string()));
        let b = Row::new()
            .with("name", Value::Text("Ada".to_string()))
            .with("id", Value::Integer(1));
        assert_eq!(fingerprint(&[a]), fingerprint(&[b]));
    }

    #[test]
    fn test_fingerprint_differs_on_content_change() {
        let a = Row::new().with("id", Value::Integer(1));
        let b = Row::new().with("id", Value::Integer(2));
        assert_ne!(fingerprint(&[a]), fingerprint(&[b]));
    }

    #[test]
    fn test_fingerprint_is_deterministic_across_calls() {
        let row = Row::new().with("id", Value::Integer(1));
        assert_eq!(fingerprint(&[row.clone()]), fingerprint(&[row]));
    }

    #[test]
    fn test_chunk_new_computes_hash() {
        let rows = vec![Row::new().with("id", Value::Integer(1))];
        let chunk = Chunk::new(0, rows.clone(), 0, 10);
        assert_eq!(chunk.hash, fingerprint(&rows));
        assert_eq!(chunk.start_pos, 0);
        assert_eq!(chunk.end_pos, 10);
    }
}
