//! `TableConfig`: the immutable, per-query, per-table configuration contract.
//!
//! These types are deserialized by an external loader (out of scope for this crate, §1)
//! from either YAML or JSON; `serde` derives keep that a zero-effort round trip.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The declared type of a column, used to coerce delimited/columnar values on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Int,
    Float,
    Decimal,
    Bool,
}

/// One column of a table's optional schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub required: bool,
}

/// The on-disk file encoding a table is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Delimited,
    ObjectArray,
    ObjectStream,
    DocumentList,
    Columnar,
}

impl Format {
    /// Detects a format from a file path's suffix, stripping a trailing `.gz` first.
    ///
    /// Returns `None` when the suffix isn't recognized; callers fall back to requiring an
    /// explicit `format` in the table configuration.
    #[must_use]
    pub fn detect(path: &str) -> Option<Self> {
        let stripped = path.strip_suffix(".gz").unwrap_or(path);
        let ext = stripped.rsplit('.').next()?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" => Some(Self::Delimited),
            "json" => Some(Self::ObjectArray),
            "jsonl" | "ndjson" => Some(Self::ObjectStream),
            "yaml" | "yml" => Some(Self::DocumentList),
            "parquet" => Some(Self::Columnar),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_quote() -> String {
    "\"".to_string()
}

fn default_escape() -> String {
    "\\".to_string()
}

/// Per-table configuration, immutable for the duration of one `Execute` call.
///
/// Boolean delimited-parsing fields default to the documented defaults
/// (`trim_spaces`/`allow_quoted`/`skip_empty_lines` = true, `strict_quotes` = false) when
/// absent from the deserialized document, rather than silently defaulting to `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub file_path: String,
    pub format: Format,

    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_true")]
    pub has_header: bool,
    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default = "default_quote")]
    pub quote: String,
    #[serde(default = "default_escape")]
    pub escape: String,
    #[serde(default)]
    pub max_columns: usize,
    #[serde(default = "default_true")]
    pub trim_spaces: bool,
    #[serde(default = "default_true")]
    pub allow_quoted: bool,
    #[serde(default)]
    pub strict_quotes: bool,
    #[serde(default = "default_true")]
    pub skip_empty_lines: bool,

    #[serde(default)]
    pub parallel_reading: bool,
    #[serde(default)]
    pub worker_threads: usize,
    #[serde(default)]
    pub chunk_size: usize,
    #[serde(default)]
    pub buffer_size: usize,
}

impl TableConfig {
    /// Worker count with the "0 = host CPU count" rule applied.
    #[must_use]
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }

    /// Chunk size with the documented default of 1000 rows.
    #[must_use]
    pub fn resolved_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            1000
        } else {
            self.chunk_size
        }
    }

    /// Chunk buffer depth with a documented default of 100 in-flight chunks.
    #[must_use]
    pub fn resolved_buffer_size(&self) -> usize {
        if self.buffer_size == 0 {
            100
        } else {
            self.buffer_size
        }
    }

    /// Whether the path names a gzip-compressed file (transparent for every format but
    /// columnar, which manages its own compression).
    #[must_use]
    pub fn is_gzipped(&self) -> bool {
        self.format != Format::Columnar && self.file_path.ends_with(".gz")
    }
}

/// A map of table name to configuration, as supplied to [`crate::Execute`].
pub type TableConfigMap = HashMap<String, TableConfig>;
