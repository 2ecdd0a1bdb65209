//! JSON Lines (`.jsonl`/`.ndjson`) reader: one JSON object per line.

use std::io::BufRead;

use serde_json::Value as JsonValue;

use crate::config::TableConfig;
use crate::error::EngineError;
use crate::row::Row;
use crate::value::Value;

/// Reads a line-delimited JSON object stream into rows.
///
/// Blank lines and lines that fail to parse as a JSON object are skipped, matching the
/// format reader contract in §4.4 (a malformed record does not abort the whole table).
///
/// # Errors
///
/// Returns [`EngineError::Io`] on a read failure.
pub fn read_rows(reader: impl BufRead, _config: &TableConfig) -> Result<Vec<Row>, EngineError> {
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Ok(JsonValue::Object(map)) = serde_json::from_str::<JsonValue>(&line) else {
            continue;
        };
        rows.push(
            map.into_iter()
                .map(|(key, value)| (key, json_to_value(&value)))
                .collect(),
        );
    }
    Ok(rows)
}

fn json_to_value(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Serializes one output row as a single JSON object line, for the write executor's
/// INSERT-into-object-stream path (§4.9).
#[must_use]
pub fn row_to_line(row: &Row) -> String {
    let map: serde_json::Map<String, JsonValue> = row
        .iter()
        .map(|(key, value)| (key.to_string(), value_to_json(value)))
        .collect();
    JsonValue::Object(map).to_string()
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Integer(n) => JsonValue::Number((*n).into()),
        Value::Float(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) | Value::Temporal(s) => JsonValue::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;
    use std::io::Cursor;

    fn config() -> TableConfig {
        TableConfig {
            name: "t".to_string(),
            file_path: "t.jsonl".to_string(),
            format: Format::ObjectStream,
            delimiter: ",".to_string(),
            has_header: true,
            columns: Vec::new(),
            quote: "\"".to_string(),
            escape: "\\".to_string(),
            max_columns: 0,
            trim_spaces: true,
            allow_quoted: true,
            strict_quotes: false,
            skip_empty_lines: true,
            parallel_reading: false,
            worker_threads: 0,
            chunk_size: 0,
            buffer_size: 0,
        }
    }

    #[test]
    fn test_reads_one_object_per_line() {
        let data = "{\"id\":1}\n{\"id\":2}\n";
        let rows = read_rows(Cursor::new(data), &config()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_blank_and_malformed_lines_are_skipped() {
        let data = "{\"id\":1}\n\nnot json\n{\"id\":2}\n";
        let rows = read_rows(Cursor::new(data), &config()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_row_to_line_round_trips() {
        let row = Row::new()
            .with("id", Value::Integer(1))
            .with("name", Value::Text("Ada".to_string()));
        let line = row_to_line(&row);
        let rows = read_rows(Cursor::new(line), &config()).unwrap();
        assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
    }
}
