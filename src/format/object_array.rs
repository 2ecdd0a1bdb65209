//! JSON object-array reader: a top-level array of objects, streamed element-by-element.

use std::io::Read;

use serde_json::Value as JsonValue;

use crate::config::TableConfig;
use crate::error::EngineError;
use crate::row::Row;
use crate::value::Value;

/// Reads an entire JSON array of objects into rows.
///
/// Non-object elements (scalars, nested arrays) are skipped rather than erroring, matching
/// the format reader contract in §4.4.
///
/// # Errors
///
/// Returns [`EngineError::Type`] when the document's top level is not a JSON array.
pub fn read_rows(mut reader: impl Read, _config: &TableConfig) -> Result<Vec<Row>, EngineError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    let parsed: JsonValue = serde_json::from_str(&buf)?;
    let JsonValue::Array(elements) = parsed else {
        return Err(EngineError::Type(
            "object-array source did not decode to a JSON array".to_string(),
        ));
    };

    Ok(elements
        .into_iter()
        .filter_map(|element| match element {
            JsonValue::Object(map) => Some(object_to_row(map)),
            _ => None,
        })
        .collect())
}

fn object_to_row(map: serde_json::Map<String, JsonValue>) -> Row {
    map.into_iter()
        .map(|(key, value)| (key, json_to_value(&value)))
        .collect()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;
    use std::io::Cursor;

    fn config() -> TableConfig {
        TableConfig {
            name: "t".to_string(),
            file_path: "t.json".to_string(),
            format: Format::ObjectArray,
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
    fn test_reads_array_of_objects() {
        let data = r#"[{"id":1,"name":"Ada"},{"id":2,"name":"Bob"}]"#;
        let rows = read_rows(Cursor::new(data), &config()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&Value::Text("Ada".to_string())));
        assert_eq!(rows[1].get("id"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_non_object_elements_are_skipped() {
        let data = r#"[{"id":1}, 42, "hello", {"id":2}]"#;
        let rows = read_rows(Cursor::new(data), &config()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_non_array_top_level_errors() {
        let data = r#"{"id":1}"#;
        assert!(read_rows(Cursor::new(data), &config()).is_err());
    }

    #[test]
    fn test_float_and_null_fields() {
        let data = r#"[{"score":1.5,"note":null}]"#;
        let rows = read_rows(Cursor::new(data), &config()).unwrap();
        assert_eq!(rows[0].get("score"), Some(&Value::Float(1.5)));
        assert_eq!(rows[0].get("note"), Some(&Value::Null));
    }
}
