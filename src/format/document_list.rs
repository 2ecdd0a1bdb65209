//! YAML document-list reader: a whole-file decode into a sequence of objects.

use std::io::Read;

use serde_yaml_ng::Value as YamlValue;

use crate::config::TableConfig;
use crate::error::EngineError;
use crate::row::Row;
use crate::value::Value;

/// Reads a YAML sequence of mappings into rows.
///
/// # Errors
///
/// Returns [`EngineError::Type`] when the document's top level is not a sequence.
pub fn read_rows(mut reader: impl Read, _config: &TableConfig) -> Result<Vec<Row>, EngineError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    let parsed: YamlValue = serde_yaml_ng::from_str(&buf)?;
    let YamlValue::Sequence(items) = parsed else {
        return Err(EngineError::Type(
            "document-list source did not decode to a YAML sequence".to_string(),
        ));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            YamlValue::Mapping(mapping) => Some(mapping_to_row(&mapping)),
            _ => None,
        })
        .collect())
}

fn mapping_to_row(mapping: &serde_yaml_ng::Mapping) -> Row {
    mapping
        .iter()
        .filter_map(|(key, value)| {
            key.as_str()
                .map(|key| (key.to_string(), yaml_to_value(value)))
        })
        .collect()
}

fn yaml_to_value(value: &YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Boolean(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        YamlValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(
            serde_yaml_ng::to_string(other)
                .unwrap_or_default()
                .trim()
                .to_string(),
        ),
    }
}
