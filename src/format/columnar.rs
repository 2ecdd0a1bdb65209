//! Columnar (Parquet) reader.
//!
//! Parquet's row-group layout requires random access, so unlike the other format readers
//! this one takes a file path rather than a generic [`std::io::Read`]; a non-seekable
//! source is the caller's responsibility to materialize to a temp file first (§4.4).

use std::fs::File;
use std::path::Path;

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;

use crate::config::TableConfig;
use crate::error::EngineError;
use crate::row::Row;
use crate::value::Value;

/// Reads every row group of a Parquet file into rows, column-major within each group.
///
/// # Errors
///
/// Returns [`EngineError::Io`] when the file cannot be opened and [`EngineError::Type`]
/// when the Parquet footer or a row group cannot be decoded.
pub fn read_rows(path: &Path, _config: &TableConfig) -> Result<Vec<Row>, EngineError> {
    let file = File::open(path)?;
    let reader = SerializedFileReader::new(file)
        .map_err(|err| EngineError::Type(format!("parquet: {err}")))?;

    let mut rows = Vec::new();
    for result in reader
        .get_row_iter(None)
        .map_err(|err| EngineError::Type(format!("parquet: {err}")))?
    {
        let record = result.map_err(|err| EngineError::Type(format!("parquet: {err}")))?;
        let mut row = Row::new();
        for (name, field) in record.get_column_iter() {
            row.insert(name.clone(), field_to_value(field));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn field_to_value(field: &Field) -> Value {
    match field {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Boolean(*b),
        Field::Byte(n) => Value::Integer(i64::from(*n)),
        Field::Short(n) => Value::Integer(i64::from(*n)),
        Field::Int(n) => Value::Integer(i64::from(*n)),
        Field::Long(n) => Value::Integer(*n),
        Field::UByte(n) => Value::Integer(i64::from(*n)),
        Field::UShort(n) => Value::Integer(i64::from(*n)),
        Field::UInt(n) => Value::Integer(i64::from(*n)),
        Field::ULong(n) => Value::Integer(*n as i64),
        Field::Float(n) => Value::Float(f64::from(*n)),
        Field::Double(n) => Value::Float(*n),
        Field::Str(s) => Value::Text(s.clone()),
        Field::Decimal(d) => Value::Text(format!("{d:?}")),
        Field::TimestampMillis(ts) | Field::TimestampMicros(ts) => {
            Value::Temporal(ts.to_string())
        }
        Field::Date(d) => Value::Temporal(d.to_string()),
        other => Value::Text(format!("{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_to_value_numeric_variants() {
        assert_eq!(field_to_value(&Field::Long(5)), Value::Integer(5));
        assert_eq!(field_to_value(&Field::Double(1.5)), Value::Float(1.5));
        assert_eq!(field_to_value(&Field::Null), Value::Null);
        assert_eq!(
            field_to_value(&Field::Str("x".to_string())),
            Value::Text("x".to_string())
        );
    }
}
