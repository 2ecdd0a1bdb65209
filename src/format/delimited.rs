//! The advanced delimited (CSV/TSV) line parser and row reader.

use std::io::BufRead;

use crate::config::TableConfig;
use crate::error::EngineError;
use crate::row::Row;
use crate::value::Value;

/// Parses one already-read line into fields per the state machine in §4.5.
pub struct LineParser {
    delimiter: char,
    quote: char,
    escape: char,
    max_columns: usize,
    trim_spaces: bool,
    allow_quoted: bool,
    strict_quotes: bool,
    skip_empty: bool,
}

impl LineParser {
    /// Builds a parser from a table's delimited-specific configuration.
    #[must_use]
    pub fn new(config: &TableConfig) -> Self {
        Self {
            delimiter: config.delimiter.chars().next().unwrap_or(','),
            quote: config.quote.chars().next().unwrap_or('"'),
            escape: config.escape.chars().next().unwrap_or('\\'),
            max_columns: config.max_columns,
            trim_spaces: config.trim_spaces,
            allow_quoted: config.allow_quoted,
            strict_quotes: config.strict_quotes,
            skip_empty: config.skip_empty_lines,
        }
    }

    /// Parses a single line into fields.
    ///
    /// Returns `Ok(None)` for a blank line when `skip_empty_lines` is set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Parse`] when `strict_quotes` is set and a field is not
    /// properly quoted.
    pub fn parse_line(&self, line: &str) -> Result<Option<Vec<String>>, EngineError> {
        if self.skip_empty && line.trim().is_empty() {
            return Ok(None);
        }

        let mut fields = Vec::new();
        let mut field_was_quoted = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut was_quoted = false;
        let mut escaped = false;

        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if escaped {
                current.push(c);
                escaped = false;
            } else if c == self.escape && self.allow_quoted {
                escaped = true;
            } else if c == self.quote && self.allow_quoted {
                if in_quotes {
                    if chars.get(i + 1) == Some(&self.quote) {
                        current.push(self.quote);
                        i += 1;
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                    was_quoted = true;
                }
            } else if c == self.delimiter && !in_quotes {
                fields.push(self.finish_field(&current, was_quoted));
                field_was_quoted.push(was_quoted);
                current.clear();
                was_quoted = false;

                if self.max_columns > 0 && fields.len() >= self.max_columns {
                    let mut remainder: String = chars[i + 1..].iter().collect();
                    if self.trim_spaces {
                        remainder = remainder.trim().to_string();
                    }
                    if fields.len() == self.max_columns {
                        let last = fields.last_mut().expect("just pushed a field");
                        last.push(self.delimiter);
                        last.push_str(&remainder);
                    }
                    fields_finalize(&mut fields, &mut field_was_quoted, self.strict_quotes, self.quote)?;
                    return Ok(Some(fields));
                }
            } else {
                current.push(c);
            }
            i += 1;
        }

        fields.push(self.finish_field(&current, was_quoted));
        field_was_quoted.push(was_quoted);

        fields_finalize(&mut fields, &mut field_was_quoted, self.strict_quotes, self.quote)?;
        Ok(Some(fields))
    }

    fn finish_field(&self, raw: &str, was_quoted: bool) -> String {
        if self.trim_spaces && !was_quoted {
            raw.trim().to_string()
        } else {
            raw.to_string()
        }
    }
}

fn fields_finalize(
    fields: &mut [String],
    was_quoted: &mut [bool],
    strict_quotes: bool,
    quote: char,
) -> Result<(), EngineError> {
    if !strict_quotes {
        return Ok(());
    }
    for (field, quoted) in fields.iter().zip(was_quoted.iter()) {
        let properly_quoted = field.chars().count() >= 2
            && field.starts_with(quote)
            && field.ends_with(quote);
        if *quoted && !properly_quoted {
            return Err(EngineError::Parse(format!(
                "field not properly quoted: {field}"
            )));
        }
    }
    Ok(())
}

/// Reads an entire delimited source into rows, handling the header/schema column-naming
/// rule and best-effort type coercion from the table's declared column schema.
///
/// # Errors
///
/// Returns [`EngineError::Parse`] on a malformed line and [`EngineError::Io`] on a read
/// failure.
pub fn read_rows(reader: impl BufRead, config: &TableConfig) -> Result<Vec<Row>, EngineError> {
    let parser = LineParser::new(config);
    let mut lines = reader.lines();
    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    if config.has_header {
        for line in lines.by_ref() {
            let line = line?;
            if let Some(fields) = parser.parse_line(&line)? {
                columns = Some(fields);
                break;
            }
        }
    }

    for line in lines {
        let line = line?;
        let Some(fields) = parser.parse_line(&line)? else {
            continue;
        };
        let names = column_names(&columns, &fields, config);
        let mut row = Row::new();
        for (name, raw) in names.iter().zip(fields.iter()) {
            row.insert(name.clone(), coerce(name, raw, config));
        }
        rows.push(row);
    }

    Ok(rows)
}

fn column_names(header: &Option<Vec<String>>, fields: &[String], config: &TableConfig) -> Vec<String> {
    if let Some(header) = header {
        return header.clone();
    }
    if !config.columns.is_empty() {
        let mut sorted = config.columns.clone();
        sorted.sort_by_key(|c| c.index);
        return sorted.into_iter().map(|c| c.name).collect();
    }
    (0..fields.len()).map(|i| format!("col_{i}")).collect()
}

fn coerce(name: &str, raw: &str, config: &TableConfig) -> Value {
    let Some(column) = config.columns.iter().find(|c| c.name == name) else {
        return Value::Text(raw.to_string());
    };
    match column.data_type {
        crate::config::DataType::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(raw.to_string())),
        crate::config::DataType::Float | crate::config::DataType::Decimal => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(raw.to_string())),
        crate::config::DataType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Value::Boolean(true),
            "false" | "0" => Value::Boolean(false),
            _ => Value::Text(raw.to_string()),
        },
        crate::config::DataType::String => Value::Text(raw.to_string()),
    }
}
