//! The scalar SQL function registry.
//!
//! Every function is resolved case-insensitively by name and takes already-evaluated
//! [`Value`] arguments (the caller, [`crate::eval`], evaluates argument expressions first).
//! Argument-count and type mismatches return an [`EngineError::Type`], not a panic; an
//! unrecognized function name returns [`EngineError::Unsupported`] instead, per the error
//! taxonomy's distinction between a malformed call and a call this engine doesn't implement.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

use crate::error::EngineError;
use crate::value::Value;

/// The date/time formats `DATE`/`YEAR`/`MONTH`/`DAY` try, in order, before giving up.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d",
];

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    for fmt in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn require_numeric(name: &str, v: &Value) -> Result<f64, EngineError> {
    v.as_f64()
        .ok_or_else(|| EngineError::Type(format!("{name}() requires a numeric argument")))
}

fn require_int(name: &str, v: &Value) -> Result<i64, EngineError> {
    v.as_i64()
        .ok_or_else(|| EngineError::Type(format!("{name}() requires an integer argument")))
}

fn arity_error(name: &str, expected: &str) -> EngineError {
    EngineError::Type(format!("{name}() requires {expected}"))
}

/// Dispatches a scalar function call by name against its already-evaluated arguments.
///
/// # Errors
///
/// Returns [`EngineError::Unsupported`] for an unknown function name, and [`EngineError::Type`]
/// for a wrong argument count or an argument that doesn't coerce to the type the function
/// needs.
pub fn call(name: &str, args: &[Value]) -> Result<Value, EngineError> {
    match name.to_ascii_uppercase().as_str() {
        "UPPER" => {
            let [v] = one(name, args)?;
            Ok(Value::Text(v.as_text().to_uppercase()))
        }
        "LOWER" => {
            let [v] = one(name, args)?;
            Ok(Value::Text(v.as_text().to_lowercase()))
        }
        "LENGTH" | "LEN" => {
            let [v] = one(name, args)?;
            Ok(Value::Integer(v.as_text().chars().count() as i64))
        }
        "SUBSTR" | "SUBSTRING" => substr(args),
        "TRIM" => {
            let [v] = one(name, args)?;
            Ok(Value::Text(v.as_text().trim().to_string()))
        }
        "LTRIM" => {
            let [v] = one(name, args)?;
            Ok(Value::Text(v.as_text().trim_start().to_string()))
        }
        "RTRIM" => {
            let [v] = one(name, args)?;
            Ok(Value::Text(v.as_text().trim_end().to_string()))
        }
        "LEFT" => side(name, args, true),
        "RIGHT" => side(name, args, false),
        "CONCAT" => Ok(Value::Text(
            args.iter().map(Value::as_text).collect::<Vec<_>>().join(""),
        )),
        "REPLACE" => {
            if args.len() != 3 {
                return Err(arity_error(name, "exactly 3 arguments"));
            }
            Ok(Value::Text(args[0].as_text().replace(
                &args[1].as_text(),
                &args[2].as_text(),
            )))
        }
        "REVERSE" => {
            let [v] = one(name, args)?;
            Ok(Value::Text(v.as_text().chars().rev().collect()))
        }
        "REPEAT" => {
            if args.len() != 2 {
                return Err(arity_error(name, "exactly 2 arguments"));
            }
            let count = require_int(name, &args[1])?;
            if count <= 0 {
                return Ok(Value::Text(String::new()));
            }
            Ok(Value::Text(args[0].as_text().repeat(count as usize)))
        }
        "ABS" => {
            let [v] = one(name, args)?;
            Ok(Value::Float(require_numeric(name, v)?.abs()))
        }
        "ROUND" => round(name, args),
        "FLOOR" => {
            let [v] = one(name, args)?;
            Ok(Value::Float(require_numeric(name, v)?.floor()))
        }
        "CEIL" | "CEILING" => {
            let [v] = one(name, args)?;
            Ok(Value::Float(require_numeric(name, v)?.ceil()))
        }
        "MOD" | "MODULO" => {
            if args.len() != 2 {
                return Err(arity_error(name, "exactly 2 arguments"));
            }
            let a = require_int(name, &args[0])?;
            let b = require_int(name, &args[1])?;
            if b == 0 {
                return Err(EngineError::Type(format!("{name}() divisor must be non-zero")));
            }
            Ok(Value::Integer(a % b))
        }
        "POWER" | "POW" => {
            if args.len() != 2 {
                return Err(arity_error(name, "exactly 2 arguments"));
            }
            let base = require_numeric(name, &args[0])?;
            let exp = require_int(name, &args[1])?;
            let mut result = 1.0;
            for _ in 0..exp.max(0) {
                result *= base;
            }
            Ok(Value::Float(result))
        }
        "SQRT" => {
            let [v] = one(name, args)?;
            let num = require_numeric(name, v)?;
            if num < 0.0 {
                return Err(EngineError::Type(format!(
                    "{name}() requires a non-negative numeric argument"
                )));
            }
            if num == 0.0 {
                return Ok(Value::Float(0.0));
            }
            let mut x = num;
            for _ in 0..10 {
                x = (x + num / x) / 2.0;
            }
            Ok(Value::Float(x))
        }
        "SIGN" => {
            let [v] = one(name, args)?;
            let num = require_numeric(name, v)?;
            Ok(Value::Integer(if num > 0.0 {
                1
            } else if num < 0.0 {
                -1
            } else {
                0
            }))
        }
        "NOW" => {
            if !args.is_empty() {
                return Err(arity_error(name, "no arguments"));
            }
            Ok(Value::Temporal(
                Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            ))
        }
        "DATE" => date_fn(args),
        "YEAR" => date_part(name, args, |dt| i64::from(dt.year())),
        "MONTH" => date_part(name, args, |dt| i64::from(dt.month())),
        "DAY" => date_part(name, args, |dt| i64::from(dt.day())),
        "COALESCE" => {
            for v in args {
                if !v.is_null_like() {
                    return Ok(v.clone());
                }
            }
            Ok(Value::Null)
        }
        "ISNULL" | "IFNULL" => {
            if args.len() != 2 {
                return Err(arity_error(name, "exactly 2 arguments"));
            }
            if args[0].is_null_like() {
                Ok(args[1].clone())
            } else {
                Ok(args[0].clone())
            }
        }
        _ => Err(EngineError::Unsupported(format!("unknown function: {name}"))),
    }
}

fn one<'a>(name: &str, args: &'a [Value]) -> Result<&'a [Value; 1], EngineError> {
    <&[Value; 1]>::try_from(args).map_err(|_| arity_error(name, "exactly 1 argument"))
}

fn substr(args: &[Value]) -> Result<Value, EngineError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(arity_error("SUBSTR", "2 or 3 arguments"));
    }
    let text: Vec<char> = args[0].as_text().chars().collect();
    let start = require_int("SUBSTR", &args[1])?;
    if start < 1 {
        return Ok(Value::Text(String::new()));
    }
    let start = (start - 1) as usize;
    if start >= text.len() {
        return Ok(Value::Text(String::new()));
    }
    let end = if args.len() == 3 {
        let length = require_int("SUBSTR", &args[2])?;
        if length < 0 {
            return Ok(Value::Text(String::new()));
        }
        (start + length as usize).min(text.len())
    } else {
        text.len()
    };
    Ok(Value::Text(text[start..end].iter().collect()))
}

fn side(name: &str, args: &[Value], left: bool) -> Result<Value, EngineError> {
    if args.len() != 2 {
        return Err(arity_error(name, "exactly 2 arguments"));
    }
    let length = require_int(name, &args[1])?;
    let text: Vec<char> = args[0].as_text().chars().collect();
    if length < 0 {
        return Ok(Value::Text(String::new()));
    }
    let length = (length as usize).min(text.len());
    let slice = if left {
        &text[..length]
    } else {
        &text[text.len() - length..]
    };
    Ok(Value::Text(slice.iter().collect()))
}

fn round(name: &str, args: &[Value]) -> Result<Value, EngineError> {
    if args.is_empty() || args.len() > 2 {
        return Err(arity_error(name, "1 or 2 arguments"));
    }
    let num = require_numeric(name, &args[0])?;
    let precision = if args.len() == 2 {
        require_int(name, &args[1])?
    } else {
        0
    };
    let multiplier = 10f64.powi(precision.max(0) as i32);
    Ok(Value::Float((num * multiplier + 0.5).floor() / multiplier))
}

fn date_fn(args: &[Value]) -> Result<Value, EngineError> {
    match args.len() {
        0 => Ok(Value::Temporal(Local::now().format("%Y-%m-%d").to_string())),
        1 => {
            let text = args[0].as_text();
            match parse_datetime(&text) {
                Some(dt) => Ok(Value::Temporal(dt.format("%Y-%m-%d").to_string())),
                None => Ok(Value::Temporal(text)),
            }
        }
        _ => Err(arity_error("DATE", "0 or 1 arguments")),
    }
}

fn date_part(
    name: &str,
    args: &[Value],
    extract: impl Fn(&NaiveDateTime) -> i64,
) -> Result<Value, EngineError> {
    let [v] = one(name, args)?;
    let text = v.as_text();
    let dt = parse_datetime(&text)
        .ok_or_else(|| EngineError::Type(format!("invalid date format: {text}")))?;
    Ok(Value::Integer(extract(&dt)))
}
