//! The dynamically tagged scalar value that flows through rows and expressions.

use std::cmp::Ordering;
use std::fmt;

/// A single cell value.
///
/// Comparisons and arithmetic coerce across `Integer`/`Float`; everything else falls back
/// to text. `Temporal` is a string carrying a recognized date/time format (produced by the
/// `DATE` function); it compares and concatenates exactly like `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Temporal(String),
}

impl Value {
    /// Returns this value's numeric form if it coerces cleanly to one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            Self::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(s) | Self::Temporal(s) => s.trim().parse::<f64>().ok(),
            Self::Null => None,
        }
    }

    /// Returns this value's integer form if it coerces cleanly to one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(n) => Some(*n as i64),
            Self::Boolean(b) => Some(i64::from(*b)),
            Self::Text(s) | Self::Temporal(s) => s.trim().parse::<i64>().ok(),
            Self::Null => None,
        }
    }

    /// Renders this value as display text (used for text fallback comparisons,
    /// concatenation, and export).
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Boolean(b) => b.to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) | Self::Temporal(s) => s.clone(),
        }
    }

    /// Null or empty text is treated as "is null" by `IS NULL`.
    #[must_use]
    pub fn is_null_like(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Truthiness per §4.1: null/false/0/empty-text are false, everything else is true.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::Text(s) | Self::Temporal(s) => !s.is_empty(),
        }
    }

    /// Three-way comparison: null sorts below every non-null value; numeric values compare
    /// numerically when both coerce, otherwise comparison falls back to text form.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Less,
            (_, Self::Null) => Ordering::Greater,
            _ => {
                if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                } else {
                    self.as_text().cmp(&other.as_text())
                }
            }
        }
    }

    /// `+`: numeric add when both sides coerce, else text concatenation.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => Self::Null,
            _ => match (self.as_numeric(), other.as_numeric()) {
                (Some(a), Some(b)) => Numeric::add(a, b),
                _ => Self::Text(format!("{}{}", self.as_text(), other.as_text())),
            },
        }
    }

    /// `-`: numeric-only; `Null` on non-numeric input.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        match (self.as_numeric(), other.as_numeric()) {
            (Some(a), Some(b)) => Numeric::sub(a, b),
            _ => Self::Null,
        }
    }

    /// `*`: numeric-only; `Null` on non-numeric input.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        match (self.as_numeric(), other.as_numeric()) {
            (Some(a), Some(b)) => Numeric::mul(a, b),
            _ => Self::Null,
        }
    }

    /// `/`: numeric-only; `Null` on non-numeric input or division by zero.
    #[must_use]
    pub fn div(&self, other: &Self) -> Self {
        match (self.as_numeric(), other.as_numeric()) {
            (Some(a), Some(b)) if b.to_f64() != 0.0 => Numeric::div(a, b),
            _ => Self::Null,
        }
    }

    /// Unary negation; `Null` on non-numeric input.
    #[must_use]
    pub fn neg(&self) -> Self {
        match self.as_numeric() {
            Some(Numeric::Int(n)) => Self::Integer(-n),
            Some(Numeric::Float(n)) => Self::Float(-n),
            None => Self::Null,
        }
    }

    fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Self::Integer(n) => Some(Numeric::Int(*n)),
            Self::Float(n) => Some(Numeric::Float(*n)),
            Self::Boolean(b) => Some(Numeric::Int(i64::from(*b))),
            Self::Text(s) | Self::Temporal(s) => {
                let trimmed = s.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    Some(Numeric::Int(n))
                } else {
                    trimmed.parse::<f64>().ok().map(Numeric::Float)
                }
            }
            Self::Null => None,
        }
    }
}

/// Internal helper distinguishing integer-typed from float-typed numeric coercions so that
/// `Value::add` on two integers stays an `Integer` rather than widening to `Float`.
#[derive(Clone, Copy)]
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn to_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(n) => n,
        }
    }

    fn add(a: Self, b: Self) -> Value {
        match (a, b) {
            (Self::Int(a), Self::Int(b)) => Value::Integer(a + b),
            _ => Value::Float(a.to_f64() + b.to_f64()),
        }
    }

    fn sub(a: Self, b: Self) -> Value {
        match (a, b) {
            (Self::Int(a), Self::Int(b)) => Value::Integer(a - b),
            _ => Value::Float(a.to_f64() - b.to_f64()),
        }
    }

    fn mul(a: Self, b: Self) -> Value {
        match (a, b) {
            (Self::Int(a), Self::Int(b)) => Value::Integer(a * b),
            _ => Value::Float(a.to_f64() * b.to_f64()),
        }
    }

    fn div(a: Self, b: Self) -> Value {
        match (a, b) {
            (Self::Int(a), Self::Int(b)) if a % b == 0 => Value::Integer(a / b),
            _ => Value::Float(a.to_f64() / b.to_f64()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// Case-insensitive SQL `LIKE` matching: `%` matches any run (including empty), `_` matches
/// exactly one character. Implemented as a recursive, anchored match over the whole string.
#[must_use]
pub fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    like_match_at(&text, &pattern)
}

fn like_match_at(text: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => {
            like_match_at(text, &pattern[1..])
                || (!text.is_empty() && like_match_at(&text[1..], pattern))
        }
        Some('_') => !text.is_empty() && like_match_at(&text[1..], &pattern[1..]),
        Some(c) => text.first() == Some(c) && like_match_at(&text[1..], &pattern[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sorts_below_everything() {
        assert_eq!(Value::Null.compare(&Value::Integer(0)), Ordering::Less);
        assert_eq!(Value::Integer(0).compare(&Value::Null), Ordering::Greater);
        assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn test_numeric_coercion_in_compare() {
        let a = Value::Integer(5);
        let b = Value::Text("5".to_string());
        assert_eq!(a.compare(&b), Ordering::Equal);
    }

    #[test]
    fn test_mixed_type_falls_back_to_text() {
        let a = Value::Text("apple".to_string());
        let b = Value::Boolean(true);
        assert_eq!(a.compare(&b), "apple".cmp("true"));
    }

    #[test]
    fn test_truthy() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Boolean(false).truthy());
        assert!(!Value::Integer(0).truthy());
        assert!(!Value::Text(String::new()).truthy());
        assert!(Value::Integer(1).truthy());
        assert!(Value::Text("0.0".to_string()).truthy());
    }

    #[test]
    fn test_add_numeric_vs_text_concat() {
        assert_eq!(Value::Integer(2).add(&Value::Integer(3)), Value::Integer(5));
        assert_eq!(
            Value::Text("foo".to_string()).add(&Value::Text("bar".to_string())),
            Value::Text("foobar".to_string())
        );
    }

    #[test]
    fn test_div_by_zero_is_null() {
        assert_eq!(Value::Integer(1).div(&Value::Integer(0)), Value::Null);
    }

    #[test]
    fn test_like_wildcards() {
        assert!(like_match("Ada", "a%"));
        assert!(like_match("Ada", "A_a"));
        assert!(!like_match("Bob", "a%"));
        assert!(like_match("anything", "%"));
    }
}
