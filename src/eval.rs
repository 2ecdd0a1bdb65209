//! Expression evaluation against a [`Row`].

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};
use crate::error::EngineError;
use crate::functions;
use crate::row::Row;
use crate::value::{like_match, Value};

/// Evaluates an expression against a row.
///
/// Column lookups go through [`Row::resolve`]'s three-step algorithm (qualified, bare,
/// unambiguous suffix). A missing or ambiguous column is a [`EngineError::Schema`] error,
/// not a silent `NULL` — callers evaluating a `WHERE` predicate treat an error the same as
/// a falsy result (the row is dropped), matching the original engine's row-skip behavior.
///
/// # Errors
///
/// Returns [`EngineError::Schema`] for an unresolvable column and [`EngineError::Type`] for
/// a function-call failure.
pub fn evaluate(expr: &Expr, row: &Row) -> Result<Value, EngineError> {
    match expr {
        Expr::Literal(lit) => Ok(literal_value(lit)),
        Expr::Column { table, name } => {
            if name == "*" {
                return Ok(Value::Null);
            }
            row.resolve(table.as_deref(), name)
                .cloned()
                .map_err(EngineError::Schema)
        }
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, row)?;
            Ok(match op {
                UnaryOp::Neg => value.neg(),
                UnaryOp::Plus => value,
                UnaryOp::Not => Value::Boolean(!value.truthy()),
            })
        }
        Expr::Binary { left, op, right } => {
            let lhs = evaluate(left, row)?;
            if matches!(op, BinaryOp::And) && !lhs.truthy() {
                return Ok(Value::Boolean(false));
            }
            if matches!(op, BinaryOp::Or) && lhs.truthy() {
                return Ok(Value::Boolean(true));
            }
            let rhs = evaluate(right, row)?;
            Ok(apply_binary(*op, &lhs, &rhs))
        }
        Expr::In {
            expr,
            list,
            negated,
        } => {
            let value = evaluate(expr, row)?;
            let mut found = false;
            for item in list {
                let candidate = evaluate(item, row)?;
                if value.compare(&candidate) == std::cmp::Ordering::Equal {
                    found = true;
                    break;
                }
            }
            Ok(Value::Boolean(found != *negated))
        }
        Expr::IsNull { expr, negated } => {
            let value = evaluate(expr, row)?;
            Ok(Value::Boolean(value.is_null_like() != *negated))
        }
        Expr::Function(call) => {
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                args.push(evaluate(arg, row)?);
            }
            functions::call(&call.name, &args)
        }
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::Text(s.clone()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
    }
}

fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    use std::cmp::Ordering;
    match op {
        BinaryOp::Add => lhs.add(rhs),
        BinaryOp::Sub => lhs.sub(rhs),
        BinaryOp::Mul => lhs.mul(rhs),
        BinaryOp::Div => lhs.div(rhs),
        BinaryOp::Eq => Value::Boolean(lhs.compare(rhs) == Ordering::Equal),
        BinaryOp::NotEq => Value::Boolean(lhs.compare(rhs) != Ordering::Equal),
        BinaryOp::Lt => Value::Boolean(lhs.compare(rhs) == Ordering::Less),
        BinaryOp::LtEq => Value::Boolean(lhs.compare(rhs) != Ordering::Greater),
        BinaryOp::Gt => Value::Boolean(lhs.compare(rhs) == Ordering::Greater),
        BinaryOp::GtEq => Value::Boolean(lhs.compare(rhs) != Ordering::Less),
        BinaryOp::And => Value::Boolean(lhs.truthy() && rhs.truthy()),
        BinaryOp::Or => Value::Boolean(lhs.truthy() || rhs.truthy()),
        BinaryOp::Like => Value::Boolean(like_match(&lhs.as_text(), &rhs.as_text())),
    }
}

/// Evaluates a predicate for `WHERE`/`ON`/`HAVING`-style filtering: an evaluation error is
/// treated the same as a falsy result, so the row is simply excluded rather than aborting
/// the whole statement.
#[must_use]
pub fn matches(expr: &Expr, row: &Row) -> bool {
    evaluate(expr, row).map(|v| v.truthy()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new()
            .with("id", Value::Integer(1))
            .with("name", Value::Text("Ada".to_string()))
    }

    #[test]
    fn test_literal_and_column() {
        assert_eq!(
            evaluate(&Expr::Literal(Literal::Integer(5)), &row()).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            evaluate(&Expr::column("name"), &row()).unwrap(),
            Value::Text("Ada".to_string())
        );
    }

    #[test]
    fn test_comparison() {
        let expr = Expr::binary(
            Expr::column("id"),
            BinaryOp::Eq,
            Expr::Literal(Literal::Integer(1)),
        );
        assert_eq!(evaluate(&expr, &row()).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_and_short_circuits_without_evaluating_missing_column() {
        let expr = Expr::binary(
            Expr::Literal(Literal::Boolean(false)),
            BinaryOp::And,
            Expr::column("does_not_exist"),
        );
        assert_eq!(evaluate(&expr, &row()).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_or_short_circuits() {
        let expr = Expr::binary(
            Expr::Literal(Literal::Boolean(true)),
            BinaryOp::Or,
            Expr::column("does_not_exist"),
        );
        assert_eq!(evaluate(&expr, &row()).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_missing_column_is_a_schema_error() {
        assert!(evaluate(&Expr::column("missing"), &row()).is_err());
    }

    #[test]
    fn test_matches_treats_evaluation_error_as_false() {
        assert!(!matches(&Expr::column("missing"), &row()));
    }

    #[test]
    fn test_in_list() {
        let expr = Expr::In {
            expr: Box::new(Expr::column("id")),
            list: vec![
                Expr::Literal(Literal::Integer(1)),
                Expr::Literal(Literal::Integer(2)),
            ],
            negated: false,
        };
        assert_eq!(evaluate(&expr, &row()).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_is_null() {
        let expr = Expr::IsNull {
            expr: Box::new(Expr::column("name")),
            negated: false,
        };
        assert_eq!(evaluate(&expr, &row()).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_function_call() {
        let expr = Expr::Function(crate::ast::FunctionCall {
            name: "UPPER".to_string(),
            args: vec![Expr::column("name")],
        });
        assert_eq!(
            evaluate(&expr, &row()).unwrap(),
            Value::Text("ADA".to_string())
        );
    }
}
