//! Expression AST types.

/// A literal value appearing directly in SQL source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// Single- or double-quoted string literal.
    String(String),
    /// `TRUE` / `FALSE`.
    Boolean(bool),
    /// `NULL`.
    Null,
}

/// Binary operators, ordered here by the precedence table in [`crate::parser::pratt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Like,
}

impl BinaryOp {
    /// Returns a canonical textual form, used when deriving an implicit column alias.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Unary `-`.
    Neg,
    /// Unary `+`.
    Plus,
    /// `NOT`.
    Not,
}

/// A function call, e.g. `UPPER(name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Function name as written (case is preserved; lookup is case-insensitive).
    pub name: String,
    /// Argument expressions.
    pub args: Vec<Expr>,
}

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Literal),
    /// A column reference, optionally qualified by a table name or alias.
    Column {
        /// The qualifier before the dot, if any (e.g. `u` in `u.name`).
        table: Option<String>,
        /// The column name.
        name: String,
    },
    /// A unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// A binary operation.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// `expr IN (list)` / `expr NOT IN (list)`.
    In {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    /// `expr IS NULL` / `expr IS NOT NULL`.
    IsNull { expr: Box<Expr>, negated: bool },
    /// A scalar function call.
    Function(FunctionCall),
}

impl Expr {
    /// Builds a bare column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            table: None,
            name: name.into(),
        }
    }

    /// Builds a table-qualified column reference.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Builds a binary expression.
    #[must_use]
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Renders a best-effort textual form of this expression, used to derive an implicit
    /// select-list alias when none is given. `a.b` collapses to `b`.
    #[must_use]
    pub fn implicit_alias(&self) -> String {
        match self {
            Self::Literal(Literal::Integer(n)) => n.to_string(),
            Self::Literal(Literal::Float(n)) => n.to_string(),
            Self::Literal(Literal::String(s)) => s.clone(),
            Self::Literal(Literal::Boolean(b)) => b.to_string(),
            Self::Literal(Literal::Null) => "null".to_string(),
            Self::Column { name, .. } => name.clone(),
            Self::Unary { operand, .. } => operand.implicit_alias(),
            Self::Binary { left, op, right } => {
                format!(
                    "{} {} {}",
                    left.implicit_alias(),
                    op.as_str(),
                    right.implicit_alias()
                )
            }
            Self::In { expr, .. } => expr.implicit_alias(),
            Self::IsNull { expr, .. } => expr.implicit_alias(),
            Self::Function(call) => {
                let args = call
                    .args
                    .iter()
                    .map(Expr::implicit_alias)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", call.name, args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_as_str() {
        assert_eq!(BinaryOp::Add.as_str(), "+");
        assert_eq!(BinaryOp::Eq.as_str(), "=");
        assert_eq!(BinaryOp::Like.as_str(), "LIKE");
    }

    #[test]
    fn test_expr_builders() {
        let e = Expr::column("age");
        assert_eq!(
            e,
            Expr::Column {
                table: None,
                name: "age".to_string()
            }
        );

        let q = Expr::qualified_column("u", "id");
        assert_eq!(
            q,
            Expr::Column {
                table: Some("u".to_string()),
                name: "id".to_string()
            }
        );
    }

    #[test]
    fn test_implicit_alias_collapses_qualifier() {
        let e = Expr::qualified_column("u", "name");
        assert_eq!(e.implicit_alias(), "name");
    }

    #[test]
    fn test_implicit_alias_binary() {
        let e = Expr::binary(Expr::column("age"), BinaryOp::Add, Expr::Literal(Literal::Integer(1)));
        assert_eq!(e.implicit_alias(), "age + 1");
    }
}
