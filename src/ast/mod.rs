//! Abstract syntax tree types: the expression tree shared by every statement kind.

mod expression;

pub use expression::{BinaryOp, Expr, FunctionCall, Literal, UnaryOp};
