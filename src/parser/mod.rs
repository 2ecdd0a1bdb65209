//! SQL parser.
//!
//! A hand-written recursive-descent parser with Pratt (precedence-climbing) expression
//! parsing, covering the statement grammar described in §4.3: `SELECT`/`INSERT`/`UPDATE`/
//! `DELETE`/`UPSERT` over a single table with an optional `JOIN` chain.
//!
//! # Supported statements
//!
//! | Statement | Notes |
//! |-----------|-------|
//! | `SELECT`  | projection (`*` or aliased expression list), `JOIN` chain, `WHERE`, `GROUP BY`, `ORDER BY`, `LIMIT` |
//! | `INSERT`  | `INTO table (cols) VALUES (...), (...)` |
//! | `UPDATE`  | `SET col = expr, ...` with optional `WHERE` |
//! | `DELETE`  | `FROM table` with optional `WHERE` |
//! | `UPSERT`  | same grammar as `INSERT`, dispatched as an upsert at execution time |
//!
//! # JOINs
//!
//! `INNER`, `LEFT [OUTER]`, `RIGHT [OUTER]`, `FULL [OUTER]`, `OUTER`, each requiring an `ON`
//! condition. Chained joins are left-associative.
//!
//! # Expressions
//!
//! - Literals: integers, floats, single- or double-quoted strings, `TRUE`/`FALSE`, `NULL`
//! - Column references: unqualified (`col`) or qualified (`t.col`)
//! - Binary operators: `+ - * /`, `= != < <= > >=`, `AND`, `OR`, `LIKE`
//! - Unary operators: `-`, `+`, `NOT`
//! - Special forms: `IS [NOT] NULL`, `[NOT] IN (...)`, `[NOT] BETWEEN ... AND ...`
//!   (desugared at parse time into a pair of comparisons, §4.3)
//! - Function calls: `NAME(arg, ...)`, dispatched against the registry in
//!   [`crate::functions`]
//!
//! # Not supported
//!
//! Subqueries, `CASE`, `CAST`, set operations (`UNION`/`INTERSECT`/`EXCEPT`), window
//! functions, common table expressions, parameter placeholders, DDL, transactions.

mod error;
mod parser;
mod pratt;

pub use error::ParseError;
pub use parser::Parser;
