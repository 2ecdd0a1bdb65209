//! The parsed, structured form of one SQL statement.

use crate::ast::Expr;
use crate::value::Value;

/// The kind of statement a [`QueryPlan`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Upsert,
}

/// One entry of a `JOIN` chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Outer,
}

/// `alias.table ON condition`.
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub kind: JoinType,
    pub table: String,
    pub alias: Option<String>,
    pub on: Expr,
}

/// One item of a `SELECT` list: an expression plus an optional explicit alias.
#[derive(Debug, Clone)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

/// `ORDER BY column [ASC|DESC]`.
#[derive(Debug, Clone)]
pub struct OrderByClause {
    pub column: String,
    pub desc: bool,
}

/// `LIMIT [offset,] count`.
#[derive(Debug, Clone, Copy)]
pub struct LimitClause {
    pub offset: usize,
    pub count: usize,
}

/// The projection list of a `SELECT`/result-shape-bearing statement.
#[derive(Debug, Clone)]
pub enum Projection {
    /// `SELECT *`.
    Wildcard,
    /// An explicit, possibly aliased, expression list.
    Items(Vec<SelectItem>),
}

/// A fully parsed SQL statement, ready for dispatch.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub kind: QueryType,
    pub table: String,
    pub alias: Option<String>,
    pub projection: Projection,
    pub joins: Vec<JoinClause>,
    pub filter: Option<Expr>,
    pub group_by: Vec<String>,
    pub order_by: Vec<OrderByClause>,
    pub limit: Option<LimitClause>,

    /// INSERT/UPSERT: target column list (empty means "infer from table schema").
    pub insert_columns: Vec<String>,
    /// INSERT/UPSERT: one row of literal values per `VALUES (...)` group.
    pub insert_values: Vec<Vec<Value>>,
    /// UPDATE: `column = expr` assignments, evaluated against the pre-update row.
    pub set_clauses: Vec<(String, Expr)>,
}

impl QueryPlan {
    /// Builds an empty plan of the given kind for a given table; callers fill in the rest.
    #[must_use]
    pub fn new(kind: QueryType, table: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            alias: None,
            projection: Projection::Wildcard,
            joins: Vec::new(),
            filter: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            insert_columns: Vec::new(),
            insert_values: Vec::new(),
            set_clauses: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_group_by(&self) -> bool {
        !self.group_by.is_empty()
    }

    #[must_use]
    pub fn has_order_by(&self) -> bool {
        !self.order_by.is_empty()
    }
}

/// The result of executing a [`QueryPlan`].
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<crate::row::Row>,
    pub count: usize,
}

impl ResultSet {
    /// Builds a `ResultSet` from a column list and a row list, deriving `count`.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<crate::row::Row>) -> Self {
        let count = rows.len();
        Self {
            columns,
            rows,
            count,
        }
    }

    /// Builds the single-row `{rows_affected: n}` shape returned by write statements.
    #[must_use]
    pub fn rows_affected(n: usize) -> Self {
        let row = crate::row::Row::new().with("rows_affected", Value::Integer(n as i64));
        Self::new(vec!["rows_affected".to_string()], vec![row])
    }
}
