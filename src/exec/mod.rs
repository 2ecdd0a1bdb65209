//! Post-read row shaping shared by the streaming and join executors: projection, `GROUP BY`
//! exemplar selection, `ORDER BY`, and `LIMIT` (§4.7, §4.8). The streaming executor's fast
//! path applies these inline as it drains a chunk stream; the join executor and the
//! streaming executor's buffered (`GROUP BY`/`ORDER BY`) path both funnel through
//! [`finish`] once every candidate row has been filtered and projected.

pub mod join;
pub mod streaming;
pub mod write;

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::error::EngineError;
use crate::eval;
use crate::plan::{LimitClause, OrderByClause, Projection, QueryPlan};
use crate::plan::ResultSet;
use crate::row::Row;
use crate::value::Value;

/// Evaluates the plan's projection against one row.
///
/// # Errors
/// Propagates a column-resolution or function-call failure from [`crate::eval::evaluate`].
pub fn project(row: &Row, projection: &Projection) -> Result<Row, EngineError> {
    match projection {
        Projection::Wildcard => Ok(row.clone()),
        Projection::Items(items) => {
            let mut out = Row::new();
            for item in items {
                let value = eval::evaluate(&item.expr, row)?;
                let name = item
                    .alias
                    .clone()
                    .unwrap_or_else(|| item.expr.implicit_alias());
                out.insert(name, value);
            }
            Ok(out)
        }
    }
}

/// The sentinel joined into a group key in place of a missing group column, so that "all
/// group columns absent" and "group columns present but all empty text" never collide.
const GROUP_NULL_SENTINEL: &str = "\u{0}\u{0}NULL\u{0}\u{0}";
const GROUP_KEY_SEPARATOR: char = '\u{1}';

fn group_key(row: &Row, group_by: &[String]) -> String {
    group_by
        .iter()
        .map(|col| {
            row.get(col)
                .map(Value::as_text)
                .unwrap_or_else(|| GROUP_NULL_SENTINEL.to_string())
        })
        .collect::<Vec<_>>()
        .join(&GROUP_KEY_SEPARATOR.to_string())
}

/// Keys rows by the concatenation of their `GROUP BY` columns and keeps the first row seen
/// per key, in first-seen key order (§4.7: "exemplar" semantics — no aggregate functions are
/// computed, see `SPEC_FULL.md` §9).
#[must_use]
pub fn group_exemplars(rows: Vec<Row>, group_by: &[String]) -> Vec<Row> {
    if group_by.is_empty() {
        return rows;
    }
    let mut exemplars: IndexMap<String, Row> = IndexMap::new();
    for row in rows {
        let key = group_key(&row, group_by);
        exemplars.entry(key).or_insert(row);
    }
    exemplars.into_values().collect()
}

/// Sorts rows stably by a lexicographic key across the `ORDER BY` clauses (descending flag
/// per clause); a missing sort column sorts as less than any present value, consistent with
/// `NULL < non-null` in §4.1.
#[must_use]
pub fn sort_rows(mut rows: Vec<Row>, order_by: &[OrderByClause]) -> Vec<Row> {
    rows.sort_by(|a, b| {
        for clause in order_by {
            let ord = match (a.get(&clause.column), b.get(&clause.column)) {
                (Some(x), Some(y)) => x.compare(y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ord = if clause.desc { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    rows
}

/// Applies `LIMIT offset, count` to an already-ordered row list.
#[must_use]
pub fn apply_limit(rows: Vec<Row>, limit: Option<LimitClause>) -> Vec<Row> {
    match limit {
        None => rows,
        Some(l) => rows.into_iter().skip(l.offset).take(l.count).collect(),
    }
}

/// Derives the declared output column list for a [`ResultSet`] (projection closure, §8):
/// an explicit select list names its own columns regardless of row count; `SELECT *`
/// borrows the key set of the first output row (empty when there are none).
#[must_use]
pub fn columns_for(projection: &Projection, rows: &[Row]) -> Vec<String> {
    match projection {
        Projection::Items(items) => items
            .iter()
            .map(|item| {
                item.alias
                    .clone()
                    .unwrap_or_else(|| item.expr.implicit_alias())
            })
            .collect(),
        Projection::Wildcard => rows
            .first()
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default(),
    }
}

/// The shared tail of both non-streaming executors: project, group, order, then limit a
/// fully materialized candidate row set, and wrap the result in a [`ResultSet`].
///
/// `rows` must already have passed `WHERE`; grouping and ordering operate on projected
/// output columns, matching the join executor's documented stage order (§4.8): WHERE,
/// projection, GROUP BY, ORDER BY, LIMIT.
#[must_use]
pub fn finish(projected_rows: Vec<Row>, plan: &QueryPlan) -> ResultSet {
    let grouped = group_exemplars(projected_rows, &plan.group_by);
    let ordered = if plan.has_order_by() {
        sort_rows(grouped, &plan.order_by)
    } else {
        grouped
    };
    let limited = apply_limit(ordered, plan.limit);
    let columns = columns_for(&plan.projection, &limited);
    ResultSet::new(columns, limited)
}
