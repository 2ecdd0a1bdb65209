//! Nested-loop join executor (§4.8).
//!
//! Each side of a join is read in full (`SELECT *`, no `WHERE` — predicates may reference
//! columns from either side, so filtering waits until after every join in the chain has
//! run). Joined rows then flow through the same project → `GROUP BY` → `ORDER BY` → `LIMIT`
//! tail as the streaming executor's buffered path, via [`super::finish`].

use crate::config::TableConfigMap;
use crate::error::EngineError;
use crate::eval;
use crate::plan::{JoinClause, JoinType, QueryPlan, ResultSet};
use crate::reader::{self, Cancellation};
use crate::row::Row;
use crate::value::Value;

/// Executes every join in `plan.joins` against `plan.table`, applies the original `WHERE`
/// to the combined rows, then projects, groups, orders, and limits.
///
/// # Errors
/// Returns [`EngineError::Schema`] for a table missing from `tables` (dispatch already
/// checked this, so this only re-fires if `tables` changed between the check and the call)
/// and propagates any reader or evaluation failure.
pub fn execute(plan: &QueryPlan, tables: &TableConfigMap, cancel: &Cancellation) -> Result<ResultSet, EngineError> {
    let base_alias = plan.alias.clone().unwrap_or_else(|| plan.table.clone());
    let mut combined = select_all(&plan.table, tables, cancel)?;
    let mut left_alias = base_alias;

    for join in &plan.joins {
        let right_alias = join.alias.clone().unwrap_or_else(|| join.table.clone());
        let right_rows = select_all(&join.table, tables, cancel)?;
        combined = join_rows(combined, &left_alias, right_rows, &right_alias, join);
        // A chained join's combined row set no longer belongs to a single aliased table;
        // qualify further collisions against this join's right alias (§9: ambiguity in
        // joins is resolved by textual alias, not structural table identity — an explicit
        // open question this implementation settles this way for chains beyond one join).
        left_alias = right_alias;
    }

    let filtered: Vec<Row> = match &plan.filter {
        Some(filter) => combined.into_iter().filter(|row| eval::matches(filter, row)).collect(),
        None => combined,
    };

    let projected = filtered
        .into_iter()
        .map(|row| super::project(&row, &plan.projection))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(super::finish(projected, plan))
}

fn select_all(table: &str, tables: &TableConfigMap, cancel: &Cancellation) -> Result<Vec<Row>, EngineError> {
    let config = tables
        .get(table)
        .ok_or_else(|| EngineError::Schema(format!("unknown table: {table}")))?;
    let rx = reader::stream(config.clone(), cancel.clone());
    let mut rows = Vec::new();
    for item in &rx {
        cancel.check()?;
        rows.extend(item?.rows);
    }
    Ok(rows)
}

/// Builds the combined row for one matched `(left, right)` pair (§4.8): left keys are
/// always copied unprefixed; a colliding right key is additionally copied under both
/// `leftAlias.key` and `rightAlias.key`, and the plain right key is left holding the left
/// value (not overwritten) in that case.
fn combine(left: &Row, left_alias: &str, right: &Row, right_alias: &str) -> Row {
    let mut out = Row::new();
    for (k, v) in left.iter() {
        out.insert(k.to_string(), v.clone());
    }
    for (k, v) in right.iter() {
        if let Some(left_value) = left.get(k) {
            out.insert(format!("{left_alias}.{k}"), left_value.clone());
            out.insert(format!("{right_alias}.{k}"), v.clone());
        } else {
            out.insert(k.to_string(), v.clone());
        }
    }
    out
}

/// Builds the row for an unmatched left row (LEFT/FULL/OUTER): left columns keep their
/// values, and every column the right side would have contributed — inferred from a sample
/// right row, since there is no actual match — is present but `NULL`.
fn combine_absent_right(left: &Row, left_alias: &str, right_alias: &str, right_sample: &[Row]) -> Row {
    let mut out = Row::new();
    for (k, v) in left.iter() {
        out.insert(k.to_string(), v.clone());
    }
    if let Some(sample) = right_sample.first() {
        for key in sample.keys() {
            if let Some(left_value) = left.get(key) {
                out.insert(format!("{left_alias}.{key}"), left_value.clone());
                out.insert(format!("{right_alias}.{key}"), Value::Null);
            } else {
                out.insert(key.to_string(), Value::Null);
            }
        }
    }
    out
}

/// The symmetric case for an unmatched right row (RIGHT/FULL/OUTER).
fn combine_absent_left(right: &Row, left_alias: &str, left_sample: &[Row], right_alias: &str) -> Row {
    let mut out = Row::new();
    let left_has = |key: &str| left_sample.first().is_some_and(|sample| sample.get(key).is_some());

    if let Some(sample) = left_sample.first() {
        for key in sample.keys() {
            if right.get(key).is_some() {
                out.insert(format!("{left_alias}.{key}"), Value::Null);
            } else {
                out.insert(key.to_string(), Value::Null);
            }
        }
    }
    for (k, v) in right.iter() {
        if left_has(k) {
            out.insert(format!("{right_alias}.{k}"), v.clone());
        } else {
            out.insert(k.to_string(), v.clone());
        }
    }
    out
}

fn join_rows(left: Vec<Row>, left_alias: &str, right: Vec<Row>, right_alias: &str, join: &JoinClause) -> Vec<Row> {
    let mut out = Vec::new();
    let mut right_matched = vec![false; right.len()];

    for l in &left {
        let mut left_matched = false;
        for (ri, r) in right.iter().enumerate() {
            let combined = combine(l, left_alias, r, right_alias);
            if eval::matches(&join.on, &combined) {
                left_matched = true;
                right_matched[ri] = true;
                out.push(combined);
            }
        }
        if !left_matched && matches!(join.kind, JoinType::Left | JoinType::Full | JoinType::Outer) {
            out.push(combine_absent_right(l, left_alias, right_alias, &right));
        }
    }

    if matches!(join.kind, JoinType::Right | JoinType::Full | JoinType::Outer) {
        for (ri, r) in right.iter().enumerate() {
            if !right_matched[ri] {
                out.push(combine_absent_left(r, left_alias, &left, right_alias));
            }
        }
    }

    out
}
