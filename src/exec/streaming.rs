//! The streaming executor (§4.7): drains a chunk stream, applying `WHERE` and projection
//! eagerly and buffering only what `GROUP BY`/`ORDER BY` require.

use crossbeam_channel::Receiver;

use crate::chunk::Chunk;
use crate::error::EngineError;
use crate::eval;
use crate::plan::{QueryPlan, ResultSet};
use crate::reader::Cancellation;

use super::{columns_for, finish, project};

/// Consumes a chunk stream per `plan`. Takes the no-buffering fast path when the plan has
/// neither `GROUP BY` nor `ORDER BY`; otherwise filters and projects every passing row into
/// memory and hands the result to [`finish`].
///
/// # Errors
/// Returns the first `EngineError` surfaced by the reader, by cancellation, or by
/// expression evaluation outside a `WHERE`/`ON` context (a `WHERE` evaluation failure drops
/// the row instead, per [`crate::eval::matches`]).
pub fn execute(
    plan: &QueryPlan,
    rx: Receiver<Result<Chunk, EngineError>>,
    cancel: &Cancellation,
) -> Result<ResultSet, EngineError> {
    if !plan.has_group_by() && !plan.has_order_by() {
        return fast_path(plan, rx, cancel);
    }
    buffered_path(plan, rx, cancel)
}

/// The no-`GROUP BY`/no-`ORDER BY` path of §4.7's pseudocode. Projection is deferred past a
/// `LIMIT` offset skip — a row skipped for `OFFSET` is never projected — a deliberate,
/// efficiency-motivated divergence from evaluating every passing row's projection before the
/// offset check; it changes nothing observable since a skipped row is never emitted either
/// way.
fn fast_path(
    plan: &QueryPlan,
    rx: Receiver<Result<Chunk, EngineError>>,
    cancel: &Cancellation,
) -> Result<ResultSet, EngineError> {
    let mut out = Vec::new();
    let mut skipped = 0usize;
    let (offset, limit) = match plan.limit {
        Some(l) => (l.offset, Some(l.count)),
        None => (0, None),
    };

    'outer: for item in &rx {
        cancel.check()?;
        let chunk = item?;
        for row in chunk.rows {
            if let Some(filter) = &plan.filter {
                if !eval::matches(filter, &row) {
                    continue;
                }
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            if let Some(limit) = limit {
                if out.len() >= limit {
                    // LIMIT satisfied: trip the shared token so any still-running parallel
                    // workers stop reading rather than finish their whole segment unread.
                    cancel.cancel();
                    break 'outer;
                }
            }
            out.push(project(&row, &plan.projection)?);
        }
    }

    let columns = columns_for(&plan.projection, &out);
    Ok(ResultSet::new(columns, out))
}

/// The `GROUP BY`/`ORDER BY` path: every passing row is filtered and projected eagerly, then
/// the full candidate set is handed to [`finish`] for exemplar selection, sort, and limit.
fn buffered_path(
    plan: &QueryPlan,
    rx: Receiver<Result<Chunk, EngineError>>,
    cancel: &Cancellation,
) -> Result<ResultSet, EngineError> {
    let mut projected = Vec::new();
    for item in &rx {
        cancel.check()?;
        let chunk = item?;
        for row in chunk.rows {
            if let Some(filter) = &plan.filter {
                if !eval::matches(filter, &row) {
                    continue;
                }
            }
            projected.push(project(&row, &plan.projection)?);
        }
    }
    Ok(finish(projected, plan))
}
