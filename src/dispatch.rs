//! The engine's single public entry point (§6): parse, resolve tables, route.

use std::time::Instant;

use crate::config::TableConfigMap;
use crate::error::EngineError;
use crate::exec::{join, streaming, write};
use crate::parser::Parser;
use crate::plan::{QueryPlan, QueryType, ResultSet};
use crate::reader::{self, Cancellation};

/// Parses `sql_text`, resolves every table it references against `tables`, and executes it,
/// bounded by `deadline`.
///
/// Routing: a `SELECT` with no `JOIN` goes through the streaming chunk-reader executor; a
/// `SELECT` with one or more `JOIN`s goes through the nested-loop join executor; `INSERT`,
/// `UPDATE`, `DELETE`, and `UPSERT` go through the file-locked write executor.
///
/// # Errors
/// Returns [`EngineError::Parse`] for malformed SQL and [`EngineError::Schema`] for a
/// statement referencing a table absent from `tables`, and otherwise propagates whatever the
/// chosen executor returns.
pub fn execute(deadline: Instant, sql_text: &str, tables: &TableConfigMap) -> Result<ResultSet, EngineError> {
    let plan = Parser::new(sql_text)
        .parse_statement()
        .map_err(|err| EngineError::Parse(err.to_string()))?;

    verify_tables(&plan, tables)?;

    let cancel = Cancellation::new(deadline);
    match plan.kind {
        QueryType::Select if plan.joins.is_empty() => execute_select(&plan, tables, &cancel),
        QueryType::Select => join::execute(&plan, tables, &cancel),
        QueryType::Insert | QueryType::Update | QueryType::Delete | QueryType::Upsert => write::execute(&plan, tables),
    }
}

fn execute_select(plan: &QueryPlan, tables: &TableConfigMap, cancel: &Cancellation) -> Result<ResultSet, EngineError> {
    let config = tables
        .get(&plan.table)
        .ok_or_else(|| EngineError::Schema(format!("unknown table: {}", plan.table)))?;
    let rx = reader::stream(config.clone(), cancel.clone());
    streaming::execute(plan, rx, cancel)
}

fn verify_tables(plan: &QueryPlan, tables: &TableConfigMap) -> Result<(), EngineError> {
    if !tables.contains_key(&plan.table) {
        return Err(EngineError::Schema(format!("unknown table: {}", plan.table)));
    }
    for join in &plan.joins {
        if !tables.contains_key(&join.table) {
            return Err(EngineError::Schema(format!("unknown table: {}", join.table)));
        }
    }
    Ok(())
}
