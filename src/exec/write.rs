//! The write executor (§4.9): `INSERT`/`UPDATE`/`DELETE`/`UPSERT`.
//!
//! Unlike the read path, writes never stream: a file-exclusive advisory lock is held for the
//! whole statement, `UPDATE`/`DELETE` materialize the entire table, and the result is written
//! out either by append (`INSERT`) or by atomic rename of a temp file (`UPDATE`/`DELETE`).

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::config::{Format, TableConfig, TableConfigMap};
use crate::error::EngineError;
use crate::eval;
use crate::format::{object_stream, read_table};
use crate::plan::{QueryPlan, QueryType, ResultSet};
use crate::row::Row;
use crate::value::Value;

const LOCK_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The process-wide registry of in-process flags, one per file path, layered under the
/// kernel-level advisory lock so threads of this same engine instance also serialize on a
/// given table; a plain flag (rather than a `Mutex`) sidesteps holding a guard with a
/// lifetime tied to a registry entry across the whole statement.
fn lock_registry() -> &'static Mutex<HashMap<String, Arc<AtomicBool>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<AtomicBool>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn process_flag_for(path: &str) -> Arc<AtomicBool> {
    let mut registry = lock_registry().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    registry.entry(path.to_string()).or_insert_with(|| Arc::new(AtomicBool::new(false))).clone()
}

/// Holds both the process-local flag and the cross-process advisory file lock for the
/// duration of one write statement; dropping it releases both.
struct FileLock {
    file: File,
    process_flag: Arc<AtomicBool>,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        self.process_flag.store(false, Ordering::Release);
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

fn acquire_lock(path: &str) -> Result<FileLock, EngineError> {
    let flag = process_flag_for(path);
    let deadline = Instant::now() + LOCK_ACQUIRE_TIMEOUT;
    loop {
        if flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            break;
        }
        if Instant::now() >= deadline {
            return Err(EngineError::Lock(format!("timed out acquiring in-process lock on {path}")));
        }
        std::thread::sleep(LOCK_POLL_INTERVAL);
    }

    let file = match OpenOptions::new().read(true).write(true).create(true).truncate(false).open(path) {
        Ok(file) => file,
        Err(err) => {
            flag.store(false, Ordering::Release);
            return Err(EngineError::Io(err));
        }
    };

    loop {
        match file.try_lock_exclusive() {
            Ok(()) => break,
            Err(_) if Instant::now() < deadline => std::thread::sleep(LOCK_POLL_INTERVAL),
            Err(_) => {
                flag.store(false, Ordering::Release);
                return Err(EngineError::Lock(format!("timed out acquiring lock on {path}")));
            }
        }
    }

    Ok(FileLock { file, process_flag: flag })
}

/// Executes an `INSERT`/`UPDATE`/`DELETE`/`UPSERT` plan against its target table.
///
/// # Errors
/// Returns [`EngineError::Safety`] for `UPDATE`/`DELETE` without a `WHERE` clause (checked
/// before any file is touched), [`EngineError::Unsupported`] for `INSERT` into an object-array
/// table, [`EngineError::Lock`] on a 10-second lock-acquisition timeout, and propagates reader
/// or I/O failures otherwise.
pub fn execute(plan: &QueryPlan, tables: &TableConfigMap) -> Result<ResultSet, EngineError> {
    let config = tables
        .get(&plan.table)
        .ok_or_else(|| EngineError::Schema(format!("unknown table: {}", plan.table)))?;

    if matches!(plan.kind, QueryType::Update | QueryType::Delete) && plan.filter.is_none() {
        return Err(EngineError::Safety(format!(
            "{:?} without WHERE is refused on table {}",
            plan.kind, plan.table
        )));
    }

    let _lock = acquire_lock(&config.file_path)?;

    match plan.kind {
        QueryType::Insert | QueryType::Upsert => insert(plan, config),
        QueryType::Update => update(plan, config),
        QueryType::Delete => delete(plan, config),
        QueryType::Select => unreachable!("select plans never reach the write executor"),
    }
}

fn insert_rows(plan: &QueryPlan) -> Vec<Row> {
    plan.insert_values
        .iter()
        .map(|values| {
            let mut row = Row::new();
            for (name, value) in plan.insert_columns.iter().zip(values.iter()) {
                row.insert(name.clone(), value.clone());
            }
            row
        })
        .collect()
}

fn insert(plan: &QueryPlan, config: &TableConfig) -> Result<ResultSet, EngineError> {
    let rows = insert_rows(plan);
    match config.format {
        Format::Delimited => insert_delimited(&rows, config)?,
        Format::ObjectStream => insert_object_stream(&rows, config)?,
        Format::ObjectArray => {
            return Err(EngineError::Unsupported(
                "INSERT into an object-array table is not supported; use object-stream (.jsonl) instead".to_string(),
            ));
        }
        other => {
            return Err(EngineError::Unsupported(format!("INSERT into {other:?} format is not supported")));
        }
    }
    tracing::debug!(table = %config.name, rows = rows.len(), "insert committed");
    Ok(ResultSet::rows_affected(rows.len()))
}

fn insert_delimited(rows: &[Row], config: &TableConfig) -> Result<(), EngineError> {
    let mut file = OpenOptions::new().append(true).create(true).open(&config.file_path)?;
    let delimiter = config.delimiter.chars().next().unwrap_or(',');
    let quote = config.quote.chars().next().unwrap_or('"');
    for row in rows {
        let mut line_fields = Vec::with_capacity(row.keys().count());
        for key in row.keys() {
            let value = row.get(key).expect("key came from this row's own keys()");
            line_fields.push(escape_delimited_field(&value.as_text(), delimiter, quote));
        }
        writeln!(file, "{}", line_fields.join(&delimiter.to_string()))?;
    }
    Ok(())
}

fn escape_delimited_field(raw: &str, delimiter: char, quote: char) -> String {
    if raw.contains(delimiter) || raw.contains(quote) || raw.contains('\n') {
        format!("{quote}{}{quote}", raw.replace(quote, &format!("{quote}{quote}")))
    } else {
        raw.to_string()
    }
}

fn insert_object_stream(rows: &[Row], config: &TableConfig) -> Result<(), EngineError> {
    let mut file = OpenOptions::new().append(true).create(true).open(&config.file_path)?;
    for row in rows {
        writeln!(file, "{}", object_stream::row_to_line(row))?;
    }
    Ok(())
}

fn update(plan: &QueryPlan, config: &TableConfig) -> Result<ResultSet, EngineError> {
    let rows = read_table(config)?;
    let filter = plan.filter.as_ref().expect("checked by execute's safety gate");

    let mut affected = 0usize;
    let updated: Vec<Row> = rows
        .into_iter()
        .map(|row| {
            if !eval::matches(filter, &row) {
                return row;
            }
            affected += 1;
            let mut next = row.clone();
            for (column, expr) in &plan.set_clauses {
                // Evaluated against the pre-update row (not `next`), so column order in the
                // SET list never changes the result (§4.9).
                if let Ok(value) = eval::evaluate(expr, &row) {
                    next.insert(column.clone(), value);
                }
            }
            next
        })
        .collect();

    rewrite_table(config, &updated)?;
    tracing::debug!(table = %config.name, affected, "update committed");
    Ok(ResultSet::rows_affected(affected))
}

fn delete(plan: &QueryPlan, config: &TableConfig) -> Result<ResultSet, EngineError> {
    let rows = read_table(config)?;
    let filter = plan.filter.as_ref().expect("checked by execute's safety gate");

    let before = rows.len();
    let kept: Vec<Row> = rows.into_iter().filter(|row| !eval::matches(filter, row)).collect();
    let affected = before - kept.len();

    rewrite_table(config, &kept)?;
    tracing::debug!(table = %config.name, affected, "delete committed");
    Ok(ResultSet::rows_affected(affected))
}

/// Writes `rows` to `<path>.tmp` and atomically renames it over the original; the temp file
/// is removed instead of left behind on any failure in between (§4.9).
fn rewrite_table(config: &TableConfig, rows: &[Row]) -> Result<(), EngineError> {
    let tmp_path = format!("{}.tmp", config.file_path);
    let result = write_rows_to_path(&tmp_path, rows, config);
    match result {
        Ok(()) => {
            fs::rename(&tmp_path, &config.file_path)?;
            Ok(())
        }
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            Err(err)
        }
    }
}

fn write_rows_to_path(path: &str, rows: &[Row], config: &TableConfig) -> Result<(), EngineError> {
    let mut file = File::create(path)?;
    match config.format {
        Format::Delimited => {
            let delimiter = config.delimiter.chars().next().unwrap_or(',');
            let quote = config.quote.chars().next().unwrap_or('"');
            if config.has_header {
                if let Some(first) = rows.first() {
                    let header: Vec<String> =
                        first.keys().map(|k| escape_delimited_field(k, delimiter, quote)).collect();
                    writeln!(file, "{}", header.join(&delimiter.to_string()))?;
                } else if !config.columns.is_empty() {
                    let mut sorted = config.columns.clone();
                    sorted.sort_by_key(|c| c.index);
                    let header: Vec<String> = sorted.into_iter().map(|c| c.name).collect();
                    writeln!(file, "{}", header.join(&delimiter.to_string()))?;
                }
            }
            for row in rows {
                let fields: Vec<String> = row
                    .keys()
                    .map(|k| escape_delimited_field(&row.get(k).map(Value::as_text).unwrap_or_default(), delimiter, quote))
                    .collect();
                writeln!(file, "{}", fields.join(&delimiter.to_string()))?;
            }
        }
        Format::ObjectStream => {
            for row in rows {
                writeln!(file, "{}", object_stream::row_to_line(row))?;
            }
        }
        other => {
            return Err(EngineError::Unsupported(format!("UPDATE/DELETE rewrite of {other:?} format is not supported")));
        }
    }
    Ok(())
}
