//! Segmented parallel reader (§4.6): splits a seekable file into record-aligned byte ranges
//! and fans them out to `worker_threads` producer threads.
//!
//! Each worker opens its own file handle, reads its segment with a positional seek, prepends
//! the captured header line for delimited tables, and runs the same per-format parser as
//! [`crate::format`] before chunking and sending downstream. Chunk identifiers are assigned
//! from one shared counter at send time, so they reflect collector arrival order rather than
//! source position — chunks from different workers can and do arrive interleaved.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use memchr::memchr;

use super::Cancellation;
use crate::chunk::Chunk;
use crate::config::{Format, TableConfig};
use crate::error::EngineError;
use crate::format::{delimited, object_stream};
use crate::row::Row;

/// The minimum per-worker segment size; below this the parallel path isn't worth the fixed
/// cost of spawning threads and degrades to sequential (§4.6 step 2).
const MIN_SEGMENT_BYTES: u64 = 1024;

/// Attempts the parallel path. Returns `None` when the source isn't a plain local file, the
/// table is empty, or the computed per-worker segment falls below [`MIN_SEGMENT_BYTES`] —
/// every `None` path is a deliberate degrade to the sequential reader, never a silent
/// zero-row result.
#[must_use]
pub fn try_stream(config: &TableConfig, cancel: &Cancellation) -> Option<Receiver<Result<Chunk, EngineError>>> {
    let mut file = File::open(&config.file_path).ok()?;
    let file_size = file.metadata().ok()?.len();
    let worker_count = config.resolved_worker_threads().max(1);

    let header = if config.format == Format::Delimited && config.has_header {
        Some(read_header_line(&mut file)?)
    } else {
        None
    };
    let header_len = header.as_ref().map_or(0, |(_, len)| *len);
    if file_size <= header_len {
        return None;
    }

    let body_len = file_size - header_len;
    let seg = body_len / worker_count as u64;
    if seg < MIN_SEGMENT_BYTES {
        return None;
    }

    let boundaries = compute_boundaries(&config.file_path, header_len, file_size, seg, worker_count)?;

    let (tx, rx) = bounded(config.resolved_buffer_size());
    let next_id = Arc::new(AtomicU64::new(0));
    let header_line = header.map(|(line, _)| line);

    for i in 0..worker_count {
        let start = boundaries[i];
        let end = boundaries[i + 1];
        if start >= end {
            continue;
        }
        let config = config.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();
        let next_id = Arc::clone(&next_id);
        let header_line = header_line.clone();
        thread::spawn(move || {
            worker_read_segment(&config, start, end, header_line, &cancel, &next_id, &tx);
        });
    }
    drop(tx);
    Some(rx)
}

/// Reads the first physical line (header_len counts its trailing newline). Returns `None`
/// for an empty file, which callers treat as "not parallelizable".
fn read_header_line(file: &mut File) -> Option<(String, u64)> {
    let mut reader = BufReader::new(file.try_clone().ok()?);
    let mut line = String::new();
    let n = reader.read_line(&mut line).ok()?;
    if n == 0 {
        return None;
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).to_string();
    Some((trimmed, n as u64))
}

/// Computes `worker_count + 1` boundaries `[b0, b1, .., bN]` such that worker `i` reads
/// `[b_i, b_{i+1})`. Interior boundaries are advanced to the next newline (§4.6 step 4) so
/// adjacent workers agree on exactly the same split point and no record straddles two
/// segments; `b0 = header_len` and `bN = file_size` are already aligned.
fn compute_boundaries(
    path: &str,
    header_len: u64,
    file_size: u64,
    seg: u64,
    worker_count: usize,
) -> Option<Vec<u64>> {
    let mut boundaries = Vec::with_capacity(worker_count + 1);
    boundaries.push(header_len);
    for i in 1..worker_count {
        let raw = header_len + seg * i as u64;
        boundaries.push(next_record_boundary(path, raw, file_size)?);
    }
    boundaries.push(file_size);
    Some(boundaries)
}

/// Scans forward from `raw` for the next newline and returns the offset just past it, or
/// `file_size` if none remains (the tentative segment trails to end of file).
fn next_record_boundary(path: &str, raw: u64, file_size: u64) -> Option<u64> {
    if raw >= file_size {
        return Some(file_size);
    }
    let mut file = File::open(path).ok()?;
    file.seek(SeekFrom::Start(raw)).ok()?;

    let mut pos = raw;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).ok()?;
        if n == 0 {
            return Some(file_size);
        }
        if let Some(idx) = memchr(b'\n', &buf[..n]) {
            return Some(pos + idx as u64 + 1);
        }
        pos += n as u64;
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_read_segment(
    config: &TableConfig,
    start: u64,
    end: u64,
    header_line: Option<String>,
    cancel: &Cancellation,
    next_id: &AtomicU64,
    tx: &crossbeam_channel::Sender<Result<Chunk, EngineError>>,
) {
    if cancel.check().is_err() {
        return;
    }

    let rows = match read_segment_rows(config, start, end, header_line.as_deref()) {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!(table = %config.name, start, end, error = %err, "segment read failed");
            let _ = tx.send(Err(err));
            return;
        }
    };

    let chunk_size = config.resolved_chunk_size().max(1);
    for slice in rows.chunks(chunk_size) {
        if cancel.check().is_err() {
            tracing::debug!(table = %config.name, start, end, "worker segment cancelled");
            return;
        }
        let id = next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(table = %config.name, start, end, chunk = id, rows = slice.len(), "parallel chunk ready");
        if tx.send(Ok(Chunk::new(id, slice.to_vec(), start, end))).is_err() {
            return;
        }
    }
}

fn read_segment_rows(
    config: &TableConfig,
    start: u64,
    end: u64,
    header_line: Option<&str>,
) -> Result<Vec<Row>, EngineError> {
    let mut file = File::open(&config.file_path)?;
    file.seek(SeekFrom::Start(start))?;
    let mut body = vec![0u8; (end - start) as usize];
    file.read_exact(&mut body)?;

    let mut data = Vec::with_capacity(body.len() + 1);
    if let Some(header) = header_line {
        data.extend_from_slice(header.as_bytes());
        data.push(b'\n');
    }
    data.extend_from_slice(&body);

    match config.format {
        Format::Delimited => delimited::read_rows(Cursor::new(data), config),
        Format::ObjectStream => object_stream::read_rows(Cursor::new(data), config),
        other => unreachable!("parallel reader only handles record-boundary-safe formats, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_for(path: &str, workers: usize) -> TableConfig {
        TableConfig {
            name: "t".to_string(),
            file_path: path.to_string(),
            format: Format::Delimited,
            delimiter: ",".to_string(),
            has_header: true,
            columns: Vec::new(),
            quote: "\"".to_string(),
            escape: "\\".to_string(),
            max_columns: 0,
            trim_spaces: true,
            allow_quoted: true,
            strict_quotes: false,
            skip_empty_lines: true,
            parallel_reading: true,
            worker_threads: workers,
            chunk_size: 100,
            buffer_size: 100,
        }
    }

    fn big_csv(rows: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id,name,filler").unwrap();
        for i in 0..rows {
            writeln!(file, "{i},name{i},{}", "x".repeat(80)).unwrap();
        }
        file
    }

    #[test]
    fn test_degrades_to_none_below_segment_floor() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id,name").unwrap();
        writeln!(file, "1,Ada").unwrap();
        let config = config_for(file.path().to_str().unwrap(), 4);
        assert!(try_stream(&config, &Cancellation::far_future()).is_none());
    }

    #[test]
    fn test_boundary_adjustment_never_splits_a_record() {
        let file = big_csv(400);
        let path = file.path().to_str().unwrap();
        let config = config_for(path, 4);
        let rx = try_stream(&config, &Cancellation::far_future()).expect("should parallelize");
        let mut rows: Vec<Row> = rx.iter().flat_map(|r| r.unwrap().rows).collect();
        rows.sort_by_key(|r| r.get("id").and_then(Value::as_i64).unwrap());
        assert_eq!(rows.len(), 400);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.get("id").and_then(Value::as_i64), Some(i as i64));
        }
    }

    #[test]
    fn test_parallel_multiset_matches_sequential() {
        let file = big_csv(250);
        let path = file.path().to_str().unwrap();
        let parallel_config = config_for(path, 3);
        let rx = try_stream(&parallel_config, &Cancellation::far_future()).expect("should parallelize");
        let mut parallel_ids: Vec<i64> = rx
            .iter()
            .flat_map(|r| r.unwrap().rows)
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .collect();
        parallel_ids.sort_unstable();

        let mut sequential_config = parallel_config;
        sequential_config.parallel_reading = false;
        let sequential_rows = crate::format::read_table(&sequential_config).unwrap();
        let mut sequential_ids: Vec<i64> = sequential_rows
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .collect();
        sequential_ids.sort_unstable();

        assert_eq!(parallel_ids, sequential_ids);
    }

    #[test]
    fn test_next_record_boundary_at_eof_returns_file_size() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "abc").unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(next_record_boundary(path, 1, 3), Some(3));
    }
}
