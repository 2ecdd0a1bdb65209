//! Chunk stream producers: turn a [`TableConfig`] into a bounded stream of [`Chunk`]s.
//!
//! [`stream`] is the single entry point every executor uses to read a table. It chooses
//! between the sequential path (one producer thread, full per-format decode under
//! [`crate::format::read_table`], then re-chunked) and the parallel path
//! ([`parallel::try_stream`]: `N` producer threads over record-aligned byte segments, §4.6),
//! and returns a [`crossbeam_channel::Receiver`] uniform across both so callers never need
//! to know which path ran.

pub mod parallel;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver};

use crate::chunk::Chunk;
use crate::config::{Format, TableConfig};
use crate::error::EngineError;
use crate::format;

/// A deadline plus a shared trip flag, checked at every suspension point named in §5.
///
/// Cloning shares the underlying flag: tripping one clone (the streaming executor, on
/// satisfying `LIMIT` early) is observed by every producer thread holding another clone, so
/// a satisfied `LIMIT` stops in-flight parallel workers rather than waiting for them to
/// exhaust their segments.
#[derive(Clone)]
pub struct Cancellation {
    deadline: Instant,
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// Builds a cancellation token that trips once `deadline` passes.
    #[must_use]
    pub fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A token that never trips on its own deadline; useful for tests and for callers that
    /// only want explicit cancellation.
    #[must_use]
    pub fn far_future() -> Self {
        Self::new(Instant::now() + std::time::Duration::from_secs(3600))
    }

    /// Trips the shared flag immediately; every clone observes it on its next [`Self::check`].
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Checks whether this token has tripped, either explicitly or because the deadline has
    /// elapsed.
    ///
    /// # Errors
    /// Returns [`EngineError::Cancel`] once tripped.
    pub fn check(&self) -> Result<(), EngineError> {
        if self.flag.load(Ordering::Relaxed) {
            return Err(EngineError::Cancel("query cancelled".to_string()));
        }
        if Instant::now() >= self.deadline {
            self.flag.store(true, Ordering::Relaxed);
            return Err(EngineError::Cancel("deadline elapsed".to_string()));
        }
        Ok(())
    }
}

/// Whether `config` is eligible for the parallel segmented reader (§4.6): a seekable local
/// file, not gzip-wrapped, in a record-boundary-safe format, with `parallel_reading` set.
///
/// Object-array, document-list, and columnar formats are never split: their encodings
/// cannot be parsed from an arbitrary byte offset without a streaming tokenizer, so they
/// always take the sequential path regardless of this flag.
#[must_use]
pub fn eligible_for_parallel(config: &TableConfig) -> bool {
    config.parallel_reading
        && !config.is_gzipped()
        && matches!(config.format, Format::Delimited | Format::ObjectStream)
}

/// Opens `config`'s table and returns a bounded stream of chunks.
///
/// Every failure (including "file not found") surfaces as the first and only item sent on
/// the returned channel rather than as a synchronous `Err`, so callers always get a uniform
/// `Receiver` to drain regardless of which path is taken.
#[must_use]
pub fn stream(config: TableConfig, cancel: Cancellation) -> Receiver<Result<Chunk, EngineError>> {
    if eligible_for_parallel(&config) {
        if let Some(rx) = parallel::try_stream(&config, &cancel) {
            return rx;
        }
        tracing::warn!(table = %config.name, "parallel reader degraded to sequential");
    }
    sequential_stream(config, cancel)
}

fn sequential_stream(config: TableConfig, cancel: Cancellation) -> Receiver<Result<Chunk, EngineError>> {
    let (tx, rx) = bounded(config.resolved_buffer_size());
    thread::spawn(move || {
        let rows = match format::read_table(&config) {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(table = %config.name, error = %err, "sequential read failed");
                let _ = tx.send(Err(err));
                return;
            }
        };

        let chunk_size = config.resolved_chunk_size().max(1);
        for (id, slice) in rows.chunks(chunk_size).enumerate() {
            if cancel.check().is_err() {
                tracing::debug!(table = %config.name, "sequential reader cancelled");
                return;
            }
            let start = (id * chunk_size) as u64;
            let end = start + slice.len() as u64;
            tracing::debug!(table = %config.name, chunk = id, rows = slice.len(), "chunk ready");
            if tx.send(Ok(Chunk::new(id as u64, slice.to_vec(), start, end))).is_err() {
                return;
            }
        }
    });
    rx
}
