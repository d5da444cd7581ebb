//! Pipeline wiring
//!
//! Runs a [`FileReader`] and a consumer on scoped threads joined by a bus.
//! No codec logic lives here.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use crate::bus;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{KvError, Result};
use crate::file::{FileReader, FileWriter, ReadSummary, WriteSummary};
use crate::progress::Progress;

/// Outcome of [`copy_file`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub read: ReadSummary,
    pub write: WriteSummary,
}

/// Re-encode `src` into `dst` through a bus
///
/// Oversize records are dropped and counted in `write.rejected`. If both
/// sides fail, the error that caused the other is reported: a reader failure
/// wins unless the reader only saw the writer disconnect.
pub fn copy_file(
    src: &Path,
    dst: &Path,
    config: &Config,
    cancel: &CancelToken,
    progress: Arc<dyn Progress>,
) -> Result<CopySummary> {
    let (publisher, subscriber) = bus::bounded(config.bus_capacity);
    let reader = FileReader::new(src, publisher, config, cancel.clone()).with_progress(Arc::clone(&progress));
    let writer = FileWriter::new(dst, subscriber, config, cancel.clone()).with_progress(progress);

    let (read, write) = thread::scope(|scope| {
        let read = scope.spawn(move || reader.run());
        let write = scope.spawn(move || writer.run());
        (join(read), join(write))
    });

    match (read, write) {
        (Ok(read), Ok(write)) => Ok(CopySummary { read, write }),
        (Err(KvError::Disconnected), Err(e)) => Err(e),
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e),
    }
}

/// Count the records in `path` without writing anything
pub fn count_records(path: &Path, config: &Config, cancel: &CancelToken) -> Result<u64> {
    let (publisher, mut subscriber) = bus::bounded(config.bus_capacity);
    let reader = FileReader::new(path, publisher, config, cancel.clone());

    thread::scope(|scope| {
        let read = scope.spawn(move || reader.run());

        let mut records = 0u64;
        let consumed = loop {
            match subscriber.consume(cancel) {
                Ok(Some(batch)) => records += batch.len() as u64,
                Ok(None) => break Ok(records),
                Err(e) => break Err(e),
            }
        };
        // Unblocks the reader if we stopped early
        drop(subscriber);

        let summary = join(read)?;
        let records = consumed?;
        debug_assert_eq!(summary.records, records);
        Ok(records)
    })
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T>>) -> Result<T> {
    match handle.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
