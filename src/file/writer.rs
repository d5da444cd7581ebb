//! File Writer
//!
//! Drains the bus and encodes records into a freshly truncated file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::BytesMut;

use crate::bus::Subscriber;
use crate::cancel::CancelToken;
use crate::codec::encode_record_into;
use crate::config::Config;
use crate::error::Result;
use crate::progress::{Progress, Side, Silent, Summary};

use super::WriteSummary;

/// Consumer half of a file transfer
pub struct FileWriter {
    path: PathBuf,
    bus: Subscriber,
    config: Config,
    cancel: CancelToken,
    progress: Arc<dyn Progress>,
}

impl FileWriter {
    /// Create a writer; the file is created or truncated when `run` starts
    pub fn new(path: impl Into<PathBuf>, bus: Subscriber, config: &Config, cancel: CancelToken) -> Self {
        Self {
            path: path.into(),
            bus,
            config: config.clone(),
            cancel,
            progress: Arc::new(Silent),
        }
    }

    /// Report progress to `progress` instead of discarding it
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Write every batch from the bus until it closes (blocking)
    ///
    /// On cancellation the bytes already buffered are flushed before
    /// [`crate::KvError::Cancelled`] is returned.
    pub fn run(self) -> Result<WriteSummary> {
        let FileWriter {
            path,
            mut bus,
            config,
            cancel,
            progress,
        } = self;

        tracing::debug!(path = %path.display(), "File write started");
        let result = write_from(&path, &mut bus, &config, &cancel, progress.as_ref());

        match &result {
            Ok(summary) => {
                tracing::info!(
                    path = %path.display(),
                    records = summary.records,
                    rejected = summary.rejected,
                    bytes = summary.bytes,
                    "File write finished"
                );
                progress.completed(Summary::Write(summary));
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "File write stopped");
                progress.failed(Side::Write, e);
            }
        }

        result
    }
}

fn write_from(
    path: &Path,
    bus: &mut Subscriber,
    config: &Config,
    cancel: &CancelToken,
    progress: &dyn Progress,
) -> Result<WriteSummary> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    let mut summary = WriteSummary::default();

    let outcome = drain(&mut out, bus, config, cancel, progress, &mut summary);

    // Flush whatever was accepted, cancelled or not
    let flushed = out.flush();
    match outcome {
        Ok(()) => {
            flushed?;
            Ok(summary)
        }
        Err(e) => {
            if let Err(flush_err) = flushed {
                tracing::warn!(error = %flush_err, "Flush after failed write also failed");
            }
            Err(e)
        }
    }
}

fn drain<W: Write>(
    out: &mut W,
    bus: &mut Subscriber,
    config: &Config,
    cancel: &CancelToken,
    progress: &dyn Progress,
    summary: &mut WriteSummary,
) -> Result<()> {
    let mut scratch = BytesMut::new();

    while let Some(batch) = bus.consume(cancel)? {
        for record in batch {
            let record = if config.forward_ttl {
                record
            } else {
                record.without_ttl()
            };

            scratch.clear();
            match encode_record_into(&record, config.max_token_size, &mut scratch) {
                Ok(len) => {
                    out.write_all(&scratch)?;
                    summary.records += 1;
                    summary.bytes += len as u64;
                }
                Err(rejection) => {
                    summary.rejected += 1;
                    tracing::warn!(%rejection, "Dropping record with oversize field");
                    progress.record_rejected(&rejection);
                }
            }
        }

        summary.batches += 1;
        if !config.silent {
            progress.batch_written();
        }
    }

    Ok(())
}
