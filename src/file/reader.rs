//! File Reader
//!
//! Decodes a delimited file and publishes its records on the bus.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bus::Publisher;
use crate::cancel::CancelToken;
use crate::codec::RecordDecoder;
use crate::config::Config;
use crate::error::Result;
use crate::progress::{Progress, Side, Silent, Summary};

use super::ReadSummary;

/// Producer half of a file transfer
///
/// Owns the bus publisher, so the bus is closed exactly once when `run`
/// returns, whatever the outcome.
pub struct FileReader {
    path: PathBuf,
    bus: Publisher,
    config: Config,
    cancel: CancelToken,
    progress: Arc<dyn Progress>,
}

impl FileReader {
    /// Create a reader for an existing file
    ///
    /// `config.silent` and `config.forward_ttl` control progress markers and
    /// ttl pass-through.
    pub fn new(path: impl Into<PathBuf>, bus: Publisher, config: &Config, cancel: CancelToken) -> Self {
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

    /// Read the whole file onto the bus (blocking)
    ///
    /// Returns [`crate::KvError::Cancelled`] if the token fires first. The bus
    /// is closed before this returns in every case.
    pub fn run(self) -> Result<ReadSummary> {
        let FileReader {
            path,
            mut bus,
            config,
            cancel,
            progress,
        } = self;

        tracing::debug!(path = %path.display(), "File read started");
        let result = read_into(&path, &mut bus, &config, &cancel, progress.as_ref());
        bus.close();

        match &result {
            Ok(summary) => {
                tracing::info!(
                    path = %path.display(),
                    records = summary.records,
                    partial = summary.partial_records,
                    "File read finished"
                );
                progress.completed(Summary::Read(summary));
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "File read stopped");
                progress.failed(Side::Read, e);
            }
        }

        result
    }
}

fn read_into(
    path: &Path,
    bus: &mut Publisher,
    config: &Config,
    cancel: &CancelToken,
    progress: &dyn Progress,
) -> Result<ReadSummary> {
    cancel.check()?;
    let file = File::open(path)?;
    let mut decoder = RecordDecoder::new(file, config);
    let mut summary = ReadSummary::default();

    loop {
        cancel.check()?;
        let record = match decoder.next_record()? {
            Some(record) => record,
            None => break,
        };
        let record = if config.forward_ttl {
            record
        } else {
            record.without_ttl()
        };

        bus.publish(vec![record], cancel)?;
        summary.records += 1;

        if !config.silent {
            progress.record_read();
        }
    }

    summary.tokens = decoder.tokens_read();
    summary.partial_records = decoder.partial_records();
    summary.discarded_bytes = decoder.discarded_tail();
    Ok(summary)
}
