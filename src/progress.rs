//! Progress reporting
//!
//! Readers and writers report through an injected [`Progress`] observer
//! instead of printing. All hooks default to no-ops.

use std::io::Write;

use parking_lot::Mutex;

use crate::codec::Rejection;
use crate::error::KvError;
use crate::file::{ReadSummary, WriteSummary};

/// Which half of the pipeline a hook is reporting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Read,
    Write,
}

/// Final outcome handed to [`Progress::completed`]
#[derive(Debug, Clone, Copy)]
pub enum Summary<'a> {
    Read(&'a ReadSummary),
    Write(&'a WriteSummary),
}

/// Observer invoked at fixed points of a read or write
///
/// `record_read` and `batch_written` are skipped in silent mode; the other
/// hooks always fire.
pub trait Progress: Send + Sync {
    /// A record was published on the bus
    fn record_read(&self) {}

    /// A batch was consumed and encoded
    fn batch_written(&self) {}

    /// A record was dropped because a field was too large
    fn record_rejected(&self, _rejection: &Rejection) {}

    fn completed(&self, _summary: Summary<'_>) {}

    fn failed(&self, _side: Side, _error: &KvError) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {}

/// Writes `r` per record read and `w` per batch written
pub struct Ticker<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> Ticker<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn tick(&self, marker: &[u8]) {
        let mut out = self.out.lock();
        // Markers are best effort
        let _ = out.write_all(marker).and_then(|_| out.flush());
    }
}

impl Ticker<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Progress for Ticker<W> {
    fn record_read(&self) {
        self.tick(b"r");
    }

    fn batch_written(&self) {
        self.tick(b"w");
    }

    fn completed(&self, _summary: Summary<'_>) {
        self.tick(b"\n");
    }

    fn failed(&self, _side: Side, _error: &KvError) {
        self.tick(b"\n");
    }
}
