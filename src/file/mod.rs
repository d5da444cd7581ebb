//! File Module
//!
//! Moves records between a delimited file and the bus.
//!
//! ## Responsibilities
//! - [`FileReader`]: open an existing file, decode triples, publish one
//!   record per batch, close the bus on every exit path
//! - [`FileWriter`]: truncate/create the file, drain the bus, encode through
//!   a buffered writer, flush before returning (cancelled or not)
//!
//! Both run on the caller's thread until done; the caller decides where
//! (see [`crate::pipeline`] for one wiring).

mod reader;
mod writer;

pub use reader::FileReader;
pub use writer::FileWriter;

/// Outcome of a successful [`FileReader::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadSummary {
    /// Records published on the bus
    pub records: u64,

    /// Delimited tokens decoded
    pub tokens: u64,

    /// Records padded because the stream ended mid-triple
    pub partial_records: u64,

    /// Unterminated bytes dropped at end of file
    pub discarded_bytes: usize,
}

/// Outcome of a successful [`FileWriter::run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Batches consumed from the bus
    pub batches: u64,

    /// Records encoded into the file
    pub records: u64,

    /// Records dropped for an oversize field
    pub rejected: u64,

    /// Bytes written to the file
    pub bytes: u64,
}
