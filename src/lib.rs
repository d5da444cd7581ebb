//! # kvframe
//!
//! Streams key/value/ttl records between a delimited text file and an
//! in-process bus:
//! - Lazy, bounded-memory decoding on a multi-byte delimiter
//! - Byte-exact re-encoding with per-field size rejection
//! - Single-producer/single-consumer bus with close owned by the producer
//! - Cooperative cancellation at every blocking point
//!
//! ## Architecture Overview
//!
//! ```text
//!  input file                                           output file
//!      │                                                     ▲
//!      ▼                                                     │
//! ┌──────────────┐   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │RecordDecoder │──▶│ FileReader  │   │ FileWriter  │──▶│encode_record │
//! │ (codec)      │   │ (publisher) │   │ (subscriber)│   │ (codec)      │
//! └──────────────┘   └──────┬──────┘   └──────▲──────┘   └──────────────┘
//!                           │      Bus        │
//!                           └─────────────────┘
//!                  CancelToken observed by both sides
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod bus;
pub mod cancel;
pub mod progress;
pub mod file;
pub mod pipeline;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, PartialRecordPolicy};
pub use codec::{Batch, Record, Rejection};
pub use cancel::CancelToken;
pub use file::{FileReader, FileWriter};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvframe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
