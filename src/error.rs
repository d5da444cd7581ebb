//! Error types for kvframe
//!
//! Provides a unified error type for all fatal outcomes. Oversize fields on
//! the encode path are not errors; see [`crate::codec::Rejection`].

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for kvframe operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Token {index} exceeds the maximum token size of {limit} bytes")]
    TokenTooLarge { limit: usize, index: u64 },

    #[error("Token {index} is not valid UTF-8")]
    InvalidUtf8 { index: u64 },

    #[error("Stream ended mid-record after {tokens} of 3 fields")]
    TruncatedRecord { tokens: usize },

    // -------------------------------------------------------------------------
    // Control Flow
    // -------------------------------------------------------------------------
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Bus consumer disconnected")]
    Disconnected,

    #[error("Batches published on the bus must hold at least one record")]
    EmptyBatch,

    #[error("Interrupt handler error: {0}")]
    Signal(#[from] ctrlc::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// True for an externally requested abort, as opposed to a data-path failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, KvError::Cancelled)
    }

    /// True for errors that come from the byte stream's framing
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            KvError::TokenTooLarge { .. } | KvError::InvalidUtf8 { .. } | KvError::TruncatedRecord { .. }
        )
    }
}
