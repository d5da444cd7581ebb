//! Configuration for kvframe
//!
//! Centralized configuration with sensible defaults.

use crate::codec::{DEFAULT_MAX_TOKEN_SIZE, DEFAULT_READ_CHUNK_SIZE};
use crate::error::{KvError, Result};

/// Main configuration shared by readers, writers and the bus
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Exclusive upper bound on the length of a single field (in bytes)
    pub max_token_size: usize,

    /// Bytes requested from the input stream per read call
    pub read_chunk_size: usize,

    /// What to do when the input ends with one or two dangling fields
    pub partial_record: PartialRecordPolicy,

    // -------------------------------------------------------------------------
    // Bus Configuration
    // -------------------------------------------------------------------------
    /// Number of batches the bus holds before publish blocks
    pub bus_capacity: usize,

    // -------------------------------------------------------------------------
    // Behaviour Flags
    // -------------------------------------------------------------------------
    /// Suppress per-record and per-batch progress markers
    pub silent: bool,

    /// Pass ttl values through; when false the ttl field is emptied
    pub forward_ttl: bool,
}

/// Handling of a record cut short by the end of the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialRecordPolicy {
    /// Publish the record with the missing fields set to empty strings
    Pad,

    /// Fail the read with [`KvError::TruncatedRecord`]
    Reject,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_token_size: DEFAULT_MAX_TOKEN_SIZE, // 1 MiB
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE, // 64 KiB
            partial_record: PartialRecordPolicy::Pad,
            bus_capacity: 1,
            silent: false,
            forward_ttl: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum token size (exclusive, in bytes)
    pub fn max_token_size(mut self, size: usize) -> Self {
        self.config.max_token_size = size;
        self
    }

    /// Set the read chunk size (in bytes)
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    /// Set the partial record policy
    pub fn partial_record(mut self, policy: PartialRecordPolicy) -> Self {
        self.config.partial_record = policy;
        self
    }

    /// Set the bus capacity (in batches)
    pub fn bus_capacity(mut self, capacity: usize) -> Self {
        self.config.bus_capacity = capacity;
        self
    }

    /// Enable or disable silent mode
    pub fn silent(mut self, silent: bool) -> Self {
        self.config.silent = silent;
        self
    }

    /// Enable or disable ttl forwarding
    pub fn forward_ttl(mut self, forward: bool) -> Self {
        self.config.forward_ttl = forward;
        self
    }

    pub fn build(self) -> Result<Config> {
        let config = self.config;
        if config.max_token_size == 0 {
            return Err(KvError::Config("max_token_size must be positive".to_string()));
        }
        if config.read_chunk_size == 0 {
            return Err(KvError::Config("read_chunk_size must be positive".to_string()));
        }
        if config.bus_capacity == 0 {
            return Err(KvError::Config("bus_capacity must be positive".to_string()));
        }
        Ok(config)
    }
}
