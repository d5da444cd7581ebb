//! Stream decoders
//!
//! `TokenDecoder` splits an unbounded byte stream on the delimiter with a
//! bounded lookahead buffer. `RecordDecoder` groups its tokens into triples.
//!
//! Both are forward-only. Once they return `None` or an error they stay
//! exhausted and every further call returns `None`.

use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};

use crate::config::{Config, PartialRecordPolicy};
use crate::error::{KvError, Result};

use super::{Record, DELIMITER};

// =============================================================================
// Token Decoder
// =============================================================================

/// Lazy tokenizer over a byte stream
///
/// ## Memory
/// The buffer never grows past `max_token_size + DELIMITER.len() + chunk_size`
/// bytes: once the undelimited prefix reaches `max_token_size` the decoder
/// fails with [`KvError::TokenTooLarge`] instead of reading further.
pub struct TokenDecoder<R> {
    reader: R,
    buf: BytesMut,
    /// Bytes of `buf` already known not to start a delimiter
    scanned: usize,
    max_token_size: usize,
    chunk_size: usize,
    tokens: u64,
    discarded: usize,
    exhausted: bool,
}

impl<R: Read> TokenDecoder<R> {
    pub fn new(reader: R, max_token_size: usize, chunk_size: usize) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(chunk_size.max(DELIMITER.len())),
            scanned: 0,
            max_token_size,
            chunk_size: chunk_size.max(1),
            tokens: 0,
            discarded: 0,
            exhausted: false,
        }
    }

    /// Yield the bytes before the next delimiter, or `None` at end of stream
    pub fn next_token(&mut self) -> Result<Option<Bytes>> {
        if self.exhausted {
            return Ok(None);
        }

        loop {
            if let Some(pos) = find_delimiter(&self.buf, self.scanned) {
                if pos >= self.max_token_size {
                    return Err(self.too_large());
                }
                let token = self.buf.split_to(pos).freeze();
                self.buf.advance(DELIMITER.len());
                self.scanned = 0;
                self.tokens += 1;
                return Ok(Some(token));
            }

            // The last DELIMITER.len() - 1 bytes may hold a delimiter prefix
            self.scanned = self.buf.len().saturating_sub(DELIMITER.len() - 1);
            if self.scanned >= self.max_token_size {
                return Err(self.too_large());
            }

            if self.fill()? == 0 {
                self.exhausted = true;
                if !self.buf.is_empty() {
                    self.discarded = self.buf.len();
                    tracing::warn!(
                        bytes = self.discarded,
                        "Discarding unterminated bytes at end of stream"
                    );
                    self.buf.clear();
                }
                return Ok(None);
            }
        }
    }

    /// Tokens yielded so far
    pub fn tokens_read(&self) -> u64 {
        self.tokens
    }

    /// Unterminated bytes dropped at end of stream
    pub fn discarded_tail(&self) -> usize {
        self.discarded
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Read one chunk into the buffer, returning the byte count
    fn fill(&mut self) -> Result<usize> {
        let start = self.buf.len();
        self.buf.resize(start + self.chunk_size, 0);

        loop {
            match self.reader.read(&mut self.buf[start..]) {
                Ok(n) => {
                    self.buf.truncate(start + n);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    self.exhausted = true;
                    return Err(e.into());
                }
            }
        }
    }

    fn too_large(&mut self) -> KvError {
        self.exhausted = true;
        self.buf.clear();
        KvError::TokenTooLarge {
            limit: self.max_token_size,
            index: self.tokens,
        }
    }
}

impl<R: Read> Iterator for TokenDecoder<R> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Position of the first delimiter at or after `from`
fn find_delimiter(haystack: &[u8], from: usize) -> Option<usize> {
    if haystack.len() < from + DELIMITER.len() {
        return None;
    }
    haystack[from..]
        .windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
        .map(|pos| pos + from)
}

// =============================================================================
// Record Decoder
// =============================================================================

/// Groups tokens into key/value/ttl records
pub struct RecordDecoder<R> {
    tokens: TokenDecoder<R>,
    policy: PartialRecordPolicy,
    partial_records: u64,
    done: bool,
}

impl<R: Read> RecordDecoder<R> {
    pub fn new(reader: R, config: &Config) -> Self {
        Self {
            tokens: TokenDecoder::new(reader, config.max_token_size, config.read_chunk_size),
            policy: config.partial_record,
            partial_records: 0,
            done: false,
        }
    }

    /// Decode the next record, or `None` once the stream is exhausted
    ///
    /// A stream ending after one or two fields of a record is handled by the
    /// configured [`PartialRecordPolicy`].
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        if self.done {
            return Ok(None);
        }

        let mut fields: [String; 3] = Default::default();
        let mut filled = 0;

        while filled < fields.len() {
            let index = self.tokens.tokens_read();
            let token = match self.tokens.next_token() {
                Ok(Some(token)) => token,
                Ok(None) => break,
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            };
            match std::str::from_utf8(&token) {
                Ok(text) => fields[filled] = text.to_owned(),
                Err(_) => {
                    self.done = true;
                    return Err(KvError::InvalidUtf8 { index });
                }
            }
            filled += 1;
        }

        if filled == 0 {
            self.done = true;
            return Ok(None);
        }

        if filled < fields.len() {
            self.done = true;
            match self.policy {
                PartialRecordPolicy::Reject => {
                    return Err(KvError::TruncatedRecord { tokens: filled });
                }
                PartialRecordPolicy::Pad => {
                    self.partial_records += 1;
                    tracing::warn!(
                        fields = filled,
                        "Stream ended mid-record, padding missing fields with empty strings"
                    );
                }
            }
        }

        let [key, value, ttl] = fields;
        Ok(Some(Record { key, value, ttl }))
    }

    pub fn tokens_read(&self) -> u64 {
        self.tokens.tokens_read()
    }

    pub fn partial_records(&self) -> u64 {
        self.partial_records
    }

    pub fn discarded_tail(&self) -> usize {
        self.tokens.discarded_tail()
    }
}

impl<R: Read> Iterator for RecordDecoder<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
