//! Codec Module
//!
//! Pure encode/decode logic for the delimited key/value/ttl file format.
//! Nothing here spawns threads or touches a file path; decoders work over any
//! `Read`, encoders over any `BufMut`.
//!
//! ## File Format
//! ```text
//! ┌───────┬──────┬───────┬──────┬───────┬──────┬───────┬──────┬─────
//! │  key  │ ✝✝   │ value │ ✝✝   │  ttl  │ ✝✝   │  key  │ ✝✝   │ ...
//! └───────┴──────┴───────┴──────┴───────┴──────┴───────┴──────┴─────
//! ```
//!
//! Every field is *terminated* by the delimiter, including the last one.
//! Fields are grouped positionally in triples: key, value, ttl.
//!
//! ## Limitations
//! There is no escaping. A field value containing the delimiter sequence
//! cannot be represented; callers must not produce such values. The encoder
//! does not scan for it.

mod record;
mod decoder;
mod encoder;

pub use record::{Batch, Field, Record};
pub use decoder::{RecordDecoder, TokenDecoder};
pub use encoder::{check_record, encode_record, encode_record_into, encoded_len, Rejection};

/// Field terminator: U+271D LATIN CROSS, twice (6 bytes of UTF-8)
pub const DELIMITER: &[u8] = "✝✝".as_bytes();

/// Default exclusive upper bound on a field's length (1 MiB)
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 1024 * 1024;

/// Default number of bytes requested per read from the input stream (64 KiB)
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;
