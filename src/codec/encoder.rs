//! Record encoder
//!
//! Produces `key ✝✝ value ✝✝ ttl ✝✝` for records whose fields all fit the
//! token limit. Oversize records are rejected per field, never truncated.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use super::{Field, Record, DELIMITER};

/// Why a record was not encoded
///
/// Non-fatal: the writer drops the record, counts it, and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} is {len} bytes (limit {limit})")]
pub struct Rejection {
    /// First field found over the limit
    pub field: Field,
    pub len: usize,
    pub limit: usize,
}

/// Check every field against the exclusive `max_token_size` bound
pub fn check_record(record: &Record, max_token_size: usize) -> Result<(), Rejection> {
    for field in Field::ALL {
        let len = record.field(field).len();
        if len >= max_token_size {
            return Err(Rejection {
                field,
                len,
                limit: max_token_size,
            });
        }
    }
    Ok(())
}

/// Number of bytes `record` occupies on the wire
pub fn encoded_len(record: &Record) -> usize {
    record.key.len() + record.value.len() + record.ttl.len() + 3 * DELIMITER.len()
}

/// Append the wire form of `record` to `out`
///
/// Returns the number of bytes appended. Nothing is written on rejection.
pub fn encode_record_into<B: BufMut>(
    record: &Record,
    max_token_size: usize,
    out: &mut B,
) -> Result<usize, Rejection> {
    check_record(record, max_token_size)?;

    for field in Field::ALL {
        out.put_slice(record.field(field).as_bytes());
        out.put_slice(DELIMITER);
    }

    Ok(encoded_len(record))
}

/// Encode `record` into a fresh buffer
pub fn encode_record(record: &Record, max_token_size: usize) -> Result<Bytes, Rejection> {
    let mut buf = BytesMut::with_capacity(encoded_len(record));
    encode_record_into(record, max_token_size, &mut buf)?;
    Ok(buf.freeze())
}
