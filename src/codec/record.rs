//! Record definitions
//!
//! Defines the key/value/ttl triple carried through the pipeline.

use std::fmt;

/// A single key/value/ttl triple
///
/// `ttl` is opaque: an empty string means "no expiry" and nothing in this
/// crate parses it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub value: String,
    pub ttl: String,
}

/// Unit of transfer on the bus; always holds at least one record when published
pub type Batch = Vec<Record>;

impl Record {
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl: ttl.into(),
        }
    }

    /// Same record with the ttl field emptied
    pub fn without_ttl(mut self) -> Self {
        self.ttl.clear();
        self
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Key => &self.key,
            Field::Value => &self.value,
            Field::Ttl => &self.ttl,
        }
    }
}

/// Positional field of a record, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Key,
    Value,
    Ttl,
}

impl Field {
    /// All fields in the order they appear on the wire
    pub const ALL: [Field; 3] = [Field::Key, Field::Value, Field::Ttl];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Key => "key",
            Field::Value => "value",
            Field::Ttl => "ttl",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_ttl() {
        let record = Record::new("k", "v", "100").without_ttl();
        assert_eq!(record, Record::new("k", "v", ""));
    }

    #[test]
    fn test_field_accessor_follows_wire_order() {
        let record = Record::new("k", "v", "t");
        let fields: Vec<&str> = Field::ALL.iter().map(|f| record.field(*f)).collect();
        assert_eq!(fields, vec!["k", "v", "t"]);
    }
}
