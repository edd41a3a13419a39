//! Inbound message decoding.
//!
//! A message is one JSON object.  Field values are read leniently: strings,
//! numbers and booleans are all accepted and handed to the validators as
//! text, so `"job": 3` and `"job": "3"` mean the same thing.

use serde_json::{Map, Value};

/// A decoded inbound JSON object.
#[derive(Debug, Clone)]
pub struct Message {
    fields: Map<String, Value>,
}

impl Message {
    /// Decode `line`.  The error string is the decoder's diagnostic.
    pub fn parse(line: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(_) => Err(String::from("expected a JSON object")),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Text form of a scalar field.  Objects, arrays and null are treated
    /// as absent.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Whether `key` is present with a usable value.
    pub fn has(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Job id: a non-negative integer fitting in `u32`, given as a number
    /// or a decimal string.
    pub fn job(&self) -> Option<u32> {
        self.field("job").as_deref().and_then(parse_unsigned)
    }
}

/// Parse a plain decimal unsigned integer.  Rejects signs, fractions and
/// surrounding whitespace.
pub fn parse_unsigned<T: core::str::FromStr>(text: &str) -> Option<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
