//! # Command Arguments
//!
//! Purpose: Represent one token of a command request with its native type so
//! builders never format numbers by hand.
//!
//! ## Design Principles
//! 1. **Typed Tokens**: Integers and floats stay numeric until framing.
//! 2. **Binary-Safe**: Byte payloads are carried as `Bytes`, never re-encoded.
//! 3. **Deterministic Rendering**: The same token always renders the same bytes.
//!
//! ## Rendering Rules
//!
//! ```text
//! Bytes(b"f")   -> f
//! Int(1000)     -> 1000
//! Float(0.01)   -> 0.01      (shortest round-trip form, never an exponent)
//! Float(1000.0) -> 1000
//! ```

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;

/// One token of a command request.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Raw bytes: command names, keys, keywords and items.
    Bytes(Bytes),
    /// Signed integer rendered in decimal.
    Int(i64),
    /// Floating-point value rendered in plain decimal notation.
    Float(f64),
}

impl Arg {
    /// Builds a token from a borrowed byte slice (copies once).
    pub fn bytes(data: impl AsRef<[u8]>) -> Self {
        Arg::Bytes(Bytes::copy_from_slice(data.as_ref()))
    }

    /// Builds a token from a static keyword without copying.
    pub const fn keyword(word: &'static str) -> Self {
        Arg::Bytes(Bytes::from_static(word.as_bytes()))
    }

    /// Returns the exact bytes sent on the wire for this token.
    pub fn to_wire(&self) -> Cow<'_, [u8]> {
        match self {
            Arg::Bytes(data) => Cow::Borrowed(data.as_ref()),
            Arg::Int(value) => Cow::Owned(encode_i64(*value)),
            Arg::Float(value) => Cow::Owned(value.to_string().into_bytes()),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Bytes(data) => write!(f, "{}", String::from_utf8_lossy(data)),
            Arg::Int(value) => write!(f, "{}", value),
            Arg::Float(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::bytes(value)
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Bytes(Bytes::from(value))
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::bytes(value)
    }
}

impl From<&[u8]> for Arg {
    fn from(value: &[u8]) -> Self {
        Arg::bytes(value)
    }
}

impl<const N: usize> From<&[u8; N]> for Arg {
    fn from(value: &[u8; N]) -> Self {
        Arg::bytes(value)
    }
}

impl From<Vec<u8>> for Arg {
    fn from(value: Vec<u8>) -> Self {
        Arg::Bytes(Bytes::from(value))
    }
}

impl From<Bytes> for Arg {
    fn from(value: Bytes) -> Self {
        Arg::Bytes(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Arg::Int(i64::from(value))
    }
}

/// Used for element counts. A count above `i64::MAX` cannot come from an
/// in-memory collection; it trips a debug assertion and saturates in release.
impl From<usize> for Arg {
    fn from(value: usize) -> Self {
        let converted = i64::try_from(value);
        debug_assert!(converted.is_ok(), "count {} does not fit in i64", value);
        Arg::Int(converted.unwrap_or(i64::MAX))
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Int(i64::from(value))
    }
}

fn encode_i64(value: i64) -> Vec<u8> {
    // Stack buffer keeps digit extraction allocation-free until the final copy.
    let mut buf = [0u8; 20];
    let mut len = 0;
    let mut magnitude = value.unsigned_abs();
    if magnitude == 0 {
        return vec![b'0'];
    }
    while magnitude > 0 {
        buf[len] = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
        len += 1;
    }

    let mut out = Vec::with_capacity(len + 1);
    if value < 0 {
        out.push(b'-');
    }
    out.extend(buf[..len].iter().rev());
    out
}
