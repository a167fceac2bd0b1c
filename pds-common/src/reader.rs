//! # Reply Reader Capability
//!
//! Purpose: Describe the primitive reads the command layer needs from a
//! decoded reply stream, independent of the transport underneath.
//!
//! ## Design Principles
//! 1. **Capability, Not Transport**: Decoders depend on this trait only, so
//!    tests can feed in-memory replies.
//! 2. **Pull Model**: Each call consumes exactly one wire element (or one
//!    aggregate header), mirroring how replies are framed.
//! 3. **Fail Fast**: Every primitive returns `ProtoError` instead of guessing.

use std::fmt;

use crate::error::ProtoResult;

/// Wire type tag of a reply element (RESP2 and RESP3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RespType {
    /// `+OK`
    Status,
    /// `-ERR ...` or `!<len>` blob error.
    Error,
    /// `:123`
    Int,
    /// `$<len>` bulk string.
    Bulk,
    /// `*<len>`
    Array,
    /// `%<len>` (RESP3)
    Map,
    /// `,1.5` (RESP3)
    Double,
    /// `#t` / `#f` (RESP3)
    Bool,
    /// `_` (RESP3)
    Null,
    /// `(1234...` (RESP3)
    BigNumber,
    /// `=<len>` verbatim string (RESP3)
    Verbatim,
    /// `~<len>` (RESP3)
    Set,
    /// `><len>` (RESP3)
    Push,
}

impl RespType {
    /// Maps a leading type byte to its tag.
    pub fn from_byte(byte: u8) -> Option<Self> {
        let kind = match byte {
            b'+' => RespType::Status,
            b'-' | b'!' => RespType::Error,
            b':' => RespType::Int,
            b'$' => RespType::Bulk,
            b'*' => RespType::Array,
            b'%' => RespType::Map,
            b',' => RespType::Double,
            b'#' => RespType::Bool,
            b'_' => RespType::Null,
            b'(' => RespType::BigNumber,
            b'=' => RespType::Verbatim,
            b'~' => RespType::Set,
            b'>' => RespType::Push,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true for types whose header carries an element count.
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            RespType::Array | RespType::Map | RespType::Set | RespType::Push
        )
    }
}

impl fmt::Display for RespType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RespType::Status => "status",
            RespType::Error => "error",
            RespType::Int => "integer",
            RespType::Bulk => "bulk string",
            RespType::Array => "array",
            RespType::Map => "map",
            RespType::Double => "double",
            RespType::Bool => "boolean",
            RespType::Null => "null",
            RespType::BigNumber => "big number",
            RespType::Verbatim => "verbatim string",
            RespType::Set => "set",
            RespType::Push => "push",
        };
        f.write_str(name)
    }
}

/// Primitive reads over a reply stream.
///
/// Error replies surface as `ProtoError::Server` from whichever read meets
/// them. Nulls surface as `ProtoError::Nil` except from
/// `read_nullable_string`.
pub trait ReplyReader {
    /// Returns the type of the next element without consuming it.
    fn peek_type(&mut self) -> ProtoResult<RespType>;

    /// Reads a map header and returns the number of key/value pairs.
    ///
    /// An even-length array is accepted as a flattened map (RESP2 form).
    fn read_map_len(&mut self) -> ProtoResult<usize>;

    /// Reads an array, set or push header and returns the element count.
    fn read_array_len(&mut self) -> ProtoResult<usize>;

    /// Reads a status, bulk, verbatim or numeric element as text.
    fn read_string(&mut self) -> ProtoResult<String>;

    /// Like `read_string`, but a null element yields `None`.
    fn read_nullable_string(&mut self) -> ProtoResult<Option<String>>;

    /// Reads a bulk, verbatim or status element as raw bytes.
    fn read_bytes(&mut self) -> ProtoResult<Vec<u8>>;

    /// Reads an integer (also parsed from status/bulk text and booleans).
    fn read_int(&mut self) -> ProtoResult<i64>;

    /// Reads a double (also parsed from status/bulk text and integers).
    fn read_float(&mut self) -> ProtoResult<f64>;

    /// Reads a boolean (RESP3 boolean or integer 0/1).
    fn read_bool(&mut self) -> ProtoResult<bool>;
}
