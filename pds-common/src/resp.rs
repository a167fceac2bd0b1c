//! # RESP Framing and Reply Reading
//!
//! Purpose: Frame command requests and pull typed elements off a RESP2/RESP3
//! reply stream without building an intermediate value tree.
//!
//! ## Design Principles
//! 1. **State-Free Parsing**: Each read consumes one element top-down.
//! 2. **Buffer Reuse**: The reader keeps one line buffer for its lifetime.
//! 3. **Binary-Safe**: Bulk strings are treated as raw bytes.
//! 4. **Fail Fast**: Invalid framing returns protocol errors immediately.
//!
//! ## Accepted Reply Types
//!
//! ```text
//! RESP2: + - : $ *
//! RESP3: % , # _ ( = ~ > !
//! ```

use std::io::{self, BufRead, Read};

use bytes::{BufMut, BytesMut};

use crate::arg::Arg;
use crate::error::{ProtoError, ProtoResult};
use crate::reader::{ReplyReader, RespType};

/// Largest bulk payload accepted, matching the store's `proto-max-bulk-len` default.
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

const PAYLOAD_PREALLOC: usize = 64 * 1024;

/// Encodes a RESP array-of-bulk-strings command into the provided buffer.
pub fn encode_command(args: &[Arg], out: &mut BytesMut) {
    out.put_u8(b'*');
    push_usize(out, args.len());
    out.put_slice(b"\r\n");
    for arg in args {
        let wire = arg.to_wire();
        out.put_u8(b'$');
        push_usize(out, wire.len());
        out.put_slice(b"\r\n");
        out.put_slice(&wire);
        out.put_slice(b"\r\n");
    }
}

/// Streaming reply reader over any buffered byte source.
pub struct RespReader<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: BufRead> RespReader<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        RespReader {
            reader,
            line: Vec::with_capacity(128),
        }
    }

    /// Returns a shared reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns a mutable reference to the underlying reader.
    ///
    /// Used by connections to reach the stream for writes.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Unwraps the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads the next header line; error replies are consumed and returned as `Err`.
    fn read_header(&mut self) -> ProtoResult<RespType> {
        read_line(&mut self.reader, &mut self.line)?;
        let first = match self.line.first() {
            Some(byte) => *byte,
            None => return Err(ProtoError::protocol("empty reply line")),
        };
        let kind = RespType::from_byte(first).ok_or_else(|| {
            ProtoError::Protocol(format!("unknown reply type byte {:?}", first as char))
        })?;

        if kind == RespType::Error {
            let message = if first == b'!' {
                let len = self.header_len()?;
                self.read_payload(len)?.unwrap_or_default()
            } else {
                self.line[1..].to_vec()
            };
            return Err(ProtoError::Server(into_string(message)));
        }
        Ok(kind)
    }

    fn header_len(&self) -> ProtoResult<i64> {
        parse_i64(&self.line[1..])
    }

    fn read_payload(&mut self, len: i64) -> ProtoResult<Option<Vec<u8>>> {
        if len < 0 {
            return Ok(None);
        }
        if len > MAX_BULK_LEN {
            return Err(ProtoError::Protocol(format!(
                "bulk length {} exceeds limit {}",
                len, MAX_BULK_LEN
            )));
        }
        let len = len as usize;

        // Grow with the bytes that actually arrive, not with the header.
        let mut data = Vec::with_capacity(len.min(PAYLOAD_PREALLOC));
        let read = (&mut self.reader).take(len as u64).read_to_end(&mut data)?;
        if read != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        let mut crlf = [0u8; 2];
        self.reader.read_exact(&mut crlf)?;
        if crlf != [b'\r', b'\n'] {
            return Err(ProtoError::protocol("bulk string missing CRLF"));
        }
        Ok(Some(data))
    }

    /// Reads one scalar element; `None` payload means null.
    fn read_scalar(&mut self) -> ProtoResult<(RespType, Option<Vec<u8>>)> {
        let kind = self.read_header()?;
        let payload = match kind {
            RespType::Status
            | RespType::Int
            | RespType::Double
            | RespType::Bool
            | RespType::BigNumber => Some(self.line[1..].to_vec()),
            RespType::Bulk => {
                let len = self.header_len()?;
                self.read_payload(len)?
            }
            RespType::Verbatim => {
                let len = self.header_len()?;
                self.read_payload(len)?.map(strip_verbatim_format)
            }
            RespType::Null => None,
            other => {
                return Err(ProtoError::UnexpectedType {
                    expected: "scalar",
                    actual: other,
                })
            }
        };
        Ok((kind, payload))
    }

    fn read_aggregate_len(&mut self, expected: &'static str) -> ProtoResult<(RespType, usize)> {
        let kind = self.read_header()?;
        if kind == RespType::Null {
            return Err(ProtoError::Nil);
        }
        if !kind.is_aggregate() {
            return Err(ProtoError::UnexpectedType {
                expected,
                actual: kind,
            });
        }
        let len = self.header_len()?;
        if len < 0 {
            return Err(ProtoError::Nil);
        }
        let len = usize::try_from(len)
            .map_err(|_| ProtoError::Protocol(format!("aggregate length {} out of range", len)))?;
        Ok((kind, len))
    }
}

impl<R: BufRead> ReplyReader for RespReader<R> {
    fn peek_type(&mut self) -> ProtoResult<RespType> {
        let buf = self.reader.fill_buf()?;
        let first = match buf.first() {
            Some(byte) => *byte,
            None => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
        };
        RespType::from_byte(first).ok_or_else(|| {
            ProtoError::Protocol(format!("unknown reply type byte {:?}", first as char))
        })
    }

    fn read_map_len(&mut self) -> ProtoResult<usize> {
        let (kind, len) = self.read_aggregate_len("map")?;
        if kind == RespType::Map {
            return Ok(len);
        }
        // Flattened key/value arrays are how RESP2 carries maps.
        if len % 2 != 0 {
            return Err(ProtoError::Protocol(format!(
                "map reply as {} must have an even length, got {}",
                kind, len
            )));
        }
        Ok(len / 2)
    }

    fn read_array_len(&mut self) -> ProtoResult<usize> {
        let (kind, len) = self.read_aggregate_len("array")?;
        if kind == RespType::Map {
            return Err(ProtoError::UnexpectedType {
                expected: "array",
                actual: kind,
            });
        }
        Ok(len)
    }

    fn read_string(&mut self) -> ProtoResult<String> {
        self.read_nullable_string()?.ok_or(ProtoError::Nil)
    }

    fn read_nullable_string(&mut self) -> ProtoResult<Option<String>> {
        let (kind, payload) = self.read_scalar()?;
        if kind == RespType::Bool {
            return Err(ProtoError::UnexpectedType {
                expected: "string",
                actual: kind,
            });
        }
        Ok(payload.map(into_string))
    }

    fn read_bytes(&mut self) -> ProtoResult<Vec<u8>> {
        let (kind, payload) = self.read_scalar()?;
        match kind {
            RespType::Bulk | RespType::Verbatim | RespType::Status | RespType::Null => {
                payload.ok_or(ProtoError::Nil)
            }
            other => Err(ProtoError::UnexpectedType {
                expected: "bulk string",
                actual: other,
            }),
        }
    }

    fn read_int(&mut self) -> ProtoResult<i64> {
        let (kind, payload) = self.read_scalar()?;
        let payload = payload.ok_or(ProtoError::Nil)?;
        match kind {
            RespType::Int
            | RespType::Status
            | RespType::Bulk
            | RespType::Verbatim
            | RespType::BigNumber => parse_i64(&payload),
            RespType::Bool => parse_bool(&payload).map(i64::from),
            other => Err(ProtoError::UnexpectedType {
                expected: "integer",
                actual: other,
            }),
        }
    }

    fn read_float(&mut self) -> ProtoResult<f64> {
        let (kind, payload) = self.read_scalar()?;
        let payload = payload.ok_or(ProtoError::Nil)?;
        match kind {
            RespType::Double
            | RespType::Status
            | RespType::Bulk
            | RespType::Verbatim
            | RespType::Int => parse_f64(&payload),
            other => Err(ProtoError::UnexpectedType {
                expected: "double",
                actual: other,
            }),
        }
    }

    fn read_bool(&mut self) -> ProtoResult<bool> {
        let (kind, payload) = self.read_scalar()?;
        let payload = payload.ok_or(ProtoError::Nil)?;
        match kind {
            RespType::Bool => parse_bool(&payload),
            RespType::Int => Ok(parse_i64(&payload)? != 0),
            other => Err(ProtoError::UnexpectedType {
                expected: "boolean",
                actual: other,
            }),
        }
    }
}

fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> ProtoResult<()> {
    buf.clear();
    let bytes = reader.read_until(b'\n', buf)?;
    if bytes == 0 {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(ProtoError::protocol("reply line missing CRLF"));
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn parse_i64(data: &[u8]) -> ProtoResult<i64> {
    let invalid = || ProtoError::Protocol(format!("invalid integer {:?}", String::from_utf8_lossy(data)));
    if data.is_empty() {
        return Err(invalid());
    }
    let (negative, digits) = match data[0] {
        b'-' => (true, &data[1..]),
        b'+' => (false, &data[1..]),
        _ => (false, data),
    };
    if digits.is_empty() {
        return Err(invalid());
    }

    // Accumulate negatively so i64::MIN parses without overflow.
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(invalid());
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_sub(i64::from(b - b'0')))
            .ok_or_else(invalid)?;
    }

    if negative {
        Ok(value)
    } else {
        value.checked_neg().ok_or_else(invalid)
    }
}

fn parse_f64(data: &[u8]) -> ProtoResult<f64> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.trim().parse::<f64>().ok())
        .ok_or_else(|| ProtoError::Protocol(format!("invalid double {:?}", String::from_utf8_lossy(data))))
}

fn parse_bool(data: &[u8]) -> ProtoResult<bool> {
    match data {
        b"t" => Ok(true),
        b"f" => Ok(false),
        _ => Err(ProtoError::Protocol(format!(
            "invalid boolean {:?}",
            String::from_utf8_lossy(data)
        ))),
    }
}

/// Drops the `txt:` style format prefix of a verbatim string.
fn strip_verbatim_format(mut data: Vec<u8>) -> Vec<u8> {
    if data.len() >= 4 && data[3] == b':' {
        data.drain(..4);
    }
    data
}

fn into_string(data: Vec<u8>) -> String {
    match String::from_utf8(data) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

fn push_usize(out: &mut BytesMut, mut value: usize) {
    // Write digits into a small stack buffer to avoid heap allocations.
    let mut buf = [0u8; 20];
    let mut len = 0;
    if value == 0 {
        buf[0] = b'0';
        len = 1;
    } else {
        while value > 0 {
            buf[len] = b'0' + (value % 10) as u8;
            value /= 10;
            len += 1;
        }
    }
    for idx in (0..len).rev() {
        out.put_u8(buf[idx]);
    }
}
