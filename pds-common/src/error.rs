//! Errors raised while reading replies off the wire.

use thiserror::Error;

use crate::reader::RespType;

/// Result type for reply reading.
pub type ProtoResult<T> = Result<T, ProtoError>;

/// Failures surfaced by a reply reader.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Network or IO failure while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// RESP framing or parse error.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// Server returned an error reply. The reply was fully consumed.
    #[error("{0}")]
    Server(String),
    /// Server returned a null where a value was required.
    #[error("nil reply")]
    Nil,
    /// Reply type did not match what the caller asked to read.
    #[error("unexpected reply type {actual}, expected {expected}")]
    UnexpectedType {
        expected: &'static str,
        actual: RespType,
    },
}

impl ProtoError {
    /// Returns true for error replies sent by the server.
    ///
    /// Server errors leave the stream aligned on the next reply; every other
    /// variant may leave unread bytes behind.
    pub fn is_server(&self) -> bool {
        matches!(self, ProtoError::Server(_))
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        ProtoError::Protocol(message.into())
    }
}
