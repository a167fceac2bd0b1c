//! Error types for the command layer.

use pds_common::ProtoError;
use thiserror::Error;

use crate::cmd::ReplyShape;

/// Result type for command outcomes.
pub type CmdResult<T> = Result<T, CmdError>;

/// Failures raised while turning a reply stream into a `Reply`.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The underlying reader failed mid-reply.
    #[error(transparent)]
    Read(#[from] ProtoError),
    /// A composite reply carried a field name outside the known set.
    #[error("{command} unexpected key {key}")]
    UnexpectedKey { command: &'static str, key: String },
    /// An element inside an aggregate was an error reply.
    #[error("error reply inside aggregate: {0}")]
    NestedServer(String),
    /// An aggregate had a different element count than the shape requires.
    #[error("expected {expected} reply elements, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Outcome error stored in a `Cmd`.
#[derive(Debug, Error)]
pub enum CmdError {
    /// The store rejected the command.
    #[error("server error: {0}")]
    Server(String),
    /// The execution channel failed (network, framing), including while a
    /// reply was being read.
    #[error("transport error: {0}")]
    Transport(#[source] ProtoError),
    /// The reply arrived intact but could not be decoded into the expected
    /// shape (null, wrong type, unknown key, wrong length).
    #[error("decode error: {0}")]
    Decode(#[source] DecodeError),
    /// No executor has settled the command yet.
    #[error("command was not executed")]
    NotExecuted,
    /// The stored reply does not have the requested shape.
    #[error("reply shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        expected: ReplyShape,
        actual: ReplyShape,
    },
}

impl CmdError {
    /// Returns true when the store answered with an error reply.
    pub fn is_server(&self) -> bool {
        matches!(self, CmdError::Server(_))
    }
}

impl From<ProtoError> for CmdError {
    fn from(err: ProtoError) -> Self {
        match err {
            ProtoError::Server(message) => CmdError::Server(message),
            other => CmdError::Transport(other),
        }
    }
}

impl From<DecodeError> for CmdError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Read(ProtoError::Server(message)) => CmdError::Server(message),
            // The channel broke mid-reply; the shape itself was never judged.
            DecodeError::Read(err @ (ProtoError::Io(_) | ProtoError::Protocol(_))) => {
                CmdError::Transport(err)
            }
            other => CmdError::Decode(other),
        }
    }
}

/// Failures while loading a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
