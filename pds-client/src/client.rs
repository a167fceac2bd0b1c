//! # Synchronous Client
//!
//! Purpose: Run commands over one blocking TCP connection to a
//! Redis-compatible store with the probabilistic modules loaded.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `PdsClient` hides framing and socket handling
//!    behind the `Executor` capability.
//! 2. **Lazy Reconnect**: A connection that hit a transport or decode
//!    failure is discarded; the next command dials again.
//! 3. **Buffer Reuse**: Each connection keeps its write buffer and reply
//!    reader for its lifetime.
//! 4. **Fail Fast**: No retries; every failure is stored in the `Cmd`.

use std::fs;
use std::io::{self, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pds_common::{encode_command, ProtoError, RespReader};

use crate::cmd::Cmd;
use crate::error::ConfigError;
use crate::executor::Executor;

/// Connection settings for `PdsClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address, e.g. "127.0.0.1:6379".
    pub addr: String,
    /// Optional TCP read timeout in milliseconds.
    pub read_timeout_ms: Option<u64>,
    /// Optional TCP write timeout in milliseconds.
    pub write_timeout_ms: Option<u64>,
    /// Optional TCP connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: "127.0.0.1:6379".to_string(),
            read_timeout_ms: None,
            write_timeout_ms: None,
            connect_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

/// Blocking executor owning a single connection.
///
/// Commands from several threads are serialized on the connection.
pub struct PdsClient {
    config: ClientConfig,
    conn: Mutex<Option<Connection>>,
}

impl PdsClient {
    /// Connects with default settings to `addr`.
    pub fn connect(addr: impl Into<String>) -> io::Result<Self> {
        let config = ClientConfig {
            addr: addr.into(),
            ..ClientConfig::default()
        };
        Self::with_config(config)
    }

    /// Connects eagerly so address and reachability errors surface here.
    pub fn with_config(config: ClientConfig) -> io::Result<Self> {
        let conn = Connection::connect(&config)?;
        info!(addr = %config.addr, "connected");
        Ok(PdsClient {
            config,
            conn: Mutex::new(Some(conn)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Executor for PdsClient {
    fn process(&self, cmd: &mut Cmd) {
        let mut guard = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if guard.is_none() {
            match Connection::connect(&self.config) {
                Ok(conn) => {
                    info!(addr = %self.config.addr, "reconnected");
                    *guard = Some(conn);
                }
                Err(err) => {
                    warn!(addr = %self.config.addr, error = %err, "connect failed");
                    cmd.set_err(ProtoError::Io(err));
                    return;
                }
            }
        }
        let Some(conn) = guard.as_mut() else {
            return;
        };

        debug!(command = %cmd.name(), args = cmd.args().len(), "dispatching");
        if !conn.exec(cmd) {
            warn!(command = %cmd.name(), "dropping connection after failure");
            *guard = None;
        }
    }
}

/// Single TCP connection with reusable buffers.
struct Connection {
    // Buffered reader reduces syscalls while still allowing direct writes.
    reader: RespReader<BufReader<TcpStream>>,
    write_buf: BytesMut,
}

impl Connection {
    fn connect(config: &ClientConfig) -> io::Result<Self> {
        let stream = connect_stream(config)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;
        // Disable Nagle to keep request latency low for small payloads.
        stream.set_nodelay(true)?;

        Ok(Connection {
            reader: RespReader::new(BufReader::new(stream)),
            write_buf: BytesMut::with_capacity(256),
        })
    }

    /// Sends the command and settles it from the reply.
    ///
    /// Returns false when the stream can no longer be trusted.
    fn exec(&mut self, cmd: &mut Cmd) -> bool {
        self.write_buf.clear();
        encode_command(cmd.args(), &mut self.write_buf);

        let stream = self.reader.get_mut().get_mut();
        if let Err(err) = stream.write_all(&self.write_buf).and_then(|()| stream.flush()) {
            cmd.set_err(ProtoError::Io(err));
            return false;
        }

        match cmd.read_reply(&mut self.reader) {
            None => true,
            Some(err) => err.is_server(),
        }
    }
}

fn connect_stream(config: &ClientConfig) -> io::Result<TcpStream> {
    let timeout = match config.connect_timeout() {
        Some(timeout) => timeout,
        None => return TcpStream::connect(config.addr.as_str()),
    };

    let mut last_err = None;
    for addr in config.addr.as_str().to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.addr, "127.0.0.1:6379");
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn config_from_partial_json() {
        let config = ClientConfig::from_json(r#"{"read_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.addr, "127.0.0.1:6379");
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.connect_timeout(), None);
    }

    #[test]
    fn config_rejects_bad_json() {
        assert!(matches!(
            ClientConfig::from_json("{addr:"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn config_missing_file_is_io_error() {
        assert!(matches!(
            ClientConfig::from_file("/nonexistent/pds.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
