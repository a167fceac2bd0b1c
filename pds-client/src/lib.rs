//! # PDS Command Client
//!
//! Purpose: Build, execute and decode the commands of a Redis-compatible
//! store's probabilistic modules: Bloom filter, Cuckoo filter, Count-Min
//! Sketch and Top-K.
//!
//! ## Design Principles
//! 1. **Builders Over an Executor**: Each facility is a trait with provided
//!    methods, implemented for every `Executor`.
//! 2. **One Result Container**: Every builder returns a settled `Cmd`
//!    holding either a typed `Reply` or a `CmdError`.
//! 3. **Explicit Options**: Optional settings are `Option` fields, never
//!    zero sentinels.
//! 4. **Protocol Clarity**: Replies are decoded from RESP2 or RESP3 through
//!    the `ReplyReader` capability.
//!
//! ```no_run
//! use pds_client::{BloomCommands, PdsClient};
//!
//! let client = PdsClient::connect("127.0.0.1:6379")?;
//! client.bf_reserve("seen", 0.01, 1000).into_status()?;
//! let added = client.bf_add("seen", "alice").into_int()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bloom;
mod client;
mod cmd;
mod cms;
mod cuckoo;
mod error;
mod executor;
mod options;
mod topk;

pub use bloom::BloomCommands;
pub use client::{ClientConfig, PdsClient};
pub use cmd::{Cmd, Reply, ReplyShape, ScanDump, TopKInfo};
pub use cms::CmsCommands;
pub use cuckoo::CuckooCommands;
pub use error::{CmdError, CmdResult, ConfigError, DecodeError};
pub use executor::Executor;
pub use options::{BfInfoField, BfInsertOptions, BfReserveOptions, CfInsertOptions, CfReserveOptions};
pub use topk::TopKCommands;

pub use pds_common::{Arg, ProtoError, ReplyReader, RespReader, RespType};
