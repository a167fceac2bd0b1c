//! # Command Container and Reply Decoding
//!
//! Purpose: Carry one request's arguments together with its single outcome,
//! and decode every reply shape through one interface.
//!
//! ## Design Principles
//! 1. **Tagged Results**: One `Reply` enum covers every shape the command
//!    set produces, so executors never need per-command types.
//! 2. **Settle Once**: A `Cmd` accepts exactly one outcome; later attempts
//!    are ignored.
//! 3. **All or Nothing**: Decoders build values locally and only hand them
//!    over on full success.
//!
//! ## Lifecycle
//!
//! ```text
//! builder --Cmd::new--> [pending] --Executor::process--> [settled] --> caller
//!                                    (read_reply / set_err)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use pds_common::{Arg, ProtoError, ProtoResult, ReplyReader, RespType};

use crate::error::{CmdError, CmdResult, DecodeError};

/// Expected shape of a command's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplyShape {
    /// Simple status such as `OK`.
    Status,
    /// One integer.
    Int,
    /// Array of integers.
    IntList,
    /// Array of nullable strings.
    StrList,
    /// Array of booleans.
    BoolList,
    /// Name to integer pairs, in wire order.
    IntMap,
    /// Top-K parameters.
    TopKInfo,
    /// One SCANDUMP chunk.
    Dump,
}

impl fmt::Display for ReplyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplyShape::Status => "status",
            ReplyShape::Int => "integer",
            ReplyShape::IntList => "integer list",
            ReplyShape::StrList => "string list",
            ReplyShape::BoolList => "boolean list",
            ReplyShape::IntMap => "integer map",
            ReplyShape::TopKInfo => "topk info",
            ReplyShape::Dump => "scan dump",
        };
        f.write_str(name)
    }
}

impl ReplyShape {
    /// Decodes one reply of this shape from the reader.
    ///
    /// Only an error reply in place of the whole value counts as a server
    /// error. One nested inside an aggregate leaves the rest of the aggregate
    /// unread and is reported as `DecodeError::NestedServer`.
    pub fn decode<R: ReplyReader + ?Sized>(self, rd: &mut R) -> Result<Reply, DecodeError> {
        let top_level_error = rd.peek_type()? == RespType::Error;
        self.decode_value(rd).map_err(|err| match err {
            DecodeError::Read(ProtoError::Server(message)) if !top_level_error => {
                DecodeError::NestedServer(message)
            }
            other => other,
        })
    }

    fn decode_value<R: ReplyReader + ?Sized>(self, rd: &mut R) -> Result<Reply, DecodeError> {
        let reply = match self {
            ReplyShape::Status => Reply::Status(rd.read_string()?),
            ReplyShape::Int => Reply::Int(read_single_int(rd)?),
            ReplyShape::IntList => Reply::IntList(read_list(rd, |rd| rd.read_int())?),
            ReplyShape::StrList => Reply::StrList(read_list(rd, |rd| rd.read_nullable_string())?),
            ReplyShape::BoolList => Reply::BoolList(read_list(rd, |rd| rd.read_bool())?),
            ReplyShape::IntMap => Reply::IntMap(read_int_map(rd)?),
            ReplyShape::TopKInfo => Reply::TopKInfo(TopKInfo::decode(rd)?),
            ReplyShape::Dump => Reply::Dump(ScanDump::decode(rd)?),
        };
        Ok(reply)
    }
}

/// Parameters of a Top-K sketch as reported by `topk.info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TopKInfo {
    /// Number of top items tracked.
    pub k: i64,
    /// Counters per array.
    pub width: i64,
    /// Number of arrays.
    pub depth: i64,
    /// Decay probability.
    pub decay: f64,
}

impl TopKInfo {
    /// Decodes the info map. Keys may arrive in any order; an unknown key
    /// aborts the decode.
    pub fn decode<R: ReplyReader + ?Sized>(rd: &mut R) -> Result<Self, DecodeError> {
        let pairs = rd.read_map_len()?;

        let mut info = TopKInfo::default();
        for _ in 0..pairs {
            let key = rd.read_string()?;
            match key.as_str() {
                "k" => info.k = rd.read_int()?,
                "width" => info.width = rd.read_int()?,
                "depth" => info.depth = rd.read_int()?,
                "decay" => info.decay = rd.read_float()?,
                _ => {
                    return Err(DecodeError::UnexpectedKey {
                        command: "topk.info",
                        key,
                    })
                }
            }
        }
        Ok(info)
    }
}

/// One chunk of a SCANDUMP iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDump {
    /// Iterator to pass to the next SCANDUMP call; zero once finished.
    pub iterator: i64,
    /// Opaque chunk payload for LOADCHUNK.
    pub data: Vec<u8>,
}

impl ScanDump {
    /// Returns true when the dump has no further chunks.
    pub fn is_finished(&self) -> bool {
        self.iterator == 0
    }

    fn decode<R: ReplyReader + ?Sized>(rd: &mut R) -> Result<Self, DecodeError> {
        let len = rd.read_array_len()?;
        expect_len(2, len)?;
        let iterator = rd.read_int()?;
        // The final chunk may carry a null payload.
        let data = match rd.read_bytes() {
            Ok(data) => data,
            Err(ProtoError::Nil) => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(ScanDump { iterator, data })
    }
}

/// Decoded reply value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Status(String),
    Int(i64),
    IntList(Vec<i64>),
    StrList(Vec<Option<String>>),
    BoolList(Vec<bool>),
    IntMap(Vec<(String, i64)>),
    TopKInfo(TopKInfo),
    Dump(ScanDump),
}

impl Reply {
    /// Returns the shape tag of this value.
    pub fn shape(&self) -> ReplyShape {
        match self {
            Reply::Status(_) => ReplyShape::Status,
            Reply::Int(_) => ReplyShape::Int,
            Reply::IntList(_) => ReplyShape::IntList,
            Reply::StrList(_) => ReplyShape::StrList,
            Reply::BoolList(_) => ReplyShape::BoolList,
            Reply::IntMap(_) => ReplyShape::IntMap,
            Reply::TopKInfo(_) => ReplyShape::TopKInfo,
            Reply::Dump(_) => ReplyShape::Dump,
        }
    }

    /// Looks up a field of an integer map reply by name.
    pub fn map_get(&self, name: &str) -> Option<i64> {
        match self {
            Reply::IntMap(pairs) => pairs
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| *value),
            _ => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(text) => f.write_str(text),
            Reply::Int(value) => write!(f, "{}", value),
            Reply::IntList(values) => write_list(f, values.iter()),
            Reply::StrList(values) => write_list(
                f,
                values.iter().map(|value| value.as_deref().unwrap_or("(nil)")),
            ),
            Reply::BoolList(values) => write_list(f, values.iter()),
            Reply::IntMap(pairs) => {
                f.write_str("{")?;
                for (idx, (name, value)) in pairs.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            }
            Reply::TopKInfo(info) => write!(
                f,
                "k={} width={} depth={} decay={}",
                info.k, info.width, info.depth, info.decay
            ),
            Reply::Dump(dump) => write!(
                f,
                "iterator={} data=<{} bytes>",
                dump.iterator,
                dump.data.len()
            ),
        }
    }
}

/// One command request and its outcome.
///
/// Builders create it pending; an executor settles it exactly once; the
/// caller then owns it.
#[derive(Debug)]
pub struct Cmd {
    args: Vec<Arg>,
    shape: ReplyShape,
    outcome: Option<Result<Reply, CmdError>>,
}

impl Cmd {
    /// Creates a pending command.
    pub fn new(shape: ReplyShape, args: Vec<Arg>) -> Self {
        Cmd {
            args,
            shape,
            outcome: None,
        }
    }

    /// Returns the full argument list, command name first.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Returns the command name (first token), lowercased.
    pub fn name(&self) -> String {
        self.args
            .first()
            .map(|arg| arg.to_string().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Returns the reply shape the command expects.
    pub fn shape(&self) -> ReplyShape {
        self.shape
    }

    /// Returns true once an outcome has been stored.
    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns the decoded value, if the command succeeded.
    pub fn reply(&self) -> Option<&Reply> {
        match &self.outcome {
            Some(Ok(reply)) => Some(reply),
            _ => None,
        }
    }

    /// Returns the stored error, if the command failed.
    pub fn err(&self) -> Option<&CmdError> {
        match &self.outcome {
            Some(Err(err)) => Some(err),
            _ => None,
        }
    }

    /// Stores a successful outcome. A value of the wrong shape is stored as
    /// a `ShapeMismatch` error instead.
    pub fn set_reply(&mut self, reply: Reply) {
        let outcome = if reply.shape() == self.shape {
            Ok(reply)
        } else {
            Err(CmdError::ShapeMismatch {
                expected: self.shape,
                actual: reply.shape(),
            })
        };
        self.settle(outcome);
    }

    /// Stores a failed outcome.
    pub fn set_err(&mut self, err: impl Into<CmdError>) {
        self.settle(Err(err.into()));
    }

    /// Decodes the reply for this command from `rd` and stores the outcome.
    ///
    /// Returns the stored error so executors can decide whether the stream
    /// is still usable.
    pub fn read_reply<R: ReplyReader + ?Sized>(&mut self, rd: &mut R) -> Option<&CmdError> {
        let outcome = self.shape.decode(rd).map_err(CmdError::from);
        self.settle(outcome);
        self.err()
    }

    fn settle(&mut self, outcome: Result<Reply, CmdError>) {
        if self.outcome.is_some() {
            warn!(command = %self.name(), "ignoring repeated outcome for settled command");
            return;
        }
        self.outcome = Some(outcome);
    }

    /// Consumes the command and returns its outcome.
    pub fn into_result(self) -> CmdResult<Reply> {
        self.outcome.unwrap_or(Err(CmdError::NotExecuted))
    }

    /// Status text, e.g. `OK`.
    pub fn into_status(self) -> CmdResult<String> {
        match self.into_result()? {
            Reply::Status(text) => Ok(text),
            other => Err(mismatch(ReplyShape::Status, &other)),
        }
    }

    pub fn into_int(self) -> CmdResult<i64> {
        match self.into_result()? {
            Reply::Int(value) => Ok(value),
            other => Err(mismatch(ReplyShape::Int, &other)),
        }
    }

    pub fn into_int_list(self) -> CmdResult<Vec<i64>> {
        match self.into_result()? {
            Reply::IntList(values) => Ok(values),
            other => Err(mismatch(ReplyShape::IntList, &other)),
        }
    }

    pub fn into_str_list(self) -> CmdResult<Vec<Option<String>>> {
        match self.into_result()? {
            Reply::StrList(values) => Ok(values),
            other => Err(mismatch(ReplyShape::StrList, &other)),
        }
    }

    pub fn into_bool_list(self) -> CmdResult<Vec<bool>> {
        match self.into_result()? {
            Reply::BoolList(values) => Ok(values),
            other => Err(mismatch(ReplyShape::BoolList, &other)),
        }
    }

    pub fn into_int_map(self) -> CmdResult<Vec<(String, i64)>> {
        match self.into_result()? {
            Reply::IntMap(pairs) => Ok(pairs),
            other => Err(mismatch(ReplyShape::IntMap, &other)),
        }
    }

    pub fn into_topk_info(self) -> CmdResult<TopKInfo> {
        match self.into_result()? {
            Reply::TopKInfo(info) => Ok(info),
            other => Err(mismatch(ReplyShape::TopKInfo, &other)),
        }
    }

    pub fn into_scan_dump(self) -> CmdResult<ScanDump> {
        match self.into_result()? {
            Reply::Dump(dump) => Ok(dump),
            other => Err(mismatch(ReplyShape::Dump, &other)),
        }
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", arg)?;
        }
        match &self.outcome {
            Some(Ok(reply)) => write!(f, ": {}", reply),
            Some(Err(err)) => write!(f, ": {}", err),
            None => Ok(()),
        }
    }
}

fn mismatch(expected: ReplyShape, actual: &Reply) -> CmdError {
    CmdError::ShapeMismatch {
        expected,
        actual: actual.shape(),
    }
}

fn expect_len(expected: usize, actual: usize) -> Result<(), DecodeError> {
    if expected != actual {
        return Err(DecodeError::Length { expected, actual });
    }
    Ok(())
}

fn read_single_int<R: ReplyReader + ?Sized>(rd: &mut R) -> Result<i64, DecodeError> {
    // Single-field info replies arrive wrapped in a one-element aggregate.
    match rd.peek_type()? {
        RespType::Map => {
            expect_len(1, rd.read_map_len()?)?;
            rd.read_string()?;
            Ok(rd.read_int()?)
        }
        RespType::Array => {
            expect_len(1, rd.read_array_len()?)?;
            Ok(rd.read_int()?)
        }
        _ => Ok(rd.read_int()?),
    }
}

fn read_list<R, T, F>(rd: &mut R, mut read: F) -> Result<Vec<T>, DecodeError>
where
    R: ReplyReader + ?Sized,
    F: FnMut(&mut R) -> ProtoResult<T>,
{
    let len = rd.read_array_len()?;
    let mut values = Vec::with_capacity(len.min(1024));
    for _ in 0..len {
        values.push(read(rd)?);
    }
    Ok(values)
}

fn read_int_map<R: ReplyReader + ?Sized>(rd: &mut R) -> Result<Vec<(String, i64)>, DecodeError> {
    let pairs = rd.read_map_len()?;
    let mut values = Vec::with_capacity(pairs.min(1024));
    for _ in 0..pairs {
        let name = rd.read_string()?;
        let value = rd.read_int()?;
        values.push((name, value));
    }
    Ok(values)
}

fn write_list<I>(f: &mut fmt::Formatter<'_>, values: I) -> fmt::Result
where
    I: Iterator,
    I::Item: fmt::Display,
{
    f.write_str("[")?;
    for (idx, value) in values.enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", value)?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pds_common::RespReader;
    use std::io::Cursor;

    fn reader(data: &[u8]) -> RespReader<Cursor<Vec<u8>>> {
        RespReader::new(Cursor::new(data.to_vec()))
    }

    const FIELDS: [(&str, &str); 4] = [
        ("k", ":3\r\n"),
        ("width", ":8\r\n"),
        ("depth", ":7\r\n"),
        ("decay", ",0.9\r\n"),
    ];

    fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for idx in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(idx);
            for mut tail in permutations(&rest) {
                tail.insert(0, head);
                out.push(tail);
            }
        }
        out
    }

    fn info_reply(order: &[usize]) -> Vec<u8> {
        let mut buf = format!("%{}\r\n", order.len()).into_bytes();
        for &idx in order {
            let (name, value) = FIELDS[idx];
            buf.extend_from_slice(format!("${}\r\n{}\r\n", name.len(), name).as_bytes());
            buf.extend_from_slice(value.as_bytes());
        }
        buf
    }

    #[test]
    fn topk_info_is_order_independent() {
        let orders = permutations(&[0, 1, 2, 3]);
        assert_eq!(orders.len(), 24);
        let expected = TopKInfo {
            k: 3,
            width: 8,
            depth: 7,
            decay: 0.9,
        };
        for order in orders {
            let mut rd = reader(&info_reply(&order));
            assert_eq!(TopKInfo::decode(&mut rd).unwrap(), expected, "order {:?}", order);
        }
    }

    #[test]
    fn topk_info_accepts_resp2_flattened_reply() {
        let data = b"*8\r\n$1\r\nk\r\n:5\r\n$5\r\nwidth\r\n:50\r\n$5\r\ndepth\r\n:4\r\n$5\r\ndecay\r\n$3\r\n0.5\r\n";
        let mut rd = reader(data);
        let info = TopKInfo::decode(&mut rd).unwrap();
        assert_eq!(
            info,
            TopKInfo {
                k: 5,
                width: 50,
                depth: 4,
                decay: 0.5
            }
        );
    }

    #[test]
    fn topk_info_missing_keys_keep_defaults() {
        let mut rd = reader(b"%1\r\n$5\r\nwidth\r\n:9\r\n");
        let info = TopKInfo::decode(&mut rd).unwrap();
        assert_eq!(
            info,
            TopKInfo {
                width: 9,
                ..TopKInfo::default()
            }
        );
    }

    #[test]
    fn topk_info_rejects_unknown_key() {
        let mut buf = info_reply(&[0, 1]);
        buf[1] = b'3';
        buf.extend_from_slice(b"$5\r\nbogus\r\n:1\r\n");
        let mut rd = reader(&buf);
        match TopKInfo::decode(&mut rd) {
            Err(DecodeError::UnexpectedKey { command, key }) => {
                assert_eq!(command, "topk.info");
                assert_eq!(key, "bogus");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn topk_info_failure_leaves_command_without_reply() {
        let mut cmd = Cmd::new(ReplyShape::TopKInfo, vec![Arg::from("topk.info"), Arg::from("t")]);
        let mut rd = reader(b"%2\r\n$1\r\nk\r\n:3\r\n$3\r\nbad\r\n:1\r\n");
        let err = cmd.read_reply(&mut rd);
        assert!(matches!(err, Some(CmdError::Decode(DecodeError::UnexpectedKey { .. }))));
        assert!(cmd.reply().is_none());
    }

    #[test]
    fn topk_info_truncated_stream_fails() {
        let mut cmd = Cmd::new(ReplyShape::TopKInfo, vec![Arg::from("topk.info"), Arg::from("t")]);
        let mut rd = reader(b"%4\r\n$1\r\nk\r\n:3\r\n$5\r\nwidth\r\n");
        cmd.read_reply(&mut rd);
        assert!(matches!(
            cmd.into_topk_info(),
            Err(CmdError::Transport(ProtoError::Io(_)))
        ));
    }

    #[test]
    fn topk_info_decoding_is_repeatable() {
        let data = info_reply(&[3, 2, 1, 0]);
        let first = TopKInfo::decode(&mut reader(&data)).unwrap();
        let second = TopKInfo::decode(&mut reader(&data)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn int_shape_unwraps_single_field_info() {
        let reply = ReplyShape::Int.decode(&mut reader(b"*1\r\n:100\r\n")).unwrap();
        assert_eq!(reply, Reply::Int(100));

        let reply = ReplyShape::Int
            .decode(&mut reader(b"%1\r\n+Capacity\r\n:100\r\n"))
            .unwrap();
        assert_eq!(reply, Reply::Int(100));
    }

    #[test]
    fn str_list_keeps_nulls() {
        let reply = ReplyShape::StrList
            .decode(&mut reader(b"*3\r\n_\r\n$3\r\nold\r\n$-1\r\n"))
            .unwrap();
        assert_eq!(reply, Reply::StrList(vec![None, Some("old".to_string()), None]));
    }

    #[test]
    fn bool_list_accepts_integers_and_booleans() {
        let reply = ReplyShape::BoolList
            .decode(&mut reader(b"*3\r\n:1\r\n#f\r\n:0\r\n"))
            .unwrap();
        assert_eq!(reply, Reply::BoolList(vec![true, false, false]));
    }

    #[test]
    fn int_map_preserves_wire_order() {
        let reply = ReplyShape::IntMap
            .decode(&mut reader(b"*4\r\n$1\r\nz\r\n:1\r\n$1\r\na\r\n:2\r\n"))
            .unwrap();
        assert_eq!(
            reply,
            Reply::IntMap(vec![("z".to_string(), 1), ("a".to_string(), 2)])
        );
        assert_eq!(reply.map_get("a"), Some(2));
        assert_eq!(reply.map_get("missing"), None);
    }

    #[test]
    fn dump_shape_reads_iterator_and_payload() {
        let reply = ReplyShape::Dump
            .decode(&mut reader(b"*2\r\n:1\r\n$3\r\n\x01\x02\x03\r\n"))
            .unwrap();
        assert_eq!(
            reply,
            Reply::Dump(ScanDump {
                iterator: 1,
                data: vec![1, 2, 3]
            })
        );

        let last = ReplyShape::Dump.decode(&mut reader(b"*2\r\n:0\r\n$-1\r\n")).unwrap();
        match last {
            Reply::Dump(dump) => assert!(dump.is_finished() && dump.data.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn dump_shape_checks_length() {
        let err = ReplyShape::Dump.decode(&mut reader(b"*1\r\n:0\r\n")).unwrap_err();
        assert!(matches!(err, DecodeError::Length { expected: 2, actual: 1 }));
    }

    #[test]
    fn server_error_maps_to_server_variant() {
        let mut cmd = Cmd::new(ReplyShape::Status, vec![Arg::from("bf.reserve"), Arg::from("f")]);
        cmd.read_reply(&mut reader(b"-ERR item exists\r\n"));
        let err = cmd.err().unwrap();
        assert!(err.is_server());
        assert_eq!(err.to_string(), "server error: ERR item exists");
    }

    #[test]
    fn read_failures_are_transport_errors() {
        let mut cmd = Cmd::new(ReplyShape::Int, vec![Arg::from("bf.card"), Arg::from("f")]);
        cmd.read_reply(&mut reader(b"$5\r\nhe"));
        assert!(matches!(cmd.err(), Some(CmdError::Transport(ProtoError::Io(_)))));

        let mut cmd = Cmd::new(ReplyShape::Status, vec![Arg::from("bf.reserve"), Arg::from("f")]);
        cmd.read_reply(&mut reader(b"?oops\r\n"));
        assert!(matches!(cmd.err(), Some(CmdError::Transport(ProtoError::Protocol(_)))));
    }

    #[test]
    fn intact_but_wrong_replies_are_decode_errors() {
        let mut cmd = Cmd::new(ReplyShape::Int, vec![Arg::from("bf.card"), Arg::from("f")]);
        cmd.read_reply(&mut reader(b"_\r\n"));
        assert!(matches!(cmd.err(), Some(CmdError::Decode(DecodeError::Read(ProtoError::Nil)))));

        let mut cmd = Cmd::new(ReplyShape::IntList, vec![Arg::from("bf.madd"), Arg::from("f")]);
        cmd.read_reply(&mut reader(b":1\r\n"));
        assert!(matches!(
            cmd.err(),
            Some(CmdError::Decode(DecodeError::Read(ProtoError::UnexpectedType { .. })))
        ));
    }

    #[test]
    fn nested_error_is_not_a_server_error() {
        let mut cmd = Cmd::new(
            ReplyShape::IntList,
            vec![Arg::from("bf.madd"), Arg::from("f"), Arg::from("a"), Arg::from("b")],
        );
        let err = cmd.read_reply(&mut reader(b"*2\r\n-ERR non scaling filter is full\r\n:1\r\n"));
        match err {
            Some(CmdError::Decode(DecodeError::NestedServer(message))) => {
                assert_eq!(message, "ERR non scaling filter is full")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!cmd.err().map(CmdError::is_server).unwrap_or(true));
    }

    #[test]
    fn outcome_is_settled_once() {
        let mut cmd = Cmd::new(ReplyShape::Int, vec![Arg::from("bf.card"), Arg::from("f")]);
        assert!(!cmd.is_settled());
        cmd.set_reply(Reply::Int(4));
        cmd.set_err(ProtoError::Nil);
        assert!(cmd.is_settled());
        assert_eq!(cmd.into_int().unwrap(), 4);
    }

    #[test]
    fn wrong_shape_reply_is_stored_as_error() {
        let mut cmd = Cmd::new(ReplyShape::Int, vec![Arg::from("bf.card"), Arg::from("f")]);
        cmd.set_reply(Reply::Status("OK".into()));
        assert!(matches!(
            cmd.err(),
            Some(CmdError::ShapeMismatch {
                expected: ReplyShape::Int,
                actual: ReplyShape::Status
            })
        ));
    }

    #[test]
    fn pending_command_reports_not_executed() {
        let cmd = Cmd::new(ReplyShape::Int, vec![Arg::from("bf.card"), Arg::from("f")]);
        assert!(matches!(cmd.into_int(), Err(CmdError::NotExecuted)));
    }

    #[test]
    fn display_includes_request_and_outcome() {
        let mut cmd = Cmd::new(
            ReplyShape::IntList,
            vec![Arg::from("bf.madd"), Arg::from("f"), Arg::from("a"), Arg::from("b")],
        );
        assert_eq!(cmd.to_string(), "bf.madd f a b");
        cmd.set_reply(Reply::IntList(vec![1, 0]));
        assert_eq!(cmd.to_string(), "bf.madd f a b: [1, 0]");
        assert_eq!(cmd.name(), "bf.madd");
    }
}
