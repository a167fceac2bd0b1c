//! # Bloom Filter Commands
//!
//! Purpose: Build `bf.*` requests from typed parameters.

use pds_common::Arg;

use crate::cmd::{Cmd, ReplyShape};
use crate::executor::{dispatch, push_items, Executor};
use crate::options::{BfInfoField, BfInsertOptions, BfReserveOptions};

/// Bloom filter commands, available on every executor.
pub trait BloomCommands: Executor {
    /// `bf.reserve key error_rate capacity`
    fn bf_reserve(&self, key: impl AsRef<[u8]>, error_rate: f64, capacity: i64) -> Cmd {
        let args = vec![
            Arg::keyword("bf.reserve"),
            Arg::bytes(key),
            Arg::Float(error_rate),
            Arg::Int(capacity),
        ];
        dispatch(self, ReplyShape::Status, args)
    }

    /// `bf.reserve key error_rate capacity expansion N`
    fn bf_reserve_expansion(
        &self,
        key: impl AsRef<[u8]>,
        error_rate: f64,
        capacity: i64,
        expansion: i64,
    ) -> Cmd {
        let args = vec![
            Arg::keyword("bf.reserve"),
            Arg::bytes(key),
            Arg::Float(error_rate),
            Arg::Int(capacity),
            Arg::keyword("expansion"),
            Arg::Int(expansion),
        ];
        dispatch(self, ReplyShape::Status, args)
    }

    /// `bf.reserve key error_rate capacity nonscaling`
    fn bf_reserve_non_scaling(&self, key: impl AsRef<[u8]>, error_rate: f64, capacity: i64) -> Cmd {
        let args = vec![
            Arg::keyword("bf.reserve"),
            Arg::bytes(key),
            Arg::Float(error_rate),
            Arg::Int(capacity),
            Arg::keyword("nonscaling"),
        ];
        dispatch(self, ReplyShape::Status, args)
    }

    /// `bf.reserve key` followed by whichever options are set.
    fn bf_reserve_with_args(&self, key: impl AsRef<[u8]>, options: &BfReserveOptions) -> Cmd {
        let mut args = vec![Arg::keyword("bf.reserve"), Arg::bytes(key)];
        options.push_args(&mut args);
        dispatch(self, ReplyShape::Status, args)
    }

    /// Adds one item. Replies 1 if newly added.
    fn bf_add(&self, key: impl AsRef<[u8]>, item: impl Into<Arg>) -> Cmd {
        let args = vec![Arg::keyword("bf.add"), Arg::bytes(key), item.into()];
        dispatch(self, ReplyShape::Int, args)
    }

    /// Number of items added so far.
    fn bf_card(&self, key: impl AsRef<[u8]>) -> Cmd {
        let args = vec![Arg::keyword("bf.card"), Arg::bytes(key)];
        dispatch(self, ReplyShape::Int, args)
    }

    fn bf_exists(&self, key: impl AsRef<[u8]>, item: impl Into<Arg>) -> Cmd {
        let args = vec![Arg::keyword("bf.exists"), Arg::bytes(key), item.into()];
        dispatch(self, ReplyShape::Int, args)
    }

    fn bf_info(&self, key: impl AsRef<[u8]>) -> Cmd {
        let args = vec![Arg::keyword("bf.info"), Arg::bytes(key)];
        dispatch(self, ReplyShape::IntMap, args)
    }

    /// Reads a single info field.
    fn bf_info_arg(&self, key: impl AsRef<[u8]>, field: BfInfoField) -> Cmd {
        let args = vec![
            Arg::keyword("bf.info"),
            Arg::bytes(key),
            Arg::keyword(field.as_str()),
        ];
        dispatch(self, ReplyShape::Int, args)
    }

    /// Adds items, creating the filter from `options` if it is missing.
    fn bf_insert<I>(&self, key: impl AsRef<[u8]>, options: Option<&BfInsertOptions>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("bf.insert"), Arg::bytes(key)];
        if let Some(options) = options {
            options.push_args(&mut args);
        }
        args.push(Arg::keyword("items"));
        push_items(&mut args, items);
        dispatch(self, ReplyShape::IntList, args)
    }

    fn bf_madd<I>(&self, key: impl AsRef<[u8]>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("bf.madd"), Arg::bytes(key)];
        push_items(&mut args, items);
        dispatch(self, ReplyShape::IntList, args)
    }

    fn bf_mexists<I>(&self, key: impl AsRef<[u8]>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("bf.mexists"), Arg::bytes(key)];
        push_items(&mut args, items);
        dispatch(self, ReplyShape::IntList, args)
    }

    /// Fetches the chunk after `iterator` (start with 0).
    fn bf_scandump(&self, key: impl AsRef<[u8]>, iterator: i64) -> Cmd {
        let args = vec![Arg::keyword("bf.scandump"), Arg::bytes(key), Arg::Int(iterator)];
        dispatch(self, ReplyShape::Dump, args)
    }

    /// Restores one chunk produced by `bf_scandump`.
    fn bf_loadchunk(&self, key: impl AsRef<[u8]>, iterator: i64, data: impl Into<Arg>) -> Cmd {
        let args = vec![
            Arg::keyword("bf.loadchunk"),
            Arg::bytes(key),
            Arg::Int(iterator),
            data.into(),
        ];
        dispatch(self, ReplyShape::Status, args)
    }
}

impl<E: Executor + ?Sized> BloomCommands for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::Reply;
    use crate::executor::testing::{render, Recorder};

    #[test]
    fn reserve_emits_positional_tokens() {
        let ex = Recorder::replying(b"+OK\r\n");
        let cmd = ex.bf_reserve("f", 0.01, 1000);
        assert_eq!(render(&cmd), vec!["bf.reserve", "f", "0.01", "1000"]);
        assert_eq!(cmd.into_status().unwrap(), "OK");
    }

    #[test]
    fn reserve_variants_append_keywords() {
        let ex = Recorder::replying(b"+OK\r\n");
        assert_eq!(
            render(&ex.bf_reserve_expansion("f", 0.01, 1000, 2)),
            vec!["bf.reserve", "f", "0.01", "1000", "expansion", "2"]
        );
        assert_eq!(
            render(&ex.bf_reserve_non_scaling("f", 0.01, 1000)),
            vec!["bf.reserve", "f", "0.01", "1000", "nonscaling"]
        );
    }

    #[test]
    fn reserve_with_args_omits_unset_values() {
        let ex = Recorder::replying(b"+OK\r\n");
        let options = BfReserveOptions {
            capacity: Some(1000),
            non_scaling: true,
            ..Default::default()
        };
        assert_eq!(
            render(&ex.bf_reserve_with_args("f", &options)),
            vec!["bf.reserve", "f", "1000", "nonscaling"]
        );
        assert_eq!(
            render(&ex.bf_reserve_with_args("f", &BfReserveOptions::default())),
            vec!["bf.reserve", "f"]
        );
    }

    #[test]
    fn reserve_with_args_full() {
        let ex = Recorder::replying(b"+OK\r\n");
        let options = BfReserveOptions {
            error_rate: Some(0.001),
            capacity: Some(500),
            expansion: Some(4),
            non_scaling: false,
        };
        assert_eq!(
            render(&ex.bf_reserve_with_args("f", &options)),
            vec!["bf.reserve", "f", "0.001", "500", "expansion", "4"]
        );
    }

    #[test]
    fn single_item_commands() {
        let ex = Recorder::replying(b":1\r\n");
        assert_eq!(render(&ex.bf_add("f", "x")), vec!["bf.add", "f", "x"]);
        assert_eq!(render(&ex.bf_exists("f", "x")), vec!["bf.exists", "f", "x"]);
        let card = ex.bf_card("f");
        assert_eq!(render(&card), vec!["bf.card", "f"]);
        assert_eq!(card.into_int().unwrap(), 1);
    }

    #[test]
    fn insert_places_items_keyword_last() {
        let ex = Recorder::replying(b"*2\r\n:1\r\n:0\r\n");
        let options = BfInsertOptions {
            capacity: Some(100),
            error_rate: Some(0.01),
            ..Default::default()
        };
        let cmd = ex.bf_insert("f", Some(&options), ["a", "b"]);
        assert_eq!(
            render(&cmd),
            vec!["bf.insert", "f", "capacity", "100", "error", "0.01", "items", "a", "b"]
        );
        assert_eq!(cmd.into_int_list().unwrap(), vec![1, 0]);

        assert_eq!(
            render(&ex.bf_insert("f", None, vec!["c".to_string()])),
            vec!["bf.insert", "f", "items", "c"]
        );
    }

    #[test]
    fn multi_item_commands() {
        let ex = Recorder::replying(b"*3\r\n#t\r\n#f\r\n#t\r\n");
        let cmd = ex.bf_madd("f", ["a", "b", "c"]);
        assert_eq!(render(&cmd), vec!["bf.madd", "f", "a", "b", "c"]);
        assert_eq!(cmd.into_int_list().unwrap(), vec![1, 0, 1]);
        assert_eq!(
            render(&ex.bf_mexists("f", [1i64, 2])),
            vec!["bf.mexists", "f", "1", "2"]
        );
    }

    #[test]
    fn info_decodes_flattened_map() {
        let ex = Recorder::replying(
            b"*4\r\n+Capacity\r\n:100\r\n+Number of items inserted\r\n:7\r\n",
        );
        let cmd = ex.bf_info("f");
        assert_eq!(render(&cmd), vec!["bf.info", "f"]);
        let reply = cmd.into_result().unwrap();
        assert_eq!(reply.map_get("Capacity"), Some(100));
        assert_eq!(reply.map_get("Number of items inserted"), Some(7));
    }

    #[test]
    fn info_arg_unwraps_single_value() {
        let ex = Recorder::replying(b"*1\r\n:100\r\n");
        let cmd = ex.bf_info_arg("f", BfInfoField::Capacity);
        assert_eq!(render(&cmd), vec!["bf.info", "f", "capacity"]);
        assert_eq!(cmd.into_int().unwrap(), 100);
    }

    #[test]
    fn scandump_and_loadchunk() {
        let ex = Recorder::replying(b"*2\r\n:9\r\n$2\r\n\xff\x00\r\n");
        let dump = ex.bf_scandump("f", 0);
        assert_eq!(render(&dump), vec!["bf.scandump", "f", "0"]);
        let dump = dump.into_scan_dump().unwrap();
        assert_eq!(dump.iterator, 9);
        assert_eq!(dump.data, vec![0xff, 0x00]);

        let ex = Recorder::replying(b"+OK\r\n");
        let cmd = ex.bf_loadchunk("g", dump.iterator, dump.data.clone());
        assert_eq!(cmd.args()[3], Arg::from(vec![0xffu8, 0x00]));
        assert_eq!(cmd.reply(), Some(&Reply::Status("OK".into())));
    }

    #[test]
    fn builders_are_deterministic() {
        let ex = Recorder::replying(b"*0\r\n");
        let options = BfInsertOptions {
            expansion: Some(3),
            non_scaling: true,
            ..Default::default()
        };
        let first = render(&ex.bf_insert("f", Some(&options), ["a", "b"]));
        let second = render(&ex.bf_insert("f", Some(&options), ["a", "b"]));
        assert_eq!(first, second);
    }

    #[test]
    fn server_rejection_is_surfaced() {
        let ex = Recorder::replying(b"-ERR item exists\r\n");
        let cmd = ex.bf_reserve("f", 0.01, -5);
        assert!(cmd.err().map(|err| err.is_server()).unwrap_or(false));
    }
}
