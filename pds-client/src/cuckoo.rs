//! # Cuckoo Filter Commands
//!
//! Purpose: Build `cf.*` requests from typed parameters.
//!
//! Unlike Bloom filters, cuckoo filters support deletion and per-item
//! counts, so `cf_del` and `cf_count` have no `bf.*` counterpart.

use pds_common::Arg;

use crate::cmd::{Cmd, ReplyShape};
use crate::executor::{dispatch, push_items, Executor};
use crate::options::{CfInsertOptions, CfReserveOptions};

/// Cuckoo filter commands, available on every executor.
pub trait CuckooCommands: Executor {
    /// `cf.reserve key capacity`
    fn cf_reserve(&self, key: impl AsRef<[u8]>, capacity: i64) -> Cmd {
        let args = vec![Arg::keyword("cf.reserve"), Arg::bytes(key), Arg::Int(capacity)];
        dispatch(self, ReplyShape::Status, args)
    }

    fn cf_reserve_with_args(&self, key: impl AsRef<[u8]>, options: &CfReserveOptions) -> Cmd {
        let mut args = vec![Arg::keyword("cf.reserve"), Arg::bytes(key)];
        options.push_args(&mut args);
        dispatch(self, ReplyShape::Status, args)
    }

    fn cf_add(&self, key: impl AsRef<[u8]>, item: impl Into<Arg>) -> Cmd {
        let args = vec![Arg::keyword("cf.add"), Arg::bytes(key), item.into()];
        dispatch(self, ReplyShape::Int, args)
    }

    /// Adds the item only if it is not already present.
    fn cf_add_nx(&self, key: impl AsRef<[u8]>, item: impl Into<Arg>) -> Cmd {
        let args = vec![Arg::keyword("cf.addnx"), Arg::bytes(key), item.into()];
        dispatch(self, ReplyShape::Int, args)
    }

    /// Approximate number of times the item was added.
    fn cf_count(&self, key: impl AsRef<[u8]>, item: impl Into<Arg>) -> Cmd {
        let args = vec![Arg::keyword("cf.count"), Arg::bytes(key), item.into()];
        dispatch(self, ReplyShape::Int, args)
    }

    /// Removes one occurrence of the item.
    fn cf_del(&self, key: impl AsRef<[u8]>, item: impl Into<Arg>) -> Cmd {
        let args = vec![Arg::keyword("cf.del"), Arg::bytes(key), item.into()];
        dispatch(self, ReplyShape::Int, args)
    }

    fn cf_exists(&self, key: impl AsRef<[u8]>, item: impl Into<Arg>) -> Cmd {
        let args = vec![Arg::keyword("cf.exists"), Arg::bytes(key), item.into()];
        dispatch(self, ReplyShape::Int, args)
    }

    fn cf_info(&self, key: impl AsRef<[u8]>) -> Cmd {
        let args = vec![Arg::keyword("cf.info"), Arg::bytes(key)];
        dispatch(self, ReplyShape::IntMap, args)
    }

    /// Adds items, creating the filter if needed and allowed.
    fn cf_insert<I>(&self, key: impl AsRef<[u8]>, options: Option<&CfInsertOptions>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let args = insert_args("cf.insert", key.as_ref(), options, items);
        dispatch(self, ReplyShape::IntList, args)
    }

    /// Like `cf_insert`, but skips items that are already present.
    fn cf_insert_nx<I>(&self, key: impl AsRef<[u8]>, options: Option<&CfInsertOptions>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let args = insert_args("cf.insertnx", key.as_ref(), options, items);
        dispatch(self, ReplyShape::IntList, args)
    }

    fn cf_mexists<I>(&self, key: impl AsRef<[u8]>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("cf.mexists"), Arg::bytes(key)];
        push_items(&mut args, items);
        dispatch(self, ReplyShape::IntList, args)
    }

    fn cf_scandump(&self, key: impl AsRef<[u8]>, iterator: i64) -> Cmd {
        let args = vec![Arg::keyword("cf.scandump"), Arg::bytes(key), Arg::Int(iterator)];
        dispatch(self, ReplyShape::Dump, args)
    }

    fn cf_loadchunk(&self, key: impl AsRef<[u8]>, iterator: i64, data: impl Into<Arg>) -> Cmd {
        let args = vec![
            Arg::keyword("cf.loadchunk"),
            Arg::bytes(key),
            Arg::Int(iterator),
            data.into(),
        ];
        dispatch(self, ReplyShape::Status, args)
    }
}

impl<E: Executor + ?Sized> CuckooCommands for E {}

fn insert_args<I>(name: &'static str, key: &[u8], options: Option<&CfInsertOptions>, items: I) -> Vec<Arg>
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    let mut args = vec![Arg::keyword(name), Arg::bytes(key)];
    if let Some(options) = options {
        options.push_args(&mut args);
    }
    args.push(Arg::keyword("items"));
    push_items(&mut args, items);
    args
}
