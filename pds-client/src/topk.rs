//! # Top-K Commands
//!
//! Purpose: Build `topk.*` requests from typed parameters.

use pds_common::Arg;

use crate::cmd::{Cmd, ReplyShape};
use crate::executor::{dispatch, push_increments, push_items, Executor};

/// Top-K commands, available on every executor.
pub trait TopKCommands: Executor {
    /// Adds items. Each reply slot holds the item expelled from the list, if any.
    fn topk_add<I>(&self, key: impl AsRef<[u8]>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("topk.add"), Arg::bytes(key)];
        push_items(&mut args, items);
        dispatch(self, ReplyShape::StrList, args)
    }

    /// `topk.reserve key k` with store defaults for the rest.
    fn topk_reserve(&self, key: impl AsRef<[u8]>, k: i64) -> Cmd {
        let args = vec![Arg::keyword("topk.reserve"), Arg::bytes(key), Arg::Int(k)];
        dispatch(self, ReplyShape::Status, args)
    }

    /// `topk.reserve key k width depth decay`
    fn topk_reserve_with_options(
        &self,
        key: impl AsRef<[u8]>,
        k: i64,
        width: i64,
        depth: i64,
        decay: f64,
    ) -> Cmd {
        let args = vec![
            Arg::keyword("topk.reserve"),
            Arg::bytes(key),
            Arg::Int(k),
            Arg::Int(width),
            Arg::Int(depth),
            Arg::Float(decay),
        ];
        dispatch(self, ReplyShape::Status, args)
    }

    fn topk_info(&self, key: impl AsRef<[u8]>) -> Cmd {
        let args = vec![Arg::keyword("topk.info"), Arg::bytes(key)];
        dispatch(self, ReplyShape::TopKInfo, args)
    }

    /// Whether each item is currently in the top list.
    fn topk_query<I>(&self, key: impl AsRef<[u8]>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("topk.query"), Arg::bytes(key)];
        push_items(&mut args, items);
        dispatch(self, ReplyShape::BoolList, args)
    }

    fn topk_count<I>(&self, key: impl AsRef<[u8]>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("topk.count"), Arg::bytes(key)];
        push_items(&mut args, items);
        dispatch(self, ReplyShape::IntList, args)
    }

    fn topk_incr_by<I, T>(&self, key: impl AsRef<[u8]>, pairs: I) -> Cmd
    where
        I: IntoIterator<Item = (T, i64)>,
        T: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("topk.incrby"), Arg::bytes(key)];
        push_increments(&mut args, pairs);
        dispatch(self, ReplyShape::StrList, args)
    }

    /// Current top items, highest first.
    fn topk_list(&self, key: impl AsRef<[u8]>) -> Cmd {
        let args = vec![Arg::keyword("topk.list"), Arg::bytes(key)];
        dispatch(self, ReplyShape::StrList, args)
    }

    /// Current top items paired with their counts.
    fn topk_list_with_count(&self, key: impl AsRef<[u8]>) -> Cmd {
        let args = vec![
            Arg::keyword("topk.list"),
            Arg::bytes(key),
            Arg::keyword("withcount"),
        ];
        dispatch(self, ReplyShape::IntMap, args)
    }
}

impl<E: Executor + ?Sized> TopKCommands for E {}
