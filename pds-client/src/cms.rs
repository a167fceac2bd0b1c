//! # Count-Min Sketch Commands
//!
//! Purpose: Build `cms.*` requests from typed parameters.
//!
//! ## Design Principles
//! 1. **Positional Pairing**: Weighted merges split (source, weight) pairs
//!    in a single pass, so the i-th weight always belongs to the i-th source
//!    whatever the input collection's iteration order.
//! 2. **Count First**: `cms.merge` carries the number of sources before the
//!    source keys.

use pds_common::Arg;

use crate::cmd::{Cmd, ReplyShape};
use crate::executor::{dispatch, push_increments, push_items, Executor};

/// Count-min sketch commands, available on every executor.
pub trait CmsCommands: Executor {
    /// Increments each item by its paired amount; replies with the new counts.
    fn cms_incr_by<I, T>(&self, key: impl AsRef<[u8]>, pairs: I) -> Cmd
    where
        I: IntoIterator<Item = (T, i64)>,
        T: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("cms.incrby"), Arg::bytes(key)];
        push_increments(&mut args, pairs);
        dispatch(self, ReplyShape::IntList, args)
    }

    fn cms_info(&self, key: impl AsRef<[u8]>) -> Cmd {
        let args = vec![Arg::keyword("cms.info"), Arg::bytes(key)];
        dispatch(self, ReplyShape::IntMap, args)
    }

    /// `cms.initbydim key width depth`
    fn cms_init_by_dim(&self, key: impl AsRef<[u8]>, width: i64, depth: i64) -> Cmd {
        let args = vec![
            Arg::keyword("cms.initbydim"),
            Arg::bytes(key),
            Arg::Int(width),
            Arg::Int(depth),
        ];
        dispatch(self, ReplyShape::Status, args)
    }

    /// `cms.initbyprob key error probability`
    fn cms_init_by_prob(&self, key: impl AsRef<[u8]>, error_rate: f64, probability: f64) -> Cmd {
        let args = vec![
            Arg::keyword("cms.initbyprob"),
            Arg::bytes(key),
            Arg::Float(error_rate),
            Arg::Float(probability),
        ];
        dispatch(self, ReplyShape::Status, args)
    }

    /// Merges `sources` into `dest` with unit weights.
    fn cms_merge<I>(&self, dest: impl AsRef<[u8]>, sources: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let sources: Vec<Arg> = sources.into_iter().map(Arg::bytes).collect();
        let mut args = Vec::with_capacity(sources.len() + 3);
        args.push(Arg::keyword("cms.merge"));
        args.push(Arg::bytes(dest));
        args.push(Arg::from(sources.len()));
        args.extend(sources);
        dispatch(self, ReplyShape::Status, args)
    }

    /// Merges weighted sources into `dest`.
    ///
    /// Accepts any collection of `(source, weight)` pairs, including a
    /// `HashMap`. Without sources the `weights` keyword is left out.
    fn cms_merge_with_weight<I, K>(&self, dest: impl AsRef<[u8]>, pairs: I) -> Cmd
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<[u8]>,
    {
        let (sources, weights): (Vec<Arg>, Vec<Arg>) = pairs
            .into_iter()
            .map(|(source, weight)| (Arg::bytes(source), Arg::Int(weight)))
            .unzip();

        let mut args = Vec::with_capacity(sources.len() * 2 + 4);
        args.push(Arg::keyword("cms.merge"));
        args.push(Arg::bytes(dest));
        args.push(Arg::from(sources.len()));
        if !sources.is_empty() {
            args.extend(sources);
            args.push(Arg::keyword("weights"));
            args.extend(weights);
        }
        dispatch(self, ReplyShape::Status, args)
    }

    /// Estimated counts for each item, in request order.
    fn cms_query<I>(&self, key: impl AsRef<[u8]>, items: I) -> Cmd
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let mut args = vec![Arg::keyword("cms.query"), Arg::bytes(key)];
        push_items(&mut args, items);
        dispatch(self, ReplyShape::IntList, args)
    }
}

impl<E: Executor + ?Sized> CmsCommands for E {}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::executor::testing::{render, Recorder};

    #[test]
    fn incr_by_interleaves_pairs() {
        let ex = Recorder::replying(b"*2\r\n:3\r\n:5\r\n");
        let cmd = ex.cms_incr_by("s", vec![("a", 3), ("b", 5)]);
        assert_eq!(render(&cmd), vec!["cms.incrby", "s", "a", "3", "b", "5"]);
        assert_eq!(cmd.into_int_list().unwrap(), vec![3, 5]);
    }

    #[test]
    fn init_commands() {
        let ex = Recorder::replying(b"+OK\r\n");
        assert_eq!(
            render(&ex.cms_init_by_dim("s", 2000, 5)),
            vec!["cms.initbydim", "s", "2000", "5"]
        );
        assert_eq!(
            render(&ex.cms_init_by_prob("s", 0.001, 0.01)),
            vec!["cms.initbyprob", "s", "0.001", "0.01"]
        );
    }

    #[test]
    fn merge_puts_count_before_sources() {
        let ex = Recorder::replying(b"+OK\r\n");
        let cmd = ex.cms_merge("dest", ["a", "b"]);
        assert_eq!(render(&cmd), vec!["cms.merge", "dest", "2", "a", "b"]);
        assert_eq!(cmd.into_status().unwrap(), "OK");
    }

    #[test]
    fn weighted_merge_keeps_pairs_aligned() {
        let ex = Recorder::replying(b"+OK\r\n");
        let pairs = BTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(
            render(&ex.cms_merge_with_weight("dest", pairs)),
            vec!["cms.merge", "dest", "3", "a", "b", "c", "weights", "1", "2", "3"]
        );
    }

    #[test]
    fn weighted_merge_pairs_survive_hash_order() {
        let ex = Recorder::replying(b"+OK\r\n");
        let pairs: HashMap<String, i64> = (0..16).map(|idx| (format!("src{}", idx), idx)).collect();
        let tokens = render(&ex.cms_merge_with_weight("dest", pairs));

        assert_eq!(tokens[2], "16");
        assert_eq!(tokens[19], "weights");
        let sources = &tokens[3..19];
        let weights = &tokens[20..];
        assert_eq!(sources.len(), weights.len());
        for (source, weight) in sources.iter().zip(weights) {
            assert_eq!(source, &format!("src{}", weight));
        }
    }

    #[test]
    fn weighted_merge_without_sources_omits_keyword() {
        let ex = Recorder::replying(b"+OK\r\n");
        let cmd = ex.cms_merge_with_weight("dest", Vec::<(&str, i64)>::new());
        assert_eq!(render(&cmd), vec!["cms.merge", "dest", "0"]);
    }

    #[test]
    fn query_and_info() {
        let ex = Recorder::replying(b"*2\r\n:10\r\n:0\r\n");
        let cmd = ex.cms_query("s", ["a", "b"]);
        assert_eq!(render(&cmd), vec!["cms.query", "s", "a", "b"]);
        assert_eq!(cmd.into_int_list().unwrap(), vec![10, 0]);

        let ex = Recorder::replying(b"*6\r\n$5\r\nwidth\r\n:2000\r\n$5\r\ndepth\r\n:5\r\n$5\r\ncount\r\n:15\r\n");
        let reply = ex.cms_info("s").into_result().unwrap();
        assert_eq!(reply.map_get("width"), Some(2000));
        assert_eq!(reply.map_get("count"), Some(15));
    }
}
