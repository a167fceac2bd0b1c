//! # Execution Channel
//!
//! Purpose: Define the one capability command builders need from the host
//! client: run a command and settle its outcome.
//!
//! ## Design Principles
//! 1. **Injected Capability**: Builders are generic over `Executor`, so a fake
//!    executor can stand in for the network in tests.
//! 2. **Side-Effect Contract**: `process` returns nothing; success or failure
//!    is recorded in the `Cmd` itself.

use std::sync::Arc;

use pds_common::Arg;

use crate::cmd::{Cmd, ReplyShape};

/// Runs commands against a store.
///
/// Implementations must settle `cmd` before returning, either by calling
/// `Cmd::read_reply` with their reply reader or `Cmd::set_err`.
pub trait Executor {
    fn process(&self, cmd: &mut Cmd);
}

impl<E: Executor + ?Sized> Executor for &E {
    fn process(&self, cmd: &mut Cmd) {
        (**self).process(cmd)
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn process(&self, cmd: &mut Cmd) {
        (**self).process(cmd)
    }
}

/// Builds a command, hands it to the executor once, and returns it.
pub(crate) fn dispatch<E: Executor + ?Sized>(executor: &E, shape: ReplyShape, args: Vec<Arg>) -> Cmd {
    let mut cmd = Cmd::new(shape, args);
    executor.process(&mut cmd);
    cmd
}

/// Appends variadic items after the fixed tokens.
pub(crate) fn push_items<I>(args: &mut Vec<Arg>, items: I)
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    args.extend(items.into_iter().map(Into::into));
}

/// Appends `item increment` pairs.
pub(crate) fn push_increments<I, T>(args: &mut Vec<Arg>, pairs: I)
where
    I: IntoIterator<Item = (T, i64)>,
    T: Into<Arg>,
{
    for (item, increment) in pairs {
        args.push(item.into());
        args.push(Arg::Int(increment));
    }
}
