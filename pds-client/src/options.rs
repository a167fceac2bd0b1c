//! # Optional Command Settings
//!
//! Purpose: Bundle the optional settings of reserve/insert commands.
//!
//! Every optional numeric setting is an `Option`: `None` omits the setting
//! and lets the store default apply, while `Some(0)` sends an explicit zero.
//! Flags are omitted when `false`.
//!
//! ## Emitted Order
//!
//! ```text
//! bf.reserve key [error] [capacity] [expansion N] [nonscaling]
//! bf.insert  key [capacity N] [error E] [expansion N] [nocreate] [nonscaling] items ...
//! cf.reserve key capacity [bucketsize N] [maxiterations N] [expansion N]
//! cf.insert  key [capacity N] [nocreate] items ...
//! ```

use serde::{Deserialize, Serialize};

use pds_common::Arg;

/// Settings for `bf.reserve` when built from options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfReserveOptions {
    /// Target false-positive rate.
    pub error_rate: Option<f64>,
    /// Expected number of items.
    pub capacity: Option<i64>,
    /// Growth factor of sub-filters.
    pub expansion: Option<i64>,
    /// Refuse to grow once full.
    pub non_scaling: bool,
}

impl BfReserveOptions {
    pub(crate) fn push_args(&self, args: &mut Vec<Arg>) {
        if let Some(error_rate) = self.error_rate {
            args.push(Arg::Float(error_rate));
        }
        if let Some(capacity) = self.capacity {
            args.push(Arg::Int(capacity));
        }
        if let Some(expansion) = self.expansion {
            args.push(Arg::keyword("expansion"));
            args.push(Arg::Int(expansion));
        }
        if self.non_scaling {
            args.push(Arg::keyword("nonscaling"));
        }
    }
}

/// Settings for `bf.insert`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfInsertOptions {
    /// Capacity used if the filter has to be created.
    pub capacity: Option<i64>,
    /// Error rate used if the filter has to be created.
    pub error_rate: Option<f64>,
    pub expansion: Option<i64>,
    /// Fail instead of creating a missing filter.
    pub no_create: bool,
    pub non_scaling: bool,
}

impl BfInsertOptions {
    pub(crate) fn push_args(&self, args: &mut Vec<Arg>) {
        if let Some(capacity) = self.capacity {
            args.push(Arg::keyword("capacity"));
            args.push(Arg::Int(capacity));
        }
        if let Some(error_rate) = self.error_rate {
            args.push(Arg::keyword("error"));
            args.push(Arg::Float(error_rate));
        }
        if let Some(expansion) = self.expansion {
            args.push(Arg::keyword("expansion"));
            args.push(Arg::Int(expansion));
        }
        if self.no_create {
            args.push(Arg::keyword("nocreate"));
        }
        if self.non_scaling {
            args.push(Arg::keyword("nonscaling"));
        }
    }
}

/// Settings for `cf.reserve` when built from options.
///
/// Capacity is a required positional token in the store grammar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfReserveOptions {
    pub capacity: i64,
    /// Items per bucket.
    pub bucket_size: Option<i64>,
    /// Swap attempts before declaring the filter full.
    pub max_iterations: Option<i64>,
    pub expansion: Option<i64>,
}

impl CfReserveOptions {
    /// Options with only the required capacity set.
    pub fn new(capacity: i64) -> Self {
        CfReserveOptions {
            capacity,
            ..CfReserveOptions::default()
        }
    }

    pub(crate) fn push_args(&self, args: &mut Vec<Arg>) {
        args.push(Arg::Int(self.capacity));
        if let Some(bucket_size) = self.bucket_size {
            args.push(Arg::keyword("bucketsize"));
            args.push(Arg::Int(bucket_size));
        }
        if let Some(max_iterations) = self.max_iterations {
            args.push(Arg::keyword("maxiterations"));
            args.push(Arg::Int(max_iterations));
        }
        if let Some(expansion) = self.expansion {
            args.push(Arg::keyword("expansion"));
            args.push(Arg::Int(expansion));
        }
    }
}

/// Settings for `cf.insert` and `cf.insertnx`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfInsertOptions {
    pub capacity: Option<i64>,
    pub no_create: bool,
}

impl CfInsertOptions {
    pub(crate) fn push_args(&self, args: &mut Vec<Arg>) {
        if let Some(capacity) = self.capacity {
            args.push(Arg::keyword("capacity"));
            args.push(Arg::Int(capacity));
        }
        if self.no_create {
            args.push(Arg::keyword("nocreate"));
        }
    }
}

/// Field selector for `bf.info key <field>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BfInfoField {
    Capacity,
    Size,
    Filters,
    Items,
    Expansion,
}

impl BfInfoField {
    /// Returns the keyword sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            BfInfoField::Capacity => "capacity",
            BfInfoField::Size => "size",
            BfInfoField::Filters => "filters",
            BfInfoField::Items => "items",
            BfInfoField::Expansion => "expansion",
        }
    }
}
