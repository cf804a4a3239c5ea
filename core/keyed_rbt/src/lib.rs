//! A `no_std` red-black tree whose nodes live in a growable arena and link to each other by index
//! rather than by pointer. Insertion and lookup are `O(log n)` regardless of the order in which keys
//! arrive.
//!
//! The tree supports two [keying modes](KeyMode):
//!
//! - [Static](KeyMode::Static): every value is inserted together with its key, which is stored on the
//!   node.
//! - [Dynamic](KeyMode::Dynamic): no key is stored; the key is derived from the value on demand with a
//!   single strategy function installed on the tree. The strategy must be deterministic, the tree does
//!   not re-validate the ordering it produces.
//!
//! Repeated keys are handled according to the configured [DuplicatePolicy]; nothing is ever dropped
//! silently. An [invariant checker](Rbt::test_invariants) is provided to validate the red-black
//! properties, intended for tests rather than production control flow.
//!
//! The crate requires `alloc` for the node arena.
//!
//! ## Examples
//!
//! ```rust
//! use keyed_rbt::{Config, KeyMode, Rbt};
//!
//! let mut rbt: Rbt<u32, &str> = Rbt::new();
//! rbt.insert("five", Some(5)).unwrap();
//! rbt.insert("three", Some(3)).unwrap();
//! assert_eq!(rbt.get(&3), Some(&"three"));
//! assert!(rbt.test_invariants());
//!
//! let mut by_len: Rbt<usize, &str> = Rbt::with_key_strategy(|s: &&str| s.len());
//! by_len.insert("abc", None).unwrap();
//! by_len.insert("a", None).unwrap();
//! assert_eq!(by_len.first(), Some(&"a"));
//! assert_eq!(by_len.key_mode(), KeyMode::Dynamic);
//!
//! let cfg = Config { key_mode: KeyMode::Dynamic, ..Default::default() };
//! let mut unset: Rbt<u32, u32> = Rbt::with_config(cfg);
//! assert!(unset.insert(1, None).is_err());
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![no_std]
extern crate alloc;

mod invariants;
mod node;
mod rbt;

pub use invariants::InvariantReport;
pub use node::{Color, Node, NodeId};
pub use rbt::Rbt;

/// Public result type for the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Public error types for the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A value was inserted without a key into a tree using [KeyMode::Static].
    MissingKey,
    /// A value was inserted into a tree using [KeyMode::Dynamic] before a key strategy was installed.
    MissingKeyStrategy,
    /// A key strategy was installed on a tree using [KeyMode::Static].
    KeyModeMismatch,
    /// The key already exists in the tree and the policy is [DuplicatePolicy::Reject].
    AlreadyExists,
}

/// How a tree obtains the ordering key of a node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// The key is supplied on insert and stored on the node.
    #[default]
    Static,
    /// The key is computed from the value with the tree's key strategy every time it is needed.
    Dynamic,
}

/// What [insert](Rbt::insert) does when the key is already present.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail with [Error::AlreadyExists], leaving the tree untouched.
    #[default]
    Reject,
    /// Replace the value of the existing node in place. The shape and colors of the tree do not change.
    Overwrite,
}

/// Construction time configuration of a [Rbt]. The key mode cannot be changed afterwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The keying mode of the tree.
    pub key_mode: KeyMode,
    /// The handling of repeated keys.
    pub duplicates: DuplicatePolicy,
}
