//! Keyed Red-Black Tree - Tree controller
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::{boxed::Box, vec::Vec};
use core::{cmp::Ordering, ops::Deref};

use crate::{
    node::{Color, Node, NodeId, Storage},
    Config, DuplicatePolicy, Error, KeyMode, Result,
};

/// Derives the ordering key of a value in a [Dynamic](KeyMode::Dynamic) tree.
type KeyStrategy<K, V> = Box<dyn Fn(&V) -> K>;

/// The key a node is ordered by, either stored on the node or derived from its value.
pub(crate) enum EffectiveKey<'a, K> {
    Stored(&'a K),
    Derived(K),
}

impl<K> Deref for EffectiveKey<'_, K> {
    type Target = K;

    fn deref(&self) -> &K {
        match self {
            EffectiveKey::Stored(key) => key,
            EffectiveKey::Derived(key) => key,
        }
    }
}

enum SearchResult {
    Found(NodeId),
    // `parent` is nil when the tree is empty.
    Vacant { parent: NodeId, ordering: Ordering },
}

/// A red-black tree ordered by static or value-derived keys.
///
/// Nodes are stored in an arena owned by the tree and are never removed, so the [NodeId] returned by
/// [insert](Self::insert) can be used to inspect the node at any later point.
pub struct Rbt<K, V> {
    storage: Storage<K, V>,
    root: NodeId,
    config: Config,
    key_strategy: Option<KeyStrategy<K, V>>,
}

impl<K, V> Rbt<K, V>
where
    K: Ord,
{
    /// Creates an empty tree using [KeyMode::Static] and [DuplicatePolicy::Reject].
    pub const fn new() -> Self {
        Rbt {
            storage: Storage::new(),
            root: NodeId::NIL,
            config: Config { key_mode: KeyMode::Static, duplicates: DuplicatePolicy::Reject },
            key_strategy: None,
        }
    }

    /// Creates an empty tree with the given configuration.
    ///
    /// A tree configured with [KeyMode::Dynamic] needs a key strategy installed with
    /// [set_key_strategy](Self::set_key_strategy) before values can be inserted.
    pub fn with_config(config: Config) -> Self {
        Rbt { storage: Storage::new(), root: NodeId::NIL, config, key_strategy: None }
    }

    /// Creates an empty [Dynamic](KeyMode::Dynamic) tree that orders values by `strategy`.
    ///
    /// The strategy must always return the same key for the same value.
    pub fn with_key_strategy<F>(strategy: F) -> Self
    where
        F: Fn(&V) -> K + 'static,
    {
        Rbt {
            storage: Storage::new(),
            root: NodeId::NIL,
            config: Config { key_mode: KeyMode::Dynamic, ..Config::default() },
            key_strategy: Some(Box::new(strategy)),
        }
    }

    /// Installs the key strategy of a [Dynamic](KeyMode::Dynamic) tree, replacing any previous one.
    ///
    /// A replacement must order the values already in the tree the same way as the strategy it replaces.
    ///
    /// # Errors
    ///
    /// Returns [KeyModeMismatch](Error::KeyModeMismatch) if the tree uses [KeyMode::Static].
    ///
    pub fn set_key_strategy<F>(&mut self, strategy: F) -> Result<()>
    where
        F: Fn(&V) -> K + 'static,
    {
        if self.config.key_mode != KeyMode::Dynamic {
            return Err(Error::KeyModeMismatch);
        }
        self.key_strategy = Some(Box::new(strategy));
        Ok(())
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Indicates whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// Returns the height of the tree.
    pub fn height(&self) -> usize {
        self.storage.height(self.root)
    }

    pub fn key_mode(&self) -> KeyMode {
        self.config.key_mode
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.config.duplicates
    }

    /// Returns the root of the tree, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeId> {
        self.root.some()
    }

    /// Directly accesses a node in the arena.
    ///
    /// # Time Complexity
    ///
    /// O(1)
    ///
    pub fn node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.storage.get(id)
    }

    /// Returns the other child of the node's parent, if both exist.
    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        self.storage.sibling(id).some()
    }

    /// Returns the parent of the node's parent, if it exists.
    pub fn grandparent(&self, id: NodeId) -> Option<NodeId> {
        self.storage.grandparent(id).some()
    }

    /// Returns the sibling of the node's parent, if it exists.
    pub fn uncle(&self, id: NodeId) -> Option<NodeId> {
        self.storage.uncle(id).some()
    }

    /// Returns the key the node is ordered by.
    ///
    /// `None` for nodes outside the arena, or for a [Dynamic](KeyMode::Dynamic) tree without a key strategy.
    pub(crate) fn effective_key(&self, id: NodeId) -> Option<EffectiveKey<'_, K>> {
        let node = self.storage.get(id)?;
        match self.config.key_mode {
            KeyMode::Static => node.key.as_ref().map(EffectiveKey::Stored),
            KeyMode::Dynamic => self.key_strategy.as_ref().map(|strategy| EffectiveKey::Derived(strategy(&node.value))),
        }
    }

    fn missing_key_error(&self) -> Error {
        match self.config.key_mode {
            KeyMode::Static => Error::MissingKey,
            KeyMode::Dynamic => Error::MissingKeyStrategy,
        }
    }

    /// Inserts a value into the tree.
    ///
    /// In a [Static](KeyMode::Static) tree `key` is required and stored on the node. In a
    /// [Dynamic](KeyMode::Dynamic) tree `key` is ignored and the key is derived from `value` by the tree's key
    /// strategy.
    ///
    /// Returns the id of the node holding `value`. Under [DuplicatePolicy::Overwrite] this is the id of the
    /// existing node whose value was replaced.
    ///
    /// # Time Complexity
    ///
    /// O(log n)
    ///
    /// # Errors
    ///
    /// Returns [MissingKey](Error::MissingKey) if the tree is static and no key was given.
    ///
    /// Returns [MissingKeyStrategy](Error::MissingKeyStrategy) if the tree is dynamic and no key strategy is
    /// installed.
    ///
    /// Returns [AlreadyExists](Error::AlreadyExists) if the key is already in the tree and the policy is
    /// [DuplicatePolicy::Reject].
    ///
    pub fn insert(&mut self, value: V, key: Option<K>) -> Result<NodeId> {
        let key = match self.config.key_mode {
            KeyMode::Static => key.ok_or(Error::MissingKey)?,
            KeyMode::Dynamic => {
                let strategy = self.key_strategy.as_ref().ok_or(Error::MissingKeyStrategy)?;
                if key.is_some() {
                    log::trace!(target: "rbt", "Ignoring explicit key for a dynamically keyed tree.");
                }
                strategy(&value)
            }
        };

        let search = self.search(&key).ok_or_else(|| self.missing_key_error())?;
        let (parent, ordering) = match search {
            SearchResult::Found(existing) => return self.insert_duplicate(existing, value, key),
            SearchResult::Vacant { parent, ordering } => (parent, ordering),
        };

        let stored_key = match self.config.key_mode {
            KeyMode::Static => Some(key),
            KeyMode::Dynamic => None,
        };
        let node = self.storage.add(value, stored_key);

        if parent.is_nil() {
            self.storage.set_color(node, Color::Black);
            self.root = node;
            return Ok(node);
        }

        match ordering {
            Ordering::Less => self.storage.link_left(parent, node),
            _ => self.storage.link_right(parent, node),
        }

        if self.storage.is_red(parent) {
            self.fixup_add(node);
        }
        Ok(node)
    }

    fn insert_duplicate(&mut self, existing: NodeId, value: V, key: K) -> Result<NodeId> {
        match self.config.duplicates {
            DuplicatePolicy::Reject => {
                log::trace!(target: "rbt", "Rejecting duplicate key of node {}.", existing.index());
                Err(Error::AlreadyExists)
            }
            DuplicatePolicy::Overwrite => {
                log::trace!(target: "rbt", "Overwriting value of node {}.", existing.index());
                let static_key = self.config.key_mode == KeyMode::Static;
                // `search` only returns ids of nodes linked into the arena, so the lookup always succeeds.
                if let Some(node) = self.storage.get_mut(existing) {
                    node.value = value;
                    if static_key {
                        node.key = Some(key);
                    }
                }
                Ok(existing)
            }
        }
    }

    /// Descends from the root looking for `key`.
    ///
    /// Returns `None` if a visited node has no effective key.
    fn search(&self, key: &K) -> Option<SearchResult> {
        let mut current = self.root;
        let mut parent = NodeId::NIL;
        let mut ordering = Ordering::Equal;
        while !current.is_nil() {
            ordering = key.cmp(&*self.effective_key(current)?);
            parent = current;
            current = match ordering {
                Ordering::Equal => return Some(SearchResult::Found(current)),
                Ordering::Less => self.storage.left(current),
                Ordering::Greater => self.storage.right(current),
            };
        }
        Some(SearchResult::Vacant { parent, ordering })
    }

    /// Searches the tree, returning the id of the node ordered by `key` if it exists.
    ///
    /// # Time Complexity
    ///
    /// O(log n)
    ///
    pub fn find(&self, key: &K) -> Option<NodeId> {
        match self.search(key)? {
            SearchResult::Found(id) => Some(id),
            SearchResult::Vacant { .. } => None,
        }
    }

    /// Searches for a value in the tree, returning it if it exists.
    ///
    /// # Time Complexity
    ///
    /// O(log n)
    ///
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).and_then(|id| self.storage.get(id)).map(|node| &node.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns the node with the smallest key in the subtree rooted at `subtree_root`.
    ///
    /// Returns `None` if `subtree_root` is not a node of this tree.
    pub fn find_min(&self, subtree_root: NodeId) -> Option<NodeId> {
        self.storage.get(subtree_root)?;
        Some(self.storage.min(subtree_root))
    }

    /// Returns the first ordered value in the tree.
    pub fn first(&self) -> Option<&V> {
        let first = self.find_min(self.root)?;
        self.storage.get(first).map(|node| &node.value)
    }

    /// Returns the ids of the linked nodes in key order.
    pub(crate) fn in_order(&self) -> Vec<NodeId> {
        let mut ordered = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut current = self.root;
        while !current.is_nil() || !stack.is_empty() {
            while !current.is_nil() {
                stack.push(current);
                current = self.storage.left(current);
            }
            if let Some(node) = stack.pop() {
                ordered.push(node);
                current = self.storage.right(node);
            }
        }
        ordered
    }

    pub(crate) fn storage(&self) -> &Storage<K, V> {
        &self.storage
    }

    #[cfg(test)]
    pub(crate) fn storage_mut(&mut self) -> &mut Storage<K, V> {
        &mut self.storage
    }

    /// Rotates left around `id`, making the new subtree root the tree root when it has no parent.
    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let top = self.storage.rotate_left(id);
        if self.storage.parent(top).is_nil() {
            self.root = top;
        }
        top
    }

    /// Rotates right around `id`, making the new subtree root the tree root when it has no parent.
    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let top = self.storage.rotate_right(id);
        if self.storage.parent(top).is_nil() {
            self.root = top;
        }
        top
    }

    /// Updates the tree after a node has been added, to meet the red-black tree properties.
    fn fixup_add(&mut self, mut node: NodeId) {
        loop {
            // Case 1: The node is the root of the tree.
            let parent = self.storage.parent(node);
            if parent.is_nil() {
                self.storage.set_color(node, Color::Black);
                return;
            }

            // The parent is black, no fixups needed.
            if self.storage.is_black(parent) {
                return;
            }

            // Case 2: the root is black, so a red parent always has a parent of its own. A red root is recolored.
            let grandparent = self.storage.parent(parent);
            if grandparent.is_nil() {
                self.storage.set_color(parent, Color::Black);
                return;
            }
            let uncle = self.storage.sibling(parent);

            // Case 3: Uncle is red, recolor parent, grandparent, uncle and continue from the grandparent.
            if self.storage.is_red(uncle) {
                log::trace!(target: "rbt", "Recoloring around node {}.", grandparent.index());
                self.storage.set_color(parent, Color::Black);
                self.storage.set_color(uncle, Color::Black);
                self.storage.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            let parent_is_left = parent == self.storage.left(grandparent);
            let node_is_left = node == self.storage.left(parent);

            // Case 4: uncle is black and node is an "inner child" of its grandparent. Rotate it outwards and
            // handle the former parent as the outer child.
            if parent_is_left != node_is_left {
                log::trace!(target: "rbt", "Rotating inner child {} outwards.", node.index());
                if parent_is_left {
                    self.rotate_left(parent);
                } else {
                    self.rotate_right(parent);
                }
                node = parent;
                continue;
            }

            // Case 5: uncle is black and node is an "outer child" of its grandparent.
            log::trace!(target: "rbt", "Rotating grandparent {}.", grandparent.index());
            if parent_is_left {
                self.rotate_right(grandparent);
            } else {
                self.rotate_left(grandparent);
            }
            let grandparent_color = self.storage.color(grandparent);
            self.storage.set_color(grandparent, self.storage.color(parent));
            self.storage.set_color(parent, grandparent_color);
            return;
        }
    }
}

impl<K, V> Default for Rbt<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> core::fmt::Debug for Rbt<K, V>
where
    K: Ord,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rbt")
            .field("len", &self.len())
            .field("height", &self.height())
            .field("key_mode", &self.config.key_mode)
            .field("duplicates", &self.config.duplicates)
            .finish()
    }
}
