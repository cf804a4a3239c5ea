//! Keyed Red-Black Tree - Nodes and their arena
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;

/// The color of a node in a red-black tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// The index of a node in the arena of a tree.
///
/// Ids are handed out by [insert](crate::Rbt::insert) and stay valid for the lifetime of the tree, as nodes are
/// never removed from the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Marks an absent parent or child link.
    pub(crate) const NIL: NodeId = NodeId(usize::MAX);

    /// Returns the position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn is_nil(self) -> bool {
        self == Self::NIL
    }

    pub(crate) fn some(self) -> Option<NodeId> {
        (!self.is_nil()).then_some(self)
    }
}

/// A node of a red-black tree.
///
/// The relational fields are indices into the owning tree's arena. The parent link is only a traversal aid,
/// the arena owns every node.
#[derive(Debug)]
pub struct Node<K, V> {
    pub(crate) color: Color,
    pub(crate) key: Option<K>,
    pub(crate) value: V,
    pub(crate) parent: NodeId,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
}

impl<K, V> Node<K, V> {
    fn new(value: V, key: Option<K>) -> Self {
        Node { color: Color::Red, key, value, parent: NodeId::NIL, left: NodeId::NIL, right: NodeId::NIL }
    }

    /// Returns the color of the node.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Indicates whether the node is red.
    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    /// Indicates whether the node is black.
    pub fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    /// Returns the stored key. Always `None` for nodes of a [Dynamic](crate::KeyMode::Dynamic) tree.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Returns the stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the parent of the node, or `None` for the root or an unlinked node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent.some()
    }

    /// Returns the left child of the node, if any.
    pub fn left(&self) -> Option<NodeId> {
        self.left.some()
    }

    /// Returns the right child of the node, if any.
    pub fn right(&self) -> Option<NodeId> {
        self.right.some()
    }
}

/// A growable arena holding the nodes of a red-black tree.
///
/// Every accessor accepts [NodeId::NIL] and treats it as an absent leaf: it reads as black, has no relatives,
/// and writes to it are ignored. This keeps the rebalancing code free of absent-node special cases.
pub(crate) struct Storage<K, V> {
    data: Vec<Node<K, V>>,
}

impl<K, V> Storage<K, V> {
    /// Create a new, empty storage container.
    pub const fn new() -> Self {
        Storage { data: Vec::new() }
    }

    /// Get the number of nodes in the storage container.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Add a new, unlinked red node to the storage container, returning its id.
    ///
    /// # Time Complexity
    ///
    /// O(1) amortized
    ///
    pub fn add(&mut self, value: V, key: Option<K>) -> NodeId {
        self.data.push(Node::new(value, key));
        NodeId(self.data.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.data.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.data.get_mut(id.0)
    }

    pub fn color(&self, id: NodeId) -> Color {
        self.get(id).map_or(Color::Black, |n| n.color)
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) {
        if let Some(node) = self.get_mut(id) {
            node.color = color;
        }
    }

    pub fn is_red(&self, id: NodeId) -> bool {
        self.color(id) == Color::Red
    }

    pub fn is_black(&self, id: NodeId) -> bool {
        self.color(id) == Color::Black
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NIL, |n| n.parent)
    }

    pub fn left(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NIL, |n| n.left)
    }

    pub fn right(&self, id: NodeId) -> NodeId {
        self.get(id).map_or(NodeId::NIL, |n| n.right)
    }

    fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.parent = parent;
        }
    }

    /// Makes `child` the left child of `parent`, updating both directions of the link.
    pub fn link_left(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.get_mut(parent) {
            node.left = child;
        }
        self.set_parent(child, parent);
    }

    /// Makes `child` the right child of `parent`, updating both directions of the link.
    pub fn link_right(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.get_mut(parent) {
            node.right = child;
        }
        self.set_parent(child, parent);
    }

    /// Puts `new` in whichever child slot of `parent` holds `old`. With no parent, `new` is left unparented.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        self.set_parent(new, parent);
        if let Some(node) = self.get_mut(parent) {
            if node.left == old {
                node.left = new;
            } else if node.right == old {
                node.right = new;
            }
        }
    }

    /// Returns the other child of the node's parent.
    pub fn sibling(&self, id: NodeId) -> NodeId {
        let parent = self.parent(id);
        if parent.is_nil() {
            return NodeId::NIL;
        }
        if self.left(parent) == id {
            self.right(parent)
        } else {
            self.left(parent)
        }
    }

    pub fn grandparent(&self, id: NodeId) -> NodeId {
        self.parent(self.parent(id))
    }

    pub fn uncle(&self, id: NodeId) -> NodeId {
        self.sibling(self.parent(id))
    }

    /// Rotate the subtree to the left and return the new subtree root.
    ///
    /// Does nothing and returns `id` when the node has no right child. The caller is responsible for updating
    /// the root of the tree when the returned node has no parent.
    pub fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let right_child = self.right(id);
        if right_child.is_nil() {
            return id;
        }
        let parent_tmp = self.parent(id);

        self.link_right(id, self.left(right_child));
        self.link_left(right_child, id);
        self.replace_child(parent_tmp, id, right_child);
        right_child
    }

    /// Rotate the subtree to the right and return the new subtree root.
    ///
    /// Does nothing and returns `id` when the node has no left child. The caller is responsible for updating
    /// the root of the tree when the returned node has no parent.
    pub fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let left_child = self.left(id);
        if left_child.is_nil() {
            return id;
        }
        let parent_tmp = self.parent(id);

        self.link_left(id, self.right(left_child));
        self.link_right(left_child, id);
        self.replace_child(parent_tmp, id, left_child);
        left_child
    }

    /// Walks left children from `id` until none remains.
    pub fn min(&self, mut id: NodeId) -> NodeId {
        while !self.left(id).is_nil() {
            id = self.left(id);
        }
        id
    }

    /// Returns the number of nodes on the longest path from `id` down to an absent child.
    pub fn height(&self, id: NodeId) -> usize {
        if id.is_nil() {
            return 0;
        }
        core::cmp::max(self.height(self.left(id)), self.height(self.right(id))) + 1
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn storage_of(values: &[i32]) -> (Storage<i32, i32>, std::vec::Vec<NodeId>) {
        let mut storage = Storage::new();
        let ids = values.iter().map(|v| storage.add(*v, Some(*v))).collect();
        (storage, ids)
    }

    #[test]
    fn new_node_is_red_and_unlinked() {
        let (storage, ids) = storage_of(&[1]);
        let node = storage.get(ids[0]).unwrap();
        assert!(node.is_red());
        assert_eq!(node.key(), Some(&1));
        assert_eq!(node.value(), &1);
        assert!(node.parent().is_none());
        assert!(node.left().is_none());
        assert!(node.right().is_none());
    }

    #[test]
    fn nil_reads_as_black_leaf() {
        let (mut storage, _) = storage_of(&[1]);
        assert!(storage.is_black(NodeId::NIL));
        assert!(!storage.is_red(NodeId::NIL));
        assert!(storage.parent(NodeId::NIL).is_nil());
        storage.set_color(NodeId::NIL, Color::Red);
        assert!(storage.is_black(NodeId::NIL));
        assert_eq!(storage.height(NodeId::NIL), 0);
    }

    #[test]
    fn test_sibling() {
        let (mut storage, ids) = storage_of(&[1, 2, 3]);
        let (p, c1, c2) = (ids[0], ids[1], ids[2]);

        // No parent
        assert!(storage.sibling(c1).is_nil());

        // Parent without a second child
        storage.link_left(p, c1);
        assert!(storage.sibling(c1).is_nil());

        storage.link_right(p, c2);
        assert_eq!(storage.sibling(c1), c2);
        assert_eq!(storage.sibling(c2), c1);
    }

    #[test]
    fn test_grandparent() {
        let (mut storage, ids) = storage_of(&[1, 2, 3]);
        let (g, p, c) = (ids[0], ids[1], ids[2]);

        assert!(storage.grandparent(c).is_nil());
        storage.link_left(p, c);
        assert!(storage.grandparent(c).is_nil());

        storage.link_left(g, p);
        assert_eq!(storage.grandparent(c), g);
    }

    #[test]
    fn test_uncle() {
        let (mut storage, ids) = storage_of(&[1, 2, 3, 4]);
        let (g, p1, p2, c) = (ids[0], ids[1], ids[2], ids[3]);

        assert!(storage.uncle(c).is_nil());
        storage.link_left(p1, c);
        assert!(storage.uncle(c).is_nil());
        storage.link_left(g, p1);
        assert!(storage.uncle(c).is_nil());

        storage.link_right(g, p2);
        assert_eq!(storage.uncle(c), p2);

        // Move the child under the other parent.
        storage.link_left(p1, NodeId::NIL);
        storage.link_left(p2, c);
        assert_eq!(storage.uncle(c), p1);
    }

    #[test]
    fn test_rotate_right() {
        /* Verifies that the rotate right function works as expected.
             [50]              [75]
             /  \              /  \
           [10][75]    <--   [50][85]
               /  \          /  \
             [70][85]      [10][70]
        */
        let (mut storage, ids) = storage_of(&[75, 50, 85, 10, 70]);
        let (node, left, right, left_l, left_r) = (ids[0], ids[1], ids[2], ids[3], ids[4]);

        storage.link_left(left, left_l);
        storage.link_right(left, left_r);
        storage.link_left(node, left);
        storage.link_right(node, right);

        let new_root = storage.rotate_right(node);
        assert_eq!(new_root, left);
        assert!(storage.parent(left).is_nil());

        // Check left[50] <-> left_l[10] connection
        assert_eq!(storage.left(left), left_l);
        assert_eq!(storage.parent(left_l), left);

        // check left[50] <-> node[75] connection
        assert_eq!(storage.right(left), node);
        assert_eq!(storage.parent(node), left);

        // check node[75] <-> left_r[70] connection
        assert_eq!(storage.left(node), left_r);
        assert_eq!(storage.parent(left_r), node);

        // check node[75] <-> right[85] connection
        assert_eq!(storage.right(node), right);
        assert_eq!(storage.parent(right), node);

        for leaf in [left_l, left_r, right] {
            assert!(storage.left(leaf).is_nil());
            assert!(storage.right(leaf).is_nil());
        }
    }

    #[test]
    fn test_rotate_left() {
        /* Verifies that the rotate left function works as expected.
             [50]              [75]
             /  \              /  \
           [10][75]    -->   [50][85]
               /  \          /  \
             [70][85]      [10][70]
        */
        let (mut storage, ids) = storage_of(&[50, 10, 75, 70, 85]);
        let (node, left, right, right_l, right_r) = (ids[0], ids[1], ids[2], ids[3], ids[4]);

        storage.link_left(right, right_l);
        storage.link_right(right, right_r);
        storage.link_left(node, left);
        storage.link_right(node, right);

        let new_root = storage.rotate_left(node);
        assert_eq!(new_root, right);
        assert!(storage.parent(right).is_nil());

        // Check right[75] <-left-> node[50] connection
        assert_eq!(storage.left(right), node);
        assert_eq!(storage.parent(node), right);

        // Check right[75] <-right-> right_r[85] connection
        assert_eq!(storage.right(right), right_r);
        assert_eq!(storage.parent(right_r), right);

        // Check node[50] <-left-> left[10] connection
        assert_eq!(storage.left(node), left);
        assert_eq!(storage.parent(left), node);

        // Check node[50] <-right-> right_l[70] connection
        assert_eq!(storage.right(node), right_l);
        assert_eq!(storage.parent(right_l), node);
    }

    #[test]
    fn rotate_reparents_into_former_slot() {
        /*
             [90]                [90]
             /                   /
           [50]       -->      [30]
           /                      \
         [30]                     [50]
        */
        let (mut storage, ids) = storage_of(&[90, 50, 30]);
        let (top, node, left) = (ids[0], ids[1], ids[2]);
        storage.link_left(top, node);
        storage.link_left(node, left);

        assert_eq!(storage.rotate_right(node), left);
        assert_eq!(storage.left(top), left);
        assert!(storage.right(top).is_nil());
        assert_eq!(storage.parent(left), top);
        assert_eq!(storage.right(left), node);
        assert!(storage.left(node).is_nil());

        // And back again, this time as the right child of the top node.
        let (mut storage, ids) = storage_of(&[10, 50, 70]);
        let (top, node, right) = (ids[0], ids[1], ids[2]);
        storage.link_right(top, node);
        storage.link_right(node, right);

        assert_eq!(storage.rotate_left(node), right);
        assert_eq!(storage.right(top), right);
        assert!(storage.left(top).is_nil());
        assert_eq!(storage.parent(right), top);
        assert_eq!(storage.left(right), node);
    }

    #[test]
    fn rotate_without_pivot_is_noop() {
        let (mut storage, ids) = storage_of(&[5, 7]);
        storage.link_right(ids[0], ids[1]);

        assert_eq!(storage.rotate_right(ids[0]), ids[0]);
        assert_eq!(storage.right(ids[0]), ids[1]);
        assert_eq!(storage.parent(ids[1]), ids[0]);

        assert_eq!(storage.rotate_left(ids[1]), ids[1]);
        assert_eq!(storage.parent(ids[1]), ids[0]);
    }

    #[test]
    fn test_min_and_height() {
        let (mut storage, ids) = storage_of(&[8, 4, 2, 9]);
        storage.link_left(ids[0], ids[1]);
        storage.link_left(ids[1], ids[2]);
        storage.link_right(ids[0], ids[3]);

        assert_eq!(storage.min(ids[0]), ids[2]);
        assert_eq!(storage.min(ids[3]), ids[3]);
        assert_eq!(storage.height(ids[0]), 3);
    }
}
