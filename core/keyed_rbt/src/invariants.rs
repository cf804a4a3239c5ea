//! Keyed Red-Black Tree - Invariant checker
//!
//! Read-only structural checks used to validate the tree in tests.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation. All rights reserved.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::vec::Vec;

use crate::{node::NodeId, Rbt};

/// The outcome of the three independent red-black checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvariantReport {
    /// In-order keys are strictly increasing and none is absent.
    pub order: bool,
    /// Every path to an absent child passes the same number of black nodes.
    pub black_height: bool,
    /// The root is black and no red node has a red parent.
    pub red_adjacency: bool,
}

impl InvariantReport {
    pub fn is_valid(&self) -> bool {
        self.order && self.black_height && self.red_adjacency
    }
}

impl<K, V> Rbt<K, V>
where
    K: Ord,
{
    /// Runs every invariant check on the current tree. An empty tree passes all of them.
    ///
    /// # Time Complexity
    ///
    /// O(n)
    ///
    pub fn verify(&self) -> InvariantReport {
        InvariantReport {
            order: self.check_order(),
            black_height: self.check_black_height(),
            red_adjacency: self.check_red_adjacency(),
        }
    }

    /// Returns `true` if the tree satisfies the red-black invariants, logging each violated category.
    ///
    /// Intended for test harnesses; production code should not branch on it.
    pub fn test_invariants(&self) -> bool {
        let report = self.verify();
        if !report.order {
            log::error!(target: "rbt_invariants", "in-order invariant violated");
        }
        if !report.black_height {
            log::error!(target: "rbt_invariants", "bookkeeping invariant violated");
        }
        if !report.red_adjacency {
            log::error!(target: "rbt_invariants", "balance invariant violated");
        }
        report.is_valid()
    }

    fn check_order(&self) -> bool {
        let keys: Vec<_> = self.in_order().into_iter().map(|id| self.effective_key(id)).collect();
        if keys.iter().any(Option::is_none) {
            return false;
        }
        keys.windows(2).all(|pair| match (&pair[0], &pair[1]) {
            (Some(prev), Some(next)) => **prev < **next,
            _ => false,
        })
    }

    fn check_black_height(&self) -> bool {
        let storage = self.storage();
        let mut expected = None;
        let mut stack = Vec::new();
        if let Some(root) = self.root() {
            stack.push((root, 0usize));
        }

        while let Some((id, above)) = stack.pop() {
            let blacks = above + usize::from(storage.is_black(id));
            for child in [storage.left(id), storage.right(id)] {
                if !child.is_nil() {
                    stack.push((child, blacks));
                    continue;
                }
                match expected {
                    None => expected = Some(blacks),
                    Some(count) if count != blacks => return false,
                    Some(_) => {}
                }
            }
        }
        true
    }

    fn check_red_adjacency(&self) -> bool {
        let storage = self.storage();
        let Some(root) = self.root() else {
            return true;
        };
        if storage.is_red(root) {
            return false;
        }
        self.in_order().into_iter().all(|id: NodeId| !(storage.is_red(id) && storage.is_red(storage.parent(id))))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use crate::{node::Color, InvariantReport, Rbt};

    fn tree_of(keys: &[i32]) -> Rbt<i32, i32> {
        let mut rbt = Rbt::new();
        for k in keys {
            rbt.insert(*k, Some(*k)).unwrap();
        }
        rbt
    }

    #[test]
    fn valid_trees_pass() {
        let empty: Rbt<i32, i32> = Rbt::new();
        assert_eq!(empty.verify(), InvariantReport { order: true, black_height: true, red_adjacency: true });
        assert!(empty.test_invariants());

        let rbt = tree_of(&[10, 5, 20, 1, 7, 15, 30, 25]);
        assert!(rbt.verify().is_valid());
        assert!(rbt.test_invariants());
    }

    #[test]
    fn red_root_fails_balance() {
        /*
            [2R]  <- corrupted
            /  \
          [1R] [3R]
        */
        let mut rbt = tree_of(&[2, 1, 3]);
        let root = rbt.root().unwrap();
        rbt.storage_mut().set_color(root, Color::Red);

        let report = rbt.verify();
        assert!(!report.red_adjacency);
        assert!(report.order);
        assert!(report.black_height);
        assert!(!rbt.test_invariants());
    }

    #[test]
    fn red_child_of_red_fails_balance() {
        /*
              [2B]
              /  \
           [1B]  [3R]  <- corrupted
                   \
                   [4R]
        */
        let mut rbt = tree_of(&[2, 1, 3, 4]);
        let three = rbt.find(&3).unwrap();
        rbt.storage_mut().set_color(three, Color::Red);

        let report = rbt.verify();
        assert!(!report.red_adjacency);
        assert!(!report.black_height);
        assert!(report.order);
    }

    #[test]
    fn unequal_black_count_fails_bookkeeping() {
        /*
              [2B]
              /  \
           [1B]  [3R]
           ^ corrupted
        */
        let mut rbt = tree_of(&[2, 1, 3]);
        let one = rbt.find(&1).unwrap();
        rbt.storage_mut().set_color(one, Color::Black);

        let report = rbt.verify();
        assert!(!report.black_height);
        assert!(report.red_adjacency);
        assert!(report.order);
        assert!(!rbt.test_invariants());
    }

    #[test]
    fn misordered_keys_fail_order() {
        let mut rbt = tree_of(&[2, 1, 3]);
        let one = rbt.find(&1).unwrap();
        let three = rbt.find(&3).unwrap();
        rbt.storage_mut().get_mut(one).unwrap().key = Some(3);
        rbt.storage_mut().get_mut(three).unwrap().key = Some(1);

        let report = rbt.verify();
        assert!(!report.order);
        assert!(report.black_height);
        assert!(report.red_adjacency);
    }

    #[test]
    fn equal_keys_fail_order() {
        let mut rbt = tree_of(&[2, 1, 3]);
        let three = rbt.find(&3).unwrap();
        rbt.storage_mut().get_mut(three).unwrap().key = Some(2);
        assert!(!rbt.verify().order);
    }

    #[test]
    fn absent_key_fails_order() {
        let mut rbt = tree_of(&[1]);
        let root = rbt.root().unwrap();
        rbt.storage_mut().get_mut(root).unwrap().key = None;
        assert!(!rbt.verify().order);
        assert!(!rbt.test_invariants());
    }
}
