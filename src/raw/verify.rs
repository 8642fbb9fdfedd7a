use core::fmt::Debug;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use super::handle::Handle;
use super::node::Node;
use super::raw_bplus_tree::RawBPlusTree;
use crate::bplus_tree::{Iter, IterRev, Keys, KeysRev};
use crate::consistency::Inconsistency;

impl<K: Ord + Debug, V> RawBPlusTree<K, V> {
    /// Checks every structural invariant and returns the height on success.
    ///
    /// Never panics on a tree whose handles are all live.
    pub(crate) fn verify(&self) -> Result<usize, Inconsistency> {
        let height = self.height();
        let mut levels: Vec<Vec<Handle>> = vec![Vec::new(); height + 1];
        self.verify_nodes(self.root(), 0, height, &mut levels)?;
        self.verify_separators(&levels)?;
        self.verify_links(&levels)?;
        self.verify_iterators()?;
        Ok(height)
    }

    fn describe(&self, handle: Handle) -> String {
        format!("{handle} {:?}", self.node(handle).keys())
    }

    /// Depth, key order, fan-out and minimum occupancy of every node below `handle`.
    /// Collects each level left to right into `levels`.
    fn verify_nodes(
        &self,
        handle: Handle,
        depth: usize,
        height: usize,
        levels: &mut Vec<Vec<Handle>>,
    ) -> Result<(), Inconsistency> {
        let node = self.node(handle);
        if let Some(index) = node.keys().windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(Inconsistency::UnorderedKeys {
                node: self.describe(handle),
                index: index + 1,
            });
        }
        let is_root = depth == 0;
        let config = self.config();
        match node {
            Node::Leaf(leaf) => {
                if depth != height {
                    return Err(Inconsistency::LeafDepth {
                        node: self.describe(handle),
                        depth,
                        height,
                    });
                }
                if !is_root && leaf.occupancy() < config.leaf_min {
                    return Err(Inconsistency::LeafUnderflow {
                        node: self.describe(handle),
                        min: config.leaf_min,
                    });
                }
                levels[depth].push(handle);
            }
            Node::Internal(internal) => {
                if internal.occupancy() != internal.key_count() + 1 {
                    return Err(Inconsistency::ChildCount {
                        node: self.describe(handle),
                        keys: internal.key_count(),
                        children: internal.child_count(),
                    });
                }
                if depth >= height {
                    // The leftmost spine is shorter than this path.
                    return Err(Inconsistency::LeafDepth {
                        node: self.describe(internal.child(0)),
                        depth: depth + 1,
                        height,
                    });
                }
                if !is_root && internal.key_count() < config.internal_min {
                    return Err(Inconsistency::InternalUnderflow {
                        node: self.describe(handle),
                        min: config.internal_min,
                    });
                }
                levels[depth].push(handle);
                for &child in internal.children() {
                    self.verify_nodes(child, depth + 1, height, levels)?;
                }
            }
        }
        Ok(())
    }

    fn checked_left_boundary(&self, handle: Handle) -> Option<&K> {
        let mut current = handle;
        loop {
            match self.node(current) {
                Node::Internal(internal) => current = *internal.children().first()?,
                Node::Leaf(leaf) => return leaf.first_key(),
            }
        }
    }

    /// Every separator equals the left boundary key of the child to its right.
    fn verify_separators(&self, levels: &[Vec<Handle>]) -> Result<(), Inconsistency> {
        for &handle in levels.iter().flatten() {
            let Node::Internal(internal) = self.node(handle) else {
                continue;
            };
            for (index, separator) in internal.keys().iter().enumerate() {
                let child = internal.child(index + 1);
                let Some(boundary) = self.checked_left_boundary(child) else {
                    return Err(Inconsistency::EmptyLeaf {
                        node: self.describe(child),
                    });
                };
                if boundary != separator {
                    return Err(Inconsistency::Separator {
                        node: self.describe(handle),
                        child: self.describe(child),
                        boundary: format!("{boundary:?}"),
                        separator: format!("{separator:?}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// On each level the sibling links form the left-to-right list of its nodes.
    fn verify_links(&self, levels: &[Vec<Handle>]) -> Result<(), Inconsistency> {
        for (level, handles) in levels.iter().enumerate() {
            let Some(&first) = handles.first() else {
                continue;
            };
            let is_leaf = self.node(first).is_leaf();
            for (position, &handle) in handles.iter().enumerate() {
                let node = self.node(handle);
                if node.is_leaf() != is_leaf {
                    return Err(Inconsistency::MixedLevel {
                        node: self.describe(handle),
                        level,
                    });
                }
                let expected_prev = position.checked_sub(1).map(|p| handles[p]);
                if node.prev() != expected_prev {
                    return Err(Inconsistency::WrongPrevious {
                        node: self.describe(handle),
                        level,
                    });
                }
                if node.next() != handles.get(position + 1).copied() {
                    return Err(Inconsistency::WrongNext {
                        node: self.describe(handle),
                        level,
                    });
                }
            }
        }
        Ok(())
    }

    /// Both key iterators are strictly monotonic and see exactly `len()` keys.
    fn verify_iterators(&self) -> Result<(), Inconsistency> {
        let forward = Keys::new(Iter::new(self));
        check_monotonic("forward", forward, self.len(), |previous, current| previous < current)?;
        let backward = KeysRev::new(IterRev::new(self));
        check_monotonic("backward", backward, self.len(), |previous, current| previous > current)
    }
}

fn check_monotonic<'a, K: Debug + 'a>(
    direction: &'static str,
    keys: impl Iterator<Item = &'a K>,
    expected: usize,
    in_order: impl Fn(&K, &K) -> bool,
) -> Result<(), Inconsistency> {
    let mut previous: Option<&K> = None;
    let mut actual = 0;
    for key in keys {
        if let Some(previous) = previous {
            if !in_order(previous, key) {
                return Err(Inconsistency::IteratorOrder {
                    direction,
                    previous: format!("{previous:?}"),
                    current: format!("{key:?}"),
                });
            }
        }
        previous = Some(key);
        actual += 1;
    }
    if actual == expected {
        Ok(())
    } else {
        Err(Inconsistency::IteratorCount {
            direction,
            actual,
            expected,
        })
    }
}
