use core::borrow::Borrow;
use core::fmt;

use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, Node, SearchResult};
use super::path::{Path, PathFrame};
use crate::config::TreeConfig;

/// The tree controller behind [`BPlusTree`](crate::BPlusTree).
///
/// Owns every node in an arena. The root is always present; an empty tree has
/// an empty leaf root.
pub(crate) struct RawBPlusTree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Handle,
    len: usize,
    config: TreeConfig,
}

impl<K, V> RawBPlusTree<K, V> {
    /// Creates an empty tree. `config` must already be validated.
    pub(crate) fn new(config: TreeConfig) -> Self {
        debug_assert!(config.validate().is_ok());
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf(LeafNode::with_capacity(config.leaf_capacity)));
        Self {
            nodes,
            root,
            len: 0,
            config,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Number of edges from the root to the leftmost leaf. Stops early at an
    /// internal node without children.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            let Some(&child) = internal.children().first() else {
                break;
            };
            current = child;
            height += 1;
        }
        height
    }

    pub(crate) fn first_leaf(&self) -> Handle {
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
        }
        current
    }

    pub(crate) fn last_leaf(&self) -> Handle {
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.child_count() - 1);
        }
        current
    }

    /// Smallest key reachable from `handle`.
    pub(crate) fn left_boundary_key(&self, handle: Handle) -> &K {
        let mut current = handle;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(0),
                Node::Leaf(leaf) => {
                    return leaf
                        .first_key()
                        .expect("`RawBPlusTree::left_boundary_key()` - reached an empty leaf");
                }
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.config);
    }

    /// Renders the subtree at `handle` in the verbose dump format.
    pub(crate) fn fmt_node(&self, f: &mut fmt::Formatter<'_>, handle: Handle, level: usize) -> fmt::Result
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        let indent = level * 3;
        match self.nodes.get(handle) {
            Node::Leaf(leaf) => {
                write!(f, "{:indent$}", "")?;
                for (index, (key, value)) in leaf.keys().iter().zip(leaf.values()).enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                Ok(())
            }
            Node::Internal(internal) => {
                let Some(first) = internal.keys().first() else {
                    return writeln!(f, "{:indent$}<empty>", "");
                };
                writeln!(f, "{:indent$}< {first}:", "")?;
                self.fmt_node(f, internal.child(0), level + 1)?;
                f.write_str("\n")?;
                let last = internal.child_count() - 1;
                for index in 1..=last {
                    writeln!(f, "{:indent$}>={}:", "", internal.key(index - 1))?;
                    self.fmt_node(f, internal.child(index), level + 1)?;
                    if index < last {
                        f.write_str("\n")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl<K: Ord + Clone, V> RawBPlusTree<K, V> {
    pub(crate) fn find_leaf<Q>(&self, key: &Q) -> Handle
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.search_child(key));
        }
        current
    }

    fn find_leaf_with_path<Q>(&self, key: &Q) -> (Handle, Path)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            let index = internal.search_child(key);
            path.push(PathFrame { node: current, index });
            current = internal.child(index);
        }
        (current, path)
    }

    pub(crate) fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let leaf = self.nodes.get(self.find_leaf(key)).as_leaf();
        match leaf.search(key) {
            SearchResult::Found(idx) => Some(leaf.value(idx)),
            SearchResult::NotFound(_) => None,
        }
    }

    /// Inserts or overwrites. Returns the previous value of an existing key.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (leaf_handle, path) = self.find_leaf_with_path(&key);
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        match leaf.search(&key) {
            SearchResult::Found(idx) => Some(core::mem::replace(leaf.value_mut(idx), value)),
            SearchResult::NotFound(idx) => {
                self.insert_at(leaf_handle, path, idx, key, value);
                None
            }
        }
    }

    /// Stores `f(Some(&old))` for an existing key or `f(None)` for a new one.
    pub(crate) fn upsert<F>(&mut self, key: K, f: F)
    where
        F: FnOnce(Option<&V>) -> V,
    {
        let (leaf_handle, path) = self.find_leaf_with_path(&key);
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        match leaf.search(&key) {
            SearchResult::Found(idx) => {
                let value = f(Some(leaf.value(idx)));
                *leaf.value_mut(idx) = value;
            }
            SearchResult::NotFound(idx) => {
                let value = f(None);
                self.insert_at(leaf_handle, path, idx, key, value);
            }
        }
    }

    fn insert_at(&mut self, leaf_handle: Handle, path: Path, idx: usize, key: K, value: V) {
        let capacity = self.config.leaf_capacity;
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        assert!(
            !leaf.is_full(capacity),
            "`RawBPlusTree::insert_at()` - cannot insert into a full leaf, it must have been split"
        );
        leaf.insert(idx, key, value);
        self.len += 1;
        if leaf.is_full(capacity) {
            self.split_leaf(leaf_handle, path);
        }
    }

    /// Splits a full leaf. A new left leaf takes the lower half; `handle` keeps the rest.
    fn split_leaf(&mut self, handle: Handle, path: Path) {
        let capacity = self.config.leaf_capacity;
        let right = self.nodes.get_mut(handle).as_leaf_mut();
        let left = right.split_head(capacity / 2, capacity);
        let separator = right.key(0).clone();
        let left_handle = self.nodes.alloc(Node::Leaf(left));
        self.link_before(left_handle, handle);
        trace!(node = %handle, left = %left_handle, "split leaf");
        self.insert_into_parent(path, left_handle, handle, separator);
    }

    /// Splits a full internal node the same way as a leaf, dropping the middle separator.
    fn split_internal(&mut self, handle: Handle, path: Path) {
        let capacity = self.config.internal_capacity;
        let right = self.nodes.get_mut(handle).as_internal_mut();
        let left = right.split_head(capacity.div_ceil(2), capacity);
        let left_handle = self.nodes.alloc(Node::Internal(left));
        self.link_before(left_handle, handle);
        let separator = self.left_boundary_key(handle).clone();
        trace!(node = %handle, left = %left_handle, "split internal node");
        self.insert_into_parent(path, left_handle, handle, separator);
    }

    fn insert_into_parent(&mut self, mut path: Path, left: Handle, right: Handle, separator: K) {
        let capacity = self.config.internal_capacity;
        let Some(frame) = path.pop() else {
            let root = InternalNode::with_children(capacity, separator, left, right);
            self.root = self.nodes.alloc(Node::Internal(root));
            trace!(root = %self.root, "promoted new root");
            return;
        };

        let parent = self.nodes.get_mut(frame.node).as_internal_mut();
        assert!(
            !parent.is_full(capacity),
            "`RawBPlusTree::insert_into_parent()` - parent must have room for both halves of a split"
        );
        assert_eq!(
            parent.child(frame.index),
            right,
            "`RawBPlusTree::insert_into_parent()` - split node is not a child of its parent"
        );
        debug_assert!(frame.index == 0 || parent.key(frame.index - 1) < &separator);
        parent.insert_split(frame.index, separator, left);
        if parent.is_full(capacity) {
            self.split_internal(frame.node, path);
        }
    }

    /// Links the fresh node `left` into the level list directly before `right`.
    fn link_before(&mut self, left: Handle, right: Handle) {
        let prev = self.nodes.get(right).prev();
        {
            let node = self.nodes.get_mut(left);
            node.set_prev(prev);
            node.set_next(Some(right));
        }
        self.nodes.get_mut(right).set_prev(Some(left));
        if let Some(prev) = prev {
            self.nodes.get_mut(prev).set_next(Some(left));
        }
    }

    /// Makes `prev` and `next` direct neighbours, dropping whatever sat between them.
    fn unlink(&mut self, prev: Option<Handle>, next: Option<Handle>) {
        if let Some(prev) = prev {
            self.nodes.get_mut(prev).set_next(next);
        }
        if let Some(next) = next {
            self.nodes.get_mut(next).set_prev(prev);
        }
    }

    /// Removes `key`, returning its value. Absent keys leave the tree untouched.
    pub(crate) fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf_handle, path) = self.find_leaf_with_path(key);
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let SearchResult::Found(idx) = leaf.search(key) else {
            return None;
        };
        let (_, value) = leaf.remove(idx);
        self.len -= 1;
        if idx == 0 && leaf.peek() >= 0 {
            self.refresh_separator(&path);
        }
        self.consolidate(leaf_handle, path);
        Some(value)
    }

    /// Rewrites the separator bounding the node reached through the last frame of
    /// `path`, at the nearest ancestor where that node is not the first child.
    fn refresh_separator(&mut self, path: &[PathFrame]) {
        let Some(frame) = path.iter().rev().find(|frame| frame.index > 0) else {
            return;
        };
        self.refresh_child_separator(frame.node, frame.index);
    }

    /// Sets `parent.keys[index - 1]` to the left boundary of `parent.children[index]`.
    fn refresh_child_separator(&mut self, parent: Handle, index: usize) {
        let child = self.nodes.get(parent).as_internal().child(index);
        let boundary = self.left_boundary_key(child).clone();
        self.nodes.get_mut(parent).as_internal_mut().set_key(index - 1, boundary);
    }

    fn sizing(&self, handle: Handle) -> (usize, usize) {
        if self.nodes.get(handle).is_leaf() {
            (self.config.leaf_capacity, self.config.leaf_min)
        } else {
            (self.config.internal_capacity, self.config.internal_min)
        }
    }

    /// Restores minimum occupancy bottom-up starting at `handle`.
    ///
    /// Only siblings under the same parent are considered: steal from the left,
    /// steal from the right, merge the left into `handle`, merge the right into
    /// `handle`. Merges continue at the parent.
    fn consolidate(&mut self, mut handle: Handle, mut path: Path) {
        loop {
            let (capacity, min) = self.sizing(handle);
            let count = self.nodes.get(handle).key_count();
            if count >= min {
                return;
            }
            let Some(&PathFrame { node: parent, index }) = path.last() else {
                self.collapse_root();
                return;
            };

            let parent_node = self.nodes.get(parent).as_internal();
            let left = (index > 0).then(|| parent_node.child(index - 1));
            let right = (index + 1 < parent_node.child_count()).then(|| parent_node.child(index + 1));
            let left_count = left.map(|h| self.nodes.get(h).key_count());
            let right_count = right.map(|h| self.nodes.get(h).key_count());

            if let (Some(donor), Some(available)) = (left, left_count) {
                if available > min {
                    self.steal_from_left(handle, donor, ((available - min) / 2).max(1));
                    self.refresh_separator(&path);
                    return;
                }
            }
            if let (Some(donor), Some(available)) = (right, right_count) {
                if available > min {
                    self.steal_from_right(handle, donor, ((available - min) / 2).max(1));
                    self.refresh_child_separator(parent, index + 1);
                    self.refresh_separator(&path);
                    return;
                }
            }
            if let (Some(donor), Some(available)) = (left, left_count) {
                if available + count < capacity {
                    self.merge_with_left(handle, donor);
                    let removed = self.nodes.get_mut(parent).as_internal_mut().remove_child(index - 1, index - 1);
                    debug_assert_eq!(removed, donor);
                    if let Some(frame) = path.last_mut() {
                        frame.index = index - 1;
                    }
                    self.refresh_separator(&path);
                    path.pop();
                    handle = parent;
                    continue;
                }
            }
            if let (Some(donor), Some(available)) = (right, right_count) {
                if available + count < capacity {
                    self.merge_with_right(handle, donor);
                    let removed = self.nodes.get_mut(parent).as_internal_mut().remove_child(index, index + 1);
                    debug_assert_eq!(removed, donor);
                    self.refresh_separator(&path);
                    path.pop();
                    handle = parent;
                    continue;
                }
            }
            unreachable!("`RawBPlusTree::consolidate()` - underfull node {handle} has no sibling to steal from or merge with");
        }
    }

    fn steal_from_left(&mut self, handle: Handle, donor: Handle, count: usize) {
        let boundary = self.internal_boundary(handle);
        let (receiver, giver) = self.nodes.get2_mut(handle, donor);
        match (receiver, giver, boundary) {
            (Node::Leaf(receiver), Node::Leaf(giver), None) => receiver.steal_from_left(giver, count),
            (Node::Internal(receiver), Node::Internal(giver), Some(boundary)) => {
                receiver.steal_from_left(giver, count, boundary);
            }
            _ => panic!("`RawBPlusTree::steal_from_left()` - siblings must be of the same kind"),
        }
        trace!(node = %handle, donor = %donor, count, "stole from left sibling");
    }

    fn steal_from_right(&mut self, handle: Handle, donor: Handle, count: usize) {
        let boundary = self.internal_boundary(donor);
        let (receiver, giver) = self.nodes.get2_mut(handle, donor);
        match (receiver, giver, boundary) {
            (Node::Leaf(receiver), Node::Leaf(giver), None) => receiver.steal_from_right(giver, count),
            (Node::Internal(receiver), Node::Internal(giver), Some(boundary)) => {
                receiver.steal_from_right(giver, count, boundary);
            }
            _ => panic!("`RawBPlusTree::steal_from_right()` - siblings must be of the same kind"),
        }
        trace!(node = %handle, donor = %donor, count, "stole from right sibling");
    }

    /// Absorbs `donor` (the left sibling) into `handle` and releases it.
    fn merge_with_left(&mut self, handle: Handle, donor: Handle) {
        let boundary = self.internal_boundary(handle);
        let giver = self.nodes.take(donor);
        let prev = giver.prev();
        match (self.nodes.get_mut(handle), giver, boundary) {
            (Node::Leaf(receiver), Node::Leaf(giver), None) => receiver.merge_with_left(giver),
            (Node::Internal(receiver), Node::Internal(giver), Some(boundary)) => {
                receiver.merge_with_left(giver, boundary);
            }
            _ => panic!("`RawBPlusTree::merge_with_left()` - siblings must be of the same kind"),
        }
        self.unlink(prev, Some(handle));
        trace!(node = %handle, donor = %donor, "merged left sibling");
    }

    /// Absorbs `donor` (the right sibling) into `handle` and releases it.
    fn merge_with_right(&mut self, handle: Handle, donor: Handle) {
        let boundary = self.internal_boundary(donor);
        let giver = self.nodes.take(donor);
        let next = giver.next();
        match (self.nodes.get_mut(handle), giver, boundary) {
            (Node::Leaf(receiver), Node::Leaf(giver), None) => receiver.merge_with_right(giver),
            (Node::Internal(receiver), Node::Internal(giver), Some(boundary)) => {
                receiver.merge_with_right(giver, boundary);
            }
            _ => panic!("`RawBPlusTree::merge_with_right()` - siblings must be of the same kind"),
        }
        self.unlink(Some(handle), next);
        trace!(node = %handle, donor = %donor, "merged right sibling");
    }

    /// Left boundary key of an internal node, `None` for a leaf.
    fn internal_boundary(&self, handle: Handle) -> Option<K> {
        match self.nodes.get(handle) {
            Node::Internal(_) => Some(self.left_boundary_key(handle).clone()),
            Node::Leaf(_) => None,
        }
    }

    /// Replaces an internal root left with a single child (or none) by that child.
    fn collapse_root(&mut self) {
        let Node::Internal(root) = self.nodes.get(self.root) else {
            return;
        };
        match root.peek() {
            -1 => {
                self.nodes.free(self.root);
                self.root = self.nodes.alloc(Node::Leaf(LeafNode::with_capacity(self.config.leaf_capacity)));
                trace!(root = %self.root, "replaced childless root with an empty leaf");
            }
            0 => {
                let child = root.child(0);
                self.nodes.free(self.root);
                self.root = child;
                trace!(root = %child, "collapsed root");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
impl<K, V> RawBPlusTree<K, V> {
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut current = Some(self.first_leaf());
        while let Some(handle) = current {
            count += 1;
            current = self.nodes.get(handle).next();
        }
        count
    }
}
