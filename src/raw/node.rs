use core::borrow::Borrow;

use alloc::vec::Vec;

use super::handle::Handle;

#[allow(private_interfaces)]
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

// Separator keys[i - 1] is the left boundary key of children[i]; children[0] has none.
pub(crate) struct InternalNode<K> {
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: Vec<K>,
    children: Vec<Handle>,
}

pub(crate) struct LeafNode<K, V> {
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: Vec<K>,
    values: Vec<V>,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

/// Moves `items` in front of the existing contents of `target`.
fn shift_right_into<T>(target: &mut Vec<T>, items: impl IntoIterator<Item = T>) {
    target.splice(0..0, items);
}

/// Removes the first `count` elements of `source`, shifting the rest left.
fn drain_head<T>(source: &mut Vec<T>, count: usize) -> alloc::vec::Drain<'_, T> {
    source.drain(..count)
}

/// Detaches everything from `at` onwards into a vector allocated with `capacity`.
fn split_tail<T>(source: &mut Vec<T>, at: usize, capacity: usize) -> Vec<T> {
    let mut tail = Vec::with_capacity(capacity);
    tail.extend(source.drain(at..));
    tail
}

impl<K, V> Node<K, V> {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("`Node::as_leaf()` - expected leaf node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("`Node::as_leaf_mut()` - expected leaf node"),
        }
    }

    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("`Node::as_internal()` - expected internal node"),
        }
    }

    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("`Node::as_internal_mut()` - expected internal node"),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }

    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => internal.keys(),
            Node::Leaf(leaf) => leaf.keys(),
        }
    }

    pub(crate) fn prev(&self) -> Option<Handle> {
        match self {
            Node::Internal(internal) => internal.prev,
            Node::Leaf(leaf) => leaf.prev,
        }
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        match self {
            Node::Internal(internal) => internal.next,
            Node::Leaf(leaf) => leaf.next,
        }
    }

    pub(crate) fn set_prev(&mut self, prev: Option<Handle>) {
        match self {
            Node::Internal(internal) => internal.prev = prev,
            Node::Leaf(leaf) => leaf.prev = prev,
        }
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        match self {
            Node::Internal(internal) => internal.next = next,
            Node::Leaf(leaf) => leaf.next = next,
        }
    }
}

impl<K> InternalNode<K> {
    /// Creates a node holding a single separator between two children.
    pub(crate) fn with_children(capacity: usize, separator: K, left: Handle, right: Handle) -> Self {
        let mut keys = Vec::with_capacity(capacity);
        let mut children = Vec::with_capacity(capacity + 1);
        keys.push(separator);
        children.push(left);
        children.push(right);
        Self {
            prev: None,
            next: None,
            keys,
            children,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Index of the last populated child slot, `-1` when there is none.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn peek(&self) -> isize {
        self.children.len() as isize - 1
    }

    pub(crate) fn occupancy(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn is_full(&self, capacity: usize) -> bool {
        self.keys.len() >= capacity
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    pub(crate) fn set_key(&mut self, index: usize, key: K) {
        self.keys[index] = key;
    }

    /// Index of the child whose subtree may hold `key`.
    #[inline]
    pub(crate) fn search_child<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        // A separator equal to the key bounds the child on its right from below.
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Registers `left` as the new lower half of the child at `index`, which keeps
    /// the upper half starting at `separator`.
    pub(crate) fn insert_split(&mut self, index: usize, separator: K, left: Handle) {
        self.keys.insert(index, separator);
        self.children.insert(index, left);
    }

    /// Removes the separator at `key_index` and the child at `child_index`.
    pub(crate) fn remove_child(&mut self, key_index: usize, child_index: usize) -> Handle {
        drop(self.keys.remove(key_index));
        self.children.remove(child_index)
    }

    /// Splits off a new left node with keys `[0, mid - 1)` and children `[0, mid)`.
    /// Key `mid - 1` is dropped; `self` keeps keys and children from `mid` onwards.
    pub(crate) fn split_head(&mut self, mid: usize, capacity: usize) -> Self {
        let keys = split_tail(&mut self.keys, mid, capacity);
        let children = split_tail(&mut self.children, mid, capacity + 1);
        let mut left_keys = core::mem::replace(&mut self.keys, keys);
        let left_children = core::mem::replace(&mut self.children, children);
        drop(left_keys.pop());
        Self {
            prev: None,
            next: None,
            keys: left_keys,
            children: left_children,
        }
    }

    /// Adopts the last `count` children of `donor`. `boundary` is the left boundary
    /// key of this node's current first child, which becomes its separator.
    pub(crate) fn steal_from_left(&mut self, donor: &mut Self, count: usize, boundary: K) {
        let start = donor.children.len() - count;
        self.keys.insert(0, boundary);
        // Donor key `start - 1` separated the first adopted child and has no slot here.
        shift_right_into(&mut self.keys, donor.keys.drain(start - 1..).skip(1));
        shift_right_into(&mut self.children, donor.children.drain(start..));
    }

    /// Adopts the first `count` children of `donor`. `boundary` is the left boundary
    /// key of the donor's first child, which becomes the separator of the first adopted child.
    pub(crate) fn steal_from_right(&mut self, donor: &mut Self, count: usize, boundary: K) {
        self.keys.push(boundary);
        // Donor key `count - 1` would separate the donor's new first child and is dropped.
        self.keys.extend(drain_head(&mut donor.keys, count).take(count - 1));
        self.children.extend(drain_head(&mut donor.children, count));
    }

    /// Absorbs the left sibling `donor`. `boundary` is the left boundary key of this
    /// node's first child.
    pub(crate) fn merge_with_left(&mut self, donor: Self, boundary: K) {
        if !self.children.is_empty() {
            self.keys.insert(0, boundary);
        }
        shift_right_into(&mut self.keys, donor.keys);
        shift_right_into(&mut self.children, donor.children);
    }

    /// Absorbs the right sibling `donor`. `boundary` is the left boundary key of the
    /// donor's first child.
    pub(crate) fn merge_with_right(&mut self, donor: Self, boundary: K) {
        if !self.children.is_empty() {
            self.keys.push(boundary);
        }
        self.keys.extend(donor.keys);
        self.children.extend(donor.children);
    }
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            prev: None,
            next: None,
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Index of the last populated slot, `-1` when empty.
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn peek(&self) -> isize {
        self.keys.len() as isize - 1
    }

    pub(crate) fn occupancy(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_full(&self, capacity: usize) -> bool {
        self.keys.len() >= capacity
    }

    pub(crate) fn prev(&self) -> Option<Handle> {
        self.prev
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    pub(crate) fn values(&self) -> &[V] {
        &self.values
    }

    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    pub(crate) fn insert(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub(crate) fn remove(&mut self, index: usize) -> (K, V) {
        let key = self.keys.remove(index);
        let value = self.values.remove(index);
        (key, value)
    }

    /// Splits off a new left leaf holding the first `mid` entries.
    pub(crate) fn split_head(&mut self, mid: usize, capacity: usize) -> Self {
        let keys = split_tail(&mut self.keys, mid, capacity);
        let values = split_tail(&mut self.values, mid, capacity);
        Self {
            prev: None,
            next: None,
            keys: core::mem::replace(&mut self.keys, keys),
            values: core::mem::replace(&mut self.values, values),
        }
    }

    /// Moves the last `count` entries of `donor` to the front of this leaf.
    pub(crate) fn steal_from_left(&mut self, donor: &mut Self, count: usize) {
        let start = donor.keys.len() - count;
        shift_right_into(&mut self.keys, donor.keys.drain(start..));
        shift_right_into(&mut self.values, donor.values.drain(start..));
    }

    /// Moves the first `count` entries of `donor` to the back of this leaf.
    pub(crate) fn steal_from_right(&mut self, donor: &mut Self, count: usize) {
        self.keys.extend(drain_head(&mut donor.keys, count));
        self.values.extend(drain_head(&mut donor.values, count));
    }

    pub(crate) fn merge_with_left(&mut self, donor: Self) {
        shift_right_into(&mut self.keys, donor.keys);
        shift_right_into(&mut self.values, donor.values);
    }

    pub(crate) fn merge_with_right(&mut self, donor: Self) {
        self.keys.extend(donor.keys);
        self.values.extend(donor.values);
    }
}

#[cfg(test)]
impl<K> InternalNode<K> {
    pub(crate) fn detach_children(&mut self) {
        self.keys.clear();
        self.children.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;

    fn h(index: usize) -> Handle {
        Handle::from_index(index)
    }

    fn leaf(keys: &[i32]) -> LeafNode<i32, i32> {
        let mut node = LeafNode::with_capacity(5);
        for (index, &key) in keys.iter().enumerate() {
            node.insert(index, key, key * 10);
        }
        node
    }

    fn internal(keys: &[i32], children: &[usize]) -> InternalNode<i32> {
        InternalNode {
            prev: None,
            next: None,
            keys: keys.to_vec(),
            children: children.iter().map(|&c| h(c)).collect(),
        }
    }

    fn handles(node: &InternalNode<i32>) -> Vec<usize> {
        node.children().iter().map(|c| c.to_index()).collect()
    }

    #[test]
    fn empty_leaf_peeks_before_the_first_slot() {
        let node = leaf(&[]);
        assert_eq!(node.peek(), -1);
        assert_eq!(node.occupancy(), 0);
        assert!(node.first_key().is_none());
    }

    #[test]
    fn internal_search_descends_right_of_equal_separator() {
        let node = internal(&[10, 20], &[0, 1, 2]);
        assert_eq!(node.search_child(&5), 0);
        assert_eq!(node.search_child(&10), 1);
        assert_eq!(node.search_child(&15), 1);
        assert_eq!(node.search_child(&20), 2);
        assert_eq!(node.search_child(&99), 2);
    }

    #[test]
    fn leaf_split_keeps_upper_half_in_place() {
        let mut right = leaf(&[1, 2, 3, 4, 5]);
        assert!(right.is_full(5));
        let left = right.split_head(2, 5);
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(left.values(), &[10, 20]);
        assert_eq!(right.keys(), &[3, 4, 5]);
        assert_eq!(right.values(), &[30, 40, 50]);
    }

    #[test]
    fn internal_split_drops_the_middle_separator() {
        let mut right = internal(&[10, 20, 30], &[0, 1, 2, 3]);
        let left = right.split_head(2, 3);
        assert_eq!(left.keys(), &[10]);
        assert_eq!(handles(&left), vec![0, 1]);
        assert_eq!(right.keys(), &[30]);
        assert_eq!(handles(&right), vec![2, 3]);
    }

    #[test]
    fn leaf_steals_move_boundary_entries() {
        let mut receiver = leaf(&[5]);
        let mut donor = leaf(&[1, 2, 3]);
        receiver.steal_from_left(&mut donor, 2);
        assert_eq!(donor.keys(), &[1]);
        assert_eq!(receiver.keys(), &[2, 3, 5]);
        assert_eq!(receiver.values(), &[20, 30, 50]);

        let mut donor = leaf(&[7, 8, 9]);
        receiver.steal_from_right(&mut donor, 1);
        assert_eq!(receiver.keys(), &[2, 3, 5, 7]);
        assert_eq!(donor.keys(), &[8, 9]);
    }

    #[test]
    fn internal_steal_from_left_regenerates_one_separator() {
        // donor children 0..=3 under separators 10, 20, 30; receiver starts at 40.
        let mut donor = internal(&[10, 20, 30], &[0, 1, 2, 3]);
        let mut receiver = internal(&[50], &[4, 5]);
        receiver.steal_from_left(&mut donor, 2, 40);
        assert_eq!(donor.keys(), &[10]);
        assert_eq!(handles(&donor), vec![0, 1]);
        assert_eq!(receiver.keys(), &[30, 40, 50]);
        assert_eq!(handles(&receiver), vec![2, 3, 4, 5]);
    }

    #[test]
    fn internal_steal_from_right_regenerates_one_separator() {
        let mut receiver = internal(&[10], &[0, 1]);
        let mut donor = internal(&[40, 50, 60], &[2, 3, 4, 5]);
        receiver.steal_from_right(&mut donor, 2, 30);
        assert_eq!(receiver.keys(), &[10, 30, 40]);
        assert_eq!(handles(&receiver), vec![0, 1, 2, 3]);
        assert_eq!(donor.keys(), &[60]);
        assert_eq!(handles(&donor), vec![4, 5]);
    }

    #[test]
    fn internal_merges_insert_the_boundary_between_halves() {
        let mut node = internal(&[], &[2]);
        node.merge_with_left(internal(&[10], &[0, 1]), 20);
        assert_eq!(node.keys(), &[10, 20]);
        assert_eq!(handles(&node), vec![0, 1, 2]);

        node.merge_with_right(internal(&[40], &[3, 4]), 30);
        assert_eq!(node.keys(), &[10, 20, 30, 40]);
        assert_eq!(handles(&node), vec![0, 1, 2, 3, 4]);
        assert_eq!(node.peek(), 4);
    }

    #[test]
    fn leaf_merges_concatenate_in_order() {
        let mut node = leaf(&[4]);
        node.merge_with_left(leaf(&[1, 2]));
        node.merge_with_right(leaf(&[6]));
        assert_eq!(node.keys(), &[1, 2, 4, 6]);
        assert_eq!(node.values(), &[10, 20, 40, 60]);
    }

    #[test]
    fn split_registration_places_left_half_before_original() {
        let mut parent = internal(&[10], &[0, 1]);
        parent.insert_split(1, 15, h(2));
        assert_eq!(parent.keys(), &[10, 15]);
        assert_eq!(handles(&parent), vec![0, 2, 1]);
        assert_eq!(parent.remove_child(1, 2).to_index(), 1);
        assert_eq!(parent.keys(), &[10]);
        assert_eq!(handles(&parent), vec![0, 2]);
    }
}
