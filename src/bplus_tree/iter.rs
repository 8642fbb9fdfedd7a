use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Handle, RawBPlusTree};

/// Position in the leaf chain walked towards larger keys.
struct Forward<'a, K, V> {
    tree: &'a RawBPlusTree<K, V>,
    leaf: Option<Handle>,
    index: usize,
}

impl<'a, K, V> Forward<'a, K, V> {
    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        loop {
            let leaf = tree.node(self.leaf?).as_leaf();
            if self.index < leaf.key_count() {
                let item = (leaf.key(self.index), leaf.value(self.index));
                self.index += 1;
                return Some(item);
            }
            self.leaf = leaf.next();
            self.index = 0;
        }
    }
}

impl<K, V> Clone for Forward<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            leaf: self.leaf,
            index: self.index,
        }
    }
}

/// Position in the leaf chain walked towards smaller keys. `remaining` counts the
/// entries of the current leaf not yet returned.
struct Backward<'a, K, V> {
    tree: &'a RawBPlusTree<K, V>,
    leaf: Option<Handle>,
    remaining: usize,
}

impl<'a, K, V> Backward<'a, K, V> {
    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        loop {
            let leaf = tree.node(self.leaf?).as_leaf();
            if self.remaining > 0 {
                self.remaining -= 1;
                return Some((leaf.key(self.remaining), leaf.value(self.remaining)));
            }
            self.leaf = leaf.prev();
            self.remaining = self.leaf.map_or(0, |prev| tree.node(prev).as_leaf().key_count());
        }
    }
}

impl<K, V> Clone for Backward<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            leaf: self.leaf,
            remaining: self.remaining,
        }
    }
}

/// An iterator over the entries of a `BPlusTree`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTree`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut tree = BPlusTree::default();
/// tree.insert(2, "b");
/// tree.insert(1, "a");
/// let mut iter = tree.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: crate::BPlusTree::iter
/// [`BPlusTree`]: crate::BPlusTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    inner: Forward<'a, K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Starts at the smallest key.
    pub(crate) fn new(tree: &'a RawBPlusTree<K, V>) -> Self {
        Self::starting_at(tree, tree.first_leaf(), 0)
    }

    /// Starts at entry `index` of `leaf`. An index past the end of the leaf
    /// continues with the next leaf.
    pub(crate) fn starting_at(tree: &'a RawBPlusTree<K, V>, leaf: Handle, index: usize) -> Self {
        Self {
            inner: Forward {
                tree,
                leaf: Some(leaf),
                index,
            },
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the keys of a `BPlusTree`, in ascending order.
///
/// This `struct` is created by the [`keys`](crate::BPlusTree::keys) and
/// [`greater_or_equal_keys`](crate::BPlusTree::greater_or_equal_keys) methods.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the entries of a `BPlusTree`, in descending key order.
///
/// This `struct` is created by the [`iter_rev`](crate::BPlusTree::iter_rev) and
/// [`lesser_or_equal_iter`](crate::BPlusTree::lesser_or_equal_iter) methods.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterRev<'a, K, V> {
    inner: Backward<'a, K, V>,
}

impl<'a, K, V> IterRev<'a, K, V> {
    /// Starts at the largest key.
    pub(crate) fn new(tree: &'a RawBPlusTree<K, V>) -> Self {
        let leaf = tree.last_leaf();
        Self::ending_at(tree, leaf, tree.node(leaf).as_leaf().key_count())
    }

    /// Starts just below entry `remaining` of `leaf`. Zero continues with the
    /// previous leaf.
    pub(crate) fn ending_at(tree: &'a RawBPlusTree<K, V>, leaf: Handle, remaining: usize) -> Self {
        Self {
            inner: Backward {
                tree,
                leaf: Some(leaf),
                remaining,
            },
        }
    }
}

impl<'a, K, V> Iterator for IterRev<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<K, V> FusedIterator for IterRev<'_, K, V> {}

impl<K, V> Clone for IterRev<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IterRev<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the keys of a `BPlusTree`, in descending order.
///
/// This `struct` is created by the [`keys_rev`](crate::BPlusTree::keys_rev) and
/// [`lesser_or_equal_keys`](crate::BPlusTree::lesser_or_equal_keys) methods.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct KeysRev<'a, K, V> {
    inner: IterRev<'a, K, V>,
}

impl<'a, K, V> KeysRev<'a, K, V> {
    pub(crate) fn new(inner: IterRev<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for KeysRev<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

impl<K, V> FusedIterator for KeysRev<'_, K, V> {}

impl<K, V> Clone for KeysRev<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for KeysRev<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the values of a `BPlusTree`, in ascending key order.
///
/// This `struct` is created by the [`values`](crate::BPlusTree::values) and
/// [`greater_or_equal_values`](crate::BPlusTree::greater_or_equal_values) methods.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the values of a `BPlusTree`, in descending key order.
///
/// This `struct` is created by the [`values_rev`](crate::BPlusTree::values_rev) and
/// [`lesser_or_equal_values`](crate::BPlusTree::lesser_or_equal_values) methods.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesRev<'a, K, V> {
    inner: IterRev<'a, K, V>,
}

impl<'a, K, V> ValuesRev<'a, K, V> {
    pub(crate) fn new(inner: IterRev<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for ValuesRev<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<K, V> FusedIterator for ValuesRev<'_, K, V> {}

impl<K, V> Clone for ValuesRev<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for ValuesRev<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
