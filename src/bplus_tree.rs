use core::borrow::Borrow;
use core::fmt;

use tracing::debug;

use crate::config::TreeConfig;
use crate::consistency::ConsistencyReport;
use crate::error::ConfigError;
use crate::raw::{Handle, RawBPlusTree, SearchResult};

mod iter;

pub use iter::{Iter, IterRev, Keys, KeysRev, Values, ValuesRev};

/// An in-memory ordered index based on a [B+ tree].
///
/// All entries live in leaves; internal nodes only hold separator keys. Nodes
/// on every level are linked to their left and right neighbours, so ordered
/// scans in both directions walk the leaf chain without revisiting internal
/// nodes.
///
/// Node sizes are fixed per tree by a [`TreeConfig`]. A node is split as soon
/// as it reaches its capacity, and a non-root node that drops below its
/// minimum borrows entries from, or merges with, a sibling under the same
/// parent.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut index = BPlusTree::with_block_size(5).unwrap();
/// for (key, row) in [(30, "c"), (10, "a"), (20, "b")] {
///     index.insert(key, row);
/// }
///
/// assert_eq!(index.search(&20), Some(&"b"));
/// assert_eq!(index.keys().copied().collect::<Vec<_>>(), [10, 20, 30]);
/// assert_eq!(index.values_rev().copied().collect::<Vec<_>>(), ["c", "b", "a"]);
///
/// assert_eq!(index.delete(&10), Some("a"));
/// assert!(index.consistency_report().is_consistent());
/// ```
///
/// [B+ tree]: https://en.wikipedia.org/wiki/B%2B_tree
pub struct BPlusTree<K, V> {
    raw: RawBPlusTree<K, V>,
}

/// A [`BPlusTree`] keyed by 32-bit integers.
pub type IntBPlusTree<V> = BPlusTree<i32, V>;

impl<K, V> BPlusTree<K, V> {
    /// Makes a new, empty tree with the given node sizing.
    ///
    /// # Errors
    ///
    /// Returns the first sizing rule `config` violates, see [`TreeConfig::validate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::{BPlusTree, ConfigError, TreeConfig};
    ///
    /// let tree: BPlusTree<u64, ()> = BPlusTree::new(TreeConfig::new(9, 4, 5, 2)).unwrap();
    /// assert!(tree.is_empty());
    ///
    /// let rejected = BPlusTree::<u64, ()>::new(TreeConfig::new(4, 1, 5, 2));
    /// assert_eq!(rejected.err(), Some(ConfigError::LeafCapacityNotOdd { capacity: 4 }));
    /// ```
    pub fn new(config: TreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            raw: RawBPlusTree::new(config),
        })
    }

    /// Makes a new, empty tree whose nodes all hold up to `block_size` keys and
    /// at least `block_size / 2`.
    ///
    /// # Errors
    ///
    /// Fails when `block_size` is even or smaller than 3.
    pub fn with_block_size(block_size: usize) -> Result<Self, ConfigError> {
        Self::new(TreeConfig::with_block_size(block_size))
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the number of levels below the root. A tree whose root is a leaf
    /// has height 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_block_size(3).unwrap();
    /// assert_eq!(tree.height(), 0);
    /// for key in (10..=50).step_by(10) {
    ///     tree.insert(key, ());
    /// }
    /// assert_eq!(tree.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the node sizing this tree was built with.
    #[must_use]
    pub const fn config(&self) -> &TreeConfig {
        self.raw.config()
    }

    /// Removes every entry, keeping the sizing.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Gets an iterator over the entries of the tree, in descending key order.
    pub fn iter_rev(&self) -> IterRev<'_, K, V> {
        IterRev::new(&self.raw)
    }

    /// Gets an iterator over the keys of the tree, in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(Iter::new(&self.raw))
    }

    /// Gets an iterator over the keys of the tree, in descending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::IntBPlusTree;
    ///
    /// let mut tree = IntBPlusTree::with_block_size(3).unwrap();
    /// for key in [4, 1, 3, 2] {
    ///     tree.insert(key, key * 100);
    /// }
    /// assert_eq!(tree.keys_rev().copied().collect::<Vec<_>>(), [4, 3, 2, 1]);
    /// ```
    pub fn keys_rev(&self) -> KeysRev<'_, K, V> {
        KeysRev::new(IterRev::new(&self.raw))
    }

    /// Gets an iterator over the values of the tree, in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(Iter::new(&self.raw))
    }

    /// Gets an iterator over the values of the tree, in descending key order.
    pub fn values_rev(&self) -> ValuesRev<'_, K, V> {
        ValuesRev::new(IterRev::new(&self.raw))
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Returns a reference to the value stored under `key`.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key)
    }

    /// Returns `true` if the tree holds a value for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// If the tree did not have this key present, `None` is returned. Otherwise
    /// the value is replaced and the old value is returned; the stored key is
    /// left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::default();
    /// assert_eq!(tree.insert("id", 1), None);
    /// assert_eq!(tree.insert("id", 2), Some(1));
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Stores the value produced by `f` under `key`.
    ///
    /// `f` receives the current value when the key is present and `None` when it
    /// is not; in the latter case a new entry is created.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut hits = BPlusTree::default();
    /// for page in ["a", "b", "a"] {
    ///     hits.upsert(page, |count: Option<&u32>| count.map_or(1, |count| count + 1));
    /// }
    /// assert_eq!(hits.search(&"a"), Some(&2));
    /// assert_eq!(hits.search(&"b"), Some(&1));
    /// ```
    pub fn upsert<F>(&mut self, key: K, f: F)
    where
        F: FnOnce(Option<&V>) -> V,
    {
        self.raw.upsert(key, f);
    }

    /// Removes `key` from the tree, returning its value if it was present.
    ///
    /// Deleting an absent key changes nothing.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.delete(key)
    }

    /// Gets an iterator over the values whose keys are greater than or equal to
    /// `key`, in ascending key order. `key` itself need not be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_block_size(3).unwrap();
    /// for key in [10, 20, 30, 40] {
    ///     tree.insert(key, key / 10);
    /// }
    /// assert_eq!(tree.greater_or_equal_values(&20).copied().collect::<Vec<_>>(), [2, 3, 4]);
    /// assert_eq!(tree.greater_or_equal_values(&25).copied().collect::<Vec<_>>(), [3, 4]);
    /// assert_eq!(tree.greater_or_equal_values(&41).next(), None);
    /// ```
    pub fn greater_or_equal_values<Q>(&self, key: &Q) -> Values<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Values::new(self.greater_or_equal_iter(key))
    }

    /// Gets an iterator over the keys greater than or equal to `key`, in
    /// ascending order.
    pub fn greater_or_equal_keys<Q>(&self, key: &Q) -> Keys<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Keys::new(self.greater_or_equal_iter(key))
    }

    /// Gets an iterator over the entries whose keys are greater than or equal to
    /// `key`, in ascending key order.
    pub fn greater_or_equal_iter<Q>(&self, key: &Q) -> Iter<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf, SearchResult::Found(index) | SearchResult::NotFound(index)) = self.seek(key);
        Iter::starting_at(&self.raw, leaf, index)
    }

    /// Gets an iterator over the values whose keys are less than or equal to
    /// `key`, in descending key order. `key` itself need not be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_block_size(3).unwrap();
    /// for key in [10, 20, 30, 40] {
    ///     tree.insert(key, key / 10);
    /// }
    /// assert_eq!(tree.lesser_or_equal_values(&30).copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// assert_eq!(tree.lesser_or_equal_values(&25).copied().collect::<Vec<_>>(), [2, 1]);
    /// assert_eq!(tree.lesser_or_equal_values(&9).next(), None);
    /// ```
    pub fn lesser_or_equal_values<Q>(&self, key: &Q) -> ValuesRev<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        ValuesRev::new(self.lesser_or_equal_iter(key))
    }

    /// Gets an iterator over the keys less than or equal to `key`, in descending
    /// order.
    pub fn lesser_or_equal_keys<Q>(&self, key: &Q) -> KeysRev<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        KeysRev::new(self.lesser_or_equal_iter(key))
    }

    /// Gets an iterator over the entries whose keys are less than or equal to
    /// `key`, in descending key order.
    pub fn lesser_or_equal_iter<Q>(&self, key: &Q) -> IterRev<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (leaf, remaining) = match self.seek(key) {
            (leaf, SearchResult::Found(index)) => (leaf, index + 1),
            (leaf, SearchResult::NotFound(index)) => (leaf, index),
        };
        IterRev::ending_at(&self.raw, leaf, remaining)
    }

    /// Finds the leaf `key` belongs to and its position there.
    fn seek<Q>(&self, key: &Q) -> (Handle, SearchResult)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let leaf = self.raw.find_leaf(key);
        (leaf, self.raw.node(leaf).as_leaf().search(key))
    }

    /// Checks the structure of the tree without modifying it.
    ///
    /// Verifies leaf depth, separator keys, minimum occupancy, sibling links and
    /// the ordering of both key iterators, and reports the first violation.
    pub fn consistency_report(&self) -> ConsistencyReport
    where
        K: fmt::Debug,
    {
        match self.raw.verify() {
            Ok(height) => ConsistencyReport::consistent(height, self.len()),
            Err(violation) => {
                debug!(%violation, "B+ tree consistency check failed");
                ConsistencyReport::broken(&violation)
            }
        }
    }
}

impl<K, V> Default for BPlusTree<K, V> {
    /// Creates an empty tree with [`TreeConfig::default`] sizing.
    fn default() -> Self {
        Self {
            raw: RawBPlusTree::new(TreeConfig::default()),
        }
    }
}

impl<K: Ord + Clone, V> Extend<(K, V)> for BPlusTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for BPlusTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, V> IntoIterator for &'a BPlusTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders every node, one leaf per line. Internal nodes introduce their first
/// child with `< k0:` and each further child with `>=k:`; every level is
/// indented by three more spaces.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for BPlusTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt_node(f, self.raw.root(), 0)
    }
}

impl<K, V> fmt::Debug for BPlusTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BPlusTree")
            .field("config", self.config())
            .field("len", &self.len())
            .field("height", &self.height())
            .finish()
    }
}
