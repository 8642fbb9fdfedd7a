//! Node sizing for [`BPlusTree`](crate::BPlusTree).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Block size used by [`TreeConfig::default`].
pub const DEFAULT_BLOCK_SIZE: usize = 63;

/// Capacities and minimum occupancies of leaf and internal nodes.
///
/// A node is split as soon as its key count reaches its capacity, so at rest a
/// node holds at most `capacity - 1` keys. Non-root nodes never hold fewer
/// than `min` keys. Both capacities must be odd and at least 3, and each
/// minimum must lie in `1..=capacity.div_ceil(2) - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeConfig {
    /// Maximum number of keys per leaf.
    pub leaf_capacity: usize,
    /// Minimum number of keys per non-root leaf.
    pub leaf_min: usize,
    /// Maximum number of separator keys per internal node.
    pub internal_capacity: usize,
    /// Minimum number of separator keys per non-root internal node.
    pub internal_min: usize,
}

impl TreeConfig {
    /// Creates a configuration from explicit sizes. Use [`validate`](Self::validate)
    /// to check it, or hand it to [`BPlusTree::new`](crate::BPlusTree::new), which does.
    #[must_use]
    pub const fn new(leaf_capacity: usize, leaf_min: usize, internal_capacity: usize, internal_min: usize) -> Self {
        Self {
            leaf_capacity,
            leaf_min,
            internal_capacity,
            internal_min,
        }
    }

    /// Uses `block_size` as both capacities and `block_size / 2` as both minimums.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::TreeConfig;
    ///
    /// let config = TreeConfig::with_block_size(7);
    /// assert_eq!(config, TreeConfig::new(7, 3, 7, 3));
    /// assert!(config.validate().is_ok());
    /// ```
    #[must_use]
    pub const fn with_block_size(block_size: usize) -> Self {
        Self::new(block_size, block_size / 2, block_size, block_size / 2)
    }

    /// Replaces the leaf sizing.
    #[must_use]
    pub const fn with_leaf(mut self, capacity: usize, min: usize) -> Self {
        self.leaf_capacity = capacity;
        self.leaf_min = min;
        self
    }

    /// Replaces the internal node sizing.
    #[must_use]
    pub const fn with_internal(mut self, capacity: usize, min: usize) -> Self {
        self.internal_capacity = capacity;
        self.internal_min = min;
        self
    }

    /// Checks the sizing rules, leaf sizing first.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as a [`ConfigError`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::{ConfigError, TreeConfig};
    ///
    /// let config = TreeConfig::new(5, 3, 5, 2);
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(ConfigError::LeafMinimumTooLarge { min: 3, max: 2, capacity: 5 })
    /// );
    /// ```
    pub const fn validate(&self) -> Result<(), ConfigError> {
        let (capacity, min) = (self.leaf_capacity, self.leaf_min);
        if capacity < 3 {
            return Err(ConfigError::LeafCapacityTooSmall { capacity });
        }
        if capacity % 2 == 0 {
            return Err(ConfigError::LeafCapacityNotOdd { capacity });
        }
        if min < 1 {
            return Err(ConfigError::LeafMinimumTooSmall { min });
        }
        let max = max_min(capacity);
        if min > max {
            return Err(ConfigError::LeafMinimumTooLarge { min, max, capacity });
        }

        let (capacity, min) = (self.internal_capacity, self.internal_min);
        if capacity < 3 {
            return Err(ConfigError::InternalCapacityTooSmall { capacity });
        }
        if capacity % 2 == 0 {
            return Err(ConfigError::InternalCapacityNotOdd { capacity });
        }
        if min < 1 {
            return Err(ConfigError::InternalMinimumTooSmall { min });
        }
        let max = max_min(capacity);
        if min > max {
            return Err(ConfigError::InternalMinimumTooLarge { min, max, capacity });
        }
        Ok(())
    }
}

/// Largest minimum occupancy for which merging two underfull siblings stays below `capacity`.
const fn max_min(capacity: usize) -> usize {
    capacity.div_ceil(2) - 1
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::with_block_size(DEFAULT_BLOCK_SIZE)
    }
}
