//! Structural diagnostics produced by [`BPlusTree::consistency_report`](crate::BPlusTree::consistency_report).

use alloc::string::String;
use core::fmt;

use thiserror::Error;

/// Outcome of a consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsistencyState {
    /// Every structural invariant holds.
    Consistent,
    /// At least one invariant is violated; the report names the first one found.
    Broken,
}

/// A consistency check result with a human readable explanation.
///
/// # Examples
///
/// ```
/// use bplus_index::{BPlusTree, ConsistencyState};
///
/// let mut tree = BPlusTree::with_block_size(3).unwrap();
/// for key in 1..=4 {
///     tree.insert(key, key);
/// }
/// let report = tree.consistency_report();
/// assert_eq!(report.state, ConsistencyState::Consistent);
/// assert_eq!(
///     report.to_string(),
///     "B+ tree is consistent with height of 1 levels and 4 elements."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Whether the tree passed the check.
    pub state: ConsistencyState,
    /// Height and size of a consistent tree, or the first violation of a broken one.
    pub report: String,
}

impl ConsistencyReport {
    pub(crate) fn consistent(height: usize, len: usize) -> Self {
        Self {
            state: ConsistencyState::Consistent,
            report: alloc::format!("B+ tree is consistent with height of {height} levels and {len} elements."),
        }
    }

    pub(crate) fn broken(violation: &Inconsistency) -> Self {
        Self {
            state: ConsistencyState::Broken,
            report: alloc::format!("{violation}"),
        }
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.state == ConsistencyState::Consistent
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report)
    }
}

/// First structural violation found by the checker. Nodes are described as
/// `#slot [keys]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum Inconsistency {
    #[error("Leaf node {node} is at depth {depth}, but the leftmost leaf is at depth {height}.")]
    LeafDepth { node: String, depth: usize, height: usize },

    #[error("Node {node} has keys out of order at index {index}.")]
    UnorderedKeys { node: String, index: usize },

    #[error("Internal node {node} has {children} children for {keys} keys.")]
    ChildCount { node: String, keys: usize, children: usize },

    #[error("Leaf node {node} has less than {min} keys.")]
    LeafUnderflow { node: String, min: usize },

    #[error("Internal node {node} has less than {min} keys.")]
    InternalUnderflow { node: String, min: usize },

    #[error("Leaf node {node} is empty and has no left boundary key.")]
    EmptyLeaf { node: String },

    #[error("Node {child} has a different left boundary key ({boundary}) than the separator {separator} in {node}.")]
    Separator {
        node: String,
        child: String,
        boundary: String,
        separator: String,
    },

    #[error("Node {node} on level {level} has a wrong previous node link.")]
    WrongPrevious { node: String, level: usize },

    #[error("Node {node} on level {level} has a wrong next node link.")]
    WrongNext { node: String, level: usize },

    #[error("Node {node} on level {level} is not of the same kind as the first node of that level.")]
    MixedLevel { node: String, level: usize },

    #[error("The {direction} key iterator returned {previous} followed by {current}.")]
    IteratorOrder {
        direction: &'static str,
        previous: String,
        current: String,
    },

    #[error("The {direction} key iterator returned {actual} keys, but the tree holds {expected} elements.")]
    IteratorCount {
        direction: &'static str,
        actual: usize,
        expected: usize,
    },
}
