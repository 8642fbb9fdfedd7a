//! In-memory B+ tree ordered index for Rust.
//!
//! This crate provides [`BPlusTree`], an ordered key-value index with O(log n)
//! insert, upsert, delete and search, plus ordered forward and backward scans
//! over keys and values. It is meant as the index primitive of a storage
//! engine: sorted primary-key and attribute indexes kept in memory.
//!
//! # Example
//!
//! ```
//! use bplus_index::{BPlusTree, TreeConfig};
//!
//! // Leaves hold up to 7 keys, internal nodes up to 5 separators.
//! let config = TreeConfig::default().with_leaf(7, 3).with_internal(5, 2);
//! let mut by_age = BPlusTree::new(config).unwrap();
//!
//! by_age.insert(42, "Carol");
//! by_age.insert(17, "Alice");
//! by_age.insert(23, "Bob");
//!
//! assert_eq!(by_age.search(&23), Some(&"Bob"));
//!
//! // Everyone aged 18 or older, in ascending order.
//! let adults: Vec<_> = by_age.greater_or_equal_values(&18).copied().collect();
//! assert_eq!(adults, ["Bob", "Carol"]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable fan-out** - Leaf and internal node capacities and minimums are set per tree
//! - **Linked levels** - Every node knows its left and right neighbour, scans walk the leaf chain
//! - **Self-checking** - [`BPlusTree::consistency_report`] verifies every structural invariant
//! - **`serde`** (optional) - `Serialize`/`Deserialize` for [`TreeConfig`]
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by index. A node splits as
//! soon as it reaches its capacity; an underfull node first borrows entries
//! from a sibling under the same parent and merges with one otherwise.
//! Splits, borrows, merges and root changes are reported through [`tracing`]
//! at `TRACE` level.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod config;
mod consistency;
mod error;
mod raw;

pub mod bplus_tree;

pub use bplus_tree::{BPlusTree, IntBPlusTree};
pub use config::{DEFAULT_BLOCK_SIZE, TreeConfig};
pub use consistency::{ConsistencyReport, ConsistencyState};
pub use error::ConfigError;
