//! Error types for `bplus_index`.

use thiserror::Error;

/// Rejected tree sizing, reported by [`TreeConfig::validate`](crate::TreeConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    // Leaf sizing
    #[error("leaf capacity must be at least 3, got {capacity}")]
    LeafCapacityTooSmall { capacity: usize },

    #[error("leaf capacity must be odd, got {capacity}")]
    LeafCapacityNotOdd { capacity: usize },

    #[error("minimum leaf occupancy must be at least 1, got {min}")]
    LeafMinimumTooSmall { min: usize },

    #[error("minimum leaf occupancy must be at most {max} for leaf capacity {capacity}, got {min}")]
    LeafMinimumTooLarge { min: usize, max: usize, capacity: usize },

    // Internal node sizing
    #[error("internal node capacity must be at least 3, got {capacity}")]
    InternalCapacityTooSmall { capacity: usize },

    #[error("internal node capacity must be odd, got {capacity}")]
    InternalCapacityNotOdd { capacity: usize },

    #[error("minimum internal node occupancy must be at least 1, got {min}")]
    InternalMinimumTooSmall { min: usize },

    #[error("minimum internal node occupancy must be at most {max} for internal node capacity {capacity}, got {min}")]
    InternalMinimumTooLarge { min: usize, max: usize, capacity: usize },
}
