//! Error types for smallworld.

use thiserror::Error;

/// Errors reported during index construction.
///
/// Construction parameters are validated eagerly; an index is never handed
/// out in a partially-initialized state. Hot-path preconditions (capacity
/// overflow, wrong vector length, `k == 0`) are programmer errors and panic
/// instead; see [`crate::hnsw::HnswIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// A construction parameter is out of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The storage backend name is not recognized.
    #[error("unknown storage backend `{0}` (expected `contiguous` or `per-slot`)")]
    UnknownStorageBackend(String),

    /// The shrink strategy name is not recognized.
    #[error("unknown shrink strategy `{0}` (expected `heuristic` or `greedy`)")]
    UnknownShrinkStrategy(String),
}

/// Result type alias for smallworld operations.
pub type Result<T> = std::result::Result<T, IndexError>;
