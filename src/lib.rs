//! smallworld: an in-memory HNSW approximate nearest neighbor index.
//!
//! Stores fixed-dimensional `f32` vectors and answers k-nearest-neighbor
//! queries under squared Euclidean distance using the Hierarchical Navigable
//! Small World graph of Malkov & Yashunin (arXiv:1603.09320). The index is
//! built incrementally, one [`HnswIndex::insert`] per vector, and queried
//! read-mostly via [`HnswIndex::search`].
//!
//! ```
//! use smallworld::{HnswConfig, HnswIndex};
//!
//! # fn main() -> smallworld::Result<()> {
//! let mut config = HnswConfig::new(2, 10)?;
//! config.seed = Some(1);
//! let mut index = HnswIndex::new(config)?;
//!
//! index.insert(&[0.0, 0.0]);
//! index.insert(&[10.0, 0.0]);
//! index.insert(&[0.0, 10.0]);
//!
//! assert_eq!(index.search(&[0.1, 0.1], 1, 10), vec![0]);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//!
//! - [`distance`]: squared-L2 kernels, a scalar reference plus runtime-
//!   dispatched SIMD (AVX2/SSE4.1/NEON) with scalar tails.
//! - [`storage`]: fixed-capacity vector storage; one contiguous block
//!   (default) or per-slot owned arrays, selectable at construction or via
//!   the `SMALLWORLD_STORAGE` environment variable.
//! - [`hnsw`]: the layered graph itself, with level sampling, beam search,
//!   diversity-based neighbor selection, and bidirectional link maintenance.
//!
//! # What it is not
//!
//! No persistence, no deletion, no concurrent mutation, no metrics beyond
//! squared L2. Dataset loading and evaluation harnesses live with the
//! caller.

pub mod distance;
pub mod error;
pub mod hnsw;
pub mod storage;

pub use error::{IndexError, Result};
pub use hnsw::{HnswConfig, HnswIndex, HnswStats, ShrinkStrategy, SHRINK_ENV};
pub use storage::{StorageBackend, STORAGE_ENV};
