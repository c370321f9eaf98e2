//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor
//! index.
//!
//! # Algorithm
//!
//! HNSW (Malkov & Yashunin, arXiv:1603.09320) maintains a stack of proximity
//! graphs over one node set:
//!
//! - **Upper layers**: exponentially sparser, providing long-range hops so a
//!   greedy walk reaches the right region in few steps.
//! - **Layer 0**: every node, densely linked, searched with a beam of width
//!   `ef` for the final candidates.
//!
//! Each inserted node draws a top layer from an exponential decay
//! distribution, then links itself into every layer it occupies: a beam
//! search gathers `ef_construction` nearby candidates, a diversity heuristic
//! picks up to `M` of them that are not mutually redundant, and edges go in
//! both directions, pruning any neighbor whose list overflows its cap
//! (`2M` on layer 0, `M` above).
//!
//! Queries descend the hierarchy greedily (beam width 1) and run one wide
//! beam search on layer 0, returning the `k` closest of the nodes retained.
//!
//! # Scope
//!
//! The index is in-memory, single-threaded, and append-only: no deletion, no
//! persistence, no metric other than squared Euclidean distance. Recall is
//! tuned at query time via `ef_search`: higher widths visit more of the
//! graph and return better neighbors, at proportional cost.
//!
//! # Usage
//!
//! ```
//! use smallworld::{HnswConfig, HnswIndex};
//!
//! # fn main() -> smallworld::Result<()> {
//! let mut config = HnswConfig::new(4, 1_000)?;
//! config.seed = Some(42);
//! let mut index = HnswIndex::new(config)?;
//!
//! index.insert(&[0.1, 0.2, 0.3, 0.4]);
//! index.insert(&[0.9, 0.8, 0.7, 0.6]);
//!
//! let nearest = index.search(&[0.1, 0.2, 0.3, 0.5], 1, 10);
//! assert_eq!(nearest, vec![0]);
//! # Ok(())
//! # }
//! ```

pub(crate) mod adjacency;
pub mod construction;
pub mod graph;
pub(crate) mod level;
pub(crate) mod search;
pub(crate) mod visited;

pub use construction::{ShrinkStrategy, SHRINK_ENV};
pub use graph::{HnswConfig, HnswIndex, HnswStats};
