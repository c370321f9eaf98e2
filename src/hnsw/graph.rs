//! The HNSW index: configuration, insertion, and query entry points.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use crate::error::{IndexError, Result};
use crate::hnsw::adjacency::NodeLinks;
use crate::hnsw::construction::{select_neighbors, shrink_neighbors, ShrinkStrategy};
use crate::hnsw::level::LevelGenerator;
use crate::hnsw::search::{search_layer, SearchScratch};
use crate::storage::{StorageBackend, VectorStore};

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 100;

/// Construction parameters for [`HnswIndex`].
///
/// `dimensions` and `capacity` are required and immutable; everything else
/// has a default. `seed` pins the level generator for reproducible builds:
/// two indexes built with the same config and the same insertion order
/// produce identical graphs, whichever storage backend is active.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HnswConfig {
    /// Vector dimensionality. Fixed for the life of the index.
    pub dimensions: usize,
    /// Maximum number of vectors the index will hold. Storage and the
    /// visited set are pre-sized from this.
    pub capacity: usize,
    /// Target neighbors per node on upper layers; layer 0 allows `2m`.
    pub m: usize,
    /// Beam width used to gather link candidates during insertion.
    pub ef_construction: usize,
    /// Vector storage layout.
    pub storage: StorageBackend,
    /// Pruning strategy when a backlink overflows a neighbor list.
    pub shrink: ShrinkStrategy,
    /// Level-generator seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl HnswConfig {
    /// Config with defaults (`m = 16`, `ef_construction = 100`), resolving
    /// the storage backend and shrink strategy from their environment
    /// toggles ([`crate::storage::STORAGE_ENV`],
    /// [`crate::hnsw::construction::SHRINK_ENV`]).
    pub fn new(dimensions: usize, capacity: usize) -> Result<Self> {
        Ok(Self {
            dimensions,
            capacity,
            m: DEFAULT_M,
            ef_construction: DEFAULT_EF_CONSTRUCTION,
            storage: StorageBackend::from_env()?,
            shrink: ShrinkStrategy::from_env()?,
            seed: None,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(IndexError::InvalidParameter(
                "dimensions must be positive".into(),
            ));
        }
        if self.capacity == 0 {
            return Err(IndexError::InvalidParameter(
                "capacity must be positive".into(),
            ));
        }
        if self.m <= 1 {
            return Err(IndexError::InvalidParameter(format!(
                "m must be at least 2, got {}",
                self.m
            )));
        }
        if self.ef_construction == 0 {
            return Err(IndexError::InvalidParameter(
                "ef_construction must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Snapshot of index parameters and build progress.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HnswStats {
    pub m: usize,
    pub ef_construction: usize,
    pub dimensions: usize,
    pub node_count: usize,
    /// Top layer of the entry point; `None` while the index is empty.
    pub max_layer: Option<usize>,
    pub entry_point: Option<u32>,
    /// Wall-clock time spent inside `insert`, accumulated across all calls.
    pub total_insert_time_ms: u64,
}

/// In-memory HNSW approximate nearest neighbor index.
///
/// Vectors are inserted one at a time and assigned dense ids in insertion
/// order; `search` returns the ids of the approximate k nearest stored
/// vectors under squared Euclidean distance. Single mutator thread only:
/// operations never overlap, and the traversal scratch is owned by the
/// index and reused call to call.
///
/// # Panics
///
/// `insert` panics when the index is full or the vector length is wrong;
/// `search` panics when `k == 0` or the query length is wrong. These are
/// caller bugs: the index has no recoverable errors after construction.
///
/// # Example
///
/// ```
/// use smallworld::{HnswConfig, HnswIndex};
///
/// # fn main() -> smallworld::Result<()> {
/// let mut config = HnswConfig::new(2, 100)?;
/// config.seed = Some(7);
/// let mut index = HnswIndex::new(config)?;
///
/// index.insert(&[0.0, 0.0]);
/// index.insert(&[10.0, 0.0]);
/// index.insert(&[0.0, 10.0]);
///
/// assert_eq!(index.search(&[0.1, 0.1], 1, 10), vec![0]);
/// # Ok(())
/// # }
/// ```
pub struct HnswIndex {
    dimensions: usize,
    capacity: usize,
    m: usize,
    ef_construction: usize,
    shrink: ShrinkStrategy,
    store: VectorStore,
    nodes: Vec<NodeLinks>,
    entry_point: Option<u32>,
    max_layer: usize,
    levels: LevelGenerator,
    scratch: RefCell<SearchScratch>,
    insert_time: Duration,
}

impl HnswIndex {
    /// Create an empty index. All parameters are validated here; an `Err`
    /// means the config is unusable and must be discarded.
    pub fn new(config: HnswConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dimensions: config.dimensions,
            capacity: config.capacity,
            m: config.m,
            ef_construction: config.ef_construction,
            shrink: config.shrink,
            store: VectorStore::new(config.storage, config.dimensions, config.capacity),
            nodes: Vec::with_capacity(config.capacity),
            entry_point: None,
            max_layer: 0,
            levels: LevelGenerator::new(config.m, config.seed),
            scratch: RefCell::new(SearchScratch::new(config.capacity)),
            insert_time: Duration::ZERO,
        })
    }

    /// Number of stored vectors. Also the next id to be assigned.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a vector and return its id (ids are dense, in insertion order).
    ///
    /// The new node draws a top layer from the level generator, descends
    /// greedily through the layers above it, then on each layer it occupies
    /// collects `ef_construction` candidates by beam search, links to up to
    /// `m` diverse ones, and installs the reverse edges, pruning any
    /// neighbor pushed past its cap.
    ///
    /// # Panics
    ///
    /// If the index is at capacity or `vector.len()` differs from the
    /// configured dimensionality.
    pub fn insert(&mut self, vector: &[f32]) -> u32 {
        let started = Instant::now();
        assert!(
            self.nodes.len() < self.capacity,
            "index is at capacity ({})",
            self.capacity
        );
        assert_eq!(
            vector.len(),
            self.dimensions,
            "vector length {} does not match index dimensionality {}",
            vector.len(),
            self.dimensions
        );

        let new_id = self.nodes.len() as u32;
        let new_top = self.levels.sample();
        self.store.put(new_id, vector);
        self.nodes.push(NodeLinks::new(new_top, self.m));

        let Some(entry) = self.entry_point else {
            self.entry_point = Some(new_id);
            self.max_layer = new_top;
            self.insert_time += started.elapsed();
            return new_id;
        };

        let scratch = self.scratch.get_mut();
        let mut current = entry;

        // Greedy width-1 descent through the layers above the new node's top.
        for layer in (new_top + 1..=self.max_layer).rev() {
            current = search_layer(vector, current, 1, layer, &self.store, &self.nodes, scratch)[0].0;
        }

        for layer in (0..=new_top.min(self.max_layer)).rev() {
            let candidates = search_layer(
                vector,
                current,
                self.ef_construction,
                layer,
                &self.store,
                &self.nodes,
                scratch,
            );
            // The closest candidate seeds the next layer down.
            current = candidates[0].0;

            // The new node's own list is capped at m on every layer; only
            // backlinks may grow a base-layer list toward 2m.
            let chosen = select_neighbors(&candidates, self.m, &self.store);
            let cap = if layer == 0 { 2 * self.m } else { self.m };

            for neighbor in chosen {
                self.nodes[new_id as usize].neighbors_mut(layer).push(neighbor);

                if self.nodes[neighbor as usize].neighbors(layer).len() < cap {
                    self.nodes[neighbor as usize]
                        .neighbors_mut(layer)
                        .push(new_id);
                } else {
                    shrink_neighbors(
                        neighbor,
                        new_id,
                        cap,
                        self.nodes[neighbor as usize].neighbors_mut(layer),
                        &self.store,
                        self.shrink,
                    );
                }
            }
        }

        // Strictly greater: on a tie the earliest-inserted node keeps the
        // entry point.
        if new_top > self.max_layer {
            self.entry_point = Some(new_id);
            self.max_layer = new_top;
        }

        self.insert_time += started.elapsed();
        new_id
    }

    /// Return the ids of up to `k` approximate nearest neighbors of `query`,
    /// ascending by squared Euclidean distance.
    ///
    /// `ef_search` is the beam width on the base layer and should be at
    /// least `k`; when it is smaller the search simply returns the
    /// `ef_search` nodes it retained. An empty index yields an empty vec,
    /// as does `k` exceeding the node count beyond what is stored.
    ///
    /// # Panics
    ///
    /// If `k == 0` or `query.len()` differs from the configured
    /// dimensionality.
    pub fn search(&self, query: &[f32], k: usize, ef_search: usize) -> Vec<u32> {
        assert!(k > 0, "k must be positive");
        assert_eq!(
            query.len(),
            self.dimensions,
            "query length {} does not match index dimensionality {}",
            query.len(),
            self.dimensions
        );

        let Some(entry) = self.entry_point else {
            return Vec::new();
        };

        let mut scratch = self.scratch.borrow_mut();
        let mut current = entry;
        for layer in (1..=self.max_layer).rev() {
            current =
                search_layer(query, current, 1, layer, &self.store, &self.nodes, &mut scratch)[0].0;
        }

        let ranked = search_layer(
            query,
            current,
            ef_search,
            0,
            &self.store,
            &self.nodes,
            &mut scratch,
        );
        ranked.into_iter().take(k).map(|(id, _)| id).collect()
    }

    /// Parameter and build-progress snapshot.
    pub fn stats(&self) -> HnswStats {
        HnswStats {
            m: self.m,
            ef_construction: self.ef_construction,
            dimensions: self.dimensions,
            node_count: self.nodes.len(),
            max_layer: self.entry_point.map(|_| self.max_layer),
            entry_point: self.entry_point,
            total_insert_time_ms: self.insert_time.as_millis() as u64,
        }
    }

    /// Top layer of node `id`. Introspection for verification and tooling.
    pub fn node_top_layer(&self, id: u32) -> usize {
        self.nodes[id as usize].top_layer()
    }

    /// Neighbor ids of node `id` at `layer`, in list order.
    pub fn node_neighbors(&self, id: u32, layer: usize) -> &[u32] {
        self.nodes[id as usize].neighbors(layer).as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(dimensions: usize, capacity: usize) -> HnswConfig {
        HnswConfig {
            dimensions,
            capacity,
            m: 4,
            ef_construction: 32,
            storage: StorageBackend::Contiguous,
            shrink: ShrinkStrategy::Heuristic,
            seed: Some(42),
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        for config in [
            HnswConfig {
                dimensions: 0,
                ..small_config(4, 10)
            },
            HnswConfig {
                capacity: 0,
                ..small_config(4, 10)
            },
            HnswConfig {
                m: 1,
                ..small_config(4, 10)
            },
            HnswConfig {
                ef_construction: 0,
                ..small_config(4, 10)
            },
        ] {
            assert!(matches!(
                HnswIndex::new(config),
                Err(IndexError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn ids_are_dense_and_sequential() {
        let mut index = HnswIndex::new(small_config(2, 8)).unwrap();
        for i in 0..8 {
            let id = index.insert(&[i as f32, 0.0]);
            assert_eq!(id, i);
        }
        assert_eq!(index.len(), 8);
    }

    #[test]
    fn first_insert_becomes_entry_point() {
        let mut index = HnswIndex::new(small_config(2, 4)).unwrap();
        index.insert(&[1.0, 2.0]);
        let stats = index.stats();
        assert_eq!(stats.entry_point, Some(0));
        assert_eq!(stats.max_layer, Some(index.node_top_layer(0)));
        assert_eq!(stats.node_count, 1);
    }

    #[test]
    #[should_panic(expected = "at capacity")]
    fn insert_past_capacity_panics() {
        let mut index = HnswIndex::new(small_config(2, 1)).unwrap();
        index.insert(&[0.0, 0.0]);
        index.insert(&[1.0, 1.0]);
    }

    #[test]
    #[should_panic(expected = "does not match index dimensionality")]
    fn insert_wrong_length_panics() {
        let mut index = HnswIndex::new(small_config(3, 4)).unwrap();
        index.insert(&[0.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "k must be positive")]
    fn search_zero_k_panics() {
        let mut index = HnswIndex::new(small_config(2, 4)).unwrap();
        index.insert(&[0.0, 0.0]);
        index.search(&[0.0, 0.0], 0, 10);
    }

    #[test]
    fn empty_index_returns_empty() {
        let index = HnswIndex::new(small_config(2, 4)).unwrap();
        assert!(index.search(&[0.5, 0.5], 3, 10).is_empty());
    }

    #[test]
    fn single_node_is_its_own_neighbor() {
        let mut index = HnswIndex::new(small_config(2, 4)).unwrap();
        index.insert(&[3.0, 4.0]);
        assert_eq!(index.search(&[3.0, 4.0], 1, 10), vec![0]);
    }

    #[test]
    fn stats_reflect_configuration() {
        let index = HnswIndex::new(small_config(2, 4)).unwrap();
        let stats = index.stats();
        assert_eq!(stats.m, 4);
        assert_eq!(stats.ef_construction, 32);
        assert_eq!(stats.dimensions, 2);
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.entry_point, None);
        assert_eq!(stats.max_layer, None);
    }
}
