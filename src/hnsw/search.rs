//! Layer-local beam search.
//!
//! `search_layer` is the traversal primitive everything else is built from:
//! insertion runs it at `ef_construction` to collect link candidates, queries
//! run it at width 1 while descending and at `ef_search` on the base layer.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::distance;
use crate::hnsw::adjacency::NodeLinks;
use crate::hnsw::visited::VisitedSet;
use crate::storage::VectorStore;

/// A node paired with its distance to the current query.
///
/// Ordered by `(distance, id)` under IEEE total ordering, so heaps behave
/// deterministically even when distances tie. Max-heap by default; wrap in
/// [`Reverse`] for min-first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub dist: f32,
    pub id: u32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable traversal state: the two beam-search heaps plus visit marks.
///
/// Heaps and visited marks are expensive to re-create per call, so the index
/// owns one scratch and threads it through every `search_layer` invocation on
/// its thread. Every call leaves the scratch fully cleared.
pub(crate) struct SearchScratch {
    /// Min-heap of nodes still to expand.
    candidates: BinaryHeap<Reverse<Candidate>>,
    /// Max-heap of the best results so far, bounded by `ef`.
    results: BinaryHeap<Candidate>,
    visited: VisitedSet,
}

impl SearchScratch {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            candidates: BinaryHeap::new(),
            results: BinaryHeap::new(),
            visited: VisitedSet::new(capacity),
        }
    }
}

/// Beam search within layer `layer`, starting from `entry`.
///
/// Returns up to `ef` of the closest nodes found, ascending by distance.
/// Classic dual-queue expansion: pop the nearest unexpanded candidate, stop
/// as soon as it cannot improve on the worst retained result, otherwise
/// relax its neighbors. Every node touched is marked in the visited set so
/// dense graphs do not recompute distances.
///
/// The order among equal-distance results follows the `(distance, id)` heap
/// key; callers must not rely on any finer ordering.
pub(crate) fn search_layer(
    query: &[f32],
    entry: u32,
    ef: usize,
    layer: usize,
    store: &VectorStore,
    nodes: &[NodeLinks],
    scratch: &mut SearchScratch,
) -> Vec<(u32, f32)> {
    let ef = ef.max(1);
    let entry_dist = distance::l2_squared(store.get(entry), query);
    scratch.candidates.push(Reverse(Candidate {
        dist: entry_dist,
        id: entry,
    }));
    scratch.results.push(Candidate {
        dist: entry_dist,
        id: entry,
    });
    scratch.visited.insert(entry);

    while let Some(Reverse(candidate)) = scratch.candidates.pop() {
        // The results heap is seeded with the entry and never drained inside
        // the loop, so a farthest element always exists.
        let farthest = scratch
            .results
            .peek()
            .map(|c| c.dist)
            .unwrap_or(f32::INFINITY);
        if candidate.dist > farthest {
            // Nothing left in the frontier can displace a retained result.
            break;
        }

        for neighbor in nodes[candidate.id as usize].neighbors(layer).iter() {
            if !scratch.visited.insert(neighbor) {
                continue;
            }
            let dist = distance::l2_squared(store.get(neighbor), query);
            let farthest = scratch
                .results
                .peek()
                .map(|c| c.dist)
                .unwrap_or(f32::INFINITY);
            if scratch.results.len() < ef || dist < farthest {
                scratch.candidates.push(Reverse(Candidate {
                    dist,
                    id: neighbor,
                }));
                scratch.results.push(Candidate { dist, id: neighbor });
                if scratch.results.len() > ef {
                    scratch.results.pop();
                }
            }
        }
    }

    // Max-heap pops farthest-first; fill back-to-front for ascending output.
    let mut ranked = vec![(0u32, 0f32); scratch.results.len()];
    let mut i = scratch.results.len();
    while let Some(candidate) = scratch.results.pop() {
        i -= 1;
        ranked[i] = (candidate.id, candidate.dist);
    }

    scratch.candidates.clear();
    scratch.visited.clear();
    ranked
}
