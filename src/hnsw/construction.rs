//! Neighbor selection and link pruning.
//!
//! Raw beam-search candidates make poor edges: the closest `M` of them tend
//! to sit in one tight clump, which starves the graph of the longer-range
//! links greedy routing depends on. `select_neighbors` applies the
//! diversity rule from the HNSW paper to spread the chosen set out, and
//! `shrink_neighbors` re-prunes an existing node's list after a
//! bidirectional install pushes it past its per-layer cap.

use crate::distance;
use crate::error::{IndexError, Result};
use crate::hnsw::adjacency::NeighborList;
use crate::storage::VectorStore;

/// Environment variable selecting the shrink strategy (`heuristic` or
/// `greedy`). Read by [`ShrinkStrategy::from_env`].
pub const SHRINK_ENV: &str = "SMALLWORLD_SHRINK";

/// How an over-cap neighbor list is pruned back to its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShrinkStrategy {
    /// Re-run diversity selection over the whole candidate set. The default;
    /// keeps graph quality and is what the recall guarantees assume.
    #[default]
    Heuristic,
    /// Keep the `cap − 1` closest neighbors and append the new node
    /// regardless of diversity. Faster builds, slightly worse graphs.
    Greedy,
}

impl ShrinkStrategy {
    /// Parse a strategy name as used by the [`SHRINK_ENV`] toggle.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(ShrinkStrategy::Heuristic),
            "greedy" => Ok(ShrinkStrategy::Greedy),
            _ => Err(IndexError::UnknownShrinkStrategy(name.to_string())),
        }
    }

    /// Resolve the strategy from [`SHRINK_ENV`], defaulting to
    /// [`ShrinkStrategy::Heuristic`] when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(SHRINK_ENV) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(ShrinkStrategy::Heuristic),
        }
    }
}

/// Pick up to `cap` diverse neighbors from `candidates`, which arrive sorted
/// ascending by distance to the node being linked.
///
/// A candidate is kept iff it is closer to the target than to every neighbor
/// already kept; rejected candidates go to a discard list. If the diversity
/// pass ends short of `cap`, the discards top the result up in their original
/// distance order, so the cap is always met when enough candidates exist.
/// The refill applies on every layer.
pub(crate) fn select_neighbors(
    candidates: &[(u32, f32)],
    cap: usize,
    store: &VectorStore,
) -> Vec<u32> {
    let mut selected: Vec<u32> = Vec::with_capacity(cap.min(candidates.len()));
    let mut discarded: Vec<u32> = Vec::new();

    for &(candidate, dist_to_target) in candidates {
        if selected.len() >= cap {
            break;
        }
        let candidate_vec = store.get(candidate);
        let diverse = selected
            .iter()
            .all(|&kept| distance::l2_squared(store.get(kept), candidate_vec) >= dist_to_target);
        if diverse {
            selected.push(candidate);
        } else {
            discarded.push(candidate);
        }
    }

    for &discard in &discarded {
        if selected.len() >= cap {
            break;
        }
        selected.push(discard);
    }

    selected
}

/// Re-prune `node`'s layer list after a backlink from `new_id` would push it
/// past `cap`. On entry `list` holds exactly `cap` neighbors; on return it
/// holds `cap` again, now accounting for `new_id`.
pub(crate) fn shrink_neighbors(
    node: u32,
    new_id: u32,
    cap: usize,
    list: &mut NeighborList,
    store: &VectorStore,
    strategy: ShrinkStrategy,
) {
    let node_vec = store.get(node);
    let mut candidates: Vec<(u32, f32)> = list
        .iter()
        .map(|id| (id, distance::l2_squared(store.get(id), node_vec)))
        .collect();

    match strategy {
        ShrinkStrategy::Greedy => {
            // Rewrite the list in place: the cap−1 closest survivors, then
            // the new node in the freed slot.
            candidates.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            for (slot, &(id, _)) in candidates.iter().take(cap - 1).enumerate() {
                list.set(slot, id);
            }
            list.set(cap - 1, new_id);
        }
        ShrinkStrategy::Heuristic => {
            candidates.push((new_id, distance::l2_squared(store.get(new_id), node_vec)));
            candidates.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
            list.replace(select_neighbors(&candidates, cap, store).into_iter().collect());
        }
    }
}
