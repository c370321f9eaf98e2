//! Fixed-capacity vector storage.
//!
//! Both backends pre-allocate for a fixed `(capacity, dimensions)` chosen at
//! construction and hand the graph core plain `&[f32]` views, so the distance
//! kernel reads stored vectors in place regardless of layout:
//!
//! - [`StorageBackend::Contiguous`] packs all slots into one flat
//!   `capacity × dimensions` buffer (slot `id` starts at `id × dimensions`).
//!   One allocation for the life of the index; the layout of choice for
//!   large capacities.
//! - [`StorageBackend::PerSlot`] boxes each vector individually. More
//!   allocator traffic, but each slot is its own allocation, which can be
//!   friendlier for small indexes.
//!
//! Ids are dense and assigned in insertion order, and a slot is written
//! exactly once. The backend choice never changes distances or graph
//! structure: identical inputs yield identical neighbor lists either way.

use crate::error::{IndexError, Result};

/// Environment variable selecting the storage backend (`contiguous` or
/// `per-slot`). Read by [`StorageBackend::from_env`].
pub const STORAGE_ENV: &str = "SMALLWORLD_STORAGE";

/// Vector storage layout, selected at index construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageBackend {
    /// Single flat `f32` block holding every slot. The default.
    #[default]
    Contiguous,
    /// One owned boxed slice per slot.
    PerSlot,
}

impl StorageBackend {
    /// Parse a backend name as used by the [`STORAGE_ENV`] toggle.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "contiguous" => Ok(StorageBackend::Contiguous),
            "per-slot" | "per_slot" => Ok(StorageBackend::PerSlot),
            _ => Err(IndexError::UnknownStorageBackend(name.to_string())),
        }
    }

    /// Resolve the backend from [`STORAGE_ENV`], defaulting to
    /// [`StorageBackend::Contiguous`] when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(STORAGE_ENV) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(StorageBackend::Contiguous),
        }
    }
}

/// Dense vector store addressed by node id.
pub(crate) enum VectorStore {
    Contiguous { block: Vec<f32>, dims: usize },
    PerSlot { slots: Vec<Box<[f32]>>, dims: usize },
}

impl VectorStore {
    pub(crate) fn new(backend: StorageBackend, dims: usize, capacity: usize) -> Self {
        match backend {
            StorageBackend::Contiguous => VectorStore::Contiguous {
                block: vec![0.0; capacity * dims],
                dims,
            },
            StorageBackend::PerSlot => VectorStore::PerSlot {
                slots: Vec::with_capacity(capacity),
                dims,
            },
        }
    }

    /// Copy `vector` into slot `id`. Ids arrive dense and in order; a slot is
    /// never written twice.
    pub(crate) fn put(&mut self, id: u32, vector: &[f32]) {
        match self {
            VectorStore::Contiguous { block, dims } => {
                let start = id as usize * *dims;
                block[start..start + *dims].copy_from_slice(vector);
            }
            VectorStore::PerSlot { slots, .. } => {
                debug_assert_eq!(id as usize, slots.len());
                slots.push(vector.into());
            }
        }
    }

    /// Borrow the vector in slot `id`.
    #[inline]
    pub(crate) fn get(&self, id: u32) -> &[f32] {
        match self {
            VectorStore::Contiguous { block, dims } => {
                let start = id as usize * *dims;
                &block[start..start + *dims]
            }
            VectorStore::PerSlot { slots, .. } => &slots[id as usize],
        }
    }
}
