//! # kinship-store
//!
//! Reference [`MemberStore`](kinship_engine::MemberStore) implementations for
//! `kinship-engine`.
//!
//! ## Features
//!
//! - **default**: [`InMemoryStore`], a `HashMap`-backed store for tests,
//!   tools and small trees
//! - **`cache`**: [`CachedStore`], an LRU read-through cache with TTL in front
//!   of any store
//! - **`snapshot`**: [`FamilySnapshot`], JSON save/load of a whole family
//! - **`full`**: everything
//!
//! ## Quick Start
//!
//! ```ignore
//! use kinship_engine::GenealogyEngine;
//! use kinship_store::{CacheConfig, CachedStore, FamilySnapshot, InMemoryStore};
//!
//! let store = InMemoryStore::from_snapshot(FamilySnapshot::load("family.json")?);
//! let cached = CachedStore::new(store, CacheConfig::default());
//!
//! let engine = GenealogyEngine::new(&cached);
//! let tree = engine.build_tree(None)?;
//! ```

#![warn(missing_docs)]

mod error;
mod memory;

#[cfg(feature = "cache")]
mod cache;

#[cfg(feature = "snapshot")]
mod snapshot;

pub use error::{MemoryStoreError, MemoryStoreResult};
pub use memory::InMemoryStore;

#[cfg(feature = "cache")]
pub use cache::{CacheConfig, CacheStats, CachedStore};

#[cfg(feature = "snapshot")]
pub use error::{StoreFileError, StoreFileResult};
#[cfg(feature = "snapshot")]
pub use snapshot::{FamilySnapshot, SNAPSHOT_VERSION};
