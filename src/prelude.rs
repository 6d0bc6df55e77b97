//! Shared collection aliases.
//!
//! Handle-keyed tables use the Fx hasher throughout; ordered property maps
//! keep insertion order for deterministic materialization.

pub use rustc_hash::{FxHashMap, FxHashSet};

pub type IndexMap<K, V> =
    indexmap::IndexMap<K, V, core::hash::BuildHasherDefault<rustc_hash::FxHasher>>;
