//! Bitset-keyed cache of effective node types.
//!
//! Aggregates are stored twice: in a hash map for exact lookups and in an
//! ordered set over the `BitKey` total order for "largest cached subset"
//! searches. Both are mutated together by `put` and `remove`.
//!
//! The cache owns the `NameIndex` that numbers its bits. Cloning the cache
//! copies the index, so a clone and its original can grow independently.
//!
//! Mutations are expected from a single logical writer at a time; the owner
//! serializes registration, unregistration and invalidation.

use crate::bitkey::BitKey;
use crate::effective::EffectiveNodeType;
use crate::name_index::NameIndex;
use nodetype_common::Name;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::trace;

#[derive(Clone, Debug, Default)]
pub struct EffectiveNodeTypeCache {
    index: NameIndex,
    aggregates: FxHashMap<BitKey, Arc<EffectiveNodeType>>,
    sorted_keys: BTreeSet<BitKey>,
}

impl EffectiveNodeTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the key for a set of node type names.
    pub fn key_for(&self, names: &[Name]) -> BitKey {
        self.index.key_for(names)
    }

    pub fn name_index(&self) -> &NameIndex {
        &self.index
    }

    /// Cache `ent` under `key`.
    pub fn put(&mut self, key: BitKey, ent: Arc<EffectiveNodeType>) {
        trace!(key = %key, "EffectiveNodeTypeCache::put");
        self.sorted_keys.replace(key.clone());
        self.aggregates.insert(key, ent);
    }

    /// Cache `ent` under the key of its merged types, returning that key.
    pub fn put_effective(&mut self, ent: Arc<EffectiveNodeType>) -> BitKey {
        let merged: Vec<Name> = ent.merged_types().iter().cloned().collect();
        let key = self.key_for(&merged);
        self.put(key.clone(), ent);
        key
    }

    pub fn contains(&self, key: &BitKey) -> bool {
        self.aggregates.contains_key(key)
    }

    pub fn get(&self, key: &BitKey) -> Option<Arc<EffectiveNodeType>> {
        self.aggregates.get(key).cloned()
    }

    /// Find the cached key covering the largest subset of `key`.
    ///
    /// Returns `key` itself when it is cached. Otherwise the ordered index is
    /// scanned from the front (largest cardinality first) and the first key
    /// whose names are all in `key` wins. Among keys of equal cardinality the
    /// winner is decided by bit values, not by merge cost.
    pub fn find_best(&self, key: &BitKey) -> Option<BitKey> {
        if let Some((cached, _)) = self.aggregates.get_key_value(key) {
            return Some(cached.clone());
        }
        self.sorted_keys
            .iter()
            .find(|candidate| key.contains(candidate))
            .cloned()
    }

    /// Evict every aggregate that includes `name`. Returns the number evicted.
    pub fn invalidate(&mut self, name: &Name) -> usize {
        // Collect first; eviction mutates both containers.
        let stale: Vec<BitKey> = self
            .aggregates
            .iter()
            .filter(|(key, ent)| ent.includes_node_type(name) || key.includes(name))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            self.remove(key);
        }
        trace!(name = %name, evicted = stale.len(), "EffectiveNodeTypeCache::invalidate");
        stale.len()
    }

    pub fn remove(&mut self, key: &BitKey) -> Option<Arc<EffectiveNodeType>> {
        let removed = self.aggregates.remove(key)?;
        self.sorted_keys.remove(key);
        trace!(key = %key, "EffectiveNodeTypeCache::remove");
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Cached keys in index order (largest cardinality first).
    pub fn keys(&self) -> impl Iterator<Item = &BitKey> {
        self.sorted_keys.iter()
    }

    /// Drop every aggregate and forget all bit assignments.
    pub fn clear(&mut self) {
        self.aggregates.clear();
        self.sorted_keys.clear();
        self.index.clear();
    }

    /// Write a human-readable listing of the cached keys.
    pub fn dump(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "EffectiveNodeTypeCache ({} entries)", self.len())?;
        writeln!(out)?;
        writeln!(out, "EffectiveNodeTypes in cache:")?;
        writeln!(out)?;
        let table = self.index.table();
        for key in &self.sorted_keys {
            write!(out, "w={}", key.len())?;
            for bit in key.bits() {
                match table.get(bit as usize) {
                    Some(name) => write!(out, ", {bit}={name}")?,
                    None => write!(out, ", {bit}=?")?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn dump_to_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.dump(&mut out);
        out
    }
}

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod tests;
