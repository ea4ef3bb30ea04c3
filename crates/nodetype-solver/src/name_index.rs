//! Bidirectional name <-> bit-number table backing `BitKey`.
//!
//! The first name seen gets bit 0, the next bit 1, and so on, for the
//! lifetime of the owning cache. Lookups vastly outnumber registrations:
//!
//! - The forward direction is a concurrent map read without any lock.
//! - Registration is double-checked: a reader that finds nothing takes the
//!   registration lock and looks again before assigning a bit.
//! - The reverse table is published as an `Arc` snapshot. A writer that finds
//!   the snapshot shared copies it before growing, so a reader holding a
//!   snapshot never sees it change.

use crate::bitkey::BitKey;
use dashmap::DashMap;
use nodetype_common::Name;
use nodetype_common::limits::{BITS_PER_WORD, INITIAL_NAME_TABLE_CAPACITY};
use smallvec::{SmallVec, smallvec};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::trace;

pub struct NameIndex {
    forward: DashMap<Name, u32>,
    reverse: RwLock<Arc<Vec<Name>>>,
    registration: Mutex<()>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_NAME_TABLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            forward: DashMap::with_capacity(capacity),
            reverse: RwLock::new(Arc::new(Vec::with_capacity(capacity))),
            registration: Mutex::new(()),
        }
    }

    /// Number of names that have been assigned a bit.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Bit number of `name`, if one has been assigned.
    #[inline]
    pub fn lookup(&self, name: &Name) -> Option<u32> {
        self.forward.get(name).map(|bit| *bit)
    }

    /// Bit number of `name`, assigning the next free bit on first sight.
    pub fn bit_for(&self, name: &Name) -> u32 {
        if let Some(bit) = self.lookup(name) {
            return bit;
        }

        let _registration = self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(bit) = self.lookup(name) {
            return bit;
        }

        let bit = {
            let mut table = self.reverse.write().unwrap_or_else(PoisonError::into_inner);
            let names = Arc::make_mut(&mut table);
            names.push(name.clone());
            (names.len() - 1) as u32
        };
        // Forward entry last: a reader that finds the bit can always resolve it back.
        self.forward.insert(name.clone(), bit);
        trace!(name = %name, bit, "NameIndex::bit_for - assigned");
        bit
    }

    /// Name assigned to `bit`, if any.
    pub fn name_at(&self, bit: u32) -> Option<Name> {
        self.table().get(bit as usize).cloned()
    }

    /// Current snapshot of the reverse table.
    pub fn table(&self) -> Arc<Vec<Name>> {
        self.reverse
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build the key for a set of names, assigning bits to unseen names.
    ///
    /// The word array is sized for the current name count plus the incoming
    /// names, so keys built while the table grows rarely need to reallocate.
    pub fn key_for(&self, names: &[Name]) -> BitKey {
        let max_bit = self.len() + names.len();
        let mut words: SmallVec<[u64; 2]> = smallvec![0; max_bit / BITS_PER_WORD + 1];
        for name in names {
            let bit = self.bit_for(name) as usize;
            let word = bit / BITS_PER_WORD;
            if word >= words.len() {
                // Other threads registered names since `max_bit` was read.
                words.resize(word + 1, 0);
            }
            words[word] |= 1u64 << (bit % BITS_PER_WORD);
        }

        let mut sorted = names.to_vec();
        sorted.sort();
        sorted.dedup();
        BitKey::from_parts(sorted.into(), words)
    }

    /// Forget every assignment. Keys built before the reset become meaningless.
    pub fn clear(&self) {
        let _registration = self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *self.reverse.write().unwrap_or_else(PoisonError::into_inner) =
            Arc::new(Vec::with_capacity(INITIAL_NAME_TABLE_CAPACITY));
        self.forward.clear();
    }
}

impl Default for NameIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NameIndex {
    /// Deep copy: the clone assigns new bits independently of the original.
    fn clone(&self) -> Self {
        let _registration = self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let table = self.table();
        let mut names = Vec::with_capacity(table.capacity().max(INITIAL_NAME_TABLE_CAPACITY));
        names.extend(table.iter().cloned());
        Self {
            forward: self.forward.clone(),
            reverse: RwLock::new(Arc::new(names)),
            registration: Mutex::new(()),
        }
    }
}

impl std::fmt::Debug for NameIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameIndex")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/name_index_tests.rs"]
mod tests;
