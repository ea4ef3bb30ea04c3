//! Bitset keys identifying sets of node type names.
//!
//! A `BitKey` stores one bit per node type name, numbered by the owning
//! cache's `NameIndex`. Identity is the bit pattern alone: two keys are equal
//! when their words are equal after zero-extending the shorter one, whatever
//! order or multiplicity the names were supplied in.
//!
//! Keys are totally ordered by
//! 1. cardinality, descending (keys with more names sort first), then
//! 2. the words from most to least significant, descending.
//!
//! With this order the first cached key contained in a request is the largest
//! cached subset, which is what `EffectiveNodeTypeCache::find_best` relies on.

use nodetype_common::Name;
use nodetype_common::limits::BITS_PER_WORD;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone)]
pub struct BitKey {
    /// Sorted, deduplicated names of the set bits. Not identity-bearing.
    names: Arc<[Name]>,
    words: SmallVec<[u64; 2]>,
    cardinality: u32,
}

impl BitKey {
    pub(crate) fn from_parts(names: Arc<[Name]>, words: SmallVec<[u64; 2]>) -> Self {
        let cardinality: u32 = words.iter().map(|w| w.count_ones()).sum();
        debug_assert_eq!(
            cardinality as usize,
            names.len(),
            "bit key names out of sync with its bits"
        );
        Self {
            names,
            words,
            cardinality,
        }
    }

    /// The names this key was built from, sorted.
    #[inline]
    pub fn names(&self) -> &[Name] {
        &self.names
    }

    /// Number of set bits (distinct names).
    #[inline]
    pub fn len(&self) -> usize {
        self.cardinality as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    /// Returns `true` if `name` is one of the names of this key.
    pub fn includes(&self, name: &Name) -> bool {
        self.names.binary_search(name).is_ok()
    }

    /// Returns `true` if every bit set in `other` is also set in `self`,
    /// i.e. `other`'s name set is a subset of `self`'s.
    pub fn contains(&self, other: &BitKey) -> bool {
        let len = self.words.len().max(other.words.len());
        (0..len).all(|i| (!self.word(i) & other.word(i)) == 0)
    }

    /// The set difference `self \ other`.
    pub fn subtract(&self, other: &BitKey) -> BitKey {
        let len = self.words.len().max(other.words.len());
        let words: SmallVec<[u64; 2]> = (0..len).map(|i| self.word(i) & !other.word(i)).collect();
        let names: Arc<[Name]> = self
            .names
            .iter()
            .filter(|name| !other.includes(name))
            .cloned()
            .collect();
        BitKey::from_parts(names, words)
    }

    /// Iterate the set bit numbers in ascending order.
    pub fn bits(&self) -> impl Iterator<Item = u32> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            let base = (index * BITS_PER_WORD) as u32;
            SetBits(word).map(move |offset| base + offset)
        })
    }

    /// The words without trailing all-zero words.
    fn significant_words(&self) -> &[u64] {
        let end = self
            .words
            .iter()
            .rposition(|&w| w != 0)
            .map_or(0, |last| last + 1);
        &self.words[..end]
    }

    #[inline]
    fn word(&self, index: usize) -> u64 {
        self.words.get(index).copied().unwrap_or(0)
    }
}

/// Iterator over set bit offsets within one word.
struct SetBits(u64);

impl Iterator for SetBits {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.0 == 0 {
            return None;
        }
        let offset = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(offset)
    }
}

impl PartialEq for BitKey {
    fn eq(&self, other: &Self) -> bool {
        self.cardinality == other.cardinality
            && self.significant_words() == other.significant_words()
    }
}

impl Eq for BitKey {}

impl Hash for BitKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_words().hash(state);
    }
}

impl Ord for BitKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cardinality.cmp(&self.cardinality).then_with(|| {
            let len = self.words.len().max(other.words.len());
            (0..len)
                .rev()
                .map(|i| other.word(i).cmp(&self.word(i)))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl PartialOrd for BitKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w={}", self.cardinality)?;
        for name in self.names.iter() {
            write!(f, ", {name}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitKey")
            .field("names", &self.names)
            .field("words", &self.significant_words())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/bitkey_tests.rs"]
mod tests;
