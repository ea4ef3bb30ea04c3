//! Name interning for node type and item names.
//!
//! Names are qualified JCR names in prefixed (`nt:base`) or expanded
//! (`{http://www.jcp.org/jcr/nt/1.0}base`) form. The resolver never looks
//! inside a name; it only compares, hashes and orders them.
//!
//! Interning keeps one shared allocation per distinct string, so equality
//! between names coming from the same interner short-circuits on pointer
//! identity and cloning a name is a reference-count bump.

use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

/// A node type or item name.
///
/// Equality, hashing and ordering are by string value. Two names built from
/// the same `NameInterner` share their allocation.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(Arc<str>);

impl Name {
    /// Create a name without interning it.
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Name(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty name is never a valid node type or item name.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if both names share the same interned allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Name) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Name {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for Name {}

impl Hash for Name {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;

/// Names of the built-in node types every repository registers.
const BUILTIN_NAMES: &[&str] = &[
    "nt:base",
    "nt:unstructured",
    "nt:hierarchyNode",
    "nt:file",
    "nt:folder",
    "nt:resource",
    "nt:linkedFile",
    "nt:nodeType",
    "nt:propertyDefinition",
    "nt:childNodeDefinition",
    "nt:versionHistory",
    "nt:version",
    "nt:frozenNode",
    "nt:versionLabels",
    "nt:versionedChild",
    "nt:query",
    "mix:referenceable",
    "mix:lockable",
    "mix:versionable",
    "mix:simpleVersionable",
    "mix:shareable",
    "mix:title",
    "mix:created",
    "mix:lastModified",
    "mix:language",
    "mix:mimeType",
    "mix:etag",
    "jcr:primaryType",
    "jcr:mixinTypes",
    "jcr:uuid",
    "jcr:content",
    "jcr:data",
    "jcr:created",
    "jcr:createdBy",
    "jcr:lastModified",
    "jcr:mimeType",
    "jcr:encoding",
];

struct InternerShard {
    strings: RwLock<FxHashSet<Arc<str>>>,
}

impl InternerShard {
    fn new() -> Self {
        InternerShard {
            strings: RwLock::new(FxHashSet::default()),
        }
    }
}

/// Sharded name interner for concurrent use.
///
/// Lookups of already-interned names only take a shard read lock; a write
/// lock is taken the first time a string is seen.
pub struct NameInterner {
    shards: [InternerShard; SHARD_COUNT],
}

impl NameInterner {
    pub fn new() -> Self {
        NameInterner {
            shards: std::array::from_fn(|_| InternerShard::new()),
        }
    }

    /// Intern a string, returning the shared `Name` for it.
    pub fn intern(&self, s: &str) -> Name {
        let shard = &self.shards[Self::shard_for(s)];

        if let Some(existing) = shard
            .strings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(s)
        {
            return Name(existing.clone());
        }

        let mut strings = shard.strings.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = strings.get(s) {
            return Name(existing.clone());
        }
        let owned: Arc<str> = Arc::from(s);
        strings.insert(owned.clone());
        Name(owned)
    }

    /// Intern an existing name, returning the interner's shared copy.
    pub fn intern_name(&self, name: &Name) -> Name {
        self.intern(name.as_str())
    }

    /// Number of distinct interned names.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .strings
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pre-intern the built-in node type and item names.
    pub fn intern_builtins(&self) {
        for s in BUILTIN_NAMES {
            self.intern(s);
        }
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }
}

impl Default for NameInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
